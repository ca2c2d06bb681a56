use serde::{Deserialize, Serialize};

use crate::errors::{GazeError, GazeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenDimensions {
    pub width: u32,
    pub height: u32,
}

/// Queried exactly once at startup and passed into the resolver; the display
/// is assumed not to change resolution mid-run.
pub trait DisplayInfoProvider {
    fn dimensions(&self) -> GazeResult<ScreenDimensions>;
}

/// Reads the primary monitor geometry via xcap.
pub struct XcapDisplay;

impl DisplayInfoProvider for XcapDisplay {
    fn dimensions(&self) -> GazeResult<ScreenDimensions> {
        let monitors = xcap::Monitor::all()
            .map_err(|e| GazeError::Config(format!("monitor query failed: {e}")))?;

        let primary = monitors
            .iter()
            .find(|m| m.is_primary())
            .or_else(|| monitors.first())
            .ok_or_else(|| GazeError::Config("no monitors detected".into()))?;

        let dims = ScreenDimensions {
            width: primary.width(),
            height: primary.height(),
        };
        tracing::info!(width = dims.width, height = dims.height, "display dimensions");
        Ok(dims)
    }
}
