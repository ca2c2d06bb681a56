use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::config::VisionConfig;
use crate::errors::{GazeError, GazeResult};
use crate::perception::annotator;
use crate::perception::display::ScreenDimensions;
use crate::perception::screenshot::FrameSource;
use crate::vision::gemini::GroundingClient;
use crate::vision::types::{NormalizedBox, ScreenPoint};

/// Diagnostic copy of the last grounded screenshot, overwritten per resolve.
const ANNOTATION_PATH: &str = "last_grounding.png";

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Total model attempts before a malformed answer becomes fatal.
    pub max_parse_retries: u32,
    pub retry_backoff: Duration,
    pub annotate: bool,
}

impl From<&VisionConfig> for ResolverConfig {
    fn from(cfg: &VisionConfig) -> Self {
        Self {
            max_parse_retries: cfg.max_parse_retries,
            retry_backoff: Duration::from_millis(cfg.retry_backoff_ms),
            annotate: cfg.annotate,
        }
    }
}

/// Resolves a natural-language element description to a screen coordinate.
#[async_trait]
pub trait ElementResolver: Send + Sync {
    async fn resolve(&self, element: &str) -> GazeResult<ScreenPoint>;
}

pub struct CoordinateResolver {
    frames: Arc<dyn FrameSource>,
    grounding: Arc<dyn GroundingClient>,
    dims: ScreenDimensions,
    cfg: ResolverConfig,
}

impl CoordinateResolver {
    /// `dims` is queried once by the caller at startup and never re-queried.
    pub fn new(
        frames: Arc<dyn FrameSource>,
        grounding: Arc<dyn GroundingClient>,
        dims: ScreenDimensions,
        cfg: ResolverConfig,
    ) -> Self {
        Self {
            frames,
            grounding,
            dims,
            cfg,
        }
    }

    fn save_annotation(&self, screenshot: &[u8], bbox: &NormalizedBox) {
        let rect = bbox.pixel_rect(&self.dims);
        match annotator::annotate_screenshot(screenshot, rect) {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(ANNOTATION_PATH, bytes) {
                    tracing::warn!(error = %e, "could not write annotated screenshot");
                } else {
                    tracing::debug!(path = ANNOTATION_PATH, "annotated screenshot saved");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not annotate screenshot"),
        }
    }
}

#[async_trait]
impl ElementResolver for CoordinateResolver {
    async fn resolve(&self, element: &str) -> GazeResult<ScreenPoint> {
        let screenshot = self.frames.capture().await?;
        let prompt = format!(
            "Return a bounding box for the {element} in [ymin, xmin, ymax, xmax] format."
        );

        let mut last_error: Option<GazeError> = None;

        for attempt in 1..=self.cfg.max_parse_retries {
            // Transport and API errors are not retried here; only a
            // malformed answer consumes an attempt.
            let text = self.grounding.locate(&screenshot, &prompt).await?;

            match parse_box(&text) {
                Ok(bbox) => {
                    let point = bbox.center_on(&self.dims);
                    tracing::info!(
                        element,
                        x = point.x,
                        y = point.y,
                        attempt,
                        "element resolved"
                    );
                    if self.cfg.annotate {
                        self.save_annotation(&screenshot, &bbox);
                    }
                    return Ok(point);
                }
                Err(e) => {
                    tracing::warn!(
                        element,
                        attempt,
                        max = self.cfg.max_parse_retries,
                        error = %e,
                        "grounding response malformed"
                    );
                    last_error = Some(e);
                    if attempt < self.cfg.max_parse_retries {
                        tokio::time::sleep(self.cfg.retry_backoff).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| GazeError::VisionParse("no grounding attempts configured".into())))
    }
}

/// Extracts a 4-number array from the model's answer text, tolerating prose
/// or markdown fences around it.
fn parse_box(text: &str) -> Result<NormalizedBox, GazeError> {
    static ARRAY_RE: OnceLock<Regex> = OnceLock::new();
    let re = ARRAY_RE.get_or_init(|| Regex::new(r"\[[^\[\]]*\]").expect("array regex"));

    let candidate = re
        .find(text)
        .ok_or_else(|| GazeError::VisionParse(format!("no array in: {}", text.trim())))?;

    let values: [f64; 4] = serde_json::from_str(candidate.as_str())
        .map_err(|e| GazeError::VisionParse(format!("{e}: {}", candidate.as_str())))?;

    NormalizedBox::from_array(values).map_err(GazeError::VisionParse)
}
