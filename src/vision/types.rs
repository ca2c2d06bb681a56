use crate::perception::annotator::PixelRect;
use crate::perception::display::ScreenDimensions;

/// The grounding service answers on a fixed 0–1000 grid, independent of the
/// actual screen resolution.
pub const NORMALIZED_SCALE: f64 = 1000.0;

/// A bounding box on the normalized grid. Construction validates the
/// invariants, so a held value is always well-formed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub y_min: f64,
    pub x_min: f64,
    pub y_max: f64,
    pub x_max: f64,
}

impl NormalizedBox {
    /// Builds a box from the service's `[y_min, x_min, y_max, x_max]` answer
    /// order. Rejects out-of-range values, reversed edges, and zero-area
    /// boxes (strict ordering excludes them).
    pub fn from_array(values: [f64; 4]) -> Result<Self, String> {
        let [y_min, x_min, y_max, x_max] = values;

        for v in values {
            if !(0.0..=NORMALIZED_SCALE).contains(&v) {
                return Err(format!("coordinate {v} outside [0, {NORMALIZED_SCALE}]"));
            }
        }
        if y_min >= y_max {
            return Err(format!("y_min {y_min} not below y_max {y_max}"));
        }
        if x_min >= x_max {
            return Err(format!("x_min {x_min} not below x_max {x_max}"));
        }

        Ok(Self {
            y_min,
            x_min,
            y_max,
            x_max,
        })
    }

    /// Center of the box in absolute device pixels, clamped into
    /// `[0, width) × [0, height)`.
    pub fn center_on(&self, dims: &ScreenDimensions) -> ScreenPoint {
        let cx = (self.x_min + self.x_max) / 2.0 / NORMALIZED_SCALE * dims.width as f64;
        let cy = (self.y_min + self.y_max) / 2.0 / NORMALIZED_SCALE * dims.height as f64;

        ScreenPoint {
            x: clamp_axis(cx, dims.width),
            y: clamp_axis(cy, dims.height),
        }
    }

    /// The box corners in device pixels, for the diagnostic overlay.
    pub fn pixel_rect(&self, dims: &ScreenDimensions) -> PixelRect {
        let to_px = |v: f64, extent: u32| (v / NORMALIZED_SCALE * extent as f64).round() as i32;
        (
            to_px(self.x_min, dims.width),
            to_px(self.y_min, dims.height),
            to_px(self.x_max, dims.width),
            to_px(self.y_max, dims.height),
        )
    }
}

fn clamp_axis(value: f64, extent: u32) -> u32 {
    let max = extent.saturating_sub(1) as i64;
    (value.round() as i64).clamp(0, max) as u32
}

/// An absolute device-pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: u32,
    pub y: u32,
}
