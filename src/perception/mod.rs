pub mod annotator;
pub mod display;
pub mod screenshot;

pub use display::{DisplayInfoProvider, ScreenDimensions, XcapDisplay};
pub use screenshot::{FrameSource, ScreenCapture};
