pub mod gemini;
pub mod resolver;
pub mod types;

pub use gemini::{GeminiClient, GroundingClient};
pub use resolver::{CoordinateResolver, ElementResolver, ResolverConfig};
pub use types::{NormalizedBox, ScreenPoint};
