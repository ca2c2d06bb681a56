use thiserror::Error;

#[derive(Debug, Error)]
pub enum GazeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Workflow file error: {0}")]
    Workflow(String),

    #[error("Capture utility unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Grounding response malformed: {0}")]
    VisionParse(String),

    #[error("Grounding service error: {0}")]
    Grounding(String),

    #[error("Command execution error: {0}")]
    Command(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type GazeResult<T> = Result<T, GazeError>;
