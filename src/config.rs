use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{GazeError, GazeResult};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Model name sent to the grounding API.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Total attempts at parsing the grounding response before giving up.
    #[serde(default = "default_max_parse_retries")]
    pub max_parse_retries: u32,
    /// Fixed backoff between parse-retry attempts.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Save a diagnostic copy of each screenshot with the resolved box drawn.
    #[serde(default = "default_true")]
    pub annotate: bool,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            max_parse_retries: default_max_parse_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            annotate: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Screenshot utility expected on PATH.
    #[serde(default = "default_capture_utility")]
    pub utility: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            utility: default_capture_utility(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_max_parse_retries() -> u32 {
    5
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_capture_utility() -> String {
    "gnome-screenshot".to_string()
}

fn default_true() -> bool {
    true
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Some(candidate);
            }
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join("config.toml");
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in working directory");
            return Some(candidate);
        }
    }

    None
}

/// Loads config.toml from next to the executable or the working directory.
/// The file is optional; every field has a default.
pub fn load_config() -> GazeResult<AppConfig> {
    let Some(path) = resolve_config_path() else {
        tracing::debug!("no config.toml found, using defaults");
        return Ok(AppConfig::default());
    };

    let content = std::fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), model = %config.vision.model, "config loaded");
    Ok(config)
}

/// Required credential for the grounding service. Read from the environment
/// (a .env file is loaded by main before this runs).
pub fn load_api_key() -> GazeResult<String> {
    std::env::var("GEMINI_API_KEY")
        .map_err(|_| GazeError::Config("GEMINI_API_KEY not set in environment or .env".into()))
}
