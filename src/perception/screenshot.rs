use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use uuid::Uuid;

use crate::errors::{GazeError, GazeResult};
use crate::executor::shell::{quote, CommandRunner};

/// Source of raw desktop frames.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn capture(&self) -> GazeResult<Vec<u8>>;
}

/// Captures the desktop through an external screenshot utility, writing each
/// frame to a uniquely named file in an ephemeral directory. The directory is
/// removed when the capture service drops.
pub struct ScreenCapture {
    utility: String,
    runner: Arc<dyn CommandRunner>,
    output_dir: TempDir,
}

impl ScreenCapture {
    pub fn new(utility: String, runner: Arc<dyn CommandRunner>) -> GazeResult<Self> {
        let output_dir = tempfile::Builder::new().prefix("gazerunner-").tempdir()?;
        tracing::debug!(dir = %output_dir.path().display(), utility = %utility, "capture output directory created");
        Ok(Self {
            utility,
            runner,
            output_dir,
        })
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir.path()
    }
}

fn on_path(utility: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| dir.join(utility).is_file())
}

#[async_trait]
impl FrameSource for ScreenCapture {
    async fn capture(&self) -> GazeResult<Vec<u8>> {
        // Checked before invocation, not inferred from a launch failure.
        if !on_path(&self.utility) {
            return Err(GazeError::CaptureUnavailable(format!(
                "{} not found on PATH",
                self.utility
            )));
        }

        let path = self
            .output_dir
            .path()
            .join(format!("screenshot_{}.png", Uuid::new_v4().simple()));
        let command = format!("{} -f {} -p", self.utility, quote(&path.to_string_lossy()));

        let out = self.runner.run(&command).await?;

        if !path.exists() {
            return Err(GazeError::CaptureFailed(format!(
                "{} produced no file: {}",
                self.utility,
                out.stderr.trim()
            )));
        }

        Ok(tokio::fs::read(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::executor::shell::CommandOutput;

    struct RecordingRunner {
        commands: Arc<Mutex<Vec<String>>>,
        write_file: bool,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, command: &str) -> GazeResult<CommandOutput> {
            self.commands.lock().unwrap().push(command.to_string());
            if self.write_file {
                // Command shape is "<utility> -f '<path>' -p".
                let path = command
                    .split(" -f ")
                    .nth(1)
                    .and_then(|rest| rest.strip_suffix(" -p"))
                    .map(|p| p.trim_matches('\''))
                    .expect("capture command shape");
                std::fs::write(path, b"not-a-real-png").unwrap();
            }
            Ok(CommandOutput {
                stdout: String::new(),
                stderr: "no display".to_string(),
            })
        }
    }

    fn capture_with(utility: &str, write_file: bool) -> (ScreenCapture, Arc<Mutex<Vec<String>>>) {
        let commands = Arc::new(Mutex::new(Vec::new()));
        let runner = RecordingRunner {
            commands: commands.clone(),
            write_file,
        };
        let capture = ScreenCapture::new(utility.to_string(), Arc::new(runner)).unwrap();
        (capture, commands)
    }

    #[tokio::test]
    async fn missing_utility_fails_without_invoking_it() {
        let (capture, commands) = capture_with("utility-that-does-not-exist-anywhere", false);
        let err = capture.capture().await.unwrap_err();
        assert!(matches!(err, GazeError::CaptureUnavailable(_)));
        assert!(commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn utility_ran_but_no_file_is_capture_failed() {
        // "sh" is always on PATH, so the pre-flight check passes.
        let (capture, commands) = capture_with("sh", false);
        let err = capture.capture().await.unwrap_err();
        assert!(matches!(err, GazeError::CaptureFailed(_)));
        assert_eq!(commands.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn returns_file_bytes_on_success() {
        let (capture, commands) = capture_with("sh", true);
        let bytes = capture.capture().await.unwrap();
        assert_eq!(bytes, b"not-a-real-png");
        let commands = commands.lock().unwrap();
        assert!(commands[0].starts_with("sh -f "));
        assert!(commands[0].ends_with(" -p"));
    }

    #[tokio::test]
    async fn successive_captures_use_unique_names() {
        let (capture, commands) = capture_with("sh", true);
        capture.capture().await.unwrap();
        capture.capture().await.unwrap();
        let commands = commands.lock().unwrap();
        assert_ne!(commands[0], commands[1]);
    }
}
