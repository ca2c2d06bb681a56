use async_trait::async_trait;

use crate::errors::{GazeError, GazeResult};

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Generic command-execution primitive. Everything that touches the OS shell
/// (input synthesis, screen capture) goes through this seam.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> GazeResult<CommandOutput>;
}

/// Runs commands through `sh -c`.
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> GazeResult<CommandOutput> {
        tracing::debug!(command, "running shell command");

        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .await
            .map_err(|e| GazeError::Command(format!("failed to launch `{command}`: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(GazeError::Command(format!(
                "`{command}` exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Single-quote shell escaping, so typed text survives `sh -c` verbatim.
pub fn quote(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for c in arg.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_wraps_plain_text() {
        assert_eq!(quote("hello world"), "'hello world'");
    }

    #[test]
    fn quote_escapes_single_quotes() {
        assert_eq!(quote("it's"), "'it'\\''s'");
    }

    #[tokio::test]
    async fn shell_runner_captures_stdout() {
        let out = ShellRunner.run("echo grounded").await.unwrap();
        assert_eq!(out.stdout.trim(), "grounded");
    }

    #[tokio::test]
    async fn shell_runner_rejects_nonzero_exit() {
        let err = ShellRunner.run("exit 3").await.unwrap_err();
        assert!(matches!(err, GazeError::Command(_)));
    }
}
