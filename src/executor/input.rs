use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::GazeResult;
use crate::executor::shell::{quote, CommandRunner};
use crate::perception::screenshot::FrameSource;
use crate::vision::types::ScreenPoint;

/// Settle delay after a UI-mutating command, before capturing a screenshot.
/// Models compositor latency; a capture taken earlier may show a stale frame.
const SETTLE_DELAY: Duration = Duration::from_secs(2);
const TYPING_DELAY_MS: u64 = 12;
const TYPING_CHUNK_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    pub screenshot: Option<Vec<u8>>,
}

/// Primitive OS input operations, as the workflow engine consumes them.
#[async_trait]
pub trait InputDriver: Send + Sync {
    async fn press_key(&self, key: &str) -> GazeResult<ShellOutput>;
    async fn type_text(&self, text: &str) -> GazeResult<ShellOutput>;
    async fn click(&self) -> GazeResult<ShellOutput>;
    async fn move_pointer(&self, point: ScreenPoint) -> GazeResult<ShellOutput>;
}

/// Synthesizes input by shelling out to xdotool.
pub struct InputSynthesizer {
    runner: Arc<dyn CommandRunner>,
    frames: Arc<dyn FrameSource>,
    settle_delay: Duration,
}

impl InputSynthesizer {
    pub fn new(runner: Arc<dyn CommandRunner>, frames: Arc<dyn FrameSource>) -> Self {
        Self {
            runner,
            frames,
            settle_delay: SETTLE_DELAY,
        }
    }

    #[cfg(test)]
    fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Runs an arbitrary shell command. When `capture_after` is set, waits
    /// the settle delay after completion and attaches a screenshot.
    pub async fn run_command(&self, command: &str, capture_after: bool) -> GazeResult<ShellOutput> {
        let out = self.runner.run(command).await?;

        let screenshot = if capture_after {
            tokio::time::sleep(self.settle_delay).await;
            Some(self.frames.capture().await?)
        } else {
            None
        };

        Ok(ShellOutput {
            stdout: out.stdout,
            stderr: out.stderr,
            screenshot,
        })
    }
}

#[async_trait]
impl InputDriver for InputSynthesizer {
    async fn press_key(&self, key: &str) -> GazeResult<ShellOutput> {
        self.run_command(&format!("xdotool key -- {key}"), true).await
    }

    /// Injects text in chunks of at most [`TYPING_CHUNK_SIZE`] characters so
    /// the input queue is never flooded. No screenshot is taken between
    /// chunks; exactly one is captured after the final chunk.
    async fn type_text(&self, text: &str) -> GazeResult<ShellOutput> {
        let mut stdout = String::new();
        let mut stderr = String::new();

        for chunk in chunk_text(text, TYPING_CHUNK_SIZE) {
            let out = self
                .run_command(
                    &format!("xdotool type --delay {TYPING_DELAY_MS} -- {}", quote(&chunk)),
                    false,
                )
                .await?;
            stdout = out.stdout;
            stderr = out.stderr;
        }

        let screenshot = self.frames.capture().await?;
        Ok(ShellOutput {
            stdout,
            stderr,
            screenshot: Some(screenshot),
        })
    }

    async fn click(&self) -> GazeResult<ShellOutput> {
        self.run_command("xdotool click 1", true).await
    }

    /// Synchronous move: `--sync` blocks until the OS confirms the pointer
    /// reached the target, so a following click cannot race the move.
    async fn move_pointer(&self, point: ScreenPoint) -> GazeResult<ShellOutput> {
        self.run_command(
            &format!("xdotool mousemove --sync {} {}", point.x, point.y),
            true,
        )
        .await
    }
}

/// Splits `text` into chunks of at most `size` characters; the last chunk may
/// be shorter. Concatenating the chunks reproduces `text` exactly.
fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::errors::GazeError;
    use crate::executor::shell::CommandOutput;

    #[derive(Clone, Debug, PartialEq)]
    enum Event {
        Command(String),
        Capture,
    }

    struct RecordingRunner {
        log: Arc<Mutex<Vec<Event>>>,
        completed_at: Arc<Mutex<Option<tokio::time::Instant>>>,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, command: &str) -> GazeResult<CommandOutput> {
            self.log.lock().unwrap().push(Event::Command(command.to_string()));
            *self.completed_at.lock().unwrap() = Some(tokio::time::Instant::now());
            Ok(CommandOutput {
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    struct RecordingFrames {
        log: Arc<Mutex<Vec<Event>>>,
        captured_at: Arc<Mutex<Option<tokio::time::Instant>>>,
    }

    #[async_trait]
    impl FrameSource for RecordingFrames {
        async fn capture(&self) -> GazeResult<Vec<u8>> {
            self.log.lock().unwrap().push(Event::Capture);
            *self.captured_at.lock().unwrap() = Some(tokio::time::Instant::now());
            Ok(vec![0u8; 4])
        }
    }

    fn harness() -> (
        InputSynthesizer,
        Arc<Mutex<Vec<Event>>>,
        Arc<Mutex<Option<tokio::time::Instant>>>,
        Arc<Mutex<Option<tokio::time::Instant>>>,
    ) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let completed_at = Arc::new(Mutex::new(None));
        let captured_at = Arc::new(Mutex::new(None));
        let synth = InputSynthesizer::new(
            Arc::new(RecordingRunner {
                log: log.clone(),
                completed_at: completed_at.clone(),
            }),
            Arc::new(RecordingFrames {
                log: log.clone(),
                captured_at: captured_at.clone(),
            }),
        );
        (synth, log, completed_at, captured_at)
    }

    #[test]
    fn chunks_rejoin_to_original_text() {
        let text = "héllo wörld 🦀 ".repeat(17);
        let chunks = chunk_text(&text, TYPING_CHUNK_SIZE);
        assert!(chunks.iter().all(|c| c.chars().count() <= TYPING_CHUNK_SIZE));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn last_chunk_may_be_shorter() {
        let chunks = chunk_text(&"a".repeat(120), 50);
        assert_eq!(
            chunks.iter().map(|c| c.len()).collect::<Vec<_>>(),
            vec![50, 50, 20]
        );
    }

    #[tokio::test]
    async fn type_text_screenshots_only_after_final_chunk() {
        let (synth, log, _, _) = harness();
        let text = "x".repeat(120);
        let out = synth.type_text(&text).await.unwrap();
        assert!(out.screenshot.is_some());

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 4); // 3 chunk commands + 1 capture
        assert!(matches!(log[3], Event::Capture));
        let captures = log.iter().filter(|e| matches!(e, Event::Capture)).count();
        assert_eq!(captures, 1);
        for event in &log[..3] {
            let Event::Command(cmd) = event else {
                panic!("capture interleaved between typing chunks");
            };
            assert!(cmd.starts_with("xdotool type --delay 12 -- "));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_command_screenshot_waits_for_settle_delay() {
        let (synth, _, completed_at, captured_at) = harness();
        synth.run_command("wmctrl -a editor", true).await.unwrap();

        let done = completed_at.lock().unwrap().unwrap();
        let captured = captured_at.lock().unwrap().unwrap();
        assert!(captured - done >= SETTLE_DELAY);
    }

    #[tokio::test]
    async fn run_command_without_capture_takes_no_screenshot() {
        let (synth, log, _, _) = harness();
        let out = synth.run_command("true", false).await.unwrap();
        assert!(out.screenshot.is_none());
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn click_issues_primary_button_press() {
        let (synth, log, _, _) = harness();
        synth.click().await.unwrap();
        assert_eq!(
            log.lock().unwrap()[0],
            Event::Command("xdotool click 1".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn move_pointer_is_synchronous() {
        let (synth, log, _, _) = harness();
        synth
            .move_pointer(ScreenPoint { x: 576, y: 216 })
            .await
            .unwrap();
        assert_eq!(
            log.lock().unwrap()[0],
            Event::Command("xdotool mousemove --sync 576 216".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn press_key_screenshots_by_default() {
        let (synth, log, _, _) = harness();
        let out = synth.press_key("Return").await.unwrap();
        assert!(out.screenshot.is_some());
        assert_eq!(
            log.lock().unwrap()[0],
            Event::Command("xdotool key -- Return".to_string())
        );
    }

    #[tokio::test]
    async fn runner_failure_propagates() {
        struct FailingRunner;

        #[async_trait]
        impl CommandRunner for FailingRunner {
            async fn run(&self, command: &str) -> GazeResult<CommandOutput> {
                Err(GazeError::Command(format!("`{command}` failed")))
            }
        }

        struct NoFrames;

        #[async_trait]
        impl FrameSource for NoFrames {
            async fn capture(&self) -> GazeResult<Vec<u8>> {
                unreachable!("capture must not run when the command fails")
            }
        }

        let synth = InputSynthesizer::new(Arc::new(FailingRunner), Arc::new(NoFrames))
            .with_settle_delay(Duration::ZERO);
        let err = synth.run_command("xdotool click 1", true).await.unwrap_err();
        assert!(matches!(err, GazeError::Command(_)));
    }
}
