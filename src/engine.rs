use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::browser::BrowserSurface;
use crate::errors::{GazeError, GazeResult};
use crate::executor::input::InputDriver;
use crate::vision::resolver::ElementResolver;
use crate::vision::types::ScreenPoint;
use crate::workflow::{DesktopOperation, WorkflowDefinition};

const FINAL_SCREENSHOT: &str = "final_screenshot.png";
const FINAL_PAGE: &str = "final_page.md";

/// Run state for one workflow. The resolved coordinate lives only while its
/// action executes.
enum RunState {
    Idle { next: usize },
    Resolving { index: usize },
    Executing { index: usize, target: ScreenPoint },
    Done,
}

/// Drives a workflow strictly sequentially: the next action's resolution is
/// never issued before every operation of the previous action has completed,
/// and operations within an action run one at a time, in declared order.
pub struct WorkflowInterpreter {
    workflow: WorkflowDefinition,
    resolver: Arc<dyn ElementResolver>,
    input: Arc<dyn InputDriver>,
    browser: Arc<dyn BrowserSurface>,
    screenshot_path: PathBuf,
    markdown_path: PathBuf,
}

impl WorkflowInterpreter {
    pub fn new(
        workflow: WorkflowDefinition,
        resolver: Arc<dyn ElementResolver>,
        input: Arc<dyn InputDriver>,
        browser: Arc<dyn BrowserSurface>,
    ) -> Self {
        Self {
            workflow,
            resolver,
            input,
            browser,
            screenshot_path: PathBuf::from(FINAL_SCREENSHOT),
            markdown_path: PathBuf::from(FINAL_PAGE),
        }
    }

    pub fn with_output_paths(mut self, screenshot: PathBuf, markdown: PathBuf) -> Self {
        self.screenshot_path = screenshot;
        self.markdown_path = markdown;
        self
    }

    /// Runs the whole workflow. Any failure aborts the run; there is no
    /// skip-and-continue and no per-action retry.
    pub async fn run(&self) -> GazeResult<()> {
        let pause = Duration::from_secs_f64(self.workflow.config.interaction_pause);
        let mut state = RunState::Idle { next: 0 };

        loop {
            state = match state {
                RunState::Idle { next } if next >= self.workflow.actions.len() => RunState::Done,

                RunState::Idle { next } => {
                    // Pacing: let the UI settle before looking at it.
                    tokio::time::sleep(pause).await;
                    RunState::Resolving { index: next }
                }

                RunState::Resolving { index } => {
                    let action = &self.workflow.actions[index];
                    tracing::info!(index, element = %action.element, "resolving element");
                    let target = self.resolver.resolve(&action.element).await?;
                    RunState::Executing { index, target }
                }

                RunState::Executing { index, target } => {
                    let action = &self.workflow.actions[index];
                    for operation in &action.operations {
                        self.execute_operation(operation, target).await?;
                    }
                    RunState::Idle { next: index + 1 }
                }

                RunState::Done => {
                    tracing::info!(actions = self.workflow.actions.len(), "workflow complete");
                    return Ok(());
                }
            };
        }
    }

    async fn execute_operation(
        &self,
        operation: &DesktopOperation,
        target: ScreenPoint,
    ) -> GazeResult<()> {
        match operation {
            DesktopOperation::Click => {
                self.input.move_pointer(target).await?;
                self.input.click().await?;
            }
            DesktopOperation::Type(text) => {
                self.input.type_text(text).await?;
            }
            DesktopOperation::Screenshot => {
                self.browser.screenshot(&self.screenshot_path).await?;
            }
            DesktopOperation::Markdownify => {
                let html = self.browser.page_html().await?;
                // CPU-bound conversion runs off the scheduling thread.
                let markdown = tokio::task::spawn_blocking(move || html2md::parse_html(&html))
                    .await
                    .map_err(|e| {
                        GazeError::Browser(format!("markdown conversion task failed: {e}"))
                    })?;
                tokio::fs::write(&self.markdown_path, markdown).await?;
                tracing::info!(path = %self.markdown_path.display(), "page markdown saved");
            }
        }
        Ok(())
    }
}
