use std::path::Path;

use crate::errors::{GazeError, GazeResult};
use crate::workflow::types::WorkflowDefinition;

/// Reads and validates a workflow YAML file.
pub fn load_workflow(path: &Path) -> GazeResult<WorkflowDefinition> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| GazeError::Workflow(format!("{}: {e}", path.display())))?;

    let workflow: WorkflowDefinition = serde_yaml::from_str(&content)
        .map_err(|e| GazeError::Workflow(format!("{}: {e}", path.display())))?;

    const WAIT_CONDITIONS: [&str; 3] = ["load", "domcontentloaded", "networkidle"];
    if !WAIT_CONDITIONS.contains(&workflow.config.wait_until.as_str()) {
        return Err(GazeError::Workflow(format!(
            "unknown wait_until `{}` (expected one of {WAIT_CONDITIONS:?})",
            workflow.config.wait_until
        )));
    }

    if !workflow.config.interaction_pause.is_finite() || workflow.config.interaction_pause < 0.0 {
        return Err(GazeError::Workflow(format!(
            "interaction_pause must be a non-negative number of seconds, got {}",
            workflow.config.interaction_pause
        )));
    }

    if workflow.actions.is_empty() {
        tracing::warn!(path = %path.display(), "workflow has no actions");
    }

    tracing::info!(
        path = %path.display(),
        url = %workflow.url,
        actions = workflow.actions.len(),
        "workflow loaded"
    );
    Ok(workflow)
}
