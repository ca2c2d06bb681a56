pub mod loader;
pub mod types;

pub use loader::load_workflow;
pub use types::{Action, DesktopOperation, WorkflowConfig, WorkflowDefinition};
