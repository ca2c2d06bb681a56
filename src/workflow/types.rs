use serde::{Deserialize, Serialize};

/// A workflow file, loaded once and immutable for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub url: String,
    pub config: WorkflowConfig,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Navigation wait condition passed to the browser (load | domcontentloaded | networkidle).
    #[serde(default = "default_wait_until")]
    pub wait_until: String,
    /// Seconds to pause before each action so the prior UI state settles.
    pub interaction_pause: f64,
}

fn default_wait_until() -> String {
    "networkidle".to_string()
}

/// One target element plus the operations to perform once it is located.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub element: String,
    #[serde(rename = "do", with = "serde_yaml::with::singleton_map_recursive")]
    pub operations: Vec<DesktopOperation>,
}

/// Closed set of primitive operations. Unknown tags in a workflow file are a
/// deserialization error, never silently skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesktopOperation {
    Click,
    Type(String),
    Screenshot,
    Markdownify,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
url: "https://example.com/login"
config:
  wait_until: load
  interaction_pause: 1.5
actions:
  - element: "username field"
    do:
      - click
      - type: "alice"
  - element: "submit button"
    do:
      - click
      - screenshot
      - markdownify
"#;

    #[test]
    fn parses_full_workflow() {
        let wf: WorkflowDefinition = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(wf.url, "https://example.com/login");
        assert_eq!(wf.config.wait_until, "load");
        assert_eq!(wf.config.interaction_pause, 1.5);
        assert_eq!(wf.actions.len(), 2);
        assert_eq!(wf.actions[0].element, "username field");
        assert_eq!(
            wf.actions[0].operations,
            vec![
                DesktopOperation::Click,
                DesktopOperation::Type("alice".to_string()),
            ]
        );
        assert_eq!(
            wf.actions[1].operations,
            vec![
                DesktopOperation::Click,
                DesktopOperation::Screenshot,
                DesktopOperation::Markdownify,
            ]
        );
    }

    #[test]
    fn wait_until_defaults_to_networkidle() {
        let wf: WorkflowDefinition = serde_yaml::from_str(
            "url: \"https://example.com\"\nconfig:\n  interaction_pause: 0.5\nactions: []\n",
        )
        .unwrap();
        assert_eq!(wf.config.wait_until, "networkidle");
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let doc = "url: \"https://example.com\"\nconfig:\n  interaction_pause: 1\nactions:\n  - element: x\n    do:\n      - hover\n";
        let err = serde_yaml::from_str::<WorkflowDefinition>(doc);
        assert!(err.is_err());
    }

    #[test]
    fn missing_interaction_pause_is_rejected() {
        let doc = "url: \"https://example.com\"\nconfig: {}\nactions: []\n";
        assert!(serde_yaml::from_str::<WorkflowDefinition>(doc).is_err());
    }
}
