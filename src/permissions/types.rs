//! Values passed through the approval path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One proposed tool invocation, built fresh per attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPermissionContext {
    pub tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_description: Option<String>,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl ToolPermissionContext {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_description: None,
            arguments: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.tool_description = Some(description.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }
}

/// Decision for one tool invocation.
///
/// `approved` together with `remember_choice` adds the tool to the
/// pre-approved set for the rest of the process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResult {
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub remember_choice: bool,
}

impl PermissionResult {
    pub fn approved() -> Self {
        Self {
            approved: true,
            reason: None,
            remember_choice: false,
        }
    }

    pub fn approved_with_reason(reason: impl Into<String>) -> Self {
        Self {
            approved: true,
            reason: Some(reason.into()),
            remember_choice: false,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: Some(reason.into()),
            remember_choice: false,
        }
    }

    /// Approve and remember: the "always allow" answer.
    pub fn always_allow() -> Self {
        Self {
            approved: true,
            reason: None,
            remember_choice: true,
        }
    }

    /// Whether this result asks for a standing pre-approval.
    pub fn grants_pre_approval(&self) -> bool {
        self.approved && self.remember_choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_builder_collects_arguments() {
        let ctx = ToolPermissionContext::new("bash")
            .with_description("Run a shell command")
            .with_argument("command", "ls -la")
            .with_argument("timeout", 30);

        assert_eq!(ctx.tool_name, "bash");
        assert_eq!(ctx.tool_description.as_deref(), Some("Run a shell command"));
        assert_eq!(ctx.arguments.get("command"), Some(&json!("ls -la")));
        assert_eq!(ctx.arguments.get("timeout"), Some(&json!(30)));
    }

    #[test]
    fn context_serializes_camel_case() {
        let ctx = ToolPermissionContext::new("edit_file").with_argument("path", "src/main.rs");
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["toolName"], json!("edit_file"));
        assert!(value.get("toolDescription").is_none());
        assert_eq!(value["arguments"]["path"], json!("src/main.rs"));
    }

    #[test]
    fn only_approved_and_remembered_grants_pre_approval() {
        assert!(PermissionResult::always_allow().grants_pre_approval());
        assert!(!PermissionResult::approved().grants_pre_approval());

        let denied_but_remembered = PermissionResult {
            approved: false,
            reason: None,
            remember_choice: true,
        };
        assert!(!denied_but_remembered.grants_pre_approval());
    }

    #[test]
    fn result_deserializes_with_defaults() {
        let result: PermissionResult = serde_json::from_str(r#"{"approved":true}"#).unwrap();
        assert_eq!(result, PermissionResult::approved());
    }
}
