//! MCP tool catalog and call types

use serde::Serialize;
use serde_json::{ Map, Value, json };

/// Tool information
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Name of the tool
    pub name: &'static str,
    /// Description of the tool
    pub description: &'static str,
}

const TOOL_CATALOG: &[ToolInfo] = &[
    ToolInfo { name: "tide_create", description: "Create a new tide" },
    ToolInfo { name: "tide_list", description: "List available tides" },
    ToolInfo { name: "tide_flow", description: "Manage flow states" },
    ToolInfo { name: "tide_add_energy", description: "Add energy data" },
    ToolInfo { name: "tide_link_task", description: "Link tasks to tides" },
    ToolInfo { name: "tide_list_task_links", description: "List task links" },
    ToolInfo { name: "tide_get_report", description: "Generate tide reports" },
    ToolInfo { name: "tides_get_participants", description: "Get tide participants" },
];

/// The tools exposed by the Tides MCP server. Static, not queried.
pub fn catalog() -> &'static [ToolInfo] {
    TOOL_CATALOG
}

/// A one-shot tool call
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Tool to call
    pub tool_name: String,
    /// Arguments passed through verbatim
    pub arguments: Map<String, Value>,
    /// Bearer token
    pub auth_token: String,
}

/// Normalized outcome of a tool call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResult {
    /// The server returned a result
    Success {
        /// The `result` member, possibly null
        payload: Value,
    },
    /// The call failed at any layer
    Failure {
        /// What went wrong; RPC error objects are rendered as JSON
        message: String,
    },
}

impl ToolResult {
    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success { .. })
    }

    /// Build a failure from an RPC `error` member
    pub fn rpc_error(error: &Value) -> Self {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        ToolResult::Failure { message }
    }
}

/// Values collected from a simple tool form
#[derive(Debug, Clone, Default)]
pub struct ToolForm {
    /// `All`, `Active` or `Completed` for list tools
    pub filter: Option<String>,
    /// Title for create tools
    pub title: Option<String>,
    /// Description for create tools
    pub description: Option<String>,
    /// Energy level (1-10) for energy tools
    pub energy_level: Option<u8>,
}

/// Map form input onto tool arguments the way the tool runner does
pub fn default_arguments(tool_name: &str, form: &ToolForm) -> Map<String, Value> {
    let mut arguments = Map::new();

    if tool_name == "tide_list" {
        if let Some(filter) = form.filter.as_deref().filter(|f| *f != "All") {
            arguments.insert("active_only".to_string(), json!(filter == "Active"));
        }
    } else if tool_name.contains("create") {
        if let Some(title) = form.title.as_deref().filter(|t| !t.is_empty()) {
            arguments.insert("title".to_string(), json!(title));
        }
        if let Some(description) = form.description.as_deref().filter(|d| !d.is_empty()) {
            arguments.insert("description".to_string(), json!(description));
        }
    } else if tool_name.contains("add") && tool_name.contains("energy") {
        arguments.insert("energy_level".to_string(), json!(form.energy_level.unwrap_or(5)));
    }

    arguments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog() {
        assert_eq!(catalog().len(), 8);
        assert!(catalog().iter().any(|tool| tool.name == "tides_get_participants"));
    }

    #[test]
    fn test_list_filter() {
        let active = ToolForm { filter: Some("Active".into()), ..Default::default() };
        assert_eq!(default_arguments("tide_list", &active)["active_only"], json!(true));

        let completed = ToolForm { filter: Some("Completed".into()), ..Default::default() };
        assert_eq!(default_arguments("tide_list", &completed)["active_only"], json!(false));

        let all = ToolForm { filter: Some("All".into()), ..Default::default() };
        assert!(default_arguments("tide_list", &all).is_empty());
    }

    #[test]
    fn test_create_and_energy() {
        let form = ToolForm {
            title: Some("Deep work".into()),
            description: Some(String::new()),
            ..Default::default()
        };
        let args = default_arguments("tide_create", &form);
        assert_eq!(args.len(), 1);
        assert_eq!(args["title"], "Deep work");

        let args = default_arguments("tide_add_energy", &ToolForm::default());
        assert_eq!(args["energy_level"], json!(5));

        assert!(default_arguments("tide_flow", &form).is_empty());
    }

    #[test]
    fn test_rpc_error_rendering() {
        assert_eq!(
            ToolResult::rpc_error(&json!("denied")),
            ToolResult::Failure { message: "denied".to_string() }
        );
        let failure = ToolResult::rpc_error(&json!({ "code": -32601, "message": "nope" }));
        match failure {
            ToolResult::Failure { message } => assert!(message.contains("-32601")),
            _ => panic!("Expected failure"),
        }
    }
}
