//! MCP tool client
//!
//! Issues a single JSON-RPC `tools/call` per invocation and normalizes the
//! reply, whether it arrives as one JSON document or as an event stream.

use reqwest::header;
use serde_json::{ Map, Value };
use tracing::debug;

use crate::client::services::{ ToolInvocation, ToolResult };
use crate::client::transport::{ HttpReply, HttpTransport };
use crate::config::ConsoleConfig;
use crate::errors::Error;
use crate::protocol::{
    ACCEPT_JSON_OR_EVENT_STREAM,
    CallToolParams,
    JSONRPCRequest,
    RpcOutcome,
    TerminalEvent,
    parse_events,
    terminal_event,
};
use crate::utils::auth::bearer_header;
use crate::utils::json::excerpt;

/// Characters of a stream body quoted when no usable event was found
const STREAM_EXCERPT_CHARS: usize = 500;
/// Characters of an undecodable JSON body quoted in the failure
const JSON_EXCERPT_CHARS: usize = 200;

/// Client for the Tides MCP server
#[derive(Debug, Clone)]
pub struct ToolClient {
    /// HTTP transport with the configured timeout
    transport: HttpTransport,
    /// Full URL of the JSON-RPC endpoint
    endpoint: String,
}

impl ToolClient {
    /// Create a client from the console configuration
    pub fn new(config: &ConsoleConfig) -> Result<Self, Error> {
        Ok(Self {
            transport: HttpTransport::new(config.request_timeout)?,
            endpoint: config.mcp_url.clone(),
        })
    }

    /// The JSON-RPC endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call `tool_name` with `arguments`, authenticating with `auth_token`.
    ///
    /// An empty token fails without making a request.
    pub async fn call(
        &self,
        tool_name: &str,
        arguments: Map<String, Value>,
        auth_token: &str
    ) -> ToolResult {
        self.execute(
            &(ToolInvocation {
                tool_name: tool_name.to_string(),
                arguments,
                auth_token: auth_token.to_string(),
            })
        ).await
    }

    /// Execute a prepared invocation
    pub async fn execute(&self, invocation: &ToolInvocation) -> ToolResult {
        if invocation.auth_token.is_empty() {
            return ToolResult::Failure { message: "API key required".to_string() };
        }

        let reply = match self.send(invocation).await {
            Ok(reply) => reply,
            Err(Error::Transport(message)) => {
                return ToolResult::Failure { message: format!("Request failed: {}", message) };
            }
            Err(e) => {
                return ToolResult::Failure { message: e.to_string() };
            }
        };

        if !reply.is_ok() {
            return ToolResult::Failure {
                message: format!("HTTP {}: {}", reply.status, reply.body),
            };
        }

        if reply.is_event_stream() {
            normalize_event_stream(&reply.body)
        } else {
            normalize_document(&reply.body)
        }
    }

    async fn send(&self, invocation: &ToolInvocation) -> Result<HttpReply, Error> {
        let request = JSONRPCRequest::tools_call(CallToolParams {
            name: invocation.tool_name.clone(),
            arguments: invocation.arguments.clone(),
        })?;
        let body = serde_json::to_value(&request)?;

        let headers = [
            (header::ACCEPT, ACCEPT_JSON_OR_EVENT_STREAM.to_string()),
            (header::AUTHORIZATION, bearer_header(&invocation.auth_token)),
        ];
        self.transport.post_json(
            &self.endpoint,
            &body,
            &headers,
            &invocation.tool_name,
            &invocation.auth_token
        ).await
    }
}

/// Normalize an event-stream body: the last decoded event decides
pub fn normalize_event_stream(body: &str) -> ToolResult {
    let events = parse_events(body);
    debug!("Decoded {} event(s) from stream", events.len());

    match terminal_event(&events) {
        TerminalEvent::Result(payload) => ToolResult::Success { payload },
        TerminalEvent::Error(error) => ToolResult::rpc_error(&error),
        TerminalEvent::Missing =>
            ToolResult::Failure {
                message: format!(
                    "No valid events in stream: {}",
                    excerpt(body, STREAM_EXCERPT_CHARS)
                ),
            },
    }
}

/// Normalize a single JSON-RPC document body
pub fn normalize_document(body: &str) -> ToolResult {
    let document: Value = match serde_json::from_str(body) {
        Ok(document) => document,
        Err(_) => {
            return ToolResult::Failure {
                message: format!("Invalid JSON response: {}", excerpt(body, JSON_EXCERPT_CHARS)),
            };
        }
    };

    match RpcOutcome::from_document(&document) {
        Ok(RpcOutcome::Result(payload)) => ToolResult::Success { payload },
        Ok(RpcOutcome::Error(error)) => ToolResult::rpc_error(&error),
        Err(e) => ToolResult::Failure { message: e.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_two_events_second_result() {
        let body = "data: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/message\"}\n\
                    data: {\"result\": {\"ok\": true}}\n";
        assert_eq!(normalize_event_stream(body), ToolResult::Success {
            payload: json!({ "ok": true }),
        });
    }

    #[test]
    fn test_stream_without_events() {
        match normalize_event_stream("event: ping\n: keep-alive\n") {
            ToolResult::Failure { message } => {
                assert!(message.to_lowercase().contains("no valid events"));
                assert!(message.contains("keep-alive"));
            }
            _ => panic!("Expected failure"),
        }
    }

    #[test]
    fn test_stream_error_event() {
        let body = "data: {\"error\": {\"code\": -32000, \"message\": \"tide not found\"}}\n";
        match normalize_event_stream(body) {
            ToolResult::Failure { message } => assert!(message.contains("tide not found")),
            _ => panic!("Expected failure"),
        }
    }

    #[test]
    fn test_document_paths() {
        assert_eq!(normalize_document("{\"result\": [1]}"), ToolResult::Success {
            payload: json!([1]),
        });
        assert_eq!(normalize_document("{\"id\": 1}"), ToolResult::Success { payload: Value::Null });
        assert_eq!(normalize_document("{\"error\": \"bad\"}"), ToolResult::Failure {
            message: "bad".to_string(),
        });
        match normalize_document("not json at all") {
            ToolResult::Failure { message } => {
                assert_eq!(message, "Invalid JSON response: not json at all");
            }
            _ => panic!("Expected failure"),
        }
    }
}
