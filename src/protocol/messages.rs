//! JSON-RPC request envelope and reply decoding

use serde::{ Deserialize, Serialize };
use serde_json::{ Map, Value };

use crate::errors::Error;
use super::{ JSONRPC_VERSION, METHOD_TOOLS_CALL };

/// Id of every `tools/call` request; the console has one call in flight at a time
pub const TOOLS_CALL_ID: i64 = 1;

/// A request that expects a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JSONRPCRequest {
    /// The JSON-RPC version (always "2.0").
    pub jsonrpc: String,

    /// The request ID.
    pub id: i64,

    /// The method name.
    pub method: String,

    /// The request parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Parameters for a call tool request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    /// The name of the tool to call.
    pub name: String,

    /// The arguments to pass to the tool.
    pub arguments: Map<String, Value>,
}

impl JSONRPCRequest {
    /// Build a `tools/call` request
    pub fn tools_call(params: CallToolParams) -> Result<Self, Error> {
        Ok(Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: TOOLS_CALL_ID,
            method: METHOD_TOOLS_CALL.to_string(),
            params: Some(serde_json::to_value(params)?),
        })
    }
}

/// The part of a JSON-RPC reply the console cares about
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    /// The `result` member (null when the server omitted it)
    Result(Value),
    /// The `error` member, kept verbatim
    Error(Value),
}

impl RpcOutcome {
    /// Decode a single-document reply. An `error` member wins over `result`;
    /// a reply with neither counts as a null result.
    pub fn from_document(document: &Value) -> Result<Self, Error> {
        let object = document
            .as_object()
            .ok_or_else(|| {
                Error::Protocol(format!("expected a JSON-RPC object, got {}", kind_of(document)))
            })?;

        if let Some(error) = object.get("error") {
            return Ok(RpcOutcome::Error(error.clone()));
        }
        Ok(RpcOutcome::Result(object.get("result").cloned().unwrap_or(Value::Null)))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tools_call_envelope() {
        let mut arguments = Map::new();
        arguments.insert("active_only".to_string(), json!(true));
        let request = JSONRPCRequest::tools_call(CallToolParams {
            name: "tide_list".to_string(),
            arguments,
        }).unwrap();

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": { "name": "tide_list", "arguments": { "active_only": true } }
            })
        );
    }

    #[test]
    fn test_empty_arguments_still_serialized() {
        let request = JSONRPCRequest::tools_call(CallToolParams {
            name: "tide_flow".to_string(),
            arguments: Map::new(),
        }).unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["params"]["arguments"], json!({}));
    }

    #[test]
    fn test_outcome_error_wins() {
        let doc = json!({ "jsonrpc": "2.0", "id": 1, "result": 1, "error": { "code": -32601 } });
        assert_eq!(
            RpcOutcome::from_document(&doc).unwrap(),
            RpcOutcome::Error(json!({ "code": -32601 }))
        );
    }

    #[test]
    fn test_outcome_missing_result_is_null() {
        let doc = json!({ "jsonrpc": "2.0", "id": 1 });
        assert_eq!(RpcOutcome::from_document(&doc).unwrap(), RpcOutcome::Result(Value::Null));
    }

    #[test]
    fn test_outcome_rejects_non_object() {
        let err = RpcOutcome::from_document(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }
}
