//! JSON-RPC protocol types for the MCP tool server
//!
//! Only the subset of JSON-RPC 2.0 the console needs is modelled here: the
//! `tools/call` request envelope and the decoding of replies that arrive
//! either as a single JSON document or as a `text/event-stream` body.

pub mod event_stream;
pub mod messages;

pub use event_stream::{ TerminalEvent, parse_events, terminal_event };
pub use messages::{ CallToolParams, JSONRPCRequest, RpcOutcome, TOOLS_CALL_ID };

/// JSON-RPC protocol version sent in every envelope
pub const JSONRPC_VERSION: &str = "2.0";

/// Method name for invoking a tool
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// Content type announcing an event-stream reply
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Accept header value: the server may answer in either framing
pub const ACCEPT_JSON_OR_EVENT_STREAM: &str = "application/json, text/event-stream";
