//! Tides Client Implementation
//!
//! Two independent clients sit behind the console:
//!
//! - [`ServiceClient`] posts typed service payloads to the agent coordinator.
//! - [`ToolClient`] invokes MCP tools over JSON-RPC 2.0.
//!
//! Both return their outcome as a value; no error escapes as a panic or an
//! `Err`, and both stay usable after any failure.

pub mod service_client;
pub mod services;
pub mod tool_client;
pub mod transport;

// Re-export key types for easier access
pub use service_client::ServiceClient;
pub use services::{
    ResponseShape,
    Service,
    ServiceParams,
    ServiceRequest,
    ServiceResponse,
    ToolForm,
    ToolInfo,
    ToolInvocation,
    ToolResult,
    reply_text,
    summarize,
};
pub use tool_client::ToolClient;
