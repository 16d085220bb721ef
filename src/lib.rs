//! Tides Console Library
//!
//! This crate provides a manual testing console for the Tides productivity
//! backend. It talks to two independent services: the agent service, which
//! routes typed service payloads through its coordinator endpoint, and the MCP
//! tool server, which answers JSON-RPC 2.0 `tools/call` requests with either a
//! JSON document or an event stream. Every call returns a normalized outcome
//! value that the interactive console renders.

// Re-export core components
pub mod cli;
pub mod client;
pub mod config;
pub mod console;
pub mod errors;
pub mod protocol;
pub mod session;
pub mod suite;
pub mod utils;
// Re-export commonly used items
pub use client::{ ServiceClient, ServiceResponse, ToolClient, ToolResult };
pub use config::ConsoleConfig;
pub use console::Console;
pub use errors::{ Error, ErrorKind };
pub use session::Session;
