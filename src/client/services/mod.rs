//! Client services
//!
//! Static catalogs, payload construction and response normalization shared
//! by the service and tool clients. Everything here is pure; the network
//! calls live in the client types.

pub mod catalog;
pub mod payload;
pub mod response;
pub mod tools;

// Re-export the main service types
pub use catalog::{ Service, ServiceInfo };
pub use payload::{ ServiceParams, ServiceRequest };
pub use response::{ ResponseShape, ServiceResponse, reply_text, summarize };
pub use tools::{ ToolForm, ToolInfo, ToolInvocation, ToolResult };
