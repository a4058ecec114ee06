//! Model Context Protocol (MCP) server handling and JSON-RPC implementations
//!
//! Provides JSON-RPC envelopes, method dispatch and the Server-Sent-Events
//! connection registry.

pub mod rpc;
pub mod server;
pub mod sse;
