//! Model Context Protocol (MCP) implementation.
//!
//! This module exposes CMS content operations as MCP tools. The server side
//! speaks JSON-RPC 2.0 over stdio; the client side speaks the same protocol
//! over HTTP with Server-Sent Events responses.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌──────────────┐    ┌──────────────┐    │
//! │   │  Transport  │───▶│  Dispatcher  │───▶│   Executor   │    │
//! │   │   (stdio)   │    │  (methods)   │    │   (tools)    │    │
//! │   └─────────────┘    └──────────────┘    └──────────────┘    │
//! │                             │                    │           │
//! │                             ▼                    ▼           │
//! │                      ┌──────────────┐    ┌──────────────┐    │
//! │                      │   Registry   │    │ ContentStore │    │
//! │                      └──────────────┘    └──────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//!
//!   McpClient ──HTTP POST──▶ remote endpoint ──SSE data: frame──▶ McpClient
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod client;
pub mod dispatcher;
pub mod executor;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod tools;
pub mod transport;

pub use client::{ClientError, McpClient};
pub use dispatcher::Dispatcher;
pub use executor::{ToolCallResult, ToolContent, ToolContext, ToolSettings};
pub use protocol::{JsonRpcErrorData, JsonRpcRequest, JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION};
pub use registry::ToolRegistry;
pub use server::McpServer;
pub use tools::{Tool, ToolDescriptor};
pub use transport::{LineTransport, StdioTransport};
