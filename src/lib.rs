//! content-mcp: MCP server and client for AI-assisted CMS content management
//!
//! This library exposes pages, posts and categories of a CMS as Model
//! Context Protocol tools, so AI assistants can list, create, update and
//! delete content.
//!
//! # Architecture
//!
//! - **Protocol adapter**: JSON-RPC dispatcher, tool registry and
//!   per-tool executors with argument validation
//! - **Transports**: a line-delimited stdio server and an HTTP + SSE client
//! - **Content store**: a small trait over the backing database, with a
//!   SQLite implementation
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`content`]: Rich-text document builders
//! - [`error`]: Error types
//! - [`mcp`]: MCP protocol implementation
//! - [`store`]: Content store trait and implementations

pub mod config;
pub mod content;
pub mod error;
pub mod mcp;
pub mod store;
