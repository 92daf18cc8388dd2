//! Error types for content-mcp.
//!
//! Store and client failures have their own enums next to the code that
//! raises them ([`crate::store::StoreError`], [`crate::mcp::client::ClientError`]);
//! this module holds configuration and tool execution errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::{Collection, RecordId, StoreError};

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while executing a tool.
///
/// Every variant is reported to the caller as a JSON-RPC execution error.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Arguments are missing or have the wrong type. Raised before any store call.
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments {
        /// Tool being invoked.
        tool: &'static str,
        /// What is wrong with the arguments.
        message: String,
    },

    /// The referenced record does not exist.
    #[error("{} {id} not found", .collection.noun())]
    NotFound {
        /// Collection that was searched.
        collection: Collection,
        /// Identifier that was requested.
        id: RecordId,
    },

    /// The content store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid setting"));
    }

    #[test]
    fn tool_error_display() {
        let error = ToolError::InvalidArguments {
            tool: "create_page",
            message: "Missing required parameter: slug".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid arguments for create_page: Missing required parameter: slug"
        );

        let error = ToolError::NotFound {
            collection: Collection::Posts,
            id: 12,
        };
        assert_eq!(error.to_string(), "Post 12 not found");
    }
}
