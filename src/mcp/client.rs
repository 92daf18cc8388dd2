//! HTTP + Server-Sent Events client for remote MCP endpoints.
//!
//! Each call is an independent exchange: the request envelope always uses
//! id `1`, is POSTed with a bearer token, and the response body is read as
//! an event stream whose first `data: ` line holds the JSON-RPC response.
//! A body without such a line is an error, never an empty success.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{json, Value};
use thiserror::Error;

use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, RequestId};

/// Path of the MCP endpoint below the server's base URL.
pub const MCP_ENDPOINT_PATH: &str = "/api/plugin/mcp";

/// Value of the `Accept` header sent with every call.
pub const ACCEPT_HEADER: &str = "application/json, text/event-stream";

const DATA_PREFIX: &str = "data: ";

/// Transport-level failures of a client call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The event stream contained no `data: ` frame.
    #[error("no valid response: event stream contained no data frame")]
    MissingDataFrame,

    /// The frame payload was not a JSON-RPC response.
    #[error("invalid JSON-RPC response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A client for a remote MCP endpoint.
///
/// Holds no per-call state, so one client can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct McpClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl McpClient {
    /// Creates a client for the server at `base_url`.
    #[must_use]
    pub fn new(base_url: &str, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}{MCP_ENDPOINT_PATH}", base_url.trim_end_matches('/')),
            token: token.into(),
        }
    }

    /// Full URL requests are POSTed to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Calls a tool and returns the JSON-RPC response.
    ///
    /// Tool-level failures come back as `Ok` responses carrying an `error`
    /// object; only transport failures are `Err`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the request fails, the server answers
    /// with a non-success status, or no response frame can be decoded.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<JsonRpcResponse, ClientError> {
        self.request(
            "tools/call",
            Some(json!({
                "name": name,
                "arguments": arguments,
            })),
        )
        .await
    }

    /// Lists the tools offered by the server.
    ///
    /// # Errors
    ///
    /// See [`McpClient::call_tool`].
    pub async fn list_tools(&self) -> Result<JsonRpcResponse, ClientError> {
        self.request("tools/list", None).await
    }

    /// Sends an `initialize` request.
    ///
    /// # Errors
    ///
    /// See [`McpClient::call_tool`].
    pub async fn initialize(&self) -> Result<JsonRpcResponse, ClientError> {
        self.request("initialize", None).await
    }

    async fn request(&self, method: &str, params: Option<Value>) -> Result<JsonRpcResponse, ClientError> {
        let envelope = JsonRpcRequest::new(RequestId::Number(1), method, params);
        tracing::debug!(endpoint = %self.endpoint, method, "Sending MCP request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(ACCEPT, ACCEPT_HEADER)
            .json(&envelope)
            .send()
            .await?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if is_json {
            return Ok(serde_json::from_str(&body)?);
        }
        parse_event_stream(&body)
    }
}

/// Decodes the first `data: ` frame of an event-stream body.
///
/// # Errors
///
/// Returns [`ClientError::MissingDataFrame`] if no line starts with
/// `data: `, and [`ClientError::Decode`] if that line's payload is not a
/// JSON-RPC response.
pub fn parse_event_stream(body: &str) -> Result<JsonRpcResponse, ClientError> {
    let payload = body
        .lines()
        .find_map(|line| line.strip_prefix(DATA_PREFIX))
        .ok_or(ClientError::MissingDataFrame)?;

    Ok(serde_json::from_str(payload.trim_end())?)
}
