//! JSON-RPC request dispatcher.
//!
//! Routes a request by method and, for `tools/call`, by tool name. The
//! dispatcher does no I/O of its own; transports feed it requests and write
//! out whatever it returns.
//!
//! | situation                          | response                              |
//! |------------------------------------|---------------------------------------|
//! | unknown method                     | error `-32601`                        |
//! | `tools/call` without a tool name   | error `-32602`                        |
//! | `tools/call` with an unknown tool  | result with `Unknown tool: <name>`    |
//! | tool fails (arguments or store)    | error `-32603` with the failure text  |

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::mcp::executor::{ToolCallResult, ToolContext, ToolSettings};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION, SERVER_NAME};
use crate::mcp::registry::ToolRegistry;
use crate::store::ContentStore;

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
}

/// Tool-specific capabilities.
///
/// The tool list is fixed for the life of the process, so `listChanged` is
/// never advertised.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information optionally sent with `initialize`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    #[serde(default)]
    protocol_version: Option<String>,
    #[serde(default)]
    client_info: Option<ClientInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct ClientInfo {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Routes JSON-RPC requests to the registry and the tool executors.
pub struct Dispatcher {
    registry: ToolRegistry,
    store: Arc<dyn ContentStore>,
    settings: ToolSettings,
}

impl Dispatcher {
    /// Creates a dispatcher over the given registry and store.
    #[must_use]
    pub fn new(registry: ToolRegistry, store: Arc<dyn ContentStore>, settings: ToolSettings) -> Self {
        Self {
            registry,
            store,
            settings,
        }
    }

    /// The registry this dispatcher serves.
    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handles one request. The response always carries the request's id.
    #[must_use]
    pub fn handle(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(id = %req.id, method = %req.method, "Dispatching request");

        match req.method.as_str() {
            "initialize" => Self::handle_initialize(req),
            "tools/list" => self.handle_tools_list(req),
            "tools/call" => self.handle_tools_call(req),
            _ => JsonRpcResponse::method_not_found(req.id.clone(), &req.method),
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(req: &JsonRpcRequest) -> JsonRpcResponse {
        if let Some(params) = req
            .params
            .as_ref()
            .and_then(|p| serde_json::from_value::<InitializeParams>(p.clone()).ok())
        {
            if let Some(client) = params.client_info {
                tracing::info!(
                    client = %client.name,
                    client_version = client.version.as_deref().unwrap_or("unknown"),
                    requested_version = params.protocol_version.as_deref().unwrap_or("unspecified"),
                    "Client initialising"
                );
            }
        }

        let capabilities = ServerCapabilities {
            tools: ToolCapabilities::default(),
        };
        let result = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": capabilities,
            "serverInfo": ServerInfo::default(),
        });

        JsonRpcResponse::success(req.id.clone(), result)
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        let result = json!({
            "tools": self.registry.describe(),
        });

        JsonRpcResponse::success(req.id.clone(), result)
    }

    /// Handles the tools/call request.
    fn handle_tools_call(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        // Absent or malformed params are answered with -32602 rather than dropped.
        let params = match req
            .params
            .as_ref()
            .map(|p| serde_json::from_value::<ToolCallParams>(p.clone()))
        {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::invalid_params(
                    req.id.clone(),
                    format!("Invalid tool call params: {e}"),
                );
            }
            None => {
                return JsonRpcResponse::invalid_params(req.id.clone(), "Missing tool call params");
            }
        };

        let Some(tool) = self.registry.lookup(&params.name) else {
            tracing::warn!(tool = %params.name, "Unknown tool requested");
            return Self::tool_result(
                req,
                &ToolCallResult::text(format!("Unknown tool: {}", params.name)),
            );
        };

        let ctx = ToolContext {
            store: self.store.as_ref(),
            settings: &self.settings,
        };

        match tool.execute(&params.arguments, ctx) {
            Ok(result) => Self::tool_result(req, &result),
            Err(e) => {
                tracing::warn!(%tool, error = %e, "Tool call failed");
                JsonRpcResponse::internal_error(req.id.clone(), e.to_string())
            }
        }
    }

    fn tool_result(req: &JsonRpcRequest, result: &ToolCallResult) -> JsonRpcResponse {
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(req.id.clone(), value),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialise tool call result");
                JsonRpcResponse::internal_error(
                    req.id.clone(),
                    "Internal error: failed to serialise result",
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{ErrorCode, RequestId};
    use crate::mcp::tools::Tool;
    use crate::store::MemoryStore;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            ToolRegistry::full(),
            Arc::new(MemoryStore::new()),
            ToolSettings::default(),
        )
    }

    fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest::new(id, method, params)
    }

    #[test]
    fn initialize_reports_identity() {
        let response = dispatcher().handle(&request(1, "initialize", None));
        let result = response.result().unwrap();
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[test]
    fn tools_list_follows_registry() {
        let dispatcher = dispatcher();
        let response = dispatcher.handle(&request(1, "tools/list", None));
        let tools = response.result().unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(tools, dispatcher.registry().len());
    }

    #[test]
    fn initialize_ignores_params() {
        let params = json!({
            "protocolVersion": "2024-11-05",
            "clientInfo": {"name": "test-client", "version": "1.0.0"}
        });
        let response = dispatcher().handle(&request(1, "initialize", Some(params)));
        assert!(response.result().is_some());

        let response = dispatcher().handle(&request(2, "initialize", Some(json!("junk"))));
        assert!(response.result().is_some());
    }

    #[test]
    fn unknown_method() {
        let response = dispatcher().handle(&request(5, "resources/list", None));
        let error = response.error().unwrap();
        assert_eq!(error.code, ErrorCode::MethodNotFound.code());
        assert_eq!(error.message, "Method not found: resources/list");
        assert_eq!(response.id, Some(RequestId::Number(5)));
    }

    #[test]
    fn tools_call_without_params() {
        let response = dispatcher().handle(&request(1, "tools/call", None));
        assert_eq!(response.error().unwrap().code, ErrorCode::InvalidParams.code());

        let response = dispatcher().handle(&request(1, "tools/call", Some(json!({"arguments": {}}))));
        assert_eq!(response.error().unwrap().code, ErrorCode::InvalidParams.code());
    }

    #[test]
    fn unknown_tool_is_a_soft_miss() {
        let params = json!({"name": "bogus_tool"});
        let response = dispatcher().handle(&request(3, "tools/call", Some(params)));
        assert!(response.error().is_none());
        assert_eq!(
            response.result().unwrap()["content"][0]["text"],
            "Unknown tool: bogus_tool"
        );
    }

    #[test]
    fn unregistered_tool_is_a_soft_miss() {
        let dispatcher = Dispatcher::new(
            ToolRegistry::with_tools([Tool::ListPages]),
            Arc::new(MemoryStore::new()),
            ToolSettings::default(),
        );
        let params = json!({"name": "create_page", "arguments": {"title": "T", "slug": "t", "content": "C"}});
        let response = dispatcher.handle(&request(1, "tools/call", Some(params)));
        assert_eq!(
            response.result().unwrap()["content"][0]["text"],
            "Unknown tool: create_page"
        );
    }

    #[test]
    fn execution_failure_is_internal_error() {
        let params = json!({"name": "create_page", "arguments": {"title": "T", "content": "C"}});
        let response = dispatcher().handle(&request(4, "tools/call", Some(params)));
        let error = response.error().unwrap();
        assert_eq!(error.code, ErrorCode::InternalError.code());
        assert!(error.message.contains("Missing required parameter: slug"));
    }

    #[test]
    fn tool_result_shape() {
        let params = json!({"name": "list_pages"});
        let response = dispatcher().handle(&request(9, "tools/call", Some(params)));
        assert_eq!(
            response.result().unwrap(),
            &json!({"content": [{"type": "text", "text": "No pages found."}]})
        );
    }
}
