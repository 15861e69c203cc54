//! MCP server loop.
//!
//! Reads newline-delimited JSON-RPC messages, answers each one in order,
//! and stops when the input reaches EOF.

use crate::protocol::*;
use crate::tools::ToolRegistry;
use anyhow::Result;
use fredmcp_core::GatewayError;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "mcp-fredapi";

/// Longest accepted request line.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

pub struct McpServer {
    registry: ToolRegistry,
    info: ServerInfo,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Serve over the process's stdin and stdout.
    pub async fn run_stdio(&self) -> Result<()> {
        self.run(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve over any byte stream pair until `reader` hits EOF.
    pub async fn run<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
        let mut sink = FramedWrite::new(writer, LinesCodec::new());

        tracing::info!(tools = self.registry.len(), "MCP server ready, waiting for requests");

        while let Some(line) = lines.next().await {
            let response = match line {
                Ok(line) => self.handle_message(&line).await,
                Err(LinesCodecError::MaxLineLengthExceeded) => Some(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::parse_error("request line too long"),
                )),
                Err(LinesCodecError::Io(e)) => return Err(e.into()),
            };

            if let Some(response) = response {
                if let Some(ref error) = response.error {
                    tracing::debug!("-> error: {}", error);
                } else {
                    tracing::debug!("-> ok");
                }
                sink.send(serde_json::to_string(&response)?).await?;
            }
        }

        tracing::info!("EOF received, shutting down");
        Ok(())
    }

    /// Handle one raw message. Returns `None` when no reply is due.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::parse_error(e.to_string()),
                ))
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(e.to_string()),
                ))
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!("unsupported jsonrpc version '{}'", request.jsonrpc)),
            ));
        }

        tracing::debug!("<- {} (id={:?})", request.method, request.id);

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        Some(self.handle_request(request).await)
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => tracing::info!("Client initialized"),
            "notifications/cancelled" => tracing::debug!("Request cancelled"),
            other => tracing::debug!("Unknown notification: {}", other),
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params).await,
            method => Err(JsonRpcError::method_not_found(method)),
        };

        match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::error(id, error),
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init) => tracing::info!(
                    client = init.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
                    protocol_version = %init.protocol_version,
                    "Initialize"
                ),
                Err(e) => return Err(JsonRpcError::invalid_params(format!("Invalid initialize params: {e}"))),
            }
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: self.info.clone(),
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    fn handle_tools_list(&self) -> Result<Value, JsonRpcError> {
        let result = ListToolsResult {
            tools: self.registry.list_schemas(),
        };
        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params for tools/call"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {e}")))
            })?;

        let tool = self
            .registry
            .get(&params.name)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

        match tool.execute(params.arguments).await {
            Ok(result) => {
                serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
            }
            Err(err) => Err(tool_error(&params.name, err)),
        }
    }
}

/// Argument problems are the caller's fault. Anything else is ours.
fn tool_error(tool: &str, err: anyhow::Error) -> JsonRpcError {
    match err.downcast_ref::<GatewayError>() {
        Some(gateway @ GatewayError::InvalidArgument(_)) => {
            tracing::debug!(tool, "Rejected arguments: {}", gateway);
            JsonRpcError::invalid_params(gateway.to_string()).with_data(json!({"kind": gateway.kind()}))
        }
        _ => {
            tracing::error!(tool, "Tool failed: {:#}", err);
            JsonRpcError::internal_error(format!("{:#}", err))
        }
    }
}
