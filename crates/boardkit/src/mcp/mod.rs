mod cli;
mod sse;
mod stdio;
mod tools;

pub use cli::App;

use crate::api::{BoardClient, HttpTransport, Transport};
use crate::config::Config;
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// JSON-RPC 2.0 types
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// MCP Protocol types
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// What every request handler can reach: the one client of this server process
pub struct ServerState<T = HttpTransport> {
    pub client: BoardClient<T>,
    pub verbose: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = Config::from_global(&global)?;
    let state = Arc::new(ServerState {
        client: BoardClient::connect(&config),
        verbose: global.verbose,
    });

    let result = match app.command {
        cli::Commands::Stdio => stdio::run_stdio(Arc::clone(&state)).await,
        cli::Commands::Sse(options) => sse::run_sse(options, Arc::clone(&state)).await,
    };

    state.client.close().await;
    result
}

pub async fn handle_request<T: Transport>(
    request_str: &str,
    state: &ServerState<T>,
) -> JsonRpcResponse {
    let request: JsonRpcRequest = match serde_json::from_str(request_str) {
        Ok(req) => req,
        Err(e) => {
            return JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: None,
                result: None,
                error: Some(JsonRpcError {
                    code: -32700,
                    message: format!("Parse error: {e}"),
                    data: None,
                }),
            };
        }
    };

    let result = match request.method.as_str() {
        "initialize" => tools::handle_initialize(),
        "tools/list" => tools::handle_tools_list(),
        "tools/call" => tools::handle_tools_call(request.params, state).await,
        method => Err(JsonRpcError {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }),
    };

    match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        },
        Err(error) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: None,
            error: Some(error),
        },
    }
}
