mod cards;
mod request;
mod tree;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::Transport;
use crate::error::Error;

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, ServerState, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "boardkit".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(internal_error)
}

const SHAPING_PROPERTIES_NOTE: &str =
    "Responses are compacted by default: long descriptions and inline base64 avatars are dropped and embedded users are reduced to {id, full_name}.";

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let compact_schema = serde_json::json!({
        "type": "boolean",
        "description": "Strip heavy fields and simplify user objects (default: true)"
    });
    let fields_schema = serde_json::json!({
        "type": "string",
        "description": "Comma-separated list of fields to keep on each item (e.g. 'id,title,state')"
    });

    let tools = vec![
        Tool {
            name: "list_cards".to_string(),
            description: format!("List cards, following offset pagination automatically until the collection is exhausted or max_pages is reached. {SHAPING_PROPERTIES_NOTE}"),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "space_id": {"type": "number", "description": "Only cards of this space"},
                    "board_id": {"type": "number", "description": "Only cards of this board"},
                    "query": {"type": "string", "description": "Free text search"},
                    "page_size": {"type": "number", "description": "Cards per request (default: 100, max: 100)"},
                    "max_pages": {"type": "number", "description": "Maximum number of requests (default: 10)"},
                    "compact": compact_schema.clone(),
                    "fields": fields_schema.clone()
                },
                "required": []
            }),
        },
        Tool {
            name: "get_card".to_string(),
            description: format!("Get a single card by id. {SHAPING_PROPERTIES_NOTE}"),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "card_id": {"type": "number", "description": "Card id"},
                    "compact": compact_schema.clone(),
                    "fields": fields_schema.clone()
                },
                "required": ["card_id"]
            }),
        },
        Tool {
            name: "list_spaces".to_string(),
            description: format!("List the spaces visible to the token. {SHAPING_PROPERTIES_NOTE}"),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "compact": compact_schema.clone(),
                    "fields": fields_schema.clone()
                },
                "required": []
            }),
        },
        Tool {
            name: "get_tree".to_string(),
            description: "Get the nested tree of spaces, folders and documents. Siblings are ordered spaces first, then folders, then documents, each by title.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "root_uid": {"type": "string", "description": "Start below this entity (default: top level)"},
                    "depth": {"type": "number", "description": "Maximum nesting depth, 0 for unlimited (default: 0)"}
                },
                "required": []
            }),
        },
        Tool {
            name: "list_children".to_string(),
            description: "List the direct children (spaces, folders, documents) of an entity, or the top-level entities when no parent is given.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "parent_uid": {"type": "string", "description": "Parent entity uid"}
                },
                "required": []
            }),
        },
        Tool {
            name: "api_request".to_string(),
            description: "Send a raw request to the API (rate limited and retried like every other tool). The path is relative to the API base URL, e.g. '/boards/12'.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "method": {
                        "type": "string",
                        "description": "HTTP method (default: GET)",
                        "enum": ["GET", "POST", "PATCH", "PUT", "DELETE"]
                    },
                    "path": {"type": "string", "description": "Path relative to the API base URL"},
                    "query": {"type": "object", "description": "Query parameters; null values are skipped"},
                    "body": {"type": "object", "description": "JSON body"},
                    "compact": compact_schema.clone(),
                    "fields": fields_schema.clone()
                },
                "required": ["path"]
            }),
        },
    ];

    let result = ToolsList { tools };

    serde_json::to_value(result).map_err(internal_error)
}

pub async fn handle_tools_call<T: Transport>(
    params: Option<serde_json::Value>,
    state: &ServerState<T>,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError {
            code: -32602,
            message: format!("Invalid params: {e}"),
            data: None,
        })?;

    match params.name.as_str() {
        "list_cards" => cards::handle_list_cards(params.arguments, state).await,
        "get_card" => cards::handle_get_card(params.arguments, state).await,
        "list_spaces" => cards::handle_list_spaces(params.arguments, state).await,
        "get_tree" => tree::handle_get_tree(params.arguments, state).await,
        "list_children" => tree::handle_list_children(params.arguments, state).await,
        "api_request" => request::handle_api_request(params.arguments, state).await,
        _ => Err(JsonRpcError {
            code: -32602,
            message: format!("Unknown tool: {}", params.name),
            data: None,
        }),
    }
}

/// Deserialize tool arguments; a missing object is treated as `{}`
fn parse_arguments<A: DeserializeOwned>(
    arguments: Option<serde_json::Value>,
) -> Result<A, JsonRpcError> {
    let arguments = match arguments {
        None | Some(serde_json::Value::Null) => serde_json::json!({}),
        Some(value) => value,
    };

    serde_json::from_value(arguments).map_err(|e| JsonRpcError {
        code: -32602,
        message: format!("Invalid arguments: {e}"),
        data: None,
    })
}

/// Wrap a tool's output in the MCP text content envelope
fn tool_result(data: &impl Serialize) -> Result<serde_json::Value, JsonRpcError> {
    let json_string = serde_json::to_string_pretty(data).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Serialization error: {e}"),
        data: None,
    })?;

    let result = CallToolResult {
        content: vec![Content::Text { text: json_string }],
        is_error: None,
    };

    serde_json::to_value(result).map_err(internal_error)
}

/// Map a client failure to a JSON-RPC error, keeping the API details inspectable
fn tool_error(err: impl Into<Error>) -> JsonRpcError {
    let err = err.into();
    let data = match &err {
        Error::Api(api) => serde_json::to_value(api).ok(),
        Error::NotFound(uid) => Some(serde_json::json!({"not_found": uid})),
        Error::Config(_) => None,
    };

    JsonRpcError {
        code: -32603,
        message: format!("Tool execution error: {err}"),
        data,
    }
}

fn internal_error(e: serde_json::Error) -> JsonRpcError {
    JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    }
}
