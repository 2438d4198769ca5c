use crate::api::{RequestSpec, Transport};
use crate::prelude::eprintln;
use boardkit_core::shaping::shape;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{parse_arguments, tool_error, tool_result, JsonRpcError, ServerState};

fn default_method() -> String {
    "GET".to_string()
}

fn default_compact() -> bool {
    true
}

/// Render a query value the way it goes on the wire; strings are not quoted
fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn invalid_params(message: String) -> JsonRpcError {
    JsonRpcError {
        code: -32602,
        message,
        data: None,
    }
}

/// Handle api_request via MCP
pub async fn handle_api_request<T: Transport>(
    arguments: Option<serde_json::Value>,
    state: &ServerState<T>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct ApiRequestArgs {
        #[serde(default = "default_method")]
        method: String,
        path: String,
        #[serde(default)]
        query: Map<String, Value>,
        body: Option<Value>,
        #[serde(default = "default_compact")]
        compact: bool,
        fields: Option<String>,
    }

    let args: ApiRequestArgs = parse_arguments(arguments)?;

    let method = Method::from_bytes(args.method.trim().to_uppercase().as_bytes())
        .map_err(|e| invalid_params(format!("Invalid method '{}': {e}", args.method)))?;
    if args.path.trim().is_empty() {
        return Err(invalid_params("Path must not be empty".to_string()));
    }

    if state.verbose {
        eprintln!("Calling api_request: {} {}", method, args.path);
    }

    let mut spec = RequestSpec::new(method, args.path.trim());
    for (key, value) in &args.query {
        spec = spec.param_opt(key.as_str(), query_value(value));
    }
    if let Some(body) = args.body {
        spec = spec.json(body);
    }

    let response = state
        .client
        .execute(&spec)
        .await
        .map_err(tool_error)?
        .map(|value| shape(value, args.compact, args.fields.as_deref()));

    tool_result(&response)
}
