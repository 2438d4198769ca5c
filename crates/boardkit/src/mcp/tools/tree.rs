use crate::api::Transport;
use crate::prelude::eprintln;
use serde::Deserialize;

use super::{parse_arguments, tool_error, tool_result, JsonRpcError, ServerState};

/// Handle get_tree via MCP
pub async fn handle_get_tree<T: Transport>(
    arguments: Option<serde_json::Value>,
    state: &ServerState<T>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct GetTreeArgs {
        root_uid: Option<String>,
        #[serde(default)]
        depth: usize,
    }

    let args: GetTreeArgs = parse_arguments(arguments)?;

    if state.verbose {
        eprintln!(
            "Calling get_tree: root_uid={:?}, depth={}",
            args.root_uid, args.depth
        );
    }

    let nodes = state
        .client
        .build_tree(args.root_uid.as_deref(), args.depth)
        .await
        .map_err(tool_error)?;

    tool_result(&nodes)
}

/// Handle list_children via MCP
pub async fn handle_list_children<T: Transport>(
    arguments: Option<serde_json::Value>,
    state: &ServerState<T>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct ListChildrenArgs {
        parent_uid: Option<String>,
    }

    let args: ListChildrenArgs = parse_arguments(arguments)?;

    if state.verbose {
        eprintln!("Calling list_children: parent_uid={:?}", args.parent_uid);
    }

    let children = state
        .client
        .list_children(args.parent_uid.as_deref())
        .await
        .map_err(tool_error)?;

    tool_result(&children)
}
