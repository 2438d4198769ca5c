use crate::api::{PageOptions, RequestSpec, Transport};
use crate::prelude::eprintln;
use boardkit_core::pagination::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
use boardkit_core::shaping::shape;
use serde::Deserialize;

use super::{parse_arguments, tool_error, tool_result, JsonRpcError, ServerState};

fn default_compact() -> bool {
    true
}

/// Handle list_cards via MCP
pub async fn handle_list_cards<T: Transport>(
    arguments: Option<serde_json::Value>,
    state: &ServerState<T>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct ListCardsArgs {
        space_id: Option<i64>,
        board_id: Option<i64>,
        query: Option<String>,
        page_size: Option<usize>,
        max_pages: Option<usize>,
        #[serde(default = "default_compact")]
        compact: bool,
        fields: Option<String>,
    }

    let args: ListCardsArgs = parse_arguments(arguments)?;

    if state.verbose {
        eprintln!(
            "Calling list_cards: space_id={:?}, board_id={:?}, query={:?}, page_size={:?}, max_pages={:?}",
            args.space_id, args.board_id, args.query, args.page_size, args.max_pages
        );
    }

    let base = RequestSpec::get("/cards")
        .param_opt("space_id", args.space_id)
        .param_opt("board_id", args.board_id)
        .param_opt("query", args.query);
    let options = PageOptions {
        page_size: args.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        max_pages: args.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
        compact: args.compact,
        fields: args.fields,
    };

    let cards = state
        .client
        .fetch_all(&base, &options)
        .await
        .map_err(tool_error)?;

    tool_result(&cards)
}

/// Handle get_card via MCP
pub async fn handle_get_card<T: Transport>(
    arguments: Option<serde_json::Value>,
    state: &ServerState<T>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct GetCardArgs {
        card_id: i64,
        #[serde(default = "default_compact")]
        compact: bool,
        fields: Option<String>,
    }

    let args: GetCardArgs = parse_arguments(arguments)?;

    if state.verbose {
        eprintln!("Calling get_card: card_id={}", args.card_id);
    }

    let card = state
        .client
        .execute(&RequestSpec::get(format!("/cards/{}", args.card_id)))
        .await
        .map_err(tool_error)?
        .unwrap_or_default();

    tool_result(&shape(card, args.compact, args.fields.as_deref()))
}

/// Handle list_spaces via MCP
pub async fn handle_list_spaces<T: Transport>(
    arguments: Option<serde_json::Value>,
    state: &ServerState<T>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct ListSpacesArgs {
        #[serde(default = "default_compact")]
        compact: bool,
        fields: Option<String>,
    }

    let args: ListSpacesArgs = parse_arguments(arguments)?;

    if state.verbose {
        eprintln!("Calling list_spaces: fields={:?}", args.fields);
    }

    let spaces = state
        .client
        .execute(&RequestSpec::get("/spaces"))
        .await
        .map_err(tool_error)?
        .unwrap_or_else(|| serde_json::json!([]));

    tool_result(&shape(spaces, args.compact, args.fields.as_deref()))
}
