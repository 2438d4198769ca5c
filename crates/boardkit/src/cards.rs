use crate::api::{BoardClient, PageOptions, RequestSpec};
use crate::config::Config;
use crate::prelude::{eprintln, println, *};
use boardkit_core::pagination::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "EXAMPLES:
  # Every card of a board, compacted:
  boardkit cards --board-id 42

  # Only ids and titles, at most 3 requests of 50:
  boardkit cards --space-id 7 --page-size 50 --max-pages 3 --fields id,title --json

NOTES:
  - Requests are spaced at least 220ms apart and 429 responses are retried
  - The page size is capped at 100 by the API")]
pub struct CardsOptions {
    /// Only cards of this space
    #[arg(long)]
    pub space_id: Option<i64>,

    /// Only cards of this board
    #[arg(long)]
    pub board_id: Option<i64>,

    /// Free text search
    #[arg(short, long)]
    pub query: Option<String>,

    /// Cards per request
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Maximum number of requests
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Keep heavy fields and full user objects
    #[arg(long)]
    pub no_compact: bool,

    /// Comma-separated list of fields to keep on each card
    #[arg(long)]
    pub fields: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CardsOptions {
    fn request(&self) -> RequestSpec {
        RequestSpec::get("/cards")
            .param_opt("space_id", self.space_id)
            .param_opt("board_id", self.board_id)
            .param_opt("query", self.query.clone())
    }

    fn page_options(&self) -> PageOptions {
        PageOptions {
            page_size: self.page_size,
            max_pages: self.max_pages,
            compact: !self.no_compact,
            fields: self.fields.clone(),
        }
    }
}

/// Render a scalar card field for the table
fn cell(card: &Value, key: &str) -> String {
    match card.get(key) {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(map)) => map
            .get("full_name")
            .or_else(|| map.get("title"))
            .and_then(Value::as_str)
            .unwrap_or("-")
            .to_string(),
        Some(other) => other.to_string(),
    }
}

pub async fn run(options: CardsOptions, global: crate::Global) -> Result<()> {
    let config = Config::from_global(&global)?;
    let client = BoardClient::connect(&config);

    if global.verbose {
        eprintln!("API base URL: {}", config.base_url);
        eprintln!();
    }

    let result = client
        .fetch_all(&options.request(), &options.page_options())
        .await;
    client.close().await;
    let cards = result?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    println!("Found {} card(s):\n", cards.len());

    if cards.is_empty() {
        println!("No cards found.");
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Title".bold().cyan(),
        "State".bold().cyan(),
        "Owner".bold().cyan()
    ]);
    for card in &cards {
        table.add_row(prettytable::row![
            cell(card, "id").green(),
            cell(card, "title").bright_white(),
            cell(card, "state").bright_yellow(),
            cell(card, "owner").bright_black()
        ]);
    }
    table.printstd();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    #[derive(Debug, clap::Parser)]
    struct Harness {
        #[clap(flatten)]
        options: CardsOptions,
    }

    #[test]
    fn test_options_defaults() {
        let harness = Harness::parse_from(["cards", "--board-id", "4"]);
        let options = harness.options;

        let spec = options.request();
        assert_eq!(spec.query_pairs(), vec![("board_id", "4")]);

        let page = options.page_options();
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.max_pages, DEFAULT_MAX_PAGES);
        assert!(page.compact);
        assert_eq!(page.fields, None);
    }

    #[test]
    fn test_no_compact_flag() {
        let harness = Harness::parse_from(["cards", "--no-compact", "--fields", "id,title"]);
        let page = harness.options.page_options();
        assert!(!page.compact);
        assert_eq!(page.fields.as_deref(), Some("id,title"));
    }

    #[test]
    fn test_cell_rendering() {
        let card = json!({
            "id": 12,
            "title": "Fix login",
            "owner": {"id": 1, "full_name": "Ann"},
            "state": null
        });
        assert_eq!(cell(&card, "id"), "12");
        assert_eq!(cell(&card, "title"), "Fix login");
        assert_eq!(cell(&card, "owner"), "Ann");
        assert_eq!(cell(&card, "state"), "-");
        assert_eq!(cell(&card, "missing"), "-");
    }
}
