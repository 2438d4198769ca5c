use crate::api::Transport;
use crate::prelude::{eprintln, *};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::ServerState;

pub async fn run_stdio<T: Transport>(state: Arc<ServerState<T>>) -> Result<()> {
    if state.verbose {
        eprintln!("Starting MCP server with stdio transport...");
        eprintln!();
    }

    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if state.verbose {
            eprintln!("Received: {trimmed}");
        }

        let response = super::handle_request(trimmed, &state).await;
        let response_json = serde_json::to_string(&response)?;

        if state.verbose {
            eprintln!("Sending: {response_json}");
        }

        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    log::debug!("stdin closed, shutting down");
    Ok(())
}
