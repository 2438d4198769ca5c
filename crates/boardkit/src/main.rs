use crate::prelude::*;
use clap::Parser;

mod api;
mod cards;
mod config;
mod error;
mod mcp;
mod prelude;
mod tree;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Rate-limited client for a kanban project-management API, usable from the shell or as an MCP server"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Tenant (company) identifier, used to build the default API base URL
    #[clap(long, env = "BOARDKIT_TENANT", global = true)]
    tenant: Option<String>,

    /// API bearer token
    #[clap(long, env = "BOARDKIT_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Override the API base URL (defaults to the tenant's host)
    #[clap(long, env = "BOARDKIT_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "BOARDKIT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Model Context Protocol server
    #[clap(name = "mcp")]
    MCP(crate::mcp::App),

    /// Print the space/folder/document tree
    Tree(crate::tree::TreeOptions),

    /// List the direct children of an entity
    Children(crate::tree::ChildrenOptions),

    /// List cards, following pagination
    Cards(crate::cards::CardsOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
        SubCommands::Tree(options) => crate::tree::run_tree(options, app.global).await,
        SubCommands::Children(options) => crate::tree::run_children(options, app.global).await,
        SubCommands::Cards(options) => crate::cards::run(options, app.global).await,
    }
}
