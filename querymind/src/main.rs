//! QueryMind - chat with the QueryMind assistant from the terminal.
//!
//! Architecture:
//! - The library crate owns conversation state and the backend boundary
//! - This binary reads the stored token, parses commands, and renders the
//!   transcript to stdout
//! - Diagnostics go to stderr through `tracing`

mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    querymind::logging::init(cli.verbose);
    execute(cli).await
}
