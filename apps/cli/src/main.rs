//! Storesync CLI — storefront content → conversational-AI knowledge base.
//!
//! Scrapes configured storefront pages and order records, detects changes
//! against the local cache, and republishes changed units as knowledge-base
//! documents, optionally binding them to an agent.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
