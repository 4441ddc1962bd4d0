//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tracing::info;

use storesync_cache::ContentCache;
use storesync_commerce::OrdersClient;
use storesync_core::{SyncContext, run_forever, run_once};
use storesync_kb::KnowledgeBaseClient;
use storesync_scrape::Fetcher;
use storesync_shared::{
    AppConfig, SyncOptions, config_file_path, expand_home, init_config, load_config,
    load_config_from, require_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Storesync — publish storefront content to a conversational-AI knowledge base.
#[derive(Parser)]
#[command(
    name = "storesync",
    version,
    about = "Sync storefront content and order records into a conversational-AI knowledge base.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Alternate config file (defaults to ~/.storesync/storesync.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run a sync pass (or the scheduled loop).
    Run {
        /// Run a single pass and exit instead of the scheduled loop.
        #[arg(long)]
        once: bool,

        /// Publish despite delete failures, accepting duplicate-document risk.
        #[arg(long)]
        force: bool,

        /// Maximum product-catalog pages to walk.
        #[arg(long)]
        max_pages: Option<u32>,

        /// Fetch orders created within the last N days.
        #[arg(long)]
        order_days: Option<i64>,

        /// Maximum number of orders to fetch per pass.
        #[arg(long)]
        order_limit: Option<u32>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "storesync=info",
        1 => "storesync=debug",
        _ => "storesync=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Run {
            once,
            force,
            max_pages,
            order_days,
            order_limit,
        } => cmd_run(config, once, force, max_pages, order_days, order_limit).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

async fn cmd_run(
    config: AppConfig,
    once: bool,
    force: bool,
    max_pages: Option<u32>,
    order_days: Option<i64>,
    order_limit: Option<u32>,
) -> Result<()> {
    // Required credential check before any unit is processed; a missing
    // key aborts the whole run with exit code 1.
    let api_key = require_api_key(&config.knowledge_base.api_key_env)?;

    let orders = if config.commerce.enabled {
        let token = require_api_key(&config.commerce.access_token_env)?;
        if config.commerce.shop_domain.is_empty() {
            return Err(eyre!("commerce.enabled is set but commerce.shop_domain is empty"));
        }
        Some(OrdersClient::new(
            &config.commerce.shop_domain,
            &config.commerce.api_version,
            &token,
        )?)
    } else {
        None
    };

    let mut options = SyncOptions::from(&config);
    options.force = force;
    if let Some(pages) = max_pages {
        options.max_catalog_pages = pages;
    }
    if let Some(days) = order_days {
        options.order_days = days;
    }
    if let Some(limit) = order_limit {
        options.order_limit = limit;
    }

    let cache = ContentCache::new(expand_home(&config.cache.dir));
    let kb = KnowledgeBaseClient::new(&config.knowledge_base.api_url, &api_key)?;

    let ctx = SyncContext {
        cache,
        fetcher: Fetcher::new()?,
        kb,
        orders,
        options,
        config,
    };

    if once {
        let summary = run_once(&ctx).await;
        println!();
        println!("  Sync pass completed.");
        println!("  Updated:  {} of {} units", summary.updated, summary.total);
        if !summary.failures.is_empty() {
            println!("  Failed:   {}", summary.failures.len());
            for (unit, error) in &summary.failures {
                println!("    {unit}: {error}");
            }
        }
        println!();
        // Per-unit failures are logged and tallied, not fatal.
        Ok(())
    } else {
        info!("starting scheduled mode");
        run_forever(&ctx).await;
        unreachable!("scheduled mode never returns");
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created default config at {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let path = config_file_path()?;
    println!("# resolved configuration ({})", path.display());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
