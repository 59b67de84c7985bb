mod commands;
mod config;
mod notice;
mod pager;
mod render;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use client_core::InventoryClient;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use views::LayoutMode;

use crate::commands::{Command, Context};

/// Width assumed when stdout is not a terminal.
const FALLBACK_WIDTH: u16 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Layout {
    Desktop,
    Mobile,
}

impl From<Layout> for LayoutMode {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Desktop => Self::Desktop,
            Layout::Mobile => Self::Mobile,
        }
    }
}

/// Terminal dashboard for the inventory backend.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[arg(long, default_value = "dashboard.toml")]
    config: PathBuf,
    /// Base URL of the inventory REST API.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    rows_per_page: Option<usize>,
    #[arg(long)]
    low_stock_threshold: Option<i64>,
    /// Per-request timeout; none by default.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Forces a layout instead of following the terminal width.
    #[arg(long, value_enum)]
    layout: Option<Layout>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings(&args.config)?;
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(rows) = args.rows_per_page {
        settings.rows_per_page = rows.max(1);
    }
    if let Some(threshold) = args.low_stock_threshold {
        settings.low_stock_threshold = threshold;
    }
    if args.timeout_secs.is_some() {
        settings.request_timeout_secs = args.timeout_secs;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!(?settings, "settings loaded");

    let client = InventoryClient::with_timeout(&settings.api_url, settings.request_timeout())
        .with_context(|| format!("cannot use API URL '{}'", settings.api_url))?;
    let width = crossterm::terminal::size()
        .map(|(width, _)| width)
        .unwrap_or(FALLBACK_WIDTH);

    let ctx = Context {
        client,
        settings,
        width,
        layout_override: args.layout.map(LayoutMode::from),
    };
    let output = commands::run(args.command.unwrap_or(Command::Home), &ctx).await?;
    print!("{output}");
    Ok(())
}
