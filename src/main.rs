// Funding Feed Mock - CLI
// Print feed pages and records as JSON, or export a stream bundle.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use funding_feed_mock::bundle::build_bundle;
use funding_feed_mock::{
    get_by_id, get_page, get_provider_funding, FeedConfig, FeedFilters, Fixtures, FundingStream,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "funding-feed-mock", version, about = "Mock DSG and PE and Sport Premium funding feed")]
struct Cli {
    /// Base URL used in feed links
    #[arg(long, env = "FUNDING_MOCK_BASE_URL", default_value = funding_feed_mock::config::DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one page of the feed
    Feed {
        /// Page number (defaults to the newest page)
        #[arg(long)]
        page: Option<usize>,
        #[arg(long, default_value_t = funding_feed_mock::config::DEFAULT_PAGE_SIZE)]
        page_size: usize,
        /// Restrict to one funding stream code
        #[arg(long)]
        stream: Option<String>,
    },
    /// Print the funding record of a feed entry
    Get { id: String },
    /// Print a single-provider funding record
    Provider { id: String },
    /// Write the download-all bundle of a stream
    Export { stream: String, out: PathBuf },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let fixtures = Fixtures::embedded().context("Failed to load embedded fixtures")?;

    match cli.command {
        Command::Feed {
            page,
            page_size,
            stream,
        } => {
            let config = FeedConfig::new(cli.base_url, page_size);
            let filters = FeedFilters {
                page_size: Some(config.default_page_size),
                funding_stream_codes: stream.into_iter().collect(),
                ..FeedFilters::default()
            };
            let response = get_page(&fixtures, &filters, page, &config)?;
            print_json(&response)?;
        }
        Command::Get { id } => match get_by_id(&fixtures, &id)? {
            Some(funding) => print_json(&funding)?,
            None => bail!("Funding {} not found", id),
        },
        Command::Provider { id } => match get_provider_funding(&fixtures, &id)? {
            Some(funding) => print_json(&funding)?,
            None => bail!("Provider funding {} not found", id),
        },
        Command::Export { stream, out } => {
            let Some(stream) = FundingStream::from_code(&stream) else {
                bail!("Unknown funding stream {}", stream);
            };
            let config = FeedConfig::new(cli.base_url, funding_feed_mock::config::DEFAULT_PAGE_SIZE);
            let bytes = build_bundle(&fixtures, stream, &config)?;
            std::fs::write(&out, &bytes)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!(path = %out.display(), bytes = bytes.len(), "bundle written");
            println!("✓ Wrote {} ({} bytes)", out.display(), bytes.len());
        }
    }

    Ok(())
}
