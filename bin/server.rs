// Funding Feed Mock - Web Server
// REST API with Axum over the embedded fixtures

use anyhow::{Context, Result};
use clap::Parser;
use funding_feed_mock::api::{router, AppState};
use funding_feed_mock::config::{DEFAULT_BASE_URL, DEFAULT_BIND_ADDR, DEFAULT_PAGE_SIZE};
use funding_feed_mock::{FeedConfig, Fixtures};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "funding-server", version, about = "Serve the mock funding feed over HTTP")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "FUNDING_MOCK_BIND", default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// Base URL used in feed links
    #[arg(long, env = "FUNDING_MOCK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Page size when a request does not supply one
    #[arg(long, env = "FUNDING_MOCK_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = FeedConfig::new(args.base_url, args.page_size).with_bind_addr(args.bind);

    let fixtures = Fixtures::embedded().context("Failed to load embedded fixtures")?;
    info!(
        pesports_rows = fixtures.pesports.len(),
        "fixtures loaded"
    );

    let bind_addr = config.bind_addr.clone();
    let feed_url = config.feed_url();
    let app = router(AppState::new(fixtures, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!(addr = %bind_addr, feed = %feed_url, "🚀 server running");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
