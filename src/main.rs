use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use scrapefeed::server::{self, AppState};
use scrapefeed::Config;

#[derive(Parser, Debug)]
#[command(name = "scrapefeed", about = "Serve RSS feeds scraped from HTML pages")]
struct Args {
    /// Path to the TOML config file ("-" reads stdin)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config file
    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(listen) = args.listen {
        config.listen = listen;
    }

    if config.feeds.is_empty() {
        tracing::warn!("No feeds configured");
    }

    let listener = TcpListener::bind(config.listen.as_str())
        .await
        .with_context(|| format!("Failed to listen on {}", config.listen))?;
    let addr = listener.local_addr().context("Failed to read listen address")?;

    let state = AppState::new(config).context("Failed to initialize server state")?;

    tracing::info!("listening on http://{}/", addr);
    server::serve(listener, state).await.context("Server error")?;

    Ok(())
}
