//! irradiate-council HTTP server
//!
//! Usage:
//!   cargo run -- --bind 0.0.0.0:3000
//!   cargo run -- --policy reject

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use irradiate_council::{
    clients::GeminiClient,
    config::{Config, CouncilPolicy},
    evaluate::Evaluator,
    http::{AppState, start_http_server},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "irradiate-council")]
#[command(about = "Personality council report server", long_about = None)]
struct Cli {
    /// Address to listen on (overrides COUNCIL_HTTP_BIND)
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,
    /// What to do with incomplete model output: warn or reject
    #[arg(long)]
    policy: Option<CouncilPolicy>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config.server.http_bind = bind;
    }
    if let Some(policy) = cli.policy {
        config.evaluation.policy = policy;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.runtime.log_level.clone()))
        .init();

    let client = GeminiClient::from_config(&config)?;
    tracing::info!(
        model = %config.gemini.model,
        policy = ?config.evaluation.policy,
        max_chars = config.evaluation.max_chars,
        "Starting irradiate-council"
    );

    let evaluator = Evaluator::new(Arc::new(client), config.evaluation.clone());
    let state = AppState::new(Arc::new(config), evaluator);
    start_http_server(state).await
}
