//! Terminal client for a running irradiate-council server.
//!
//! Usage:
//!   council --server http://127.0.0.1:3000 "考えていることを書く"
//!   council --file draft.txt

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use irradiate_council::{
    config::DEFAULT_MAX_CHARS,
    report::{ReportSession, SessionError, text::render_text},
    schemas::EvaluateRequest,
};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "council")]
#[command(about = "Ask the council to evaluate a text", long_about = None)]
struct Cli {
    /// Base URL of the server
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,
    /// Read the input from a file instead of the argument
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,
    /// Maximum characters sent; longer input is truncated
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    max_chars: usize,
    /// Request timeout in seconds
    #[arg(long, default_value_t = 150)]
    timeout_secs: u64,
    /// Print the raw JSON instead of the report
    #[arg(long)]
    json: bool,
    /// Text to evaluate
    text: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let input = match (&cli.file, &cli.text) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, Some(text)) => text.clone(),
        (None, None) => anyhow::bail!("provide TEXT or --file PATH"),
    };

    let mut session = ReportSession::new(cli.max_chars);
    session.set_input(&input)?;
    if input.chars().count() > session.max_chars() {
        eprintln!("⚠️ input truncated to {} characters", session.max_chars());
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;
    let url = format!("{}/api/evaluate", cli.server.trim_end_matches('/'));

    let submitted = session
        .submit(move |request| async move { post_evaluate(&client, &url, &request).await })
        .await;

    match submitted {
        Ok(()) => {}
        Err(SessionError::Blank) => anyhow::bail!(
            "{}",
            session.error().unwrap_or("input is blank")
        ),
        Err(e) => return Err(e.into()),
    }

    if let Some(message) = session.error() {
        anyhow::bail!("{}", message);
    }
    if cli.json {
        let value = session.raw().cloned().unwrap_or(Value::Null);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if let Some(view) = session.result() {
        print!("{}", render_text(view));
    }
    Ok(())
}

/// POST the request; error bodies carry `{ "error": ... }`
async fn post_evaluate(
    client: &reqwest::Client,
    url: &str,
    request: &EvaluateRequest,
) -> std::result::Result<Value, String> {
    let resp = client
        .post(url)
        .json(request)
        .send()
        .await
        .map_err(|e| format!("request failed: {}", e))?;
    let status = resp.status();
    let body: Value = resp
        .json()
        .await
        .map_err(|e| format!("invalid response body: {}", e))?;
    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        return Err(message);
    }
    Ok(body)
}
