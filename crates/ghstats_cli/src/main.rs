//! ghstats CLI - renders GitHub account statistics into a Markdown report.

mod config;
mod report;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use ghstats::http::{BlockingTransport, ReqwestTransport};
use ghstats::{GitHubClient, Stats, Transport};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "ghstats")]
#[command(version)]
#[command(about = "Render GitHub account statistics into a Markdown template")]
#[command(after_long_help = r#"CONFIGURATION
    ghstats reads configuration from (highest precedence first):
      1. ACCESS_TOKEN and GITHUB_ACTOR environment variables
      2. Environment variables (GHSTATS_* prefix, e.g. GHSTATS_TRANSPORT__MAX_CONNECTIONS)
      3. A file passed with --config
      4. ./ghstats.toml
      5. ~/.config/ghstats/config.toml (or $XDG_CONFIG_HOME/ghstats/config.toml)
      6. Built-in defaults

    A .env file in the current directory is loaded into the environment first.

ENVIRONMENT VARIABLES
    ACCESS_TOKEN     GitHub personal access token (required)
    GITHUB_ACTOR     GitHub login to report on (required)
"#)]
struct Cli {
    /// Additional config file, overriding ./ghstats.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template to render (default from config or model.md)
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Report destination (default from config or README.md)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the statistics as JSON instead of writing the report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ghstats=info,ghstats_cli=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // Load configuration (config files -> env vars -> defaults)
    let config = Config::load(cli.config.as_deref());
    let credentials = config.credentials()?;

    let timeout = config.transport.request_timeout();
    let transport = Transport::new(
        credentials.token,
        Arc::new(ReqwestTransport::with_timeout(timeout)?),
        Arc::new(BlockingTransport::with_timeout(timeout)),
    )
    .with_gate(config.transport.gate())
    .with_retry(config.transport.retry())
    .with_api_url(config.github.api_url.as_str());

    let stats = Stats::new(GitHubClient::new(transport, credentials.actor.as_str()));
    let snapshot = stats.aggregate().await;

    tracing::info!(
        actor = %credentials.actor,
        contributions = snapshot.total_contributions,
        repos = snapshot.repo_count,
        stars = snapshot.stars,
        forks = snapshot.forks,
        languages = snapshot.languages.len(),
        "Aggregated statistics"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let template = cli.template.unwrap_or(config.report.template);
    let output = cli.output.unwrap_or(config.report.output);
    report::write_report(&template, &output, &snapshot)?;
    tracing::info!("Wrote {}", output.display());

    Ok(())
}
