use anyhow::Result;
use clap::Parser;
use fredmcp_fred::FredClient;
use fredmcp_mcp::{McpServer, SeriesObservationsTool, ToolRegistry};
use std::sync::Arc;

mod config;
mod health;

use config::{Cli, LogFormat, Mode, ServerConfig};

const DEFAULT_LOG_FILTER: &str =
    "fredmcp_server=info,fredmcp_mcp=info,fredmcp_fred=info,tower_http=info";

#[tokio::main]
async fn main() {
    // A .env file is optional.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr: in local mode stdout carries the protocol.
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Pretty => builder.with_ansi(false).init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ServerConfig::load(&cli)?;

    tracing::info!(
        mode = config.mode.name(),
        cloud_platform = config.cloud_platform,
        "Starting MCP FRED API server v{}",
        env!("CARGO_PKG_VERSION")
    );

    match config.mode {
        Mode::Local => run_local(config).await,
        Mode::Service { port } => run_service(config, port).await,
    }
}

async fn run_local(config: ServerConfig) -> Result<()> {
    tracing::debug!(fred = ?config.fred, "FRED client configuration");
    let client = FredClient::new(config.fred)?;

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SeriesObservationsTool::new(Arc::new(client))));
    tracing::info!("Registered {} tools", registry.len());

    McpServer::new(registry).run_stdio().await
}

/// The tool is not reachable in this mode; only liveness is served.
async fn run_service(config: ServerConfig, port: u16) -> Result<()> {
    if config.fred.api_key().is_none() {
        tracing::warn!("FRED_API_KEY is not set; the observations tool would be unusable");
    }

    let addr = format!("{}:{}", config.host, port);
    health::serve(&addr).await
}
