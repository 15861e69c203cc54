use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fredmcp_core::GatewayError;
use fredmcp_fred::{FredConfig, DEFAULT_BASE_URL};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Parser, Debug, Clone)]
#[command(name = "fredmcp")]
#[command(about = "MCP server for FRED economic time series", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "FREDMCP_CONFIG", default_value = "fredmcp.toml")]
    pub config: PathBuf,

    /// Port for the health-check listener. Setting it selects service mode.
    #[arg(short, long, env = "PORT")]
    pub port: Option<String>,

    /// Host to bind the health-check listener to
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// FRED API key
    #[arg(long, env = "FRED_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Root URL of the FRED REST API
    #[arg(long, env = "FRED_API_URL")]
    pub fred_url: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, env = "FRED_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Set by the hosting platform; informational only
    #[arg(long = "cloud-platform", env = "RENDER", hide = true)]
    pub cloud_platform: Option<String>,

    /// Log output format
    #[arg(long, env = "FREDMCP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// How the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Serve the observations tool over stdio.
    Local,
    /// Answer liveness probes over HTTP on `port`.
    Service { port: u16 },
}

impl Mode {
    /// Pick the mode from the raw port setting.
    ///
    /// Absent or blank means local mode. Anything other than a port number
    /// in 1..=65535 is a configuration error rather than a silent fallback.
    pub fn select(port: Option<&str>) -> Result<Self, GatewayError> {
        let Some(raw) = port.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(Self::Local);
        };

        match raw.parse::<u16>() {
            Ok(port) if port > 0 => Ok(Self::Service { port }),
            _ => Err(GatewayError::configuration(format!(
                "PORT must be an integer between 1 and 65535, got '{raw}'"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Service { .. } => "service",
        }
    }
}

/// Optional settings file. The API key is deliberately not accepted here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub fred: FredSection,

    #[serde(default)]
    pub http: HttpSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FredSection {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    pub host: Option<String>,
}

impl FileConfig {
    /// Load the file if it exists, otherwise use defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Configuration file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {}", path.display()))
    }
}

/// Resolved startup configuration handed to the components.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub mode: Mode,
    pub host: String,
    pub fred: FredConfig,
    pub cloud_platform: bool,
}

impl ServerConfig {
    /// Merge CLI/env values over the settings file over built-in defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = FileConfig::load(&cli.config)?;
        Ok(Self::resolve(cli, file)?)
    }

    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, GatewayError> {
        let mode = Mode::select(cli.port.as_deref())?;

        let base_url = cli
            .fred_url
            .as_deref()
            .or(file.fred.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(base_url).map_err(|e| {
            GatewayError::configuration(format!("Invalid FRED API URL '{base_url}': {e}"))
        })?;

        let timeout = positive_secs(
            "timeout_secs",
            cli.timeout_secs
                .or(file.fred.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )?;
        let connect_timeout = positive_secs(
            "connect_timeout_secs",
            file.fred
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )?;

        let mut fred = FredConfig::new(base_url)
            .with_timeout(timeout)
            .with_connect_timeout(connect_timeout);
        if let Some(api_key) = &cli.api_key {
            fred = fred.with_api_key(api_key.clone());
        }

        let host = cli
            .host
            .clone()
            .or(file.http.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Self {
            mode,
            host,
            fred,
            cloud_platform: is_set(cli.cloud_platform.as_deref()),
        })
    }
}

fn positive_secs(field: &str, secs: u64) -> Result<Duration, GatewayError> {
    if secs == 0 {
        return Err(GatewayError::configuration(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(Duration::from_secs(secs))
}

fn is_set(flag: Option<&str>) -> bool {
    match flag.map(|f| f.trim().to_ascii_lowercase()) {
        None => false,
        Some(f) => !matches!(f.as_str(), "" | "0" | "false" | "no"),
    }
}
