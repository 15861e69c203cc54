//! Error taxonomy shared by every layer of the gateway.

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced by the observation gateway.
///
/// None of these are retried. Each one is reported to the caller of the
/// single operation that produced it.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A caller-supplied parameter failed validation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// FRED answered, but not with a usable observation list.
    #[error("FRED API error (status {status}): {}", upstream_message(.body))]
    Upstream { status: u16, body: String },

    /// FRED could not be reached.
    #[error("Transport error: {message}")]
    Transport { message: String, timeout: bool },

    /// Startup configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timeout: true,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Stable tag for logs and tool results.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Upstream { .. } => "upstream_error",
            Self::Transport { .. } => "transport_error",
            Self::Configuration(_) => "configuration_error",
        }
    }

    /// Upstream HTTP status, if FRED answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { timeout: true, .. })
    }
}

/// FRED error bodies look like `{"error_code":400,"error_message":"..."}`.
/// Fall back to the raw text when the body is anything else.
fn upstream_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct FredErrorBody {
        error_message: String,
    }

    match serde_json::from_str::<FredErrorBody>(body) {
        Ok(parsed) => parsed.error_message,
        Err(_) if body.trim().is_empty() => "<empty body>".to_string(),
        Err(_) => body.to_string(),
    }
}
