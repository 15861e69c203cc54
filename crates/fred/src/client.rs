//! HTTP client for the FRED `series/observations` endpoint.

use crate::config::FredConfig;
use fredmcp_core::{GatewayError, GatewayResult, Observation, ObservationQuery, ObservationSource};
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::{debug, warn};

const OBSERVATIONS_PATH: &str = "series/observations";

/// Client for a single FRED account.
///
/// Every call is one GET with no retry. The API key is checked once, at
/// construction.
#[derive(Clone)]
pub struct FredClient {
    client: Client,
    config: FredConfig,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

impl FredClient {
    /// Create a client. Fails if no API key is configured.
    pub fn new(config: FredConfig) -> GatewayResult<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| GatewayError::configuration("FRED_API_KEY is not set"))?
            .to_string();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| {
                GatewayError::configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Build a URL for the given endpoint path.
    fn build_url(&self, path: &str) -> GatewayResult<url::Url> {
        self.config
            .base_url
            .join(path)
            .map_err(|e| GatewayError::configuration(format!("Invalid FRED URL: {e}")))
    }

    /// Fetch the observations for a validated query.
    pub async fn series_observations(
        &self,
        query: &ObservationQuery,
    ) -> GatewayResult<Vec<Observation>> {
        let url = self.build_url(OBSERVATIONS_PATH)?;
        debug!(series_id = %query.series_id, "GET series/observations");

        let response = self
            .client
            .get(url)
            .query(&query.query_pairs())
            .query(&[("api_key", self.api_key.as_str()), ("file_type", "json")])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        if !response_ok(status) {
            warn!(series_id = %query.series_id, status, "FRED request failed");
            return Err(GatewayError::upstream(status, body));
        }

        match serde_json::from_str::<ObservationsResponse>(&body) {
            Ok(parsed) => {
                debug!(
                    series_id = %query.series_id,
                    count = parsed.observations.len(),
                    "FRED request succeeded"
                );
                Ok(parsed.observations)
            }
            Err(e) => {
                warn!(series_id = %query.series_id, status, error = %e, "Unexpected FRED response body");
                Err(GatewayError::upstream(status, body))
            }
        }
    }
}

impl std::fmt::Debug for FredClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FredClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn response_ok(status: u16) -> bool {
    (200..300).contains(&status)
}

/// reqwest errors embed the request URL, which carries the API key.
fn transport_error(err: reqwest::Error) -> GatewayError {
    let timed_out = err.is_timeout();
    let message = err.without_url().to_string();
    if timed_out {
        GatewayError::timeout(message)
    } else {
        GatewayError::transport(message)
    }
}

#[async_trait::async_trait]
impl ObservationSource for FredClient {
    async fn series_observations(
        &self,
        query: &ObservationQuery,
    ) -> GatewayResult<Vec<Observation>> {
        FredClient::series_observations(self, query).await
    }
}
