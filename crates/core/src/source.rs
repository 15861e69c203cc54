use crate::error::GatewayResult;
use crate::request::ObservationQuery;
use crate::types::Observation;

/// Anything that can answer a validated observations query.
///
/// The FRED HTTP client is the production implementation. Tool code only
/// sees this trait.
#[async_trait::async_trait]
pub trait ObservationSource: Send + Sync {
    /// Issue exactly one upstream request for `query`.
    async fn series_observations(&self, query: &ObservationQuery) -> GatewayResult<Vec<Observation>>;
}
