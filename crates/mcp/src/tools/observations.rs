// The get_fred_series_observations tool

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_enum, json_schema_integer, json_schema_object, json_schema_string, Tool};
use anyhow::Result;
use fredmcp_core::{
    AggregationMethod, Frequency, GatewayError, ObservationRequest, ObservationSource, SortOrder,
    Units,
};
use std::sync::Arc;

pub const TOOL_NAME: &str = "get_fred_series_observations";

/// Fetches the observations of one FRED series.
pub struct SeriesObservationsTool {
    source: Arc<dyn ObservationSource>,
}

impl SeriesObservationsTool {
    pub fn new(source: Arc<dyn ObservationSource>) -> Self {
        Self { source }
    }
}

fn parse_arguments(arguments: serde_json::Value) -> Result<ObservationRequest, GatewayError> {
    if arguments.is_null() {
        return Ok(ObservationRequest::default());
    }
    serde_json::from_value(arguments)
        .map_err(|e| GatewayError::invalid_argument(format!("Invalid arguments for {TOOL_NAME}: {e}")))
}

#[async_trait::async_trait]
impl Tool for SeriesObservationsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: "Get series observations from the FRED API.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "series_id": json_schema_string("The id for a series, e.g. GDP."),
                    "realtime_start": json_schema_string(
                        "The start of the real-time period. Format: YYYY-MM-DD. Defaults to today's date."
                    ),
                    "realtime_end": json_schema_string(
                        "The end of the real-time period. Format: YYYY-MM-DD. Defaults to today's date."
                    ),
                    "limit": json_schema_integer(Some(10), "Maximum number of observations to return."),
                    "offset": json_schema_integer(Some(0), "Number of observations to offset from first."),
                    "sort_order": json_schema_enum(
                        SortOrder::CODES,
                        Some("asc"),
                        "Sort order of observations."
                    ),
                    "observation_start": json_schema_string("Start date of observations. Format: YYYY-MM-DD."),
                    "observation_end": json_schema_string("End date of observations. Format: YYYY-MM-DD."),
                    "units": json_schema_enum(Units::CODES, Some("lin"), "Data value transformation."),
                    "frequency": json_schema_enum(
                        Frequency::CODES,
                        None,
                        "Frequency of observations. Omit for no frequency aggregation."
                    ),
                    "aggregation_method": json_schema_enum(
                        AggregationMethod::CODES,
                        Some("avg"),
                        "Aggregation method for frequency. No effect unless frequency is set."
                    ),
                    "output_type": {
                        "type": ["integer", "string"],
                        "enum": [1, 2, 3, 4, "1", "2", "3", "4"],
                        "default": 1,
                        "description": "Output type: 1 real-time period, 2 vintage date (all), 3 vintage date (new and revised), 4 initial release only."
                    },
                    "vintage_dates": json_schema_string("Comma-separated list of YYYY-MM-DD vintage dates.")
                }),
                vec!["series_id"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let query = parse_arguments(arguments)?.resolve()?;

        match self.source.series_observations(&query).await {
            Ok(observations) => {
                tracing::debug!(
                    series_id = %query.series_id,
                    count = observations.len(),
                    "Observations fetched"
                );
                let json = serde_json::to_string_pretty(&observations)?;
                Ok(CallToolResult::text(json))
            }
            Err(err @ GatewayError::InvalidArgument(_)) => Err(err.into()),
            Err(err) => {
                tracing::warn!(series_id = %query.series_id, kind = err.kind(), "{}", err);
                Ok(CallToolResult::error(format!("{}: {}", err.kind(), err)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fredmcp_core::{GatewayResult, Observation, ObservationQuery};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every query it receives and answers with a canned result.
    struct RecordingSource {
        calls: AtomicUsize,
        last_query: Mutex<Option<ObservationQuery>>,
        fail_with_status: Option<u16>,
    }

    impl RecordingSource {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
                fail_with_status: None,
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
                fail_with_status: Some(status),
            })
        }
    }

    #[async_trait::async_trait]
    impl ObservationSource for RecordingSource {
        async fn series_observations(
            &self,
            query: &ObservationQuery,
        ) -> GatewayResult<Vec<Observation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.clone());

            if let Some(status) = self.fail_with_status {
                return Err(GatewayError::upstream(status, "nope"));
            }

            Ok(vec![serde_json::from_value(json!({
                "date": "2023-10-01",
                "value": "27000.000",
                "realtime_start": "2024-01-01",
                "realtime_end": "2024-01-01"
            }))
            .unwrap()])
        }
    }

    fn invalid_argument(err: anyhow::Error) -> String {
        match err.downcast::<GatewayError>() {
            Ok(GatewayError::InvalidArgument(msg)) => msg,
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_lists_every_parameter() {
        let tool = SeriesObservationsTool::new(RecordingSource::ok());
        let schema = tool.schema();

        assert_eq!(schema.name, TOOL_NAME);
        assert_eq!(schema.input_schema["required"], json!(["series_id"]));
        assert_eq!(
            schema.input_schema["properties"].as_object().unwrap().len(),
            13
        );
        assert_eq!(schema.input_schema["properties"]["units"]["enum"].as_array().unwrap().len(), 9);
    }

    #[test]
    fn test_output_type_schema_accepts_numeric_strings() {
        let tool = SeriesObservationsTool::new(RecordingSource::ok());
        let schema = tool.schema();
        let output_type = &schema.input_schema["properties"]["output_type"];

        assert_eq!(output_type["type"], json!(["integer", "string"]));
        let allowed = output_type["enum"].as_array().unwrap();
        assert!(allowed.contains(&json!(3)));
        assert!(allowed.contains(&json!("3")));
        assert_eq!(allowed.len(), 8);
    }

    #[tokio::test]
    async fn test_output_type_as_string_is_accepted() {
        let source = RecordingSource::ok();
        let tool = SeriesObservationsTool::new(source.clone());

        let result = tool
            .execute(json!({"series_id": "GNPCA", "output_type": "3"}))
            .await
            .unwrap();

        assert!(result.is_error.is_none());
        let query = source.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(query.output_type, fredmcp_core::OutputType::VintageNewAndRevised);
    }

    #[tokio::test]
    async fn test_returns_observations_as_json_text() {
        let source = RecordingSource::ok();
        let tool = SeriesObservationsTool::new(source.clone());

        let result = tool
            .execute(json!({"series_id": "GDP", "limit": 5, "sort_order": "desc"}))
            .await
            .unwrap();

        assert!(result.is_error.is_none());
        let parsed: serde_json::Value = serde_json::from_str(result.content[0].as_text()).unwrap();
        assert_eq!(parsed[0]["value"], "27000.000");

        let query = source.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(query.limit, 5);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_source() {
        let source = RecordingSource::ok();
        let tool = SeriesObservationsTool::new(source.clone());

        let cases = vec![
            json!({}),
            json!(null),
            json!({"series_id": ""}),
            json!({"series_id": "GDP", "sort_order": "random"}),
            json!({"series_id": "GDP", "units": "xyz"}),
            json!({"series_id": "GDP", "frequency": "yearly"}),
            json!({"series_id": "GDP", "aggregation_method": "max"}),
            json!({"series_id": "GDP", "output_type": 9}),
            json!({"series_id": "GDP", "limit": 2.5}),
            json!({"series_id": 42}),
        ];

        for args in cases {
            let err = tool.execute(args.clone()).await.unwrap_err();
            let msg = invalid_argument(err);
            assert!(!msg.is_empty(), "no message for {args}");
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_becomes_error_result() {
        let source = RecordingSource::failing(400);
        let tool = SeriesObservationsTool::new(source.clone());

        let result = tool.execute(json!({"series_id": "GDP"})).await.unwrap();

        assert_eq!(result.is_error, Some(true));
        let text = result.content[0].as_text();
        assert!(text.contains("upstream_error"));
        assert!(text.contains("status 400"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
