// Tool call through the MCP server down to a stubbed FRED API

use fredmcp_fred::{FredClient, FredConfig};
use fredmcp_mcp::protocol::JsonRpcError;
use fredmcp_mcp::{McpServer, SeriesObservationsTool, ToolRegistry};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_server(fred_uri: &str) -> McpServer {
    let config = FredConfig::new(url::Url::parse(fred_uri).unwrap()).with_api_key("e2e-key");
    let client = FredClient::new(config).unwrap();

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SeriesObservationsTool::new(Arc::new(client))));
    McpServer::new(registry)
}

fn tools_call(id: u64, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": "get_fred_series_observations", "arguments": arguments}
    })
    .to_string()
}

#[tokio::test]
async fn gdp_descending_scenario() {
    let fred = MockServer::start().await;
    let body = json!({
        "observations": [{
            "date": "2023-10-01",
            "value": "27000.000",
            "realtime_start": "2024-01-01",
            "realtime_end": "2024-01-01"
        }]
    });

    Mock::given(method("GET"))
        .and(path("/series/observations"))
        .and(query_param("series_id", "GDP"))
        .and(query_param("limit", "5"))
        .and(query_param("sort_order", "desc"))
        .and(query_param("offset", "0"))
        .and(query_param("units", "lin"))
        .and(query_param("aggregation_method", "avg"))
        .and(query_param("output_type", "1"))
        .and(query_param("api_key", "e2e-key"))
        .and(query_param("file_type", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&fred)
        .await;

    let server = create_server(&fred.uri());
    let response = server
        .handle_message(&tools_call(1, json!({"series_id": "GDP", "limit": 5, "sort_order": "desc"})))
        .await
        .unwrap();

    let result = response.result.expect("tool call should succeed");
    assert!(result.get("isError").is_none());

    let text = result["content"][0]["text"].as_str().unwrap();
    let observations: Value = serde_json::from_str(text).unwrap();
    assert_eq!(observations, body["observations"]);
}

#[tokio::test]
async fn upstream_400_is_reported_with_status() {
    let fred = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_code": 400,
            "error_message": "Bad Request.  Variable api_key is not registered."
        })))
        .expect(1)
        .mount(&fred)
        .await;

    let server = create_server(&fred.uri());
    let response = server
        .handle_message(&tools_call(2, json!({"series_id": "GDP"})))
        .await
        .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("upstream_error"));
    assert!(text.contains("status 400"));
    assert!(text.contains("api_key is not registered"));
}

#[tokio::test]
async fn invalid_arguments_issue_no_upstream_call() {
    let fred = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"observations": []})))
        .expect(0)
        .mount(&fred)
        .await;

    let server = create_server(&fred.uri());

    for arguments in [
        json!({"limit": 5}),
        json!({"series_id": ""}),
        json!({"series_id": "GDP", "output_type": 7}),
        json!({"series_id": "GDP", "observation_start": "01/01/2020"}),
    ] {
        let response = server.handle_message(&tools_call(3, arguments)).await.unwrap();
        assert_eq!(response.error.unwrap().code, JsonRpcError::INVALID_PARAMS);
    }
}
