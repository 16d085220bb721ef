//! Tool client tests against a mock MCP server

use serde_json::{ Map, json };
use tides_console::client::ToolInvocation;
use tides_console::{ ConsoleConfig, ToolClient, ToolResult };
use wiremock::matchers::{ body_json, header, method };
use wiremock::{ Mock, MockServer, Request, ResponseTemplate };

const TOKEN: &str = "tides_test_key_0123456789";

fn client(server: &MockServer) -> ToolClient {
    let config = ConsoleConfig::builder()
        .with_mcp_url(format!("{}/mcp", server.uri()))
        .build()
        .unwrap();
    ToolClient::new(&config).unwrap()
}

fn event_stream(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/event-stream")
}

#[tokio::test]
async fn test_request_envelope_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(|request: &Request| {
            request.headers
                .get("accept")
                .is_some_and(|value| value == "application/json, text/event-stream")
        })
        .and(
            body_json(
                json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": { "name": "tide_list", "arguments": { "active_only": true } }
            })
            )
        )
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({ "jsonrpc": "2.0", "id": 1, "result": { "tides": [] } })
            )
        )
        .expect(1)
        .mount(&server).await;

    let mut arguments = Map::new();
    arguments.insert("active_only".into(), json!(true));
    let result = client(&server).call("tide_list", arguments, TOKEN).await;
    assert_eq!(result, ToolResult::Success { payload: json!({ "tides": [] }) });
}

#[tokio::test]
async fn test_event_stream_last_event_wins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(event_stream("data: {\"a\":1}\ndata: {\"result\":{\"ok\":true}}\n"))
        .mount(&server).await;

    let result = client(&server).call("tide_flow", Map::new(), TOKEN).await;
    assert_eq!(result, ToolResult::Success { payload: json!({ "ok": true }) });
}

#[tokio::test]
async fn test_event_stream_error_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(event_stream("data: {\"error\":{\"code\":-32601,\"message\":\"nope\"}}\n"))
        .mount(&server).await;

    match client(&server).call("tide_flow", Map::new(), TOKEN).await {
        ToolResult::Failure { message } => assert!(message.contains("nope")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_event_stream_without_valid_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(event_stream("data: not json\n"))
        .mount(&server).await;

    match client(&server).call("tide_flow", Map::new(), TOKEN).await {
        ToolResult::Failure { message } => {
            assert!(message.starts_with("No valid events in stream"));
            assert!(message.contains("data: not json"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_token_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let result = client(&server).execute(
        &(ToolInvocation {
            tool_name: "tide_list".into(),
            arguments: Map::new(),
            auth_token: String::new(),
        })
    ).await;
    assert_eq!(result, ToolResult::Failure { message: "API key required".into() });
}

#[tokio::test]
async fn test_http_error_and_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": "tide_get_report", "arguments": {} }
        })))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>", "text/html"))
        .mount(&server).await;
    let client = client(&server);

    let unauthorized = client.call("tide_get_report", Map::new(), TOKEN).await;
    assert_eq!(unauthorized, ToolResult::Failure { message: "HTTP 401: Unauthorized".into() });

    match client.call("tide_list", Map::new(), TOKEN).await {
        ToolResult::Failure { message } => assert_eq!(message, "Invalid JSON response: <html>"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_request_failure() {
    let config = ConsoleConfig::builder().with_mcp_url("http://127.0.0.1:9/mcp").build().unwrap();
    let client = ToolClient::new(&config).unwrap();

    match client.call("tide_list", Map::new(), TOKEN).await {
        ToolResult::Failure { message } => assert!(message.starts_with("Request failed: "), "{}", message),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_repeated_calls_give_identical_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(event_stream("data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":1}\n"))
        .expect(2)
        .mount(&server).await;
    let client = client(&server);

    let first = client.call("tide_flow", Map::new(), TOKEN).await;
    let second = client.call("tide_flow", Map::new(), TOKEN).await;
    assert_eq!(first, ToolResult::Success { payload: json!(1) });
    assert_eq!(first, second);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].body, requests[1].body);
}
