//! Integration tests for the MCP server.
//!
//! Registry and protocol tests run everywhere. Tests that need a live
//! database are skipped unless the `REDSHIFT_*` environment variables are
//! set (point them at a scratch cluster or a local Postgres, which speaks
//! the same wire protocol).

use std::sync::Arc;

use serde_json::{json, Map, Value as JsonValue};

use redshift_mcp::{
    JsonRpcRequest, McpError, McpServer, RedshiftConfig, RedshiftSession, ToolRegistry,
};

/// Connect using the process environment, or skip the test.
async fn live_session() -> Option<RedshiftSession> {
    let config = RedshiftConfig::from_env().ok()?;
    match RedshiftSession::connect(&config).await {
        Ok(session) => Some(session),
        Err(e) => panic!("REDSHIFT_* set but connect failed: {}", e),
    }
}

/// A full server over a live session, or skip the test.
async fn live_server() -> Option<McpServer> {
    Some(McpServer::new(Arc::new(live_session().await?)))
}

/// Build a JSON-RPC 2.0 request; `id: None` makes it a notification.
fn rpc(method: &str, id: Option<i64>, params: Option<JsonValue>) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: id.map(|n| json!(n)),
        method: method.to_string(),
        params,
    }
}

fn args(value: JsonValue) -> Map<String, JsonValue> {
    match value {
        JsonValue::Object(m) => m,
        _ => Map::new(),
    }
}

/// Helper to dispatch a tool call.
async fn call_tool(
    session: &RedshiftSession,
    registry: &ToolRegistry,
    name: &str,
    arguments: JsonValue,
) -> JsonValue {
    registry
        .dispatch(session, name, args(arguments))
        .await
        .unwrap_or_else(|e| panic!("Tool {} failed: {}", name, e))
}

/// Helper to dispatch a tool call and expect an error.
async fn call_tool_err(
    session: &RedshiftSession,
    registry: &ToolRegistry,
    name: &str,
    arguments: JsonValue,
) -> McpError {
    registry
        .dispatch(session, name, args(arguments))
        .await
        .expect_err(&format!("Expected tool {} to fail", name))
}

// =============================================================================
// Tool Registry
// =============================================================================

#[test]
fn test_tool_count() {
    let registry = ToolRegistry::new();
    let tools = registry.tools();

    assert_eq!(
        tools.len(),
        5,
        "Expected 5 tools, got {}. Tools: {:?}",
        tools.len(),
        tools.iter().map(|t| &t.name).collect::<Vec<_>>()
    );
}

#[test]
fn test_all_tools_have_required_fields() {
    let registry = ToolRegistry::new();

    for tool in registry.tools() {
        assert!(!tool.name.is_empty(), "Tool name should not be empty");
        assert!(!tool.description.is_empty(), "Tool description should not be empty");
        assert!(tool.input_schema.is_object(), "Tool input_schema should be an object");
        assert!(
            tool.input_schema.get("required").is_some(),
            "Tool schema should declare required fields"
        );
    }
}

#[test]
fn test_no_duplicate_tool_names() {
    let registry = ToolRegistry::new();
    let tools = registry.tools();
    let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    let original_count = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), original_count, "Found duplicate tool names");
}

#[test]
fn test_expected_tool_surface() {
    let registry = ToolRegistry::new();
    let names: Vec<&str> = registry.tools().iter().map(|t| t.name.as_str()).collect();
    for expected in [
        "run_query",
        "explain_query",
        "list_schemas",
        "list_tables_in_schema",
        "test_redshift_connection",
    ] {
        assert!(names.contains(&expected), "missing tool {}", expected);
    }
}

// =============================================================================
// Live Database
// =============================================================================

#[tokio::test]
async fn test_run_query_select_one() {
    let Some(session) = live_session().await else { return };
    let registry = ToolRegistry::new();

    let result = call_tool(&session, &registry, "run_query", json!({"query": "SELECT 1"})).await;
    let rows = result.as_array().expect("Expected array of rows");
    assert_eq!(rows.len(), 1);

    // Column alias differs across engines; the single value must be 1.
    let row = rows[0].as_object().expect("Expected row mapping");
    assert_eq!(row.len(), 1);
    assert_eq!(row.values().next().unwrap(), &json!(1));
}

#[tokio::test]
async fn test_run_query_empty_is_rejected_before_execution() {
    let Some(session) = live_session().await else { return };
    let registry = ToolRegistry::new();

    let err = call_tool_err(&session, &registry, "run_query", json!({"query": ""})).await;
    assert!(matches!(err, McpError::InvalidArg { ref name, .. } if name == "query"));

    let err = call_tool_err(&session, &registry, "run_query", json!({})).await;
    assert!(matches!(err, McpError::MissingArg(ref name) if name == "query"));
}

#[tokio::test]
async fn test_connection_survives_query_error() {
    let Some(session) = live_session().await else { return };
    let registry = ToolRegistry::new();

    let err = call_tool_err(
        &session,
        &registry,
        "run_query",
        json!({"query": "SELEC broken syntax"}),
    )
    .await;
    assert!(matches!(err, McpError::Query { .. }), "got: {}", err);

    // The shared connection must remain usable after a rejected statement.
    call_tool(&session, &registry, "run_query", json!({"query": "SELECT 1"})).await;
    call_tool(&session, &registry, "run_query", json!({"query": "SELECT 2"})).await;
}

#[tokio::test]
async fn test_explain_query_returns_plan_lines() {
    let Some(session) = live_session().await else { return };
    let registry = ToolRegistry::new();

    let result =
        call_tool(&session, &registry, "explain_query", json!({"query": "SELECT 1"})).await;
    let rows = result.as_array().expect("Expected array of plan lines");
    assert!(!rows.is_empty());
    for row in rows {
        let row = row.as_object().expect("Expected plan-line mapping");
        let plan_text = row.values().next().expect("Expected a plan-text field");
        assert!(plan_text.is_string());
    }
}

#[tokio::test]
async fn test_list_schemas_includes_public() {
    let Some(session) = live_session().await else { return };
    let registry = ToolRegistry::new();

    let result = call_tool(&session, &registry, "list_schemas", json!({})).await;
    let rows = result.as_array().expect("Expected array of schemas");
    assert!(!rows.is_empty());
    assert!(rows
        .iter()
        .any(|r| r.get("schema_name").and_then(|v| v.as_str()) == Some("public")));
    for row in rows {
        assert!(row.get("schema_name").is_some());
        assert!(row.get("schema_owner").is_some());
    }
}

#[tokio::test]
async fn test_list_tables_in_missing_schema_is_empty_not_error() {
    let Some(session) = live_session().await else { return };
    let registry = ToolRegistry::new();

    let result = call_tool(
        &session,
        &registry,
        "list_tables_in_schema",
        json!({"schema_name": "schema_with_no_tables_xyz"}),
    )
    .await;
    assert_eq!(result, json!([]));
}

#[tokio::test]
async fn test_list_tables_rejects_empty_schema_name() {
    let Some(session) = live_session().await else { return };
    let registry = ToolRegistry::new();

    let err = call_tool_err(
        &session,
        &registry,
        "list_tables_in_schema",
        json!({"schema_name": "   "}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { ref name, .. } if name == "schema_name"));
}

#[tokio::test]
async fn test_connection_check_tool() {
    let Some(session) = live_session().await else { return };
    let registry = ToolRegistry::new();

    let result = call_tool(&session, &registry, "test_redshift_connection", json!({})).await;
    assert_eq!(result.get("connected"), Some(&json!(true)));
    assert_eq!(result.get("status").and_then(|v| v.as_str()), Some("success"));
    assert!(result.get("version").is_some());
    assert!(result.get("timestamp").is_some());
}

#[tokio::test]
async fn test_unknown_tool() {
    let Some(session) = live_session().await else { return };
    let registry = ToolRegistry::new();

    let err = call_tool_err(&session, &registry, "drop_cluster", json!({})).await;
    assert!(matches!(err, McpError::UnknownTool(_)));
}

#[tokio::test]
async fn test_connect_to_rejected_target_fails() {
    // Only meaningful when a reachable host is configured. A nonexistent
    // database is rejected by every server regardless of auth setup, so
    // this asserts unconditionally, unlike a wrong password would.
    let Ok(mut config) = RedshiftConfig::from_env() else { return };
    config.database = "database_that_does_not_exist_xyz".to_string();

    let err = RedshiftSession::connect(&config)
        .await
        .expect_err("connect to a nonexistent database must fail");
    assert!(matches!(err, McpError::Connection(_)), "got: {}", err);
}

// =============================================================================
// JSON-RPC Protocol
// =============================================================================

#[tokio::test]
async fn test_wrong_jsonrpc_version_is_invalid_request() {
    let Some(server) = live_server().await else { return };

    let mut request = rpc("tools/list", Some(1), None);
    request.jsonrpc = "1.0".to_string();

    let response = server.handle_request(request).await.expect("expected a response");
    let err = response.error.expect("expected an error response");
    assert_eq!(err.code, -32600);
}

#[tokio::test]
async fn test_unknown_method_is_method_not_found() {
    let Some(server) = live_server().await else { return };

    let response = server
        .handle_request(rpc("resources/list", Some(2), None))
        .await
        .expect("expected a response");
    let err = response.error.expect("expected an error response");
    assert_eq!(err.code, -32601);
    assert!(err.message.contains("resources/list"));
}

#[tokio::test]
async fn test_tools_list_over_protocol() {
    let Some(server) = live_server().await else { return };

    let response = server
        .handle_request(rpc("tools/list", Some(3), None))
        .await
        .expect("expected a response");
    let result = response.result.expect("expected a result");
    let tools = result
        .get("tools")
        .and_then(|t| t.as_array())
        .expect("expected a tools array");
    assert_eq!(tools.len(), 5);
    for tool in tools {
        assert!(tool.get("name").is_some());
        assert!(tool.get("inputSchema").is_some());
    }
}

#[tokio::test]
async fn test_tools_call_wraps_result_in_content() {
    let Some(server) = live_server().await else { return };

    let params = json!({"name": "run_query", "arguments": {"query": "SELECT 1"}});
    let response = server
        .handle_request(rpc("tools/call", Some(4), Some(params)))
        .await
        .expect("expected a response");
    let result = response.result.expect("expected a result");

    let content = result
        .get("content")
        .and_then(|c| c.as_array())
        .expect("expected a content array");
    assert_eq!(content.len(), 1);
    assert_eq!(content[0].get("type"), Some(&json!("text")));

    // The text payload is the tool's JSON result, serialized.
    let text = content[0].get("text").and_then(|t| t.as_str()).expect("expected text");
    let rows: JsonValue = serde_json::from_str(text).expect("text should be JSON");
    assert_eq!(rows.as_array().map(|r| r.len()), Some(1));
}

#[tokio::test]
async fn test_tools_call_validation_error_is_invalid_params() {
    let Some(server) = live_server().await else { return };

    let params = json!({"name": "run_query", "arguments": {"query": "  "}});
    let response = server
        .handle_request(rpc("tools/call", Some(5), Some(params)))
        .await
        .expect("expected a response");
    let err = response.error.expect("expected an error response");
    assert_eq!(err.code, -32602);
}

#[tokio::test]
async fn test_initialized_notification_gets_no_response() {
    let Some(server) = live_server().await else { return };

    // Handshake: initialize is a request and must be answered.
    let response = server
        .handle_request(rpc("initialize", Some(6), None))
        .await
        .expect("expected a response");
    let result = response.result.expect("expected a result");
    assert_eq!(result.get("protocolVersion"), Some(&json!("2024-11-05")));

    // The follow-up acknowledgment carries no id and must stay silent.
    assert!(server.handle_request(rpc("initialized", None, None)).await.is_none());
    assert!(server
        .handle_request(rpc("notifications/initialized", None, None))
        .await
        .is_none());

    // The server still answers id-carrying requests afterwards.
    let response = server
        .handle_request(rpc("ping", Some(7), None))
        .await
        .expect("expected a response");
    assert!(response.result.is_some());
}
