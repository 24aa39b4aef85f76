//! MCP Integration Tests
//!
//! Tests that verify the MCP server can start up and handle basic tool calls.
//! These tests use the child process transport to spawn the server and communicate with it.

use rmcp::{
    model::CallToolRequestParam,
    service::{RoleClient, RunningService},
    transport::{ConfigureCommandExt, TokioChildProcess},
    ServiceExt,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::timeout;

fn shipped_model_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("models")
}

/// Spawn the server binary and connect a client to it
async fn connect() -> RunningService<RoleClient, ()> {
    let server_path = PathBuf::from(env!("CARGO_BIN_EXE_sleep-pattern"));
    let model_dir = shipped_model_dir();

    let transport = TokioChildProcess::new(tokio::process::Command::new(&server_path).configure(
        |cmd| {
            cmd.arg("--model-dir").arg(&model_dir).arg("serve");
        },
    ))
    .expect("Failed to create child process transport");

    timeout(Duration::from_secs(10), ().serve(transport))
        .await
        .expect("Server startup timed out")
        .expect("Failed to connect to server")
}

/// Test that the MCP server starts up and can list tools
#[tokio::test]
async fn test_mcp_server_startup_and_list_tools() {
    let client = connect().await;

    let tools = timeout(Duration::from_secs(5), client.list_all_tools())
        .await
        .expect("List tools timed out")
        .expect("Failed to list tools");

    assert_eq!(tools.len(), 2, "Expected 2 tools, got {}", tools.len());

    let tool_names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
    assert!(
        tool_names.contains(&"sleep_predict_pattern"),
        "Missing sleep_predict_pattern tool"
    );
    assert!(
        tool_names.contains(&"sleep_list_patterns"),
        "Missing sleep_list_patterns tool"
    );

    client.cancel().await.expect("Failed to cancel client");
}

/// Predict a pattern for the default form inputs
#[tokio::test]
async fn test_mcp_predict_pattern() {
    let client = connect().await;

    let params = json!({
        "social_media_minutes": 120,
        "gaming_hours": 10,
        "personality_score": 3
    });

    let result = timeout(
        Duration::from_secs(5),
        client.call_tool(CallToolRequestParam {
            name: "sleep_predict_pattern".into(),
            arguments: params.as_object().cloned(),
        }),
    )
    .await
    .expect("Predict pattern timed out")
    .expect("Failed to predict pattern");

    assert_eq!(
        result.is_error,
        Some(false),
        "Predict pattern returned error: {:?}",
        result.content
    );

    let text = result
        .content
        .first()
        .and_then(|content| content.raw.as_text())
        .map(|text| text.text.clone())
        .expect("Missing text content in response");
    let report: Value = serde_json::from_str(&text).expect("Failed to parse report JSON");

    assert_eq!(report["label"], "Balanced Digital User");
    assert_eq!(report["cluster_id"], 0);
    assert!(report["confidence"].as_f64().unwrap().is_finite());
    assert_eq!(report["insights"].as_array().unwrap().len(), 3);

    client.cancel().await.expect("Failed to cancel client");
}

/// Out-of-range inputs are rejected as invalid parameters
#[tokio::test]
async fn test_mcp_error_handling() {
    let client = connect().await;

    let invalid_params = json!({
        "social_media_minutes": 120,
        "gaming_hours": 10,
        "personality_score": 7
    });

    let result = timeout(
        Duration::from_secs(5),
        client.call_tool(CallToolRequestParam {
            name: "sleep_predict_pattern".into(),
            arguments: invalid_params.as_object().cloned(),
        }),
    )
    .await
    .expect("Tool call timed out");

    assert!(
        result.is_err(),
        "Expected error response for invalid personality score, got: {:?}",
        result
    );

    client.cancel().await.expect("Failed to cancel client");
}
