mod common;

use common::{call_logs, post_authorized, row_count, spawn_server, wait_for_entries, STEP_INTERVAL_MS};
use serde_json::{json, Value};
use std::time::Duration;

const STATUSES: [&str; 4] = ["Connecting...", "Ringing...", "In Progress...", "Call ended."];

/// Long enough for any wrongly started simulation to have written its first rows.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(STEP_INTERVAL_MS * 6)).await;
}

#[tokio::test]
async fn place_call_acknowledges_then_logs_four_statuses() {
    let server = spawn_server().await;

    let response = post_authorized(
        &server,
        "/place_call",
        json!({ "audio_url": "/static/voice1.mp3", "call_id": "abc123" }),
    )
    .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "message": "Call initiated.",
            "call_id": "abc123",
            "audio_url": "/static/voice1.mp3"
        })
    );

    let entries = wait_for_entries(&server, "abc123", 4).await;
    let statuses: Vec<&str> = entries
        .iter()
        .map(|entry| entry["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, STATUSES);

    let timestamps: Vec<&str> = entries
        .iter()
        .map(|entry| entry["timestamp"].as_str().unwrap())
        .collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(entries.iter().all(|entry| entry["id"].is_i64()));

    // Nothing follows the terminal status.
    settle().await;
    assert_eq!(row_count(&server), 4);
}

#[tokio::test]
async fn place_call_missing_fields_is_rejected_without_logging() {
    let server = spawn_server().await;

    for body in [
        json!({ "call_id": "abc123" }),
        json!({ "audio_url": "/static/voice1.mp3" }),
        json!({ "audio_url": "/static/voice1.mp3", "call_id": "" }),
        json!({}),
    ] {
        let response = post_authorized(&server, "/place_call", body.clone()).await;
        assert_eq!(response.status(), 400, "body {body}");
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["error"], "Missing audio_url or call_id");
    }

    settle().await;
    assert_eq!(row_count(&server), 0);
}

#[tokio::test]
async fn place_call_malformed_json_is_a_bad_request() {
    let server = spawn_server().await;

    let response = reqwest::Client::new()
        .post(server.endpoint("/place_call"))
        .header("X-API-Key", common::API_KEY)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "Missing audio_url or call_id");
}

#[tokio::test]
async fn place_call_rejects_missing_or_wrong_api_key() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();
    let body = json!({ "audio_url": "/static/voice1.mp3", "call_id": "abc123" });

    let missing = client
        .post(server.endpoint("/place_call"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 401);
    let error: Value = missing.json().await.unwrap();
    assert_eq!(error["error"], "Unauthorized");

    let wrong = client
        .post(server.endpoint("/place_call"))
        .header("X-API-Key", "wrong")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 401);

    settle().await;
    assert_eq!(row_count(&server), 0);
}

#[tokio::test]
async fn call_logs_list_later_calls_first() {
    let server = spawn_server().await;

    post_authorized(
        &server,
        "/place_call",
        json!({ "audio_url": "/static/a.mp3", "call_id": "first" }),
    )
    .await;
    wait_for_entries(&server, "first", 4).await;

    post_authorized(
        &server,
        "/place_call",
        json!({ "audio_url": "/static/b.mp3", "call_id": "second" }),
    )
    .await;
    wait_for_entries(&server, "second", 4).await;

    let logs = call_logs(&server).await;
    assert_eq!(logs.len(), 8);

    let order: Vec<(&str, &str)> = logs
        .iter()
        .map(|e| (e["call_id"].as_str().unwrap(), e["status"].as_str().unwrap()))
        .collect();
    assert_eq!(order[0], ("second", "Call ended."));
    assert_eq!(order[3], ("second", "Connecting..."));
    assert_eq!(order[4], ("first", "Call ended."));
    assert_eq!(order[7], ("first", "Connecting..."));
}

#[tokio::test]
async fn concurrent_calls_keep_their_own_order() {
    let server = spawn_server().await;

    let ids: Vec<String> = (0..4).map(|i| format!("call-{i}")).collect();
    for id in &ids {
        let response = post_authorized(
            &server,
            "/place_call",
            json!({ "audio_url": "/static/x.mp3", "call_id": id }),
        )
        .await;
        assert_eq!(response.status(), 200);
    }

    for id in &ids {
        let entries = wait_for_entries(&server, id, 4).await;
        let statuses: Vec<&str> = entries
            .iter()
            .map(|entry| entry["status"].as_str().unwrap())
            .collect();
        assert_eq!(statuses, STATUSES, "call {id}");
    }
    assert_eq!(row_count(&server), 16);
}

#[tokio::test]
async fn call_logs_is_empty_on_a_fresh_database() {
    let server = spawn_server().await;
    assert!(call_logs(&server).await.is_empty());
}
