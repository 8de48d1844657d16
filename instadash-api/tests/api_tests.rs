//! Integration tests for instadash-api endpoints
//!
//! Tests cover:
//! - Alert read-state PATCH (toggle, idempotence, not found, validation)
//! - Alert listing with unread filter
//! - Post listing and demo cleanup
//! - Keep-alive probe
//! - Punctuation fail-open without credentials
//! - Workflow routes without configuration
//! - Diagnostics and health (no store access)

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

use instadash_api::{build_router, AppState};
use instadash_common::config::StoreConfig;
use instadash_common::maintenance::seed_demo_posts;
use instadash_common::models::{Alert, AlertKind, Client, Competitor, Post};
use instadash_common::store::{SqliteStore, Store};
use instadash_common::Config;

/// Test helper: in-memory store with one client and two unread alerts
async fn setup_store() -> SqliteStore {
    let store = SqliteStore::in_memory().await.expect("in-memory store");

    store
        .insert_client(&Client {
            id: "client-1".to_string(),
            instagram_username: "panaderia_sol".to_string(),
            full_name: Some("Panadería Sol".to_string()),
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
        })
        .await
        .unwrap();

    for (id, hour) in [("alert-1", 8), ("alert-2", 9)] {
        store
            .insert_alert(&Alert {
                id: id.to_string(),
                client_id: Some("client-1".to_string()),
                alert_type: AlertKind::EngagementSpike,
                message: format!("Engagement spike detected ({})", id),
                is_read: false,
                created_at: Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap(),
            })
            .await
            .unwrap();
    }

    store
}

/// Test helper: router over `store` with default config (no integrations)
fn setup_app(store: SqliteStore) -> axum::Router {
    let config = Config::new(StoreConfig::Sqlite { path: ":memory:".into() });
    let state = AppState::new(Arc::new(store), config).expect("app state");
    build_router(state)
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Alert read-state
// =============================================================================

#[tokio::test]
async fn test_patch_alert_toggles_read_state() {
    let app = setup_app(setup_store().await);

    let response = app
        .clone()
        .oneshot(json_request("PATCH", "/api/alerts/alert-1", json!({"is_read": true})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let read = extract_json(response.into_body()).await;
    assert_eq!(read["success"], true);
    assert_eq!(read["data"]["id"], "alert-1");
    assert_eq!(read["data"]["is_read"], true);

    let response = app
        .oneshot(json_request("PATCH", "/api/alerts/alert-1", json!({"is_read": false})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let unread = extract_json(response.into_body()).await;
    assert_eq!(unread["data"]["is_read"], false);

    // Everything except the flag is unchanged
    for field in ["id", "client_id", "alert_type", "message", "created_at"] {
        assert_eq!(read["data"][field], unread["data"][field], "field {} changed", field);
    }
}

#[tokio::test]
async fn test_patch_alert_same_state_twice() {
    let app = setup_app(setup_store().await);

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request("PATCH", "/api/alerts/alert-2", json!({"is_read": true})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        bodies.push(extract_json(response.into_body()).await);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_patch_unknown_alert_is_not_found_deterministically() {
    let app = setup_app(setup_store().await);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request("PATCH", "/api/alerts/does-not-exist", json!({"is_read": true})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = extract_json(response.into_body()).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_patch_alert_rejects_malformed_body() {
    let app = setup_app(setup_store().await);

    let bad_bodies = [
        json!({}),
        json!({"is_read": "yes"}),
        json!({"is_read": true, "message": "rewritten"}),
    ];

    for body in bad_bodies {
        let response = app
            .clone()
            .oneshot(json_request("PATCH", "/api/alerts/alert-1", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {} accepted", body);

        let json = extract_json(response.into_body()).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_patch_alert_rejects_invalid_id() {
    let app = setup_app(setup_store().await);

    let response = app
        .oneshot(json_request("PATCH", "/api/alerts/bad%20id", json!({"is_read": true})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_alerts_unread_only() {
    let store = setup_store().await;
    store.set_alert_read("alert-1", true).await.unwrap();
    let app = setup_app(store);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/alerts"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 2);
    // Newest first
    assert_eq!(body["data"][0]["id"], "alert-2");

    let response = app
        .oneshot(test_request("GET", "/api/alerts?unread_only=true&client_id=client-1"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], "alert-2");
}

#[tokio::test]
async fn test_list_alerts_rejects_bad_query() {
    let app = setup_app(setup_store().await);

    let response = app
        .oneshot(test_request("GET", "/api/alerts?limit=many"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Posts
// =============================================================================

#[tokio::test]
async fn test_list_posts_envelope() {
    let store = setup_store().await;
    let demo: Vec<String> = ["1", "2", "3"].iter().map(|s| s.to_string()).collect();
    seed_demo_posts(&store, &demo, Some("client-1")).await.unwrap();
    let app = setup_app(store);

    let response = app
        .oneshot(test_request("GET", "/api/posts?limit=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert!(body["posts"].is_array());
}

#[tokio::test]
async fn test_cleanup_demo_twice() {
    let store = setup_store().await;
    let demo: Vec<String> = ["1", "2", "3"].iter().map(|s| s.to_string()).collect();
    seed_demo_posts(&store, &demo, None).await.unwrap();
    store
        .insert_posts(&[Post {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: Some("client-1".to_string()),
            post_id: "3127745931234567890".to_string(),
            caption: Some("Real post".to_string()),
            media_type: Some("CAROUSEL_ALBUM".to_string()),
            likes_count: 42,
            comments_count: 7,
            posted_at: None,
            created_at: Utc::now(),
        }])
        .await
        .unwrap();
    let app = setup_app(store);

    let response = app
        .clone()
        .oneshot(test_request("DELETE", "/api/posts/cleanup-demo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = extract_json(response.into_body()).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["count"], 3);
    assert_eq!(first["deleted"].as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(test_request("DELETE", "/api/posts/cleanup-demo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let second = extract_json(response.into_body()).await;
    assert_eq!(second["count"], 0);

    let response = app.oneshot(test_request("GET", "/api/posts")).await.unwrap();
    let remaining = extract_json(response.into_body()).await;
    assert_eq!(remaining["count"], 1);
    assert_eq!(remaining["posts"][0]["post_id"], "3127745931234567890");
}

// =============================================================================
// Secondary tables
// =============================================================================

#[tokio::test]
async fn test_list_competitors_active_only() {
    let store = setup_store().await;
    for (id, active) in [("c1", true), ("c2", false)] {
        store
            .insert_competitor(&Competitor {
                id: id.to_string(),
                client_id: Some("client-1".to_string()),
                instagram_username: format!("rival_{}", id),
                is_active: active,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }
    let app = setup_app(store);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/competitors"))
        .await
        .unwrap();
    assert_eq!(extract_json(response.into_body()).await["count"], 2);

    let response = app
        .oneshot(test_request("GET", "/api/competitors?active_only=true"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], "c1");
}

#[tokio::test]
async fn test_list_clients() {
    let app = setup_app(setup_store().await);

    let response = app.oneshot(test_request("GET", "/api/clients")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"][0]["instagram_username"], "panaderia_sol");
}

// =============================================================================
// Keep-alive, diagnostics, health
// =============================================================================

#[tokio::test]
async fn test_keep_alive_reports_data() {
    let app = setup_app(setup_store().await);

    let response = app.oneshot(test_request("GET", "/api/keep-alive")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["hasData"], true);
    assert!(body["timestamp"].is_string());
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_keep_alive_store_failure_is_500() {
    let store = setup_store().await;
    store.pool().close().await;
    let app = setup_app(store);

    let response = app.oneshot(test_request("GET", "/api/keep-alive")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(setup_store().await);

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "instadash-api");
    assert_eq!(body["store"], "sqlite");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_connection_diagnostic() {
    let app = setup_app(setup_store().await);

    let response = app
        .oneshot(test_request("GET", "/api/test-connection"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["punctuation_configured"], false);
    assert_eq!(body["workflow_configured"], false);
}

// =============================================================================
// Integrations without credentials
// =============================================================================

#[tokio::test]
async fn test_punctuate_without_credential_returns_input() {
    let app = setup_app(setup_store().await);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/punctuate", json!({"text": "hola como estas"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["text"], "hola como estas");
    assert_eq!(body["data"]["degraded"], true);

    let response = app
        .oneshot(json_request("POST", "/api/test-punctuation", json!({"text": "que tal"})))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["original"], "que tal");
    assert_eq!(body["punctuated"], "que tal");
}

#[tokio::test]
async fn test_punctuate_rejects_missing_text() {
    let app = setup_app(setup_store().await);

    let response = app
        .oneshot(json_request("POST", "/api/punctuate", json!({"txt": "hola"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_workflow_routes_unconfigured() {
    let app = setup_app(setup_store().await);

    let response = app
        .oneshot(test_request("POST", "/api/workflows/wf-1/activate"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_CONFIGURED");
}
