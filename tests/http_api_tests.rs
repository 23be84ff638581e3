//! HTTP API integration tests
//!
//! Drives the full router (middleware included) with `oneshot`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use consent_tracker::api::{create_router, AppState};
use consent_tracker::config::{RateLimitConfig, ServerConfig};
use consent_tracker::types::EventTime;

fn unlimited_config() -> ServerConfig {
    ServerConfig {
        rate_limit: RateLimitConfig {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn setup() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::from_config(unlimited_config()));
    (create_router(state.clone()), state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn consent_body(analytics: bool, marketing: bool) -> Value {
    json!({
        "consent": {
            "essential": true,
            "analytics": analytics,
            "marketing": marketing,
            "performance": false,
            "targeting": false,
            "functional": false
        },
        "sessionId": "session-1"
    })
}

#[tokio::test]
async fn test_record_and_list_consent() {
    let (app, _) = setup();

    let response = app
        .clone()
        .oneshot(post_json("/api/consent", consent_body(true, true)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Consent saved successfully");
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(body["data"]["timestamp"].is_string());

    let response = app.oneshot(get("/api/consent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["limit"], 50);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["data"][0]["id"], id);
    assert_eq!(body["data"][0]["consent"]["analytics"], true);
}

#[tokio::test]
async fn test_missing_consent_is_rejected() {
    let (app, state) = setup();

    let response = app
        .oneshot(post_json("/api/consent", json!({ "sessionId": "abc" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Consent data is required");
    assert_eq!(body["field"], "consent");
    assert!(state.catalog.consent().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let (app, state) = setup();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/analytics")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(state.catalog.analytics().is_empty());
}

#[tokio::test]
async fn test_analytics_defaults_from_headers() {
    let (app, state) = setup();

    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/api/analytics")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::REFERER, "http://localhost:5500/index.html")
        .header(header::USER_AGENT, "test-agent/1.0")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(json!({ "type": "page_view" }).to_string()))
        .unwrap();
    let peer: SocketAddr = "192.0.2.10:40000".parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Analytics event recorded");

    let stored = state.catalog.analytics().snapshot();
    assert_eq!(stored.len(), 1);
    assert_eq!(
        stored[0].origin.url.as_deref(),
        Some("http://localhost:5500/index.html")
    );
    assert_eq!(stored[0].origin.user_agent.as_deref(), Some("test-agent/1.0"));
    assert_eq!(stored[0].origin.session_id, "anonymous");
    // Forwarded headers are ignored unless the proxy is trusted
    assert_eq!(stored[0].origin.ip.as_deref(), Some("192.0.2.10"));

    let body = body_json(app.oneshot(get("/api/analytics")).await.unwrap()).await;
    assert_eq!(body["data"][0]["type"], "page_view");
    assert_eq!(body["data"][0]["url"], "http://localhost:5500/index.html");
    assert_eq!(body["data"][0]["userAgent"], "test-agent/1.0");
}

#[tokio::test]
async fn test_body_fields_win_over_headers() {
    let (app, state) = setup();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/analytics")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::REFERER, "http://referer.example/")
        .body(Body::from(
            json!({ "type": "click", "url": "http://page.example/" }).to_string(),
        ))
        .unwrap();
    app.oneshot(request).await.unwrap();

    let stored = state.catalog.analytics().snapshot();
    assert_eq!(stored[0].origin.url.as_deref(), Some("http://page.example/"));
}

#[tokio::test]
async fn test_analytics_type_filter() {
    let (app, _) = setup();

    for event_type in ["page_view", "click", "page_view", "page_view", "click"] {
        let response = app
            .clone()
            .oneshot(post_json("/api/analytics", json!({ "type": event_type })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let body = body_json(
        app.clone()
            .oneshot(get("/api/analytics?type=page_view&limit=2"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let body = body_json(app.oneshot(get("/api/analytics")).await.unwrap()).await;
    assert_eq!(body["total"], 5);
    assert_eq!(body["limit"], 100);
}

#[tokio::test]
async fn test_marketing_requires_type_and_action() {
    let (app, _) = setup();

    let response = app
        .clone()
        .oneshot(post_json("/api/marketing", json!({ "type": "marketing_event" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Event type and action are required"
    );

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/marketing",
            json!({ "type": "marketing_event", "action": "demo_interaction" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Marketing event recorded");

    let body = body_json(
        app.oneshot(get("/api/marketing?action=demo_interaction"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["type"], "marketing_event");
    assert_eq!(body["data"][0]["action"], "demo_interaction");
}

#[tokio::test]
async fn test_limit_is_capped() {
    let (app, _) = setup();

    let body = body_json(app.oneshot(get("/api/consent?limit=100000")).await.unwrap()).await;
    assert_eq!(body["limit"], 1000);
}

#[tokio::test]
async fn test_invalid_query_is_rejected() {
    let (app, _) = setup();

    let response = app.oneshot(get("/api/consent?limit=lots")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_stats_shape() {
    let (app, _) = setup();

    for (analytics, marketing) in [(true, true), (true, true), (false, false)] {
        app.clone()
            .oneshot(post_json("/api/consent", consent_body(analytics, marketing)))
            .await
            .unwrap();
    }

    let response = app.oneshot(get("/api/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["consents"]["total"], 3);
    assert_eq!(data["consents"]["last24h"], 3);
    assert_eq!(data["consents"]["last7d"], 3);
    assert_eq!(
        data["consents"]["breakdown"],
        json!({ "allAccepted": 2, "partialAccepted": 0, "essentialOnly": 1 })
    );
    assert_eq!(data["analytics"], json!({ "total": 0, "last24h": 0 }));
    assert_eq!(data["marketing"], json!({ "total": 0, "last24h": 0 }));
    assert!(data["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let config = ServerConfig {
        rate_limit: RateLimitConfig {
            enabled: true,
            max_requests: 2,
            window: Duration::from_secs(60),
        },
        ..Default::default()
    };
    let app = create_router(Arc::new(AppState::from_config(config)));

    let request = || {
        Request::builder()
            .uri("/api/stats")
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-limit"], "2");
    }

    let response = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Too many requests from this IP, please try again later."
    );

    // Health is outside /api and never limited
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-forwarded-for", "198.51.100.4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_trusted_proxy_supplies_client_ip() {
    let state = Arc::new(AppState::from_config(ServerConfig {
        trust_proxy_headers: true,
        ..unlimited_config()
    }));
    let app = create_router(state.clone());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/analytics")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::from(json!({ "type": "page_view" }).to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap();

    let stored = state.catalog.analytics().snapshot();
    assert_eq!(stored[0].origin.ip.as_deref(), Some("203.0.113.7"));
}

fn limited_config(max_requests: u32) -> ServerConfig {
    ServerConfig {
        rate_limit: RateLimitConfig {
            enabled: true,
            max_requests,
            window: Duration::from_secs(60),
        },
        ..Default::default()
    }
}

fn stats_from(peer: SocketAddr, forwarded_for: &str) -> Request<Body> {
    let mut request = Request::builder()
        .uri("/api/stats")
        .header("x-forwarded-for", forwarded_for)
        .body(Body::empty())
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

#[tokio::test]
async fn test_rotating_forwarded_for_is_still_limited() {
    let app = create_router(Arc::new(AppState::from_config(limited_config(2))));
    let peer: SocketAddr = "192.0.2.20:50000".parse().unwrap();

    let mut statuses = Vec::new();
    for i in 0..10 {
        let response = app
            .clone()
            .oneshot(stats_from(peer, &format!("198.51.100.{i}")))
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert_eq!(&statuses[..2], &[StatusCode::OK, StatusCode::OK]);
    assert!(statuses[2..]
        .iter()
        .all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_budget_is_per_peer() {
    let app = create_router(Arc::new(AppState::from_config(limited_config(1))));
    let first: SocketAddr = "192.0.2.30:50000".parse().unwrap();
    let second: SocketAddr = "192.0.2.31:50000".parse().unwrap();

    let response = app.clone().oneshot(stats_from(first, "10.0.0.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.clone().oneshot(stats_from(first, "10.0.0.2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app.oneshot(stats_from(second, "10.0.0.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_numeric_timestamp_is_epoch_millis() {
    let (app, state) = setup();

    let response = app
        .oneshot(post_json(
            "/api/analytics",
            json!({ "type": "click", "timestamp": 1718452800000i64 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["timestamp"], "2024-06-15T12:00:00.000Z");

    let stored = state.catalog.analytics().snapshot();
    assert_eq!(stored.len(), 1);
    assert!(matches!(stored[0].timestamp, EventTime::At(_)));
}

#[tokio::test]
async fn test_non_string_timestamp_is_stored_as_malformed() {
    let (app, state) = setup();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/marketing",
            json!({ "type": "marketing_event", "action": "demo", "timestamp": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = state.catalog.marketing().snapshot();
    assert_eq!(stored[0].timestamp, EventTime::Malformed("true".to_string()));

    let body = body_json(app.oneshot(get("/api/stats")).await.unwrap()).await;
    assert_eq!(body["data"]["marketing"], json!({ "total": 1, "last24h": 0 }));
}

#[tokio::test]
async fn test_null_timestamp_defaults_to_now() {
    let (app, state) = setup();

    let response = app
        .oneshot(post_json(
            "/api/analytics",
            json!({ "type": "click", "timestamp": null }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = state.catalog.analytics().snapshot();
    assert!(matches!(stored[0].timestamp, EventTime::At(_)));
}
