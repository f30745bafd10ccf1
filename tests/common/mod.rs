// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use andra::config::{BackendConfig, Config};
use andra::routes::create_router;
use andra::services::FallbackPolicy;
use andra::AppState;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Access token the mock backend hands out.
#[allow(dead_code)]
pub const REMOTE_TOKEN: &str = "remote-access-token";

/// Remote user id the mock backend signs in.
#[allow(dead_code)]
pub const REMOTE_USER_ID: &str = "11111111-2222-3333-4444-555555555555";

/// Create a demo-mode test app (no backend configured).
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_app_with_config(Config::test_default())
}

/// Create a test app talking to the mock backend at `server`.
#[allow(dead_code)]
pub fn create_remote_app(
    server: &MockServer,
    fallback_policy: FallbackPolicy,
) -> (axum::Router, Arc<AppState>) {
    let config = Config {
        backend: Some(BackendConfig {
            url: server.uri(),
            anon_key: "test-anon-key".to_string(),
        }),
        fallback_policy,
        ..Config::test_default()
    };
    create_app_with_config(config)
}

fn create_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config));
    (create_router(state.clone()), state)
}

/// Mount mocks for a successful password sign-in and its profile row.
#[allow(dead_code)]
pub async fn mount_remote_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": REMOTE_TOKEN,
            "refresh_token": "refresh",
            "token_type": "bearer",
            "user": { "id": REMOTE_USER_ID, "email": "ana@example.com" }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": REMOTE_USER_ID,
            "name": "Ana",
            "email": "ana@example.com",
            "created_at": "2026-01-05T10:00:00Z"
        }])))
        .mount(server)
        .await;
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send a request, with an optional bearer token and JSON body.
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Start a session and return its token.
#[allow(dead_code)]
pub async fn sign_in(app: &axum::Router) -> String {
    let response = send(
        app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "ana@example.com", "password": "secret" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}
