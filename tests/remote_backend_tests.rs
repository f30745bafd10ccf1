// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flows against a mocked hosted backend: successful calls, the
//! degrade-to-local fallback and the propagate policy.

use andra::config::{BackendConfig, Config};
use andra::db::supabase::CONNECTION_ERROR_MESSAGE;
use andra::routes::create_router;
use andra::services::FallbackPolicy;
use andra::AppState;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{REMOTE_TOKEN, REMOTE_USER_ID};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn remote_activity(id: &str, activity_type: &str, distance_km: f64) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": REMOTE_USER_ID,
        "type": activity_type,
        "distance_km": distance_km,
        "duration_min": 30,
        "calories": (distance_km * 60.0).round() as u32,
        "date": "2026-02-10",
        "created_at": "2026-02-10T08:00:00Z"
    })
}

fn remote_challenge(id: &str, title: &str) -> serde_json::Value {
    let today = Utc::now().date_naive();
    json!({
        "id": id,
        "title": title,
        "description": "Remote challenge",
        "goal_distance_km": 50.0,
        "start_date": (today - Duration::days(5)).to_string(),
        "end_date": (today + Duration::days(25)).to_string(),
        "created_by": REMOTE_USER_ID
    })
}

async fn mount_rows(server: &MockServer, table: &str, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/rest/v1/{}", table)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

async fn mount_failure(server: &MockServer, http_method: &str, table: &str) {
    Mock::given(method(http_method))
        .and(path(format!("/rest/v1/{}", table)))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(server)
        .await;
}

// ─── Auth ────────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_loads_remote_profile() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);

    let response = common::send(
        &app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "ana@example.com", "password": "secret" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["status"], "signed_in");
    assert_eq!(body["demo_mode"], false);
    assert_eq!(body["user"]["id"], REMOTE_USER_ID);
    assert_eq!(body["user"]["name"], "Ana");
    // No stored avatar, so the generated one is shown
    assert_eq!(
        body["user"]["avatar_url"],
        "https://api.dicebear.com/7.x/avataaars/svg?seed=Ana"
    );
}

#[tokio::test]
async fn test_sign_in_rejected_returns_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;
    let (app, state) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);

    let response = common::send(
        &app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "ana@example.com", "password": "wrong" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "auth_error");
    assert_eq!(body["details"], "Invalid login credentials");
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_reports_connection_error() {
    let config = Config {
        backend: Some(BackendConfig {
            // Nothing listens on the discard port
            url: "http://127.0.0.1:9".to_string(),
            anon_key: "test-anon-key".to_string(),
        }),
        ..Config::test_default()
    };
    let app = create_router(Arc::new(AppState::new(config)));

    let response = common::send(
        &app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "ana@example.com", "password": "secret" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["details"], CONNECTION_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_sign_in_without_profile_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": REMOTE_TOKEN,
            "user": { "id": REMOTE_USER_ID }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);

    let response = common::send(
        &app,
        "POST",
        "/auth/signin",
        None,
        Some(json!({ "email": "ana@example.com", "password": "secret" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_up_pending_confirmation_stays_signed_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "new-user-id",
            "email": "joana@example.com"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({
            "id": "new-user-id",
            "email": "joana@example.com",
            "name": "Joana",
            "avatar_url": "https://api.dicebear.com/7.x/avataaars/svg?seed=Joana"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    let (app, state) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);

    let response = common::send(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "email": "joana@example.com", "password": "secret", "name": "Joana" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["status"], "signed_out");
    assert!(body["token"].is_null());
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn test_sign_out_revokes_remote_session() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", format!("Bearer {}", REMOTE_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let (app, state) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);
    let token = common::sign_in(&app).await;

    let response = common::send(&app, "POST", "/auth/signout", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn test_session_endpoint_without_token_is_signed_out() {
    let server = MockServer::start().await;
    let (app, state) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);

    let response = common::send(&app, "GET", "/auth/session", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["status"], "signed_out");
    assert!(body["user"].is_null());
    assert!(state.sessions.is_empty());
}

// ─── Reads ───────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_activities_from_backend() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/activities"))
        .and(query_param("user_id", format!("eq.{}", REMOTE_USER_ID).as_str()))
        .and(query_param("order", "date.desc"))
        .and(header("apikey", "test-anon-key"))
        .and(header("authorization", format!("Bearer {}", REMOTE_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            remote_activity("a1", "pedalada", 20.0)
        ])))
        .mount(&server)
        .await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);
    let token = common::sign_in(&app).await;

    let response = common::send(&app, "GET", "/api/activities", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    let activities = body["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0]["id"], "a1");
    assert_eq!(body["totals"]["calories"], 1200);
    assert_eq!(body["demo_mode"], false);
}

#[tokio::test]
async fn test_empty_result_is_not_replaced_by_demo_data() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);
    let token = common::sign_in(&app).await;

    let response = common::send(&app, "GET", "/api/activities", Some(&token), None).await;
    let body = common::body_json(response).await;
    assert!(body["activities"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_read_failure_degrades_to_demo_data() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    mount_failure(&server, "GET", "activities").await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);
    let token = common::sign_in(&app).await;

    let response = common::send(&app, "GET", "/api/activities", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    let activities = body["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0]["id"], "1");
    assert_eq!(body["totals"]["distance_label"], "8.3");
}

#[tokio::test]
async fn test_read_failure_propagates_under_strict_policy() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    mount_failure(&server, "GET", "challenges").await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::Propagate);
    let token = common::sign_in(&app).await;

    let response = common::send(&app, "GET", "/api/challenges", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "backend_error");
    // Backend details are not leaked to the client
    assert!(body["details"].is_null());
}

// ─── Writes ──────────────────────────────────────────────────

#[tokio::test]
async fn test_add_activity_inserts_then_refetches() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/activities"))
        .and(header("prefer", "return=minimal"))
        .and(body_partial_json(json!({
            "user_id": REMOTE_USER_ID,
            "type": "corrida",
            "distance_km": 5.0,
            "calories": 300
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            remote_activity("a2", "corrida", 5.0),
            remote_activity("a1", "pedalada", 20.0)
        ])))
        .mount(&server)
        .await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);
    let token = common::sign_in(&app).await;

    let response = common::send(
        &app,
        "POST",
        "/api/activities",
        Some(&token),
        Some(json!({ "type": "corrida", "distance_km": 5.0, "duration_min": 30 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::body_json(response).await;
    let activities = body["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0]["id"], "a2");
}

#[tokio::test]
async fn test_write_failure_degrades_to_local_record() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    mount_failure(&server, "POST", "activities").await;
    mount_failure(&server, "GET", "activities").await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);
    let token = common::sign_in(&app).await;

    let response = common::send(
        &app,
        "POST",
        "/api/activities",
        Some(&token),
        Some(json!({ "type": "caminhada", "distance_km": 4.0, "duration_min": 50 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::body_json(response).await;
    let activities = body["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 3);
    assert_eq!(activities[0]["type"], "caminhada");
    assert_eq!(activities[0]["user_id"], REMOTE_USER_ID);
    assert_eq!(activities[0]["calories"], 240);
}

#[tokio::test]
async fn test_write_failure_propagates_under_strict_policy() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    mount_failure(&server, "POST", "challenge_participants").await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::Propagate);
    let token = common::sign_in(&app).await;

    let response = common::send(&app, "POST", "/api/challenges/7/join", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_join_failure_degrades_to_local_participation() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    mount_failure(&server, "POST", "challenge_participants").await;
    mount_failure(&server, "GET", "challenge_participants").await;
    mount_failure(&server, "GET", "challenges").await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);
    let token = common::sign_in(&app).await;

    let response = common::send(&app, "POST", "/api/challenges/2/join", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    let my_active = body["my_active"].as_array().unwrap();
    assert_eq!(my_active.len(), 1);
    assert_eq!(my_active[0]["id"], "2");
}

#[tokio::test]
async fn test_failed_insert_keeps_remote_rows() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    mount_rows(&server, "activities", json!([remote_activity("a1", "pedalada", 20.0)])).await;
    mount_failure(&server, "POST", "activities").await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);
    let token = common::sign_in(&app).await;

    let response = common::send(
        &app,
        "POST",
        "/api/activities",
        Some(&token),
        Some(json!({ "type": "corrida", "distance_km": 5.0, "duration_min": 30 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::body_json(response).await;
    let activities = body["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0]["type"], "corrida");
    assert_eq!(activities[0]["user_id"], REMOTE_USER_ID);
    assert_eq!(activities[1]["id"], "a1");
}

#[tokio::test]
async fn test_failed_challenge_insert_keeps_remote_rows() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    mount_rows(&server, "challenges", json!([remote_challenge("c9", "Remoto")])).await;
    mount_rows(&server, "challenge_participants", json!([])).await;
    mount_failure(&server, "POST", "challenges").await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);
    let token = common::sign_in(&app).await;

    let end_date = (Utc::now().date_naive() + Duration::days(10)).to_string();
    let response = common::send(
        &app,
        "POST",
        "/api/challenges",
        Some(&token),
        Some(json!({
            "title": "Local",
            "description": "Kept in the session",
            "goal_distance_km": 10.0,
            "end_date": end_date
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::body_json(response).await;
    let challenges = body["challenges"].as_array().unwrap();
    assert_eq!(challenges.len(), 2);
    assert_eq!(challenges[0]["title"], "Local");
    assert_eq!(challenges[0]["created_by"], REMOTE_USER_ID);
    assert_eq!(challenges[1]["id"], "c9");
}

#[tokio::test]
async fn test_failed_join_insert_still_shows_participation() {
    let server = MockServer::start().await;
    common::mount_remote_sign_in(&server).await;
    mount_rows(&server, "challenges", json!([remote_challenge("c9", "Remoto")])).await;
    mount_rows(&server, "challenge_participants", json!([])).await;
    mount_failure(&server, "POST", "challenge_participants").await;
    let (app, _) = common::create_remote_app(&server, FallbackPolicy::DegradeToLocal);
    let token = common::sign_in(&app).await;

    let response = common::send(&app, "POST", "/api/challenges/c9/join", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    let challenges = body["challenges"].as_array().unwrap();
    assert_eq!(challenges.len(), 1);
    assert_eq!(challenges[0]["participating"], true);
    assert_eq!(challenges[0]["can_join"], false);
    let my_active = body["my_active"].as_array().unwrap();
    assert_eq!(my_active.len(), 1);
    assert_eq!(my_active[0]["id"], "c9");
    assert_eq!(my_active[0]["progress"]["percent"], 0.0);
}
