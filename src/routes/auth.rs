// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in, sign-up, sign-out and session restore.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    create_jwt, extract_token, removal_cookie, session_cookie, verify_jwt,
};
use crate::routes::views::UserResponse;
use crate::services::{AuthState, Session};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/session", get(get_session))
        .route("/auth/signin", post(sign_in))
        .route("/auth/signup", post(sign_up))
        .route("/auth/signout", post(sign_out))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
}

/// Auth state of the caller's session.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    /// `signed_in`, `signed_out` or `loading`
    pub status: String,
    pub user: Option<UserResponse>,
    /// Session token, only present when a new session was issued.
    pub token: Option<String>,
    pub demo_mode: bool,
}

impl AuthResponse {
    fn new(state: &AuthState, token: Option<String>, demo_mode: bool) -> Self {
        Self {
            status: state.label().to_string(),
            user: state.user().map(UserResponse::from),
            token,
            demo_mode,
        }
    }
}

/// Store a session and issue its token as body field and cookie.
async fn issue_session(
    state: &AppState,
    jar: CookieJar,
    session: Session,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let session = state.sessions.insert(session);
    let token = create_jwt(session.id(), &state.config.jwt_signing_key)?;
    let auth_state = session.state().await;

    tracing::debug!(
        session_id = %session.id(),
        status = auth_state.label(),
        "Issued session"
    );

    let jar = jar.add(session_cookie(token.clone(), &state.config.frontend_url));
    Ok((
        jar,
        Json(AuthResponse::new(&auth_state, Some(token), state.is_demo_mode())),
    ))
}

/// Restore the caller's session, or start one.
///
/// A valid token resolves to its stored session (finishing initialization if
/// it is still loading). Without one, demo mode starts a demo session and a
/// configured backend reports signed out.
async fn get_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let existing = extract_token(&jar, &headers)
        .and_then(|token| verify_jwt(&token, &state.config.jwt_signing_key))
        .and_then(|session_id| state.sessions.get(&session_id));

    if let Some(session) = existing {
        let mut auth_state = session.state().await;
        if auth_state == AuthState::Loading {
            auth_state = state.auth.init_session(&session).await;
        }
        return Ok((
            jar,
            Json(AuthResponse::new(&auth_state, None, state.is_demo_mode())),
        ));
    }

    if state.is_demo_mode() {
        let session = state.auth.sign_in("", "").await?;
        return issue_session(&state, jar, session).await;
    }

    Ok((
        jar,
        Json(AuthResponse::new(&AuthState::SignedOut, None, false)),
    ))
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SignInRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    body.validate()?;

    let session = state.auth.sign_in(&body.email, &body.password).await?;
    if session.user().await.is_none() {
        return Err(AppError::Auth("User profile not found".to_string()));
    }

    issue_session(&state, jar, session).await
}

/// Create an account. If the backend holds the account for e-mail
/// confirmation, no session is issued and the response reports signed out.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SignUpRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    body.validate()?;

    let session = state
        .auth
        .sign_up(&body.email, &body.password, body.name.trim())
        .await?;

    let auth_state = session.state().await;
    if auth_state.user().is_none() {
        return Ok((
            jar,
            Json(AuthResponse::new(&auth_state, None, state.is_demo_mode())),
        ));
    }

    issue_session(&state, jar, session).await
}

/// Tear down the caller's session, if any, and clear the cookie.
async fn sign_out(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, StatusCode) {
    let session_id = extract_token(&jar, &headers)
        .and_then(|token| verify_jwt(&token, &state.config.jwt_signing_key));

    if let Some(session) = session_id.and_then(|id| state.sessions.remove(&id)) {
        state.auth.sign_out(&session).await;
        tracing::info!(session_id = %session.id(), "Signed out");
    }

    (
        jar.add(removal_cookie(&state.config.frontend_url)),
        StatusCode::NO_CONTENT,
    )
}
