// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token authentication middleware.

use crate::error::AppError;
use crate::models::User;
use crate::services::Session;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "andra_token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (session ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub session: Arc<Session>,
    pub user: User,
}

/// Session token from the cookie, falling back to the bearer header.
pub fn extract_token(jar: &CookieJar, headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Decode a session token and return the session ID it names.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Option<String> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims.sub)
}

/// Middleware that requires a signed-in session.
///
/// In demo mode a request without a usable token (none, unverifiable, or
/// naming a session that no longer exists) is given a fresh demo session,
/// and its token is set as a cookie on the response.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&jar, request.headers());

    let existing = match token {
        Some(token) => {
            let session = verify_jwt(&token, &state.config.jwt_signing_key)
                .and_then(|session_id| state.sessions.get(&session_id));
            match session {
                Some(session) => Some(session),
                None if state.is_demo_mode() => {
                    tracing::debug!("Stale session token, starting a new demo session");
                    None
                }
                None => return Err(AppError::InvalidToken),
            }
        }
        None if state.is_demo_mode() => None,
        None => return Err(AppError::Unauthorized),
    };

    let (session, new_token) = match existing {
        Some(session) => (session, None),
        None => {
            let session = state.sessions.insert(state.auth.sign_in("", "").await?);
            let token = create_jwt(session.id(), &state.config.jwt_signing_key)?;
            tracing::debug!(session_id = %session.id(), "Started demo session");
            (session, Some(token))
        }
    };

    let user = session.user().await.ok_or(AppError::Unauthorized)?;
    request.extensions_mut().insert(AuthUser { session, user });

    let response = next.run(request).await;
    match new_token {
        Some(token) => {
            let jar = CookieJar::new().add(session_cookie(token, &state.config.frontend_url));
            Ok((jar, response).into_response())
        }
        None => Ok(response),
    }
}

/// Create a JWT for a session.
pub fn create_jwt(session_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: session_id.to_string(),
        iat: now,
        exp: now + 30 * 24 * 60 * 60, // 30 days
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Session cookie; `Secure` unless the frontend is served over plain HTTP.
pub fn session_cookie(token: String, frontend_url: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(frontend_url.starts_with("https://"))
        .build()
}

/// Expired cookie that clears the session token.
pub fn removal_cookie(frontend_url: &str) -> Cookie<'static> {
    let mut cookie = session_cookie(String::new(), frontend_url);
    cookie.make_removal();
    cookie
}
