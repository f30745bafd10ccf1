// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the hosted backend (Supabase-style project).
//!
//! Handles:
//! - Table queries through the REST endpoint (`/rest/v1`): select with
//!   equality filters and ordering, and inserts
//! - Password auth through the auth endpoint (`/auth/v1`): sign-in, sign-up,
//!   sign-out and current-user lookup

use crate::config::BackendConfig;
use crate::error::AppError;
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Shown when the auth endpoint could not be reached at all.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Please try again.";

/// Filters and ordering for a select query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<(String, String)>,
    order: Option<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows where `column` equals `value`.
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value)));
        self
    }

    /// Sort by `column`, newest/largest first.
    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(format!("{}.desc", column));
        self
    }

    /// Query-string pairs in the REST endpoint's syntax.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        pairs.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.clone()));
        }
        pairs
    }
}

/// Auth endpoint failures, surfaced to the user as a message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    /// The backend answered with an error (bad credentials, duplicate email, ...)
    #[error("{0}")]
    Rejected(String),

    /// The backend could not be reached or returned garbage.
    #[error("Connection error. Please try again.")]
    Connection,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err.to_string())
    }
}

/// Identity returned by the auth endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in remote session.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSession {
    pub access_token: String,
    pub user: RemoteUser,
}

/// Sign-up returns a session when e-mail confirmation is off, otherwise just
/// the (unconfirmed) user.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(RemoteSession),
    User(RemoteUser),
}

impl SignUpResponse {
    pub fn user(&self) -> &RemoteUser {
        match self {
            SignUpResponse::Session(session) => &session.user,
            SignUpResponse::User(user) => user,
        }
    }
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Error body shapes used by the auth endpoint across versions.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl AuthErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Hosted backend client.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Bearer for REST calls: the user's token when signed in, else the anon key.
    fn bearer<'a>(&'a self, access_token: Option<&'a str>) -> &'a str {
        access_token.unwrap_or(&self.anon_key)
    }

    // ─── Table Operations ────────────────────────────────────────

    /// Select rows from `table`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        access_token: Option<&str>,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .http
            .get(self.rest_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer(access_token))
            .query(&query.to_pairs())
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Select on {} failed: {}", table, e)))?;

        self.check_response_json(response).await
    }

    /// Insert one row into `table`. The row is not returned.
    pub async fn insert<B: Serialize + ?Sized>(
        &self,
        access_token: Option<&str>,
        table: &str,
        row: &B,
    ) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.rest_url(table))
            .header("apikey", &self.anon_key)
            .header("Prefer", HeaderValue::from_static("return=minimal"))
            .bearer_auth(self.bearer(access_token))
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Insert into {} failed: {}", table, e)))?;

        self.check_response(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Backend(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))
    }

    // ─── Auth Operations ─────────────────────────────────────────

    /// Password sign-in.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<RemoteSession, AuthError> {
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&PasswordCredentials { email, password })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Sign-in request failed");
                AuthError::Connection
            })?;

        self.check_auth_json(response).await
    }

    /// Create an account with e-mail and password.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, AuthError> {
        let response = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&PasswordCredentials { email, password })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Sign-up request failed");
                AuthError::Connection
            })?;

        self.check_auth_json(response).await
    }

    /// Revoke the session behind `access_token`.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Sign-out request failed");
                AuthError::Connection
            })?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(auth_error_from(response).await)
    }

    /// Look up the user owning `access_token`.
    pub async fn get_user(&self, access_token: &str) -> Result<RemoteUser, AuthError> {
        let response = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "User lookup request failed");
                AuthError::Connection
            })?;

        self.check_auth_json(response).await
    }

    async fn check_auth_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        if !response.status().is_success() {
            return Err(auth_error_from(response).await);
        }

        response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Unexpected auth response body");
            AuthError::Connection
        })
    }
}

/// Turn a failed auth response into the backend's own message.
async fn auth_error_from(response: reqwest::Response) -> AuthError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<AuthErrorBody>(&body)
        .ok()
        .and_then(AuthErrorBody::into_message)
        .unwrap_or_else(|| format!("HTTP {}", status));

    tracing::debug!(status = %status, message = %message, "Auth request rejected");
    AuthError::Rejected(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs() {
        let query = Query::new().eq("user_id", "u1").order_desc("date");
        assert_eq!(
            query.to_pairs(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.u1".to_string()),
                ("order".to_string(), "date.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = SupabaseClient::new(&BackendConfig {
            url: "https://x.supabase.co/".to_string(),
            anon_key: "anon".to_string(),
        });
        assert_eq!(
            client.rest_url("activities"),
            "https://x.supabase.co/rest/v1/activities"
        );
        assert_eq!(client.auth_url("user"), "https://x.supabase.co/auth/v1/user");
    }

    #[test]
    fn test_auth_error_body_variants() {
        let body: AuthErrorBody =
            serde_json::from_str(r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#)
                .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid login credentials"));

        let body: AuthErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#,
        )
        .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Email not confirmed"));
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let with_session: SignUpResponse = serde_json::from_value(serde_json::json!({
            "access_token": "tok",
            "token_type": "bearer",
            "refresh_token": "ref",
            "user": {"id": "u1", "email": "a@b.c"}
        }))
        .unwrap();
        assert!(matches!(with_session, SignUpResponse::Session(_)));
        assert_eq!(with_session.user().id, "u1");

        let pending: SignUpResponse =
            serde_json::from_value(serde_json::json!({"id": "u2", "email": "d@e.f"})).unwrap();
        assert!(matches!(pending, SignUpResponse::User(_)));
    }

    #[test]
    fn test_connection_error_message() {
        assert_eq!(AuthError::Connection.to_string(), CONNECTION_ERROR_MESSAGE);
        let app: AppError = AuthError::Rejected("User already registered".to_string()).into();
        assert!(matches!(app, AppError::Auth(msg) if msg == "User already registered"));
    }
}
