// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth provider: sign-in, sign-up, sign-out and session restore.
//!
//! In demo mode every flow succeeds immediately with the demo user. With a
//! backend configured, credentials go to the remote auth endpoint and the
//! profile comes from the `users` table.

use crate::db::fixtures;
use crate::db::supabase::{SignUpResponse, SupabaseClient};
use crate::error::Result;
use crate::models::user::default_avatar_url;
use crate::models::{NewProfile, User};
use crate::services::data::DataService;
use crate::services::session::{new_session_id, AuthState, Session};
use chrono::Utc;

/// Session lifecycle operations.
#[derive(Clone)]
pub struct AuthProvider {
    remote: Option<SupabaseClient>,
    data: DataService,
}

impl AuthProvider {
    pub fn new(remote: Option<SupabaseClient>, data: DataService) -> Self {
        Self { remote, data }
    }

    /// Resolve a `Loading` session: demo mode signs in the demo user, otherwise
    /// the remote access token (if any) is checked and the profile loaded.
    pub async fn init_session(&self, session: &Session) -> AuthState {
        let state = match (&self.remote, session.access_token()) {
            (None, _) => AuthState::SignedIn(fixtures::demo_user(Utc::now())),
            (Some(_), None) => AuthState::SignedOut,
            (Some(remote), Some(token)) => match remote.get_user(token).await {
                Ok(remote_user) => self.load_profile(session, &remote_user.id).await,
                Err(e) => {
                    tracing::info!(error = %e, "Remote session no longer valid");
                    AuthState::SignedOut
                }
            },
        };

        session.set_state(state.clone()).await;
        state
    }

    async fn load_profile(&self, session: &Session, user_id: &str) -> AuthState {
        match self.data.fetch_profile(session, user_id).await {
            Ok(Some(user)) => AuthState::SignedIn(user),
            Ok(None) => {
                tracing::warn!(user_id, "No profile row for signed-in user");
                AuthState::SignedOut
            }
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to fetch profile");
                AuthState::SignedOut
            }
        }
    }

    /// Password sign-in. Demo mode ignores the credentials.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let Some(remote) = &self.remote else {
            let session = Session::new(new_session_id()?, None, Utc::now());
            self.init_session(&session).await;
            return Ok(session);
        };

        let remote_session = remote.sign_in_with_password(email, password).await?;
        tracing::info!(user_id = %remote_session.user.id, "Signed in");

        let session = Session::new(
            new_session_id()?,
            Some(remote_session.access_token),
            Utc::now(),
        );
        let state = self.load_profile(&session, &remote_session.user.id).await;
        session.set_state(state).await;
        Ok(session)
    }

    /// Create an account and its profile row. When the backend holds the new
    /// account for e-mail confirmation the returned session is signed out.
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Session> {
        let Some(remote) = &self.remote else {
            let now = Utc::now();
            let session = Session::new(new_session_id()?, None, now);
            let user = User {
                name: name.to_string(),
                email: email.to_string(),
                avatar_url: Some(default_avatar_url(name)),
                ..fixtures::demo_user(now)
            };
            session.set_state(AuthState::SignedIn(user)).await;
            return Ok(session);
        };

        let response = remote.sign_up(email, password).await?;
        let user_id = response.user().id.clone();
        let access_token = match response {
            SignUpResponse::Session(remote_session) => Some(remote_session.access_token),
            SignUpResponse::User(_) => None,
        };
        tracing::info!(user_id = %user_id, confirmed = access_token.is_some(), "Signed up");

        let profile = NewProfile::new(user_id.clone(), email.to_string(), name.to_string());
        if let Err(e) = self
            .data
            .create_profile(access_token.as_deref(), &profile)
            .await
        {
            tracing::error!(user_id = %user_id, error = %e, "Failed to create profile");
        }

        let session = Session::new(new_session_id()?, access_token, Utc::now());
        let state = if session.access_token().is_some() {
            self.load_profile(&session, &user_id).await
        } else {
            AuthState::SignedOut
        };
        session.set_state(state).await;
        Ok(session)
    }

    /// Tear down a session: revoke the remote token (best effort) and drop
    /// local state.
    pub async fn sign_out(&self, session: &Session) {
        if let (Some(remote), Some(token)) = (&self.remote, session.access_token()) {
            if let Err(e) = remote.sign_out(token).await {
                tracing::warn!(error = %e, "Remote sign-out failed");
            }
        }

        session.set_state(AuthState::SignedOut).await;
        session.local().clear().await;
        tracing::debug!(session_id = %session.id(), "Session torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_provider() -> AuthProvider {
        AuthProvider::new(None, DataService::demo())
    }

    #[tokio::test]
    async fn test_demo_init_signs_in_demo_user() {
        let auth = demo_provider();
        let session = Session::new("s1".to_string(), None, Utc::now());

        let state = auth.init_session(&session).await;

        assert_eq!(state.user().map(|u| u.id.as_str()), Some(fixtures::DEMO_USER_ID));
        assert_eq!(session.state().await, state);
    }

    #[tokio::test]
    async fn test_demo_sign_in_accepts_anything() {
        let session = demo_provider().sign_in("x@y.z", "").await.unwrap();
        let user = session.user().await.unwrap();
        assert_eq!(user.email, "demo@andra.com");
    }

    #[tokio::test]
    async fn test_demo_sign_up_uses_given_identity() {
        let session = demo_provider()
            .sign_up("joana@example.com", "secret", "Joana")
            .await
            .unwrap();
        let user = session.user().await.unwrap();

        assert_eq!(user.name, "Joana");
        assert_eq!(user.email, "joana@example.com");
        assert_eq!(user.avatar_url, Some(default_avatar_url("Joana")));
        assert_eq!(user.id, fixtures::DEMO_USER_ID);
    }

    #[tokio::test]
    async fn test_sign_out_clears_state() {
        let auth = demo_provider();
        let session = auth.sign_in("a@b.c", "pw").await.unwrap();

        auth.sign_out(&session).await;

        assert_eq!(session.state().await, AuthState::SignedOut);
        assert!(session.local().activities().await.is_empty());
    }
}
