// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-client session context.
//!
//! A session is created when a client signs in (or, in demo mode, on its
//! first request) and torn down on sign-out or after sitting idle. It carries
//! the auth state, the remote access token and the session-local fallback
//! store.

use crate::db::LocalStore;
use crate::error::AppError;
use crate::models::User;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const SESSION_ID_BYTES: usize = 32;

/// Sessions unused for this long are dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound on live sessions; the least recently used one makes room.
pub const MAX_SESSIONS: usize = 10_000;

/// Auth state of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    SignedOut,
    Loading,
    SignedIn(User),
}

impl AuthState {
    pub fn label(&self) -> &'static str {
        match self {
            AuthState::SignedOut => "signed_out",
            AuthState::Loading => "loading",
            AuthState::SignedIn(_) => "signed_in",
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// One client's session.
#[derive(Debug)]
pub struct Session {
    id: String,
    access_token: Option<String>,
    state: RwLock<AuthState>,
    local: LocalStore,
    /// Last use, epoch milliseconds
    last_seen: AtomicI64,
}

impl Session {
    /// New session in the `Loading` state with a fixture-seeded local store.
    pub fn new(id: String, access_token: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            access_token,
            state: RwLock::new(AuthState::Loading),
            local: LocalStore::seeded(now),
            last_seen: AtomicI64::new(now.timestamp_millis()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Remote access token, if signed in against the hosted backend.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user().cloned()
    }

    pub async fn set_state(&self, state: AuthState) {
        *self.state.write().await = state;
    }

    fn touch(&self, now: DateTime<Utc>) {
        self.last_seen
            .fetch_max(now.timestamp_millis(), Ordering::Relaxed);
    }

    fn last_seen_ms(&self) -> i64 {
        self.last_seen.load(Ordering::Relaxed)
    }

    fn idle_ms(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis() - self.last_seen_ms()
    }
}

/// Live sessions keyed by session id.
///
/// Idle sessions are swept whenever a new one is inserted, and a lookup of an
/// idle session drops it instead of returning it. At `max_sessions` the least
/// recently used session is evicted.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Session>>,
    idle_timeout_ms: i64,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, MAX_SESSIONS)
    }

    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout_ms: i64::try_from(idle_timeout.as_millis()).unwrap_or(i64::MAX),
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn insert(&self, session: Session) -> Arc<Session> {
        self.insert_at(session, Utc::now())
    }

    pub fn insert_at(&self, session: Session, now: DateTime<Utc>) -> Arc<Session> {
        self.evict_idle(now);
        while self.sessions.len() >= self.max_sessions {
            if !self.evict_least_recent() {
                break;
            }
        }

        let session = Arc::new(session);
        session.touch(now);
        self.sessions
            .insert(session.id().to_string(), session.clone());
        session
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.get_at(id, Utc::now())
    }

    /// Live session for `id`, marked as used at `now`.
    pub fn get_at(&self, id: &str, now: DateTime<Utc>) -> Option<Arc<Session>> {
        let session = self.sessions.get(id).map(|entry| entry.value().clone())?;
        if session.idle_ms(now) > self.idle_timeout_ms {
            self.sessions.remove(id);
            tracing::debug!(session_id = %id, "Dropped idle session");
            return None;
        }
        session.touch(now);
        Some(session)
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    /// Drop every session idle for longer than the timeout. Returns how many
    /// were removed.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        let timeout = self.idle_timeout_ms;
        self.sessions
            .retain(|_, session| session.idle_ms(now) <= timeout);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle sessions");
        }
        evicted
    }

    fn evict_least_recent(&self) -> bool {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.value().last_seen_ms())
            .map(|entry| entry.key().clone());
        match oldest {
            Some(id) => self.sessions.remove(&id).is_some(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Random, URL-safe session id.
pub fn new_session_id() -> Result<String, AppError> {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate session id")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
