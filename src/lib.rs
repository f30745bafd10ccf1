// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Andra: fitness tracking with activities and distance challenges.
//!
//! This crate provides the backend API. Auth and persistence go to a hosted
//! backend when one is configured; otherwise everything runs in demo mode on
//! fixtures and session-local memory.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SupabaseClient;
use services::session::MAX_SESSIONS;
use services::{AuthProvider, DataService, SessionStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub data: DataService,
    pub auth: AuthProvider,
    pub sessions: SessionStore,
}

impl AppState {
    /// Wire up services for the given configuration.
    pub fn new(config: Config) -> Self {
        let remote = config.backend.as_ref().map(SupabaseClient::new);
        let data = DataService::new(remote.clone(), config.fallback_policy);
        let auth = AuthProvider::new(remote, data.clone());
        let sessions = SessionStore::with_limits(config.session_idle_timeout, MAX_SESSIONS);

        Self {
            config,
            data,
            auth,
            sessions,
        }
    }

    pub fn is_demo_mode(&self) -> bool {
        self.config.is_demo_mode()
    }
}
