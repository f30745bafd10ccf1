// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The hosted backend is optional. When either `SUPABASE_URL` or
//! `SUPABASE_ANON_KEY` is missing the whole application runs in demo mode.

use crate::services::session::DEFAULT_IDLE_TIMEOUT;
use crate::services::FallbackPolicy;
use ring::rand::{SecureRandom, SystemRandom};
use std::env;
use std::time::Duration;

/// Connection settings for the hosted auth/query backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project endpoint, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public (anon) API key
    pub anon_key: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hosted backend, `None` in demo mode
    pub backend: Option<BackendConfig>,
    /// Frontend URL (allowed CORS origin)
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// What to do when a remote data call fails
    pub fallback_policy: FallbackPolicy,
    /// Sessions unused for this long are dropped
    pub session_idle_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let backend = backend_from(
            env::var("SUPABASE_URL").ok(),
            env::var("SUPABASE_ANON_KEY").ok(),
        );

        let jwt_signing_key = match env::var("JWT_SIGNING_KEY") {
            Ok(key) if !key.trim().is_empty() => key.into_bytes(),
            _ => {
                tracing::warn!("JWT_SIGNING_KEY not set, generating an ephemeral signing key");
                random_key()?
            }
        };

        let fallback_policy = match env::var("FALLBACK_POLICY") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("FALLBACK_POLICY", raw))?,
            Err(_) => FallbackPolicy::default(),
        };

        let session_idle_timeout = match env::var("SESSION_IDLE_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("SESSION_IDLE_TIMEOUT_SECS", raw))?,
            Err(_) => DEFAULT_IDLE_TIMEOUT,
        };

        Ok(Self {
            backend,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key,
            fallback_policy,
            session_idle_timeout,
        })
    }

    /// Config for tests: demo mode, fixed signing key.
    pub fn test_default() -> Self {
        Self {
            backend: None,
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            fallback_policy: FallbackPolicy::default(),
            session_idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// True when no hosted backend is configured.
    pub fn is_demo_mode(&self) -> bool {
        self.backend.is_none()
    }
}

/// Build the backend config only if both values are present and non-empty.
pub fn backend_from(url: Option<String>, anon_key: Option<String>) -> Option<BackendConfig> {
    let url = url.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
    let anon_key = anon_key
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())?;

    Some(BackendConfig { url, anon_key })
}

fn random_key() -> Result<Vec<u8>, ConfigError> {
    let mut key = vec![0u8; 32];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| ConfigError::Random)?;
    Ok(key)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),

    #[error("Failed to generate random signing key")]
    Random,
}
