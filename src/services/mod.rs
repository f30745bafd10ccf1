// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod data;
pub mod fallback;
pub mod session;

pub use auth::AuthProvider;
pub use data::DataService;
pub use fallback::FallbackPolicy;
pub use session::{AuthState, Session, SessionStore};
