// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod achievement;
pub mod activity;
pub mod challenge;
pub mod stats;
pub mod user;

pub use achievement::Achievement;
pub use activity::{Activity, ActivityForm, NewActivity};
pub use challenge::{Challenge, ChallengeForm, ChallengeParticipant, ChallengeStatus, NewChallenge};
pub use stats::ActivityTotals;
pub use user::{NewProfile, User};
