// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance challenges and their participants.

use crate::time_utils::midnight_utc;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Stored challenge (`challenges` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub goal_distance_km: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// User who created the challenge
    pub created_by: String,
}

/// Where a challenge sits relative to the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Upcoming,
    Active,
    Finished,
}

impl Challenge {
    pub fn from_new(id: String, created_by: &str, new: NewChallenge) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            goal_distance_km: new.goal_distance_km,
            start_date: new.start_date,
            end_date: new.end_date,
            created_by: created_by.to_string(),
        }
    }

    /// Status at `now`. Both dates are taken as midnight UTC, so a challenge
    /// is finished as soon as its end date begins.
    pub fn status_at(&self, now: DateTime<Utc>) -> ChallengeStatus {
        if now < midnight_utc(self.start_date) {
            ChallengeStatus::Upcoming
        } else if now > midnight_utc(self.end_date) {
            ChallengeStatus::Finished
        } else {
            ChallengeStatus::Active
        }
    }
}

/// Challenge fields supplied by the user; id and creator are assigned later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewChallenge {
    pub title: String,
    pub description: String,
    pub goal_distance_km: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Insert payload: the new challenge with its creator attached.
#[derive(Debug, Serialize)]
pub struct ChallengeInsert<'a> {
    #[serde(flatten)]
    pub challenge: &'a NewChallenge,
    pub created_by: &'a str,
}

/// "Create challenge" form submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChallengeForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, max = 100000.0))]
    pub goal_distance_km: f64,
    /// Defaults to today
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub end_date: NaiveDate,
}

impl ChallengeForm {
    /// Resolve the start date default. Returns `None` if the end date falls
    /// before the start date.
    pub fn into_new_challenge(self, today: NaiveDate) -> Option<NewChallenge> {
        let start_date = self.start_date.unwrap_or(today);
        if self.end_date < start_date {
            return None;
        }

        Some(NewChallenge {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            goal_distance_km: self.goal_distance_km,
            start_date,
            end_date: self.end_date,
        })
    }
}

/// A user's participation in a challenge (`challenge_participants` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChallengeParticipant {
    pub id: String,
    pub challenge_id: String,
    pub user_id: String,
    /// Distance counted towards the goal. Set at join time and never updated.
    pub progress_km: f64,
    pub joined_at: DateTime<Utc>,
}

/// Insert payload for joining a challenge.
#[derive(Debug, Serialize)]
pub struct ParticipantInsert<'a> {
    pub challenge_id: &'a str,
    pub user_id: &'a str,
    pub progress_km: f64,
}
