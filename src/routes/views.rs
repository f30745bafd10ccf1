// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Response shapes for the API, with the derived values the client renders.

use crate::models::activity::activity_icon;
use crate::models::stats::{progress_bar_width, progress_percent};
use crate::models::{
    Activity, ActivityTotals, Challenge, ChallengeParticipant, ChallengeStatus, User,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Days counted as "this week" on the dashboard, today included.
const WEEK_DAYS: i64 = 7;

/// Current user response.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Stored avatar, or the generated default.
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar_url: user.display_avatar(),
            created_at: user.created_at,
        }
    }
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: Activity,
    pub icon: String,
}

impl From<Activity> for ActivityView {
    fn from(activity: Activity) -> Self {
        let icon = activity_icon(&activity.activity_type).to_string();
        Self { activity, icon }
    }
}

/// Activity totals with display labels.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TotalsView {
    pub count: u32,
    pub distance_km: f64,
    pub distance_label: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub calories: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub duration_min: u64,
    pub duration_label: String,
    pub activities_by_type: BTreeMap<String, u32>,
}

impl From<ActivityTotals> for TotalsView {
    fn from(totals: ActivityTotals) -> Self {
        Self {
            count: totals.count,
            distance_label: totals.distance_label(),
            duration_label: totals.duration_label(),
            distance_km: totals.distance_km,
            calories: totals.calories,
            duration_min: totals.duration_min,
            activities_by_type: totals.activities_by_type,
        }
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivityView>,
    pub totals: TotalsView,
    pub demo_mode: bool,
}

impl ActivitiesResponse {
    pub fn new(activities: Vec<Activity>, demo_mode: bool) -> Self {
        let totals = ActivityTotals::from_activities(&activities).into();
        Self {
            activities: activities.into_iter().map(ActivityView::from).collect(),
            totals,
            demo_mode,
        }
    }
}

// ─── Challenges ──────────────────────────────────────────────

/// Progress of a participation towards the challenge goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressView {
    pub progress_km: f64,
    pub goal_distance_km: f64,
    /// Unclamped, may exceed 100.
    pub percent: f64,
    /// `percent` clamped to 0..=100.
    pub bar_width: f64,
    /// e.g. `"8.3 / 50 km"`
    pub label: String,
}

impl ProgressView {
    pub fn new(progress_km: f64, goal_distance_km: f64) -> Self {
        let percent = progress_percent(progress_km, goal_distance_km);
        Self {
            progress_km,
            goal_distance_km,
            percent,
            bar_width: progress_bar_width(percent),
            label: format!("{:.1} / {} km", progress_km, goal_distance_km),
        }
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChallengeView {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub status: ChallengeStatus,
    pub participating: bool,
    /// Only active challenges the user has not joined can be joined.
    pub can_join: bool,
    pub progress: Option<ProgressView>,
}

impl ChallengeView {
    /// Derive status and progress for `challenge` against the user's
    /// participations. The first matching participation wins.
    pub fn new(
        challenge: Challenge,
        participations: &[ChallengeParticipant],
        now: DateTime<Utc>,
    ) -> Self {
        let status = challenge.status_at(now);
        let participation = participations
            .iter()
            .find(|p| p.challenge_id == challenge.id);
        let progress =
            participation.map(|p| ProgressView::new(p.progress_km, challenge.goal_distance_km));

        Self {
            status,
            participating: participation.is_some(),
            can_join: status == ChallengeStatus::Active && participation.is_none(),
            progress,
            challenge,
        }
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChallengesResponse {
    pub challenges: Vec<ChallengeView>,
    /// Joined challenges that are currently active.
    pub my_active: Vec<ChallengeView>,
    pub demo_mode: bool,
}

impl ChallengesResponse {
    pub fn new(
        challenges: Vec<Challenge>,
        participations: &[ChallengeParticipant],
        now: DateTime<Utc>,
        demo_mode: bool,
    ) -> Self {
        let my_active = my_active_challenges(&challenges, participations, now);
        Self {
            challenges: challenges
                .into_iter()
                .map(|c| ChallengeView::new(c, participations, now))
                .collect(),
            my_active,
            demo_mode,
        }
    }
}

/// One view per participation whose challenge exists and is active, in
/// participation order.
pub fn my_active_challenges(
    challenges: &[Challenge],
    participations: &[ChallengeParticipant],
    now: DateTime<Utc>,
) -> Vec<ChallengeView> {
    participations
        .iter()
        .filter_map(|p| {
            let challenge = challenges.iter().find(|c| c.id == p.challenge_id)?;
            (challenge.status_at(now) == ChallengeStatus::Active).then(|| ChallengeView {
                challenge: challenge.clone(),
                status: ChallengeStatus::Active,
                participating: true,
                can_join: false,
                progress: Some(ProgressView::new(p.progress_km, challenge.goal_distance_km)),
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ParticipationsResponse {
    pub participations: Vec<ChallengeParticipant>,
    pub demo_mode: bool,
}

// ─── Dashboard ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardResponse {
    pub user: UserResponse,
    pub totals: TotalsView,
    pub activities_this_week: usize,
    pub active_challenges: Vec<ChallengeView>,
    pub demo_mode: bool,
}

impl DashboardResponse {
    pub fn new(
        user: &User,
        activities: &[Activity],
        challenges: &[Challenge],
        participations: &[ChallengeParticipant],
        now: DateTime<Utc>,
        demo_mode: bool,
    ) -> Self {
        Self {
            user: user.into(),
            totals: ActivityTotals::from_activities(activities).into(),
            activities_this_week: count_this_week(activities, now.date_naive()),
            active_challenges: my_active_challenges(challenges, participations, now),
            demo_mode,
        }
    }
}

/// Activities dated within the last seven days, today included.
pub fn count_this_week(activities: &[Activity], today: NaiveDate) -> usize {
    let first_day = today - Duration::days(WEEK_DAYS - 1);
    activities
        .iter()
        .filter(|a| a.date >= first_day && a.date <= today)
        .count()
}
