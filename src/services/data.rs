// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dual-mode data access.
//!
//! Every operation decides per call whether to use the hosted backend or the
//! session's local store, so route handlers never branch on configuration:
//! - no backend configured: answer from local state, no network call
//! - backend configured: query it; on failure apply the `FallbackPolicy`
//!
//! Writes to the backend are followed by a full re-fetch rather than merging
//! the new record locally. Successful reads are mirrored into the session's
//! local store, so a failed write lands on top of the user's own rows.

use crate::db::fixtures;
use crate::db::supabase::{Query, SupabaseClient};
use crate::db::tables;
use crate::error::Result;
use crate::models::activity::ActivityInsert;
use crate::models::challenge::{ChallengeInsert, ParticipantInsert};
use crate::models::{Activity, Challenge, ChallengeParticipant, NewActivity, NewChallenge, NewProfile, User};
use crate::services::fallback::FallbackPolicy;
use crate::services::session::Session;
use chrono::Utc;

/// Data-access service shared by all route handlers.
#[derive(Clone)]
pub struct DataService {
    remote: Option<SupabaseClient>,
    policy: FallbackPolicy,
}

impl DataService {
    pub fn new(remote: Option<SupabaseClient>, policy: FallbackPolicy) -> Self {
        Self { remote, policy }
    }

    /// Demo-mode service: never touches the network.
    pub fn demo() -> Self {
        Self::new(None, FallbackPolicy::default())
    }

    // ─── Activities ──────────────────────────────────────────────

    /// Activities of `user_id`, most recent date first.
    pub async fn fetch_activities(&self, session: &Session, user_id: &str) -> Result<Vec<Activity>> {
        let Some(remote) = &self.remote else {
            return Ok(session.local().activities().await);
        };

        match Self::sync_activities(remote, session, user_id).await {
            Ok(rows) => Ok(rows),
            Err(err) => {
                self.policy
                    .recover("fetch_activities", err, move || session.local().activities())
                    .await
            }
        }
    }

    /// Query the backend and mirror the rows into the session's local store.
    async fn sync_activities(
        remote: &SupabaseClient,
        session: &Session,
        user_id: &str,
    ) -> Result<Vec<Activity>> {
        let query = Query::new().eq("user_id", user_id).order_desc("date");
        let rows: Vec<Activity> = remote
            .select(session.access_token(), tables::ACTIVITIES, &query)
            .await?;
        session.local().replace_activities(rows.clone()).await;
        Ok(rows)
    }

    /// Record a new activity and return the updated list.
    ///
    /// If the insert fails and the policy degrades, the record is synthesized
    /// locally and put in front of the latest list the backend returned.
    pub async fn add_activity(
        &self,
        session: &Session,
        user_id: &str,
        activity: NewActivity,
    ) -> Result<Vec<Activity>> {
        let Some(remote) = &self.remote else {
            let added = session
                .local()
                .add_activity(user_id, activity, Utc::now())
                .await;
            tracing::debug!(activity_id = %added.id, "Activity stored locally");
            return Ok(session.local().activities().await);
        };

        let row = ActivityInsert {
            activity: &activity,
            user_id,
        };
        let inserted = remote
            .insert(session.access_token(), tables::ACTIVITIES, &row)
            .await;
        match inserted {
            Ok(()) => {
                tracing::info!(user_id, "Activity inserted");
                self.fetch_activities(session, user_id).await
            }
            Err(err) => {
                self.policy
                    .recover("add_activity", err, move || async move {
                        if let Err(err) = Self::sync_activities(remote, session, user_id).await {
                            tracing::debug!(error = %err, "Keeping last known activities");
                        }
                        session
                            .local()
                            .add_activity(user_id, activity, Utc::now())
                            .await;
                        session.local().activities().await
                    })
                    .await
            }
        }
    }

    // ─── Challenges ──────────────────────────────────────────────

    /// All challenges, latest start date first.
    pub async fn fetch_challenges(&self, session: &Session) -> Result<Vec<Challenge>> {
        let Some(remote) = &self.remote else {
            return Ok(session.local().challenges().await);
        };

        match Self::sync_challenges(remote, session).await {
            Ok(rows) => Ok(rows),
            Err(err) => {
                self.policy
                    .recover("fetch_challenges", err, move || session.local().challenges())
                    .await
            }
        }
    }

    async fn sync_challenges(remote: &SupabaseClient, session: &Session) -> Result<Vec<Challenge>> {
        let query = Query::new().order_desc("start_date");
        let rows: Vec<Challenge> = remote
            .select(session.access_token(), tables::CHALLENGES, &query)
            .await?;
        session.local().replace_challenges(rows.clone()).await;
        Ok(rows)
    }

    /// Create a challenge owned by `user_id` and return the updated list.
    pub async fn create_challenge(
        &self,
        session: &Session,
        user_id: &str,
        challenge: NewChallenge,
    ) -> Result<Vec<Challenge>> {
        let Some(remote) = &self.remote else {
            session
                .local()
                .add_challenge(user_id, challenge, Utc::now())
                .await;
            return Ok(session.local().challenges().await);
        };

        let row = ChallengeInsert {
            challenge: &challenge,
            created_by: user_id,
        };
        let inserted = remote
            .insert(session.access_token(), tables::CHALLENGES, &row)
            .await;
        match inserted {
            Ok(()) => {
                tracing::info!(user_id, title = %challenge.title, "Challenge created");
                self.fetch_challenges(session).await
            }
            Err(err) => {
                self.policy
                    .recover("create_challenge", err, move || async move {
                        if let Err(err) = Self::sync_challenges(remote, session).await {
                            tracing::debug!(error = %err, "Keeping last known challenges");
                        }
                        session
                            .local()
                            .add_challenge(user_id, challenge, Utc::now())
                            .await;
                        session.local().challenges().await
                    })
                    .await
            }
        }
    }

    // ─── Participations ──────────────────────────────────────────

    /// Challenges `user_id` has joined.
    pub async fn fetch_participations(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<Vec<ChallengeParticipant>> {
        let Some(remote) = &self.remote else {
            return Ok(session.local().participations().await);
        };

        match Self::sync_participations(remote, session, user_id).await {
            Ok(rows) => Ok(rows),
            Err(err) => {
                self.policy
                    .recover("fetch_participations", err, move || session.local().participations())
                    .await
            }
        }
    }

    async fn sync_participations(
        remote: &SupabaseClient,
        session: &Session,
        user_id: &str,
    ) -> Result<Vec<ChallengeParticipant>> {
        let query = Query::new().eq("user_id", user_id);
        let rows: Vec<ChallengeParticipant> = remote
            .select(session.access_token(), tables::CHALLENGE_PARTICIPANTS, &query)
            .await?;
        session.local().replace_participations(rows.clone()).await;
        Ok(rows)
    }

    /// Join a challenge with zero progress and return the updated
    /// participation list. Repeated joins are not rejected.
    pub async fn join_challenge(
        &self,
        session: &Session,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<Vec<ChallengeParticipant>> {
        let Some(remote) = &self.remote else {
            session
                .local()
                .add_participation(challenge_id, user_id, Utc::now())
                .await;
            return Ok(session.local().participations().await);
        };

        let row = ParticipantInsert {
            challenge_id,
            user_id,
            progress_km: 0.0,
        };
        let inserted = remote
            .insert(session.access_token(), tables::CHALLENGE_PARTICIPANTS, &row)
            .await;
        match inserted {
            Ok(()) => {
                tracing::info!(user_id, challenge_id, "Joined challenge");
                self.fetch_participations(session, user_id).await
            }
            Err(err) => {
                self.policy
                    .recover("join_challenge", err, move || async move {
                        if let Err(err) = Self::sync_participations(remote, session, user_id).await {
                            tracing::debug!(error = %err, "Keeping last known participations");
                        }
                        session
                            .local()
                            .add_participation(challenge_id, user_id, Utc::now())
                            .await;
                        session.local().participations().await
                    })
                    .await
            }
        }
    }

    // ─── Profiles ────────────────────────────────────────────────

    /// Profile row for `user_id`. Errors are returned, not recovered: the
    /// auth flow decides what a missing profile means.
    pub async fn fetch_profile(&self, session: &Session, user_id: &str) -> Result<Option<User>> {
        let Some(remote) = &self.remote else {
            return Ok(Some(fixtures::demo_user(Utc::now())));
        };

        let query = Query::new().eq("id", user_id);
        let rows: Vec<User> = remote
            .select(session.access_token(), tables::USERS, &query)
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Insert the profile row for a freshly signed-up user.
    pub async fn create_profile(&self, access_token: Option<&str>, profile: &NewProfile) -> Result<()> {
        let Some(remote) = &self.remote else {
            return Ok(());
        };

        remote.insert(access_token, tables::USERS, profile).await
    }
}
