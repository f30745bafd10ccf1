//! Session-local in-memory store used in demo mode and as the write fallback.
//!
//! Each session owns one store, seeded from the demo fixtures. Nothing here
//! outlives the session.

use crate::db::fixtures;
use crate::models::{Activity, Challenge, ChallengeParticipant, NewActivity, NewChallenge};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// Issues time-based ids (epoch milliseconds), bumped when two ids would
/// land on the same millisecond.
#[derive(Debug, Default)]
pub struct LocalIdGenerator {
    last: AtomicI64,
}

impl LocalIdGenerator {
    pub fn next(&self, now: DateTime<Utc>) -> String {
        let now_ms = now.timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_ms.max(last + 1))
            })
            .unwrap_or(now_ms);
        now_ms.max(previous + 1).to_string()
    }
}

/// In-memory copies of the lists a session has seen.
#[derive(Debug, Default)]
pub struct LocalStore {
    activities: RwLock<Vec<Activity>>,
    challenges: RwLock<Vec<Challenge>>,
    participants: RwLock<Vec<ChallengeParticipant>>,
    ids: LocalIdGenerator,
}

impl LocalStore {
    /// Store pre-filled with the demo fixtures.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self {
            activities: RwLock::new(fixtures::demo_activities(now)),
            challenges: RwLock::new(fixtures::demo_challenges(now)),
            participants: RwLock::new(fixtures::demo_participants(now)),
            ids: LocalIdGenerator::default(),
        }
    }

    pub async fn activities(&self) -> Vec<Activity> {
        self.activities.read().await.clone()
    }

    /// Synthesize an activity and put it at the front of the list.
    pub async fn add_activity(
        &self,
        user_id: &str,
        new: NewActivity,
        now: DateTime<Utc>,
    ) -> Activity {
        let activity = Activity::from_new(self.ids.next(now), user_id, new, now);
        self.activities.write().await.insert(0, activity.clone());
        activity
    }

    /// Replace the activity list with rows read from the backend.
    pub async fn replace_activities(&self, activities: Vec<Activity>) {
        *self.activities.write().await = activities;
    }

    pub async fn challenges(&self) -> Vec<Challenge> {
        self.challenges.read().await.clone()
    }

    /// Synthesize a challenge and put it at the front of the list.
    pub async fn add_challenge(
        &self,
        created_by: &str,
        new: NewChallenge,
        now: DateTime<Utc>,
    ) -> Challenge {
        let challenge = Challenge::from_new(self.ids.next(now), created_by, new);
        self.challenges.write().await.insert(0, challenge.clone());
        challenge
    }

    pub async fn replace_challenges(&self, challenges: Vec<Challenge>) {
        *self.challenges.write().await = challenges;
    }

    pub async fn participations(&self) -> Vec<ChallengeParticipant> {
        self.participants.read().await.clone()
    }

    /// Synthesize a participation with zero progress and append it.
    /// Joining the same challenge twice is allowed.
    pub async fn add_participation(
        &self,
        challenge_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ChallengeParticipant {
        let participant = ChallengeParticipant {
            id: self.ids.next(now),
            challenge_id: challenge_id.to_string(),
            user_id: user_id.to_string(),
            progress_km: 0.0,
            joined_at: now,
        };
        self.participants.write().await.push(participant.clone());
        participant
    }

    pub async fn replace_participations(&self, participants: Vec<ChallengeParticipant>) {
        *self.participants.write().await = participants;
    }

    /// Drop everything held for the session.
    pub async fn clear(&self) {
        self.activities.write().await.clear();
        self.challenges.write().await.clear();
        self.participants.write().await.clear();
    }
}
