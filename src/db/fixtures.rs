//! Static demo data served when no backend is configured.
//!
//! Relative dates ("yesterday", "this week") are computed from `now` so the
//! demo always shows a fresh dashboard.

use crate::models::{Achievement, Activity, Challenge, ChallengeParticipant, User};
use crate::time_utils::utc_date;
use chrono::{DateTime, Duration, NaiveDate, Utc};

pub const DEMO_USER_ID: &str = "demo-user-1";

pub fn demo_user(now: DateTime<Utc>) -> User {
    User {
        id: DEMO_USER_ID.to_string(),
        name: "Usuário Demo".to_string(),
        email: "demo@andra.com".to_string(),
        avatar_url: Some("https://api.dicebear.com/7.x/avataaars/svg?seed=demo".to_string()),
        created_at: now,
    }
}

pub fn demo_activities(now: DateTime<Utc>) -> Vec<Activity> {
    vec![
        Activity {
            id: "1".to_string(),
            user_id: DEMO_USER_ID.to_string(),
            activity_type: "corrida".to_string(),
            distance_km: 5.2,
            duration_min: 32,
            calories: 312,
            date: utc_date(now - Duration::days(1)),
            created_at: now,
        },
        Activity {
            id: "2".to_string(),
            user_id: DEMO_USER_ID.to_string(),
            activity_type: "caminhada".to_string(),
            distance_km: 3.1,
            duration_min: 45,
            calories: 186,
            date: utc_date(now - Duration::days(2)),
            created_at: now,
        },
    ]
}

pub fn demo_challenges(now: DateTime<Utc>) -> Vec<Challenge> {
    vec![
        Challenge {
            id: "1".to_string(),
            title: "Desafio 50km em Janeiro".to_string(),
            description: "Complete 50km de atividades físicas durante o mês de janeiro. \
                          Qualquer modalidade conta!"
                .to_string(),
            goal_distance_km: 50.0,
            start_date: ymd(2024, 1, 1),
            end_date: ymd(2024, 1, 31),
            created_by: DEMO_USER_ID.to_string(),
        },
        Challenge {
            id: "2".to_string(),
            title: "Corrida Semanal".to_string(),
            description: "Corra pelo menos 15km por semana. Vamos manter a consistência!"
                .to_string(),
            goal_distance_km: 15.0,
            start_date: utc_date(now),
            end_date: utc_date(now + Duration::days(7)),
            created_by: DEMO_USER_ID.to_string(),
        },
    ]
}

pub fn demo_participants(now: DateTime<Utc>) -> Vec<ChallengeParticipant> {
    vec![ChallengeParticipant {
        id: "1".to_string(),
        challenge_id: "1".to_string(),
        user_id: DEMO_USER_ID.to_string(),
        progress_km: 8.3,
        joined_at: now,
    }]
}

pub fn demo_achievements() -> Vec<Achievement> {
    Vec::new()
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
