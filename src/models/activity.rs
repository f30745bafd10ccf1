// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Logged physical activity model and the activity form.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Rough calorie burn per km, used when the user doesn't enter calories.
const CALORIES_PER_KM: f64 = 60.0;

/// Stored activity record (`activities` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Activity {
    pub id: String,
    /// Owner
    pub user_id: String,
    /// Free-text category (corrida, caminhada, ...)
    #[serde(rename = "type")]
    pub activity_type: String,
    pub distance_km: f64,
    pub duration_min: u32,
    pub calories: u32,
    /// Day the activity happened
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    /// Build a locally-held activity from form data.
    pub fn from_new(id: String, user_id: &str, new: NewActivity, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            activity_type: new.activity_type,
            distance_km: new.distance_km,
            duration_min: new.duration_min,
            calories: new.calories,
            date: new.date,
            created_at: now,
        }
    }
}

/// Activity fields supplied by the user; id, owner and timestamp are assigned later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub distance_km: f64,
    pub duration_min: u32,
    pub calories: u32,
    pub date: NaiveDate,
}

/// Insert payload: the new activity with its owner attached.
#[derive(Debug, Serialize)]
pub struct ActivityInsert<'a> {
    #[serde(flatten)]
    pub activity: &'a NewActivity,
    pub user_id: &'a str,
}

fn default_activity_type() -> String {
    "corrida".to_string()
}

/// "New activity" form submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActivityForm {
    #[serde(rename = "type", default = "default_activity_type")]
    #[validate(length(min = 1, max = 50))]
    pub activity_type: String,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub distance_km: f64,
    #[validate(range(max = 10000))]
    pub duration_min: u32,
    /// Defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl ActivityForm {
    /// Resolve defaults and estimate calories.
    pub fn into_new_activity(self, today: NaiveDate) -> NewActivity {
        NewActivity {
            calories: estimate_calories(self.distance_km),
            activity_type: self.activity_type.trim().to_string(),
            distance_km: self.distance_km,
            duration_min: self.duration_min,
            date: self.date.unwrap_or(today),
        }
    }
}

/// Simple estimate: 60 kcal per km, rounded.
pub fn estimate_calories(distance_km: f64) -> u32 {
    (distance_km.max(0.0) * CALORIES_PER_KM).round() as u32
}

/// Emoji shown next to an activity of the given category.
pub fn activity_icon(activity_type: &str) -> &'static str {
    match activity_type.to_lowercase().as_str() {
        "corrida" => "🏃‍♂️",
        "caminhada" => "🚶‍♂️",
        "pedalada" => "🚴‍♂️",
        "natação" => "🏊‍♂️",
        _ => "💪",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_calories() {
        assert_eq!(estimate_calories(5.2), 312);
        assert_eq!(estimate_calories(3.1), 186);
        assert_eq!(estimate_calories(0.0), 0);
    }

    #[test]
    fn test_activity_icon() {
        assert_eq!(activity_icon("Corrida"), "🏃‍♂️");
        assert_eq!(activity_icon("NATAÇÃO"), "🏊‍♂️");
        assert_eq!(activity_icon("musculação"), "💪");
    }

    #[test]
    fn test_form_defaults() {
        let form: ActivityForm =
            serde_json::from_value(serde_json::json!({"distance_km": 4.0, "duration_min": 25}))
                .unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let new = form.into_new_activity(today);

        assert_eq!(new.activity_type, "corrida");
        assert_eq!(new.date, today);
        assert_eq!(new.calories, 240);
    }

    #[test]
    fn test_form_rejects_negative_distance() {
        let form = ActivityForm {
            activity_type: "corrida".to_string(),
            distance_km: -1.0,
            duration_min: 10,
            date: None,
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_insert_payload_shape() {
        let new = NewActivity {
            activity_type: "pedalada".to_string(),
            distance_km: 20.5,
            duration_min: 60,
            calories: 1230,
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        };
        let value = serde_json::to_value(ActivityInsert {
            activity: &new,
            user_id: "u1",
        })
        .unwrap();

        assert_eq!(value["type"], "pedalada");
        assert_eq!(value["date"], "2024-02-01");
        assert_eq!(value["user_id"], "u1");
        assert!(value.get("id").is_none());
    }
}
