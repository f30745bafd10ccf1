//! Derived statistics computed from activity lists and participations.
//!
//! Nothing here is persisted; values are recomputed on every request from
//! whatever list the data layer returned.

use serde::Serialize;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Activity;

/// Sums over an activity list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityTotals {
    /// Number of activities
    pub count: u32,
    /// Total distance (km)
    pub distance_km: f64,
    /// Total estimated calories
    pub calories: u64,
    /// Total duration (minutes)
    pub duration_min: u64,
    /// Activity count per category
    pub activities_by_type: BTreeMap<String, u32>,
}

impl ActivityTotals {
    /// Linear sum over the given activities.
    pub fn from_activities(activities: &[Activity]) -> Self {
        let mut totals = Self::default();
        for activity in activities {
            totals.add(activity);
        }
        totals
    }

    fn add(&mut self, activity: &Activity) {
        self.count += 1;
        self.distance_km += activity.distance_km;
        self.calories += u64::from(activity.calories);
        self.duration_min += u64::from(activity.duration_min);
        *self
            .activities_by_type
            .entry(activity.activity_type.to_lowercase())
            .or_insert(0) += 1;
    }

    /// Distance with one decimal, e.g. "8.3".
    pub fn distance_label(&self) -> String {
        format!("{:.1}", self.distance_km)
    }

    /// Duration as hours and minutes, e.g. "1h 17m".
    pub fn duration_label(&self) -> String {
        format!("{}h {}m", self.duration_min / 60, self.duration_min % 60)
    }
}

/// Share of the goal covered, in percent. Not clamped: overshooting a goal
/// yields values above 100.
pub fn progress_percent(progress_km: f64, goal_distance_km: f64) -> f64 {
    if goal_distance_km <= 0.0 {
        return 0.0;
    }
    progress_km / goal_distance_km * 100.0
}

/// Progress bar width in percent, clamped to `0..=100` for display.
pub fn progress_bar_width(percent: f64) -> f64 {
    percent.clamp(0.0, 100.0)
}
