//! Achievement model. Part of the schema, not yet awarded by any flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An achievement earned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}
