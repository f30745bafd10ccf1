//! Storage layer: the hosted backend client, demo fixtures and the
//! session-local fallback store.

pub mod fixtures;
pub mod local;
pub mod supabase;

pub use local::LocalStore;
pub use supabase::{AuthError, Query, SupabaseClient};

/// Table names as constants.
pub mod tables {
    pub const USERS: &str = "users";
    pub const ACTIVITIES: &str = "activities";
    pub const CHALLENGES: &str = "challenges";
    pub const CHALLENGE_PARTICIPANTS: &str = "challenge_participants";
}
