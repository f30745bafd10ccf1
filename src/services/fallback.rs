//! What to do when a call to the hosted backend fails.
//!
//! The product behavior is to never show the user an error for data reads or
//! writes: reads fall back to demo data, writes fall back to a record kept in
//! the session's local store. `Propagate` turns that off so failures surface
//! as errors instead.

use crate::error::{AppError, Result};
use std::future::Future;
use std::str::FromStr;

/// Failure-recovery strategy for remote data calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Log the failure and answer from local state.
    #[default]
    DegradeToLocal,
    /// Return the failure to the caller.
    Propagate,
}

impl FallbackPolicy {
    /// Resolve a failed remote call for `operation`, either by running the
    /// local fallback or by handing the error back.
    pub async fn recover<T, F, Fut>(
        &self,
        operation: &'static str,
        err: AppError,
        local: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self {
            FallbackPolicy::DegradeToLocal => {
                tracing::warn!(
                    operation,
                    error = %err,
                    "Remote call failed, falling back to local data"
                );
                Ok(local().await)
            }
            FallbackPolicy::Propagate => {
                tracing::error!(operation, error = %err, "Remote call failed");
                Err(err)
            }
        }
    }
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "degrade" | "degrade_to_local" | "local" => Ok(FallbackPolicy::DegradeToLocal),
            "propagate" | "strict" => Ok(FallbackPolicy::Propagate),
            other => Err(format!("unknown fallback policy '{}'", other)),
        }
    }
}
