//! Storage contract consumed by the core.

use crate::{
    error::{CoreError, CoreResult},
    models::{BodyWeightEntry, NewWorkoutLog, ProgramDay, WorkoutLog},
};

pub const DEFAULT_LOG_LIMIT: u32 = 100;
pub const DEFAULT_BODY_WEIGHT_LIMIT: u32 = 365;

/// Who is signed in. The core never caches or guesses an identity.
pub trait IdentityProvider {
    fn current_user_id(&self) -> Option<String>;

    fn require_user(&self) -> CoreResult<String> {
        self.current_user_id()
            .filter(|id| !id.trim().is_empty())
            .ok_or(CoreError::Unauthorized)
    }
}

/// Identity fixed for the lifetime of the process, e.g. from a flag or config.
#[derive(Debug, Clone, Default)]
pub struct FixedIdentity(Option<String>);

impl FixedIdentity {
    pub fn new(user: Option<String>) -> Self {
        Self(user)
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for FixedIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Per-user persistence of program days, logs and body-weight entries.
///
/// Composite saves are all-or-nothing. Every call fails with
/// [`CoreError::Unauthorized`] when nobody is signed in.
#[allow(async_fn_in_trait)]
pub trait Repository {
    /// Days ordered by day of week, exercises by order.
    async fn load_program(&self) -> CoreResult<Vec<ProgramDay>>;

    /// Create, or replace when `existing_id` is given. Returns the day id.
    async fn save_program_day(&self, day: &ProgramDay, existing_id: Option<&str>)
    -> CoreResult<String>;

    async fn delete_program_day(&self, id: &str) -> CoreResult<()>;

    /// Newest first.
    async fn load_logs(&self, limit: u32) -> CoreResult<Vec<WorkoutLog>>;

    /// Stores the log with a storage-assigned timestamp. Returns the log id.
    async fn save_workout_log(&self, log: &NewWorkoutLog) -> CoreResult<String>;

    /// Newest first.
    async fn load_body_weight_entries(&self, limit: u32) -> CoreResult<Vec<BodyWeightEntry>>;

    async fn save_body_weight_entry(&self, weight: f64, note: &str) -> CoreResult<String>;

    async fn delete_body_weight_entry(&self, id: &str) -> CoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_user() {
        assert_eq!(FixedIdentity::user("ana").require_user(), Ok("ana".to_string()));
        assert_eq!(FixedIdentity::anonymous().require_user(), Err(CoreError::Unauthorized));
        assert_eq!(
            FixedIdentity::new(Some("  ".to_string())).require_user(),
            Err(CoreError::Unauthorized)
        );
    }
}
