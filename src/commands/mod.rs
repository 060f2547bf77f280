use anyhow::Result;
use chrono::{DateTime, Local};
use ironlog::{
    db::SqliteRepository,
    error::{CoreError, CoreResult},
    metrics::ProgressionRules,
    models::WorkoutLog,
    program::Program,
    repository::{DEFAULT_LOG_LIMIT, FixedIdentity, IdentityProvider, Repository},
    storage::DraftStore,
    types::OutputFmt,
};

pub mod bodyweight;
pub mod compare;
pub mod config;
pub mod graph;
pub mod home;
pub mod log;
pub mod program;
pub mod progress;
pub mod workout;

/// Everything a command needs, resolved once in `main`.
pub struct Ctx {
    pub fmt: OutputFmt,
    pub repo: SqliteRepository<FixedIdentity>,
    pub rules: ProgressionRules,
    pub drafts: DraftStore,
    pub user: Option<String>,
}

impl Ctx {
    pub fn user(&self) -> CoreResult<String> {
        FixedIdentity::new(self.user.clone()).require_user()
    }

    pub async fn program(&self) -> Result<Program> {
        Ok(Program::new(self.repo.load_program().await?))
    }

    pub async fn logs(&self) -> Result<Vec<WorkoutLog>> {
        Ok(self.repo.load_logs(DEFAULT_LOG_LIMIT).await?)
    }
}

/// 1-based position as typed by the user -> 0-based index.
pub fn index(n: usize, what: &str) -> CoreResult<usize> {
    n.checked_sub(1)
        .ok_or_else(|| CoreError::validation(format!("{what} index must be ≥ 1")))
}

/// The item at a 1-based position from a listing.
pub fn nth<'a, T>(items: &'a [T], n: usize, what: &str) -> CoreResult<&'a T> {
    items.get(index(n, what)?).ok_or_else(|| {
        CoreError::validation(format!("no {what} at position {n} (there are {})", items.len()))
    })
}

pub fn fmt_date(d: DateTime<Local>) -> String {
    d.format("%a %d %b %Y").to_string()
}

pub fn fmt_datetime(d: DateTime<Local>) -> String {
    d.format("%Y-%m-%d %H:%M").to_string()
}
