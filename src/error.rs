use thiserror::Error;

/// Errors surfaced by the core and the repository boundary.
///
/// Metrics and view builders never produce these; they coerce bad numbers to
/// zero instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Repository(String),

    #[error("not signed in")]
    Unauthorized,
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    /// `NotFound` counts as a repository failure; callers should refresh.
    pub fn is_repository(&self) -> bool {
        matches!(self, CoreError::Repository(_) | CoreError::NotFound(_))
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => CoreError::NotFound("no matching row".to_string()),
            other => CoreError::Repository(other.to_string()),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
