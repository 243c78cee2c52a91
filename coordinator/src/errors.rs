use lingo_sdk::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Generation inputs failed validation; nothing was sent.
    #[error("Invalid generation input: {0}")]
    InvalidInput(String),
    /// Exactly one generation attempt may be in flight per coordinator.
    #[error("A generation attempt is already in flight")]
    Busy,
    /// `force` or `adopt` was called with no conflict pending.
    #[error("No duplicate-job decision is pending")]
    NoPendingDecision,
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
