use crate::DuplicateJob;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request to the backend failed or the parsing of the response
    /// failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The bearer credential was missing or rejected (HTTP 401). Never
    /// retried silently; surface to the caller as "not authenticated".
    #[error("Not authenticated")]
    Unauthorized,
    /// The requested record does not exist (HTTP 404) where absence is
    /// exceptional. Job status fetches map 404 to an absent job instead.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The backend already holds a job for equivalent inputs (HTTP 409).
    /// A decision point rather than a failure: the caller forces a new
    /// generation or adopts the existing job.
    #[error("Duplicate generation job {}", .0.id)]
    Duplicate(DuplicateJob),
    /// Well-formed error response from the backend (4xx/5xx with a
    /// structured message).
    #[error("Backend error: {1} (Status {0})")]
    Backend(reqwest::StatusCode, String),
    /// A response shape the library cannot interpret.
    #[error("Invariant: {0}")]
    Invariant(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
