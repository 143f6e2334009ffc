use thiserror::Error;

/// Failures reported by the managed backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport failures and 5xx responses alike
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Invalid(String),
}
