//! Error types for cellar-advisor
//!
//! The engine itself never fails; these errors cover the collaborators it
//! consults (profile generator, caches, stores). Every one of them is
//! recoverable by falling back.

use thiserror::Error;

/// Profile provider errors
#[derive(Debug, Error)]
pub enum ProfileError {
    /// No generator configured or service unreachable
    #[error("Profile service unavailable: {0}")]
    Unavailable(String),

    /// Generator did not answer in time
    #[error("Profile generation timed out after {0} ms")]
    Timeout(u64),

    /// Generator answered with something unusable
    #[error("Invalid profile response: {0}")]
    InvalidResponse(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Profile cache read/write failed
    #[error("Profile store error: {0}")]
    Store(#[from] cellar_common::Error),
}
