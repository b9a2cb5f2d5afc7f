//! Error classification by domain

use serde::{Deserialize, Serialize};

/// Classification of an error by who caused it and whether retrying helps
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Client-caused; the same request will fail again until it is changed
    Validation,
    /// The order moved underneath the caller; re-fetch and reapply
    Concurrency,
    /// Storage or I/O failure; retrying the same request may succeed
    Infrastructure,
}

impl ErrorCategory {
    /// Whether the caller may retry the request (after a refresh for
    /// concurrency errors) rather than surfacing it as a user error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCategory::Concurrency | ErrorCategory::Infrastructure
        )
    }
}
