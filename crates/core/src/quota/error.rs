//! Quota error types.

use thiserror::Error;

/// Quota operation errors.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// Reading from the profile store failed or found no profile.
    #[error("profile lookup failed: {0}")]
    Lookup(String),

    /// Writing to the profile store failed.
    #[error("profile update failed: {0}")]
    Update(String),

    /// Requested limit is not a valid size.
    #[error("invalid upload limit: {0}")]
    InvalidLimit(String),
}

impl QuotaError {
    /// Create a lookup error.
    #[must_use]
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Create an update error.
    #[must_use]
    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }
}
