//! # Payment Error Types
//!
//! Typed error handling for the M-Pesa gateway client.
//! All gateway operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all gateway operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing credentials, invalid URLs)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Token endpoint rejected the credentials or could not be reached
    #[error("Failed to obtain access token: {0}")]
    UpstreamAuth(String),

    /// Push endpoint rejected the request or could not be reached
    #[error("STK push failed: {0}")]
    UpstreamPush(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Returns the HTTP status code appropriate for this error.
    ///
    /// Every failure maps to a generic 500.
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::UpstreamAuth(_) => 500,
            PaymentError::UpstreamPush(_) => 500,
            PaymentError::Internal(_) => 500,
        }
    }
}

/// Result type alias for gateway operations
pub type PaymentResult<T> = Result<T, PaymentError>;
