//! Controller operation outcomes
//!
//! Controllers report expected, enumerable failures through a result value
//! rather than an error path, so the dispatch loop can branch on codes
//! without exception-style control flow. Transport and programming errors
//! still travel on the `Err` channel and are never eligible for fallback.

use std::fmt;

/// Error code carried by a controller failure.
///
/// Matching is exact and case-sensitive; the three named codes are the only
/// ones any fallback policy may treat as recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The refresh token was rejected by the service
    InvalidGrant,
    /// The backend holds no account matching the request hints
    NoAccountFound,
    /// The backend holds no cached tokens for the account
    NoTokensFound,
    /// Any other service-defined code
    Other(String),
}

impl ErrorCode {
    pub const INVALID_GRANT: &'static str = "invalid_grant";
    pub const NO_ACCOUNT_FOUND: &'static str = "no_account_found";
    pub const NO_TOKENS_FOUND: &'static str = "no_tokens_found";

    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::InvalidGrant => Self::INVALID_GRANT,
            ErrorCode::NoAccountFound => Self::NO_ACCOUNT_FOUND,
            ErrorCode::NoTokensFound => Self::NO_TOKENS_FOUND,
            ErrorCode::Other(code) => code,
        }
    }

    /// Classify a wire-level code string. Unrecognized codes stay opaque.
    pub fn from_code(code: &str) -> Self {
        match code {
            Self::INVALID_GRANT => ErrorCode::InvalidGrant,
            Self::NO_ACCOUNT_FOUND => ErrorCode::NoAccountFound,
            Self::NO_TOKENS_FOUND => ErrorCode::NoTokensFound,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error-code-bearing failure reported by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub code: ErrorCode,
    pub message: String,
}

impl ServiceFailure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Outcome of a single controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerOutcome<T> {
    /// The operation produced its payload
    Success(T),
    /// The operation completed but the service answered with an error code
    Failure(ServiceFailure),
}

impl<T> ControllerOutcome<T> {
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        ControllerOutcome::Failure(ServiceFailure::new(code, message))
    }
}
