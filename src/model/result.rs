//! Command results and their payloads.

use std::sync::Arc;

use crate::error::PopAuthError;
use crate::model::CorrelationId;

/// Terminal state of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Completed,
    Cancelled,
    Error,
}

/// The outcome delivered to every observer of a command.
///
/// Results fan out to all callers that coalesced onto one execution, so the
/// error arm shares its payload behind an [`Arc`] rather than cloning it.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Completed {
        correlation_id: CorrelationId,
        payload: CommandPayload,
    },
    Cancelled {
        correlation_id: CorrelationId,
    },
    Failed {
        correlation_id: CorrelationId,
        error: Arc<PopAuthError>,
    },
}

impl CommandResult {
    pub fn completed(correlation_id: CorrelationId, payload: CommandPayload) -> Self {
        Self::Completed {
            correlation_id,
            payload,
        }
    }

    pub fn failed(correlation_id: CorrelationId, error: PopAuthError) -> Self {
        Self::Failed {
            correlation_id,
            error: Arc::new(error),
        }
    }

    pub fn status(&self) -> CommandStatus {
        match self {
            Self::Completed { .. } => CommandStatus::Completed,
            Self::Cancelled { .. } => CommandStatus::Cancelled,
            Self::Failed { .. } => CommandStatus::Error,
        }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        match self {
            Self::Completed { correlation_id, .. }
            | Self::Cancelled { correlation_id }
            | Self::Failed { correlation_id, .. } => correlation_id,
        }
    }
}

/// What a successfully completed command carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPayload {
    Token(TokenResult),
    Accounts(Vec<AccountRecord>),
    Shr(String),
    Removed(bool),
    Void,
}

/// A token acquisition result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResult {
    pub access_token: String,
    pub id_token: Option<String>,
    pub home_account_id: String,
    pub scopes: Vec<String>,
    pub expires_in: u64,
}

/// An account known to a controller's cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub home_account_id: String,
    pub username: String,
    pub environment: String,
}

/// A device code flow authorization: the user-facing code and URI plus
/// the device code the flow polls with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCodeAuthorization {
    pub verification_uri: String,
    pub user_code: String,
    pub device_code: String,
    pub message: String,
    pub expires_in: u64,
}
