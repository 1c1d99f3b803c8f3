//! Commands: immutable descriptions of one unit of work.
//!
//! A command pairs a [`CommandRequest`] with bookkeeping (public API id,
//! correlation id). The bookkeeping never influences identity: the
//! dispatcher coalesces commands by [`CommandKey`], which is derived from
//! the request alone, so two callers asking for the same work share one
//! execution even when their correlation ids differ.

use crate::model::{
    AccountParameters, CorrelationId, DeviceCodeFlowParameters, ShrParameters,
    SilentTokenParameters, TokenParameters,
};

/// The work a command asks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandRequest {
    AcquireToken(TokenParameters),
    AcquireTokenSilent(SilentTokenParameters),
    GenerateShr(ShrParameters),
    /// Both device code flow phases as one unit: authorize, surface the
    /// user code, then poll. The phases cannot be submitted separately.
    DeviceCodeFlow(DeviceCodeFlowParameters),
    LoadAccounts(AccountParameters),
    RemoveAccount(AccountParameters),
    RefreshOn(SilentTokenParameters),
}

impl CommandRequest {
    /// Whether a concurrent identical request may share this one's
    /// execution. Requests that drive user interaction never coalesce.
    pub fn is_deduplicable(&self) -> bool {
        !matches!(self, Self::AcquireToken(_) | Self::DeviceCodeFlow(_))
    }

    /// Whether executing this request may put UI on screen.
    pub fn creates_ui(&self) -> bool {
        matches!(self, Self::AcquireToken(_))
    }

    /// Whether executing this request reaches the token endpoint; such
    /// executions each emit one structured telemetry event.
    pub fn is_eligible_for_telemetry(&self) -> bool {
        matches!(
            self,
            Self::AcquireToken(_)
                | Self::AcquireTokenSilent(_)
                | Self::DeviceCodeFlow(_)
                | Self::RefreshOn(_)
        )
    }
}

/// One unit of work handed to the dispatcher.
#[derive(Debug, Clone)]
pub struct Command {
    request: CommandRequest,
    public_api_id: String,
    correlation_id: CorrelationId,
}

impl Command {
    pub fn new(request: CommandRequest, public_api_id: impl Into<String>) -> Self {
        Self {
            request,
            public_api_id: public_api_id.into(),
            correlation_id: CorrelationId::new(),
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn request(&self) -> &CommandRequest {
        &self.request
    }

    pub fn public_api_id(&self) -> &str {
        &self.public_api_id
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Identity for in-flight coalescing. Derived from the request only;
    /// correlation id and public API id are deliberately excluded.
    pub fn key(&self) -> CommandKey {
        CommandKey(self.request.clone())
    }
}

/// Coalescing key: two commands with equal keys describe the same work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandKey(CommandRequest);
