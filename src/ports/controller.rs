use crate::error::PopAuthResult;
use crate::model::{
    AccountParameters, AccountRecord, ControllerOutcome, CorrelationId, DeviceCodeAuthorization,
    DeviceCodeFlowParameters, ShrParameters, SilentTokenParameters, TokenParameters, TokenResult,
};

/// A token broker backend.
///
/// Several controllers may be installed at once; execution tries them in
/// order and falls through on recoverable service failures. Implementations
/// signal a service-level failure through [`ControllerOutcome::Failure`] and
/// reserve `Err` for infrastructure faults, which abort the whole chain.
pub trait Controller: Send + Sync {
    /// Stable name used in logs and telemetry.
    fn name(&self) -> &str;

    /// Acquire a token with user interaction.
    fn acquire_token(
        &self,
        params: &TokenParameters,
        correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>>;

    /// Acquire a token from cache or by refresh, without UI.
    fn acquire_token_silent(
        &self,
        params: &SilentTokenParameters,
        correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>>;

    /// Refresh an access token ahead of its expiry, without UI. Skips the
    /// cache lookup that `acquire_token_silent` starts with.
    fn renew_access_token(
        &self,
        params: &SilentTokenParameters,
        correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>>;

    /// Mint a signed HTTP request bound to the device key.
    fn generate_shr(
        &self,
        params: &ShrParameters,
        correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<String>>;

    /// Start a device code flow: obtain the user code and verification URI.
    fn device_code_flow_authorize(
        &self,
        params: &DeviceCodeFlowParameters,
        correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<DeviceCodeAuthorization>>;

    /// Poll a started device code flow until the user completes it.
    fn device_code_flow_poll(
        &self,
        params: &DeviceCodeFlowParameters,
        device_code: &str,
        correlation_id: &CorrelationId,
    ) -> PopAuthResult<ControllerOutcome<TokenResult>>;

    /// Accounts known to this controller's cache.
    fn load_accounts(
        &self,
        params: &AccountParameters,
        correlation_id: &CorrelationId,
    ) -> PopAuthResult<Vec<AccountRecord>>;

    /// Remove an account from this controller's cache. Returns whether
    /// anything was removed.
    fn remove_account(
        &self,
        params: &AccountParameters,
        correlation_id: &CorrelationId,
    ) -> PopAuthResult<bool>;
}
