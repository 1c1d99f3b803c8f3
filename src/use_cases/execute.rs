//! Runs one command against the controller chain.

use std::sync::Arc;

use crate::error::{CommandError, PopAuthError, PopAuthResult};
use crate::logic::{run_with_fallback, FallbackPolicy};
use crate::model::{
    Command, CommandPayload, CommandRequest, ControllerOutcome, CorrelationId,
    DeviceCodeAuthorization, DeviceCodeFlowParameters, ServiceFailure, TokenResult,
};
use crate::ports::{Controller, TelemetrySink};

/// Stateless executor over a fixed, ordered controller chain.
///
/// Silent acquisition and SHR minting walk the whole chain under their
/// fallback policies. Interactive and device-code flows only ever talk to
/// the default (first) controller: a second controller cannot take over a
/// user interaction half way. Account operations aggregate across every
/// controller instead of falling through.
pub struct CommandExecutor {
    controllers: Vec<Arc<dyn Controller>>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl CommandExecutor {
    pub fn new(controllers: Vec<Arc<dyn Controller>>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            controllers,
            telemetry,
        }
    }

    pub fn execute(&self, command: &Command) -> PopAuthResult<CommandPayload> {
        let correlation_id = command.correlation_id();
        match command.request() {
            CommandRequest::AcquireToken(params) => {
                let controller = self.default_controller()?;
                match controller.acquire_token(params, correlation_id)? {
                    ControllerOutcome::Success(token) => Ok(CommandPayload::Token(token)),
                    ControllerOutcome::Failure(failure) => Err(service_error(failure)),
                }
            }
            CommandRequest::AcquireTokenSilent(params) => run_with_fallback(
                &self.controllers,
                &FallbackPolicy::silent(),
                self.telemetry.as_ref(),
                |controller| controller.acquire_token_silent(params, correlation_id),
            )
            .map(CommandPayload::Token),
            CommandRequest::RefreshOn(params) => run_with_fallback(
                &self.controllers,
                &FallbackPolicy::silent(),
                self.telemetry.as_ref(),
                |controller| controller.renew_access_token(params, correlation_id),
            )
            .map(CommandPayload::Token),
            CommandRequest::GenerateShr(params) => run_with_fallback(
                &self.controllers,
                &FallbackPolicy::signed_http_request(),
                self.telemetry.as_ref(),
                |controller| controller.generate_shr(params, correlation_id),
            )
            .map(CommandPayload::Shr),
            CommandRequest::DeviceCodeFlow(params) => self
                .device_code_flow(params, correlation_id, &|_| {})
                .map(CommandPayload::Token),
            CommandRequest::LoadAccounts(params) => {
                self.load_accounts(params, correlation_id).map(CommandPayload::Accounts)
            }
            CommandRequest::RemoveAccount(params) => {
                self.remove_account(params, correlation_id).map(CommandPayload::Removed)
            }
        }
    }

    /// Both device code flow phases on the default controller: authorize,
    /// hand the user code to `on_user_code`, then poll. Polling cannot be
    /// reached without a successful authorization.
    pub fn device_code_flow(
        &self,
        params: &DeviceCodeFlowParameters,
        correlation_id: &CorrelationId,
        on_user_code: &dyn Fn(&DeviceCodeAuthorization),
    ) -> PopAuthResult<TokenResult> {
        let controller = self.default_controller()?;
        let authorization = match controller.device_code_flow_authorize(params, correlation_id)? {
            ControllerOutcome::Success(authorization) => authorization,
            ControllerOutcome::Failure(failure) => return Err(service_error(failure)),
        };
        on_user_code(&authorization);
        match controller.device_code_flow_poll(
            params,
            &authorization.device_code,
            correlation_id,
        )? {
            ControllerOutcome::Success(token) => Ok(token),
            ControllerOutcome::Failure(failure) => Err(service_error(failure)),
        }
    }

    fn default_controller(&self) -> PopAuthResult<&dyn Controller> {
        self.controllers
            .first()
            .map(|controller| controller.as_ref())
            .ok_or_else(|| CommandError::NoControllersAvailable.into())
    }

    fn load_accounts(
        &self,
        params: &crate::model::AccountParameters,
        correlation_id: &CorrelationId,
    ) -> PopAuthResult<Vec<crate::model::AccountRecord>> {
        if self.controllers.is_empty() {
            return Err(CommandError::NoControllersAvailable.into());
        }
        let mut accounts = Vec::new();
        for controller in &self.controllers {
            accounts.extend(controller.load_accounts(params, correlation_id)?);
        }
        Ok(accounts)
    }

    fn remove_account(
        &self,
        params: &crate::model::AccountParameters,
        correlation_id: &CorrelationId,
    ) -> PopAuthResult<bool> {
        if self.controllers.is_empty() {
            return Err(CommandError::NoControllersAvailable.into());
        }
        let mut removed = false;
        for controller in &self.controllers {
            removed |= controller.remove_account(params, correlation_id)?;
        }
        Ok(removed)
    }
}

fn service_error(failure: ServiceFailure) -> PopAuthError {
    CommandError::Service {
        code: failure.code,
        message: failure.message,
    }
    .into()
}
