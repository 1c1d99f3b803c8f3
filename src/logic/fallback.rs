//! Ordered controller fallback.
//!
//! A command runs against a fixed controller chain. Each controller either
//! succeeds (terminal), fails with a recoverable code (fall through to the
//! next controller), or fails hard (terminal). When every controller falls
//! through, the FIRST recoverable failure is the one reported: later
//! controllers were only consulted on its behalf.

use std::sync::Arc;

use tracing::debug;

use crate::error::{CommandError, PopAuthResult};
use crate::model::{ControllerOutcome, ErrorCode};
use crate::ports::{Controller, TelemetryEvent, TelemetrySink};

/// Which service error codes allow falling through to the next controller,
/// and how exhaustion of the chain is reported.
#[derive(Debug, Clone, Copy)]
pub struct FallbackPolicy {
    recoverable: &'static [ErrorCode],
    escalates_to_ui: bool,
}

impl FallbackPolicy {
    /// Policy for silent token acquisition.
    pub const fn silent() -> Self {
        Self {
            recoverable: &[
                ErrorCode::InvalidGrant,
                ErrorCode::NoAccountFound,
                ErrorCode::NoTokensFound,
            ],
            escalates_to_ui: false,
        }
    }

    /// Policy for signed-HTTP-request minting: only a missing account falls
    /// through, and chain exhaustion means the user has to sign in.
    pub const fn signed_http_request() -> Self {
        Self {
            recoverable: &[ErrorCode::NoAccountFound],
            escalates_to_ui: true,
        }
    }

    fn is_recoverable(&self, code: &ErrorCode) -> bool {
        self.recoverable.contains(code)
    }
}

/// Run `attempt` against each controller in order under `policy`.
///
/// Infrastructure errors (`Err` from `attempt`) and non-recoverable service
/// failures are terminal immediately; they never consult later controllers.
pub fn run_with_fallback<T, F>(
    controllers: &[Arc<dyn Controller>],
    policy: &FallbackPolicy,
    telemetry: &dyn TelemetrySink,
    mut attempt: F,
) -> PopAuthResult<T>
where
    F: FnMut(&dyn Controller) -> PopAuthResult<ControllerOutcome<T>>,
{
    if controllers.is_empty() {
        return Err(CommandError::NoControllersAvailable.into());
    }

    let mut deferred = None;
    for controller in controllers {
        match attempt(controller.as_ref())? {
            ControllerOutcome::Success(value) => return Ok(value),
            ControllerOutcome::Failure(failure) => {
                if policy.is_recoverable(&failure.code) {
                    debug!(
                        controller = controller.name(),
                        code = %failure.code,
                        "recoverable failure, trying next controller"
                    );
                    telemetry.record(TelemetryEvent::ControllerFellThrough {
                        controller: controller.name().to_string(),
                        code: failure.code.as_str().to_string(),
                    });
                    deferred.get_or_insert(failure);
                } else {
                    return Err(CommandError::Service {
                        code: failure.code,
                        message: failure.message,
                    }
                    .into());
                }
            }
        }
    }

    match deferred {
        Some(failure) if policy.escalates_to_ui => Err(CommandError::UiRequired {
            code: failure.code,
            message: failure.message,
        }
        .into()),
        Some(failure) => Err(CommandError::Service {
            code: failure.code,
            message: failure.message,
        }
        .into()),
        // Unreachable with a non-empty chain; kept for totality.
        None => Err(CommandError::NoControllersAvailable.into()),
    }
}
