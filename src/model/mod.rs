mod command;
mod correlation;
mod crypto_suite;
mod outcome;
mod parameters;
mod result;
mod shr;

pub use command::{Command, CommandKey, CommandRequest};
pub use correlation::CorrelationId;
pub use crypto_suite::{
    CryptoSuite, EntryKind, SecureHardwareState, SigningAlgorithm, DEVICE_POP_SUITE,
    SESSION_TRANSPORT_SUITE,
};
pub use outcome::{ControllerOutcome, ErrorCode, ServiceFailure};
pub use parameters::{
    AccountParameters, DeviceCodeFlowParameters, ShrParameters, SilentTokenParameters,
    TokenParameters,
};
pub use result::{
    AccountRecord, CommandPayload, CommandResult, CommandStatus, DeviceCodeAuthorization,
    TokenResult,
};
pub use shr::{CnfClaim, RsaJwk, ShrClaims};
