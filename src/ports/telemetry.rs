use crate::model::{CommandStatus, SecureHardwareState};
use crate::ports::Capability;

/// Events emitted by the cores for operational visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    /// One key generation attempt started (1-based).
    KeyGenerationAttempt { attempt: u32 },
    /// A platform capability was given up after it caused a failure.
    CapabilityDegraded { capability: Capability },
    /// A key pair was generated and persisted.
    KeyGenerated { secure_hardware: SecureHardwareState },
    /// The device key was deleted.
    KeyCleared,
    /// A command joined an already-running identical execution.
    CommandCoalesced { correlation_id: String },
    /// A controller was skipped over after a recoverable failure.
    ControllerFellThrough { controller: String, code: String },
    /// One token-endpoint command execution finished. Coalesced observers
    /// share a single execution and therefore a single event.
    CommandExecuted {
        public_api_id: String,
        correlation_id: String,
        status: CommandStatus,
    },
}

/// Sink for telemetry events. Implementations must not block.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: TelemetryEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn record(&self, _event: TelemetryEvent) {}
}
