use tracing::info;

use crate::ports::{TelemetryEvent, TelemetrySink};

/// Telemetry sink that forwards events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn record(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::KeyGenerationAttempt { attempt } => {
                info!(attempt, "key generation attempt");
            }
            TelemetryEvent::CapabilityDegraded { capability } => {
                info!(%capability, "generation capability degraded");
            }
            TelemetryEvent::KeyGenerated { secure_hardware } => {
                info!(?secure_hardware, "device key generated");
            }
            TelemetryEvent::KeyCleared => {
                info!("device key cleared");
            }
            TelemetryEvent::CommandCoalesced { correlation_id } => {
                info!(correlation_id, "command joined in-flight execution");
            }
            TelemetryEvent::ControllerFellThrough { controller, code } => {
                info!(controller, code, "controller fell through");
            }
            TelemetryEvent::CommandExecuted {
                public_api_id,
                correlation_id,
                status,
            } => {
                info!(public_api_id, correlation_id, ?status, "command executed");
            }
        }
    }
}
