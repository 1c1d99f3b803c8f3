//! Top-level API: default wiring over the bundled adapters.
//!
//! Library users with their own platform key store or broker transport
//! should construct [`DevicePopManager`] and [`Dispatcher`] directly; the
//! functions here cover the common software-only setups.

use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::{FileKeyStore, MemoryKeyStore, RsaKeyPairGenerator, TracingTelemetry};
use crate::error::PopAuthResult;
use crate::model::DEVICE_POP_SUITE;
use crate::ports::{Controller, KeyPairGenerator, KeyStore, TelemetrySink};
use crate::use_cases::{CommandExecutor, DevicePopManager, Dispatcher, KeyAccessor};

pub use crate::model::*;

/// Alias under which the device proof-of-possession key is persisted.
pub const DEVICE_KEY_ALIAS: &str = "popauth.device.key";

/// Manager over a caller-supplied store, generator, and telemetry sink.
pub fn device_pop_manager(
    store: Arc<dyn KeyStore>,
    generator: Arc<dyn KeyPairGenerator>,
    telemetry: Arc<dyn TelemetrySink>,
) -> DevicePopManager {
    let accessor = KeyAccessor::new(store, DEVICE_POP_SUITE, DEVICE_KEY_ALIAS);
    DevicePopManager::new(accessor, generator, telemetry)
}

/// Software-only manager whose key lives in process memory.
pub fn software_pop_manager() -> DevicePopManager {
    device_pop_manager(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(RsaKeyPairGenerator),
        Arc::new(TracingTelemetry),
    )
}

/// Software-only manager whose key is persisted as PEM under `dir`.
pub fn file_backed_pop_manager(dir: impl Into<PathBuf>) -> PopAuthResult<DevicePopManager> {
    Ok(device_pop_manager(
        Arc::new(FileKeyStore::new(dir)?),
        Arc::new(RsaKeyPairGenerator),
        Arc::new(TracingTelemetry),
    ))
}

/// Dispatcher over an ordered controller chain with tracing telemetry.
pub fn dispatcher(controllers: Vec<Arc<dyn Controller>>, silent_workers: usize) -> Dispatcher {
    let telemetry: Arc<dyn TelemetrySink> = Arc::new(TracingTelemetry);
    let executor = Arc::new(CommandExecutor::new(controllers, telemetry.clone()));
    Dispatcher::new(executor, telemetry, silent_workers)
}
