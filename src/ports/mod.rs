//! Ports (traits) for the command and key-management cores
//!
//! These traits define the capabilities the cores depend on. They represent
//! ports in hexagonal architecture - orchestration code depends on these
//! abstractions, not on concrete brokers, key stores, or thread pools.

mod controller;
mod delivery;
mod key_store;
mod keypair_generator;
mod telemetry;

pub use controller::Controller;
pub use delivery::{CommandCallback, ResultQueue, UserCodeSink};
pub use key_store::{KeyStore, StoredKey};
pub use keypair_generator::{
    Capability, GeneratedKeyPair, GenerationError, GenerationFlags, KeyPairGenerator,
};
pub use telemetry::{NoopTelemetry, TelemetryEvent, TelemetrySink};
