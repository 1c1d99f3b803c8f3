//! Adapters - concrete implementations of ports (traits)

mod file_key_store;
mod inline_queue;
mod memory_key_store;
mod rsa_generator;
mod tracing_telemetry;
mod worker_pool;

#[cfg(test)]
pub mod fakes;

// Re-export for convenience
pub use file_key_store::FileKeyStore;
pub use inline_queue::InlineQueue;
pub use memory_key_store::MemoryKeyStore;
pub use rsa_generator::RsaKeyPairGenerator;
pub use tracing_telemetry::TracingTelemetry;
pub use worker_pool::WorkerPool;
