//! Use cases - orchestration over ports
//!
//! Each use case wires ports together to carry out one top-level concern:
//! key lifecycle ([`DevicePopManager`]), command execution against the
//! controller chain ([`CommandExecutor`]), and result multiplexing
//! ([`Dispatcher`]).

mod dispatch;
mod execute;
mod key_accessor;
mod pop_manager;

pub use dispatch::Dispatcher;
pub use execute::CommandExecutor;
pub use key_accessor::KeyAccessor;
pub use pop_manager::{DevicePopManager, PublicKeyExportFormat};
