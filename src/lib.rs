//! popauth - broker command dispatch and device proof-of-possession keys
//!
//! Two cores, shared plumbing:
//!
//! - Commands describe token work (silent/interactive acquisition, signed
//!   HTTP requests, device code flow, account queries). A [`use_cases::Dispatcher`]
//!   coalesces identical in-flight commands and runs them against an
//!   ordered controller chain with per-operation fallback policies.
//! - A [`use_cases::DevicePopManager`] owns the device RSA key: bounded
//!   degrading-capability generation, RFC 7638 thumbprints, and RS256
//!   signed-HTTP-request minting.
//!
//! Platform integration happens through the traits in [`ports`]; the
//! [`adapters`] module ships software implementations of each.

pub mod adapters;
pub mod api;
pub mod error;
pub mod logic;
pub mod model;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use error::{PopAuthError, PopAuthResult};

// Re-export public API
pub use api::{
    device_pop_manager, dispatcher, file_backed_pop_manager, software_pop_manager,
    DEVICE_KEY_ALIAS,
};
