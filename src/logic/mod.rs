//! Pure logic: no I/O, no clocks, no storage
//!
//! Everything here is a function of its inputs. The fallback runner is the
//! one exception to "no traits": it walks a controller chain handed to it,
//! but owns no state of its own.

mod fallback;
mod jws;
mod thumbprint;

pub use fallback::{run_with_fallback, FallbackPolicy};
pub use jws::{sign_compact_rs256, verify_compact_rs256};
pub use thumbprint::{jwk_thumbprint, rsa_jwk};
