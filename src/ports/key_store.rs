use std::time::SystemTime;

use rsa::RsaPrivateKey;

use crate::error::PopAuthResult;
use crate::model::SecureHardwareState;

/// A key pair at rest, together with where its private half lives.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredKey {
    pub private_key: RsaPrivateKey,
    pub secure_hardware: SecureHardwareState,
}

/// Durable storage for device keys, addressed by alias.
///
/// Implementations must be safe to call from several threads; the key
/// accessor serializes mutations above this trait, so `store`/`remove`
/// only need per-call atomicity.
pub trait KeyStore: Send + Sync {
    /// Load the key under `alias`, or `None` if absent.
    fn load(&self, alias: &str) -> PopAuthResult<Option<StoredKey>>;

    /// Persist `key` under `alias`, replacing any previous entry.
    fn store(&self, alias: &str, key: StoredKey) -> PopAuthResult<()>;

    /// Delete the entry under `alias`. Returns whether one existed.
    fn remove(&self, alias: &str) -> PopAuthResult<bool>;

    /// When the entry under `alias` was persisted, if the backend tracks
    /// it and the entry exists.
    fn creation_date(&self, alias: &str) -> PopAuthResult<Option<SystemTime>>;

    fn exists(&self, alias: &str) -> PopAuthResult<bool> {
        Ok(self.load(alias)?.is_some())
    }
}
