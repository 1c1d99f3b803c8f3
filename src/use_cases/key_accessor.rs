use std::sync::{Arc, Mutex};

use crate::error::{KeystoreError, PopAuthResult};
use crate::model::CryptoSuite;
use crate::ports::{KeyStore, StoredKey};

/// Binds one alias and one crypto suite to a key store.
///
/// All mutations go through an internal lock so a clear racing a save
/// cannot interleave halfway; reads go straight to the store.
pub struct KeyAccessor {
    store: Arc<dyn KeyStore>,
    suite: CryptoSuite,
    alias: String,
    write_guard: Mutex<()>,
}

impl KeyAccessor {
    pub fn new(store: Arc<dyn KeyStore>, suite: CryptoSuite, alias: impl Into<String>) -> Self {
        Self {
            store,
            suite,
            alias: alias.into(),
            write_guard: Mutex::new(()),
        }
    }

    pub fn suite(&self) -> &CryptoSuite {
        &self.suite
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn load(&self) -> PopAuthResult<Option<StoredKey>> {
        self.store.load(&self.alias)
    }

    /// Load the key, failing if it does not exist.
    pub fn require(&self) -> PopAuthResult<StoredKey> {
        self.load()?.ok_or_else(|| {
            KeystoreError::InvalidKeyMissing {
                alias: self.alias.clone(),
            }
            .into()
        })
    }

    pub fn exists(&self) -> PopAuthResult<bool> {
        self.store.exists(&self.alias)
    }

    pub fn creation_date(&self) -> PopAuthResult<Option<std::time::SystemTime>> {
        self.store.creation_date(&self.alias)
    }

    pub fn save(&self, key: StoredKey) -> PopAuthResult<()> {
        let _guard = self.lock_writes();
        self.store.store(&self.alias, key)
    }

    pub fn clear(&self) -> PopAuthResult<bool> {
        let _guard = self.lock_writes();
        self.store.remove(&self.alias)
    }

    fn lock_writes(&self) -> std::sync::MutexGuard<'_, ()> {
        match self.write_guard.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fakes::software_pair;
    use crate::adapters::MemoryKeyStore;
    use crate::error::PopAuthError;
    use crate::model::{SecureHardwareState, DEVICE_POP_SUITE};

    fn accessor() -> KeyAccessor {
        KeyAccessor::new(
            Arc::new(MemoryKeyStore::new()),
            DEVICE_POP_SUITE,
            "popauth.device.key",
        )
    }

    #[test]
    fn test_require_fails_when_absent() {
        let result = accessor().require();
        match result {
            Err(PopAuthError::Keystore(KeystoreError::InvalidKeyMissing { alias })) => {
                assert_eq!(alias, "popauth.device.key");
            }
            other => panic!("expected missing-key error: {other:?}"),
        }
    }

    #[test]
    fn test_save_then_require_round_trips() {
        let accessor = accessor();
        let pair = software_pair();
        accessor
            .save(StoredKey {
                private_key: pair.private_key.clone(),
                secure_hardware: SecureHardwareState::SoftwareBacked,
            })
            .unwrap();

        let stored = accessor.require().unwrap();
        assert_eq!(stored.private_key, pair.private_key);
        assert!(accessor.exists().unwrap());

        assert!(accessor.clear().unwrap());
        assert!(!accessor.exists().unwrap());
    }
}
