use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;

use crate::error::{KeystoreError, PopAuthResult};
use crate::ports::{KeyStore, StoredKey};

type Entries = HashMap<String, (StoredKey, SystemTime)>;

/// In-memory key store. Keys live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    entries: Mutex<Entries>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> PopAuthResult<std::sync::MutexGuard<'_, Entries>> {
        self.entries
            .lock()
            .map_err(|_| KeystoreError::InterruptedOperation.into())
    }
}

impl KeyStore for MemoryKeyStore {
    fn load(&self, alias: &str) -> PopAuthResult<Option<StoredKey>> {
        Ok(self.locked()?.get(alias).map(|(key, _)| key.clone()))
    }

    fn store(&self, alias: &str, key: StoredKey) -> PopAuthResult<()> {
        self.locked()?
            .insert(alias.to_string(), (key, SystemTime::now()));
        Ok(())
    }

    fn remove(&self, alias: &str) -> PopAuthResult<bool> {
        Ok(self.locked()?.remove(alias).is_some())
    }

    fn creation_date(&self, alias: &str) -> PopAuthResult<Option<SystemTime>> {
        Ok(self.locked()?.get(alias).map(|(_, created)| *created))
    }
}
