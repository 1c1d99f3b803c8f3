use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;

use crate::error::{KeystoreError, PopAuthResult};
use crate::model::SecureHardwareState;
use crate::ports::{KeyStore, StoredKey};

/// Key store backed by PKCS#8 PEM files in a directory, one file per alias.
///
/// Keys read back from disk are always reported as software backed; the
/// hardware state of the originating platform is not round-tripped.
#[derive(Debug)]
pub struct FileKeyStore {
    dir: PathBuf,
}

impl FileKeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> PopAuthResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| KeystoreError::NotInitialized {
            reason: format!("cannot create {}: {e}", dir.display()),
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, alias: &str) -> PopAuthResult<PathBuf> {
        if alias.is_empty() || alias.contains(['/', '\\']) || alias.contains("..") {
            return Err(KeystoreError::InvalidProtectionParams {
                reason: format!("alias {alias:?} is not a plain file name"),
            }
            .into());
        }
        Ok(self.dir.join(format!("{alias}.pem")))
    }

    fn read_key(path: &Path) -> PopAuthResult<Option<RsaPrivateKey>> {
        let pem = match fs::read_to_string(path) {
            Ok(pem) => pem,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(KeystoreError::NotInitialized {
                    reason: format!("cannot read {}: {e}", path.display()),
                }
                .into())
            }
        };
        let key =
            RsaPrivateKey::from_pkcs8_pem(&pem).map_err(|e| {
                KeystoreError::InvalidProtectionParams {
                    reason: format!("{} is not a PKCS#8 RSA key: {e}", path.display()),
                }
            })?;
        Ok(Some(key))
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self, alias: &str) -> PopAuthResult<Option<StoredKey>> {
        let path = self.path_for(alias)?;
        Ok(Self::read_key(&path)?.map(|private_key| StoredKey {
            private_key,
            secure_hardware: SecureHardwareState::SoftwareBacked,
        }))
    }

    fn store(&self, alias: &str, key: StoredKey) -> PopAuthResult<()> {
        let path = self.path_for(alias)?;
        let pem = key
            .private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| KeystoreError::InvalidProtectionParams {
                reason: format!("cannot encode key for {alias}: {e}"),
            })?;
        fs::write(&path, pem.as_bytes()).map_err(|e| {
            KeystoreError::NotInitialized {
                reason: format!("cannot write {}: {e}", path.display()),
            }
            .into()
        })
    }

    fn remove(&self, alias: &str) -> PopAuthResult<bool> {
        let path = self.path_for(alias)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(KeystoreError::NotInitialized {
                reason: format!("cannot remove {}: {e}", path.display()),
            }
            .into()),
        }
    }

    fn creation_date(&self, alias: &str) -> PopAuthResult<Option<std::time::SystemTime>> {
        let path = self.path_for(alias)?;
        match fs::metadata(&path) {
            Ok(metadata) => Ok(metadata.modified().ok()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KeystoreError::NotInitialized {
                reason: format!("cannot stat {}: {e}", path.display()),
            }
            .into()),
        }
    }
}
