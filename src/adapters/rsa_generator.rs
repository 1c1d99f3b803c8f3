use rand::thread_rng;
use rsa::RsaPrivateKey;

use crate::model::{CryptoSuite, EntryKind, SecureHardwareState};
use crate::ports::{GeneratedKeyPair, GenerationError, GenerationFlags, KeyPairGenerator};

/// Software RSA key pair generator.
///
/// Software keys have no hardware isolation or attestation to offer, so all
/// capability flags are accepted and quietly ignored; generated keys always
/// report [`SecureHardwareState::SoftwareBacked`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RsaKeyPairGenerator;

impl KeyPairGenerator for RsaKeyPairGenerator {
    fn generate(
        &self,
        suite: &CryptoSuite,
        _flags: GenerationFlags,
    ) -> Result<GeneratedKeyPair, GenerationError> {
        let private_key = RsaPrivateKey::new(&mut thread_rng(), suite.key_size())
            .map_err(|e| GenerationError::Failed(e.to_string()))?;
        Ok(GeneratedKeyPair {
            private_key,
            secure_hardware: SecureHardwareState::SoftwareBacked,
            measured_length: Some(suite.key_size()),
        })
    }
}
