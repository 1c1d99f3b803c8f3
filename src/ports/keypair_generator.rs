use std::fmt;

use rsa::RsaPrivateKey;

use crate::model::{CryptoSuite, SecureHardwareState};

/// Optional platform capabilities requested for a generation attempt.
///
/// Each capability can be given up independently when the platform rejects
/// it; the key material itself never depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationFlags {
    pub hardware_isolation: bool,
    pub import: bool,
    pub attestation: bool,
}

impl Default for GenerationFlags {
    fn default() -> Self {
        Self {
            hardware_isolation: true,
            import: true,
            attestation: true,
        }
    }
}

impl GenerationFlags {
    pub fn is_enabled(&self, capability: Capability) -> bool {
        match capability {
            Capability::HardwareIsolation => self.hardware_isolation,
            Capability::Import => self.import,
            Capability::Attestation => self.attestation,
        }
    }

    pub fn disable(&mut self, capability: Capability) {
        match capability {
            Capability::HardwareIsolation => self.hardware_isolation = false,
            Capability::Import => self.import = false,
            Capability::Attestation => self.attestation = false,
        }
    }
}

/// A capability that can be degraded away during generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    HardwareIsolation,
    Import,
    Attestation,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HardwareIsolation => "hardware_isolation",
            Self::Import => "import",
            Self::Attestation => "attestation",
        })
    }
}

/// Why one generation attempt failed.
///
/// Capability variants name the feature the platform rejected; the retry
/// loop disables that feature and tries again without spending an attempt.
/// `Failed` is an ordinary fault and aborts generation outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    HardwareIsolationUnavailable,
    ImportUnsupported,
    AttestationUnsupported,
    Failed(String),
}

impl GenerationError {
    /// The capability this failure implicates, if any.
    pub fn implicated_capability(&self) -> Option<Capability> {
        match self {
            Self::HardwareIsolationUnavailable => Some(Capability::HardwareIsolation),
            Self::ImportUnsupported => Some(Capability::Import),
            Self::AttestationUnsupported => Some(Capability::Attestation),
            Self::Failed(_) => None,
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardwareIsolationUnavailable => f.write_str("hardware isolation unavailable"),
            Self::ImportUnsupported => f.write_str("key import unsupported"),
            Self::AttestationUnsupported => f.write_str("key attestation unsupported"),
            Self::Failed(reason) => write!(f, "key generation failed: {reason}"),
        }
    }
}

impl std::error::Error for GenerationError {}

/// A freshly generated key pair plus what the platform reported about it.
#[derive(Debug, Clone)]
pub struct GeneratedKeyPair {
    pub private_key: RsaPrivateKey,
    pub secure_hardware: SecureHardwareState,
    /// Key length the platform measured, when it can measure one at all.
    pub measured_length: Option<usize>,
}

/// Produces key pairs for a crypto suite under a set of capability flags.
pub trait KeyPairGenerator: Send + Sync {
    fn generate(
        &self,
        suite: &CryptoSuite,
        flags: GenerationFlags,
    ) -> Result<GeneratedKeyPair, GenerationError>;
}
