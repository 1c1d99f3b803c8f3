//! Cipher/MAC/key-size suite descriptors
//!
//! A [`CryptoSuite`] names a complete cipher configuration independently of
//! the keystore mechanics that back it. Suites are immutable after
//! construction; many accessors may share one suite instance.

use std::fmt;

/// The kind of keystore entry a suite operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Private key + certificate pair
    PrivateKey,
    /// Raw symmetric secret
    SecretKey,
}

/// Signing algorithms supported against stored keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256
    Rs256,
}

impl SigningAlgorithm {
    /// JOSE name of the algorithm, used verbatim in the JWS header.
    pub fn jose_name(&self) -> &'static str {
        match self {
            SigningAlgorithm::Rs256 => "RS256",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jose_name())
    }
}

/// Whether a key's private material lives in isolated secure hardware.
///
/// This is informational only; a negative or failed probe must never fail
/// the operation that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecureHardwareState {
    /// Private material is held in a secure element / HSM
    HardwareBacked,
    /// Private material is managed in software
    SoftwareBacked,
    /// The backend could not answer the query
    Unknown,
}

/// An immutable named cipher/MAC/key-size combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CryptoSuite {
    name: &'static str,
    cipher: &'static str,
    mac: &'static str,
    entry_kind: EntryKind,
    key_size: usize,
}

impl CryptoSuite {
    pub const fn new(
        name: &'static str,
        cipher: &'static str,
        mac: &'static str,
        entry_kind: EntryKind,
        key_size: usize,
    ) -> Self {
        Self {
            name,
            cipher,
            mac,
            entry_kind,
            key_size,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cipher(&self) -> &'static str {
        self.cipher
    }

    pub fn mac(&self) -> &'static str {
        self.mac
    }

    pub fn entry_kind(&self) -> EntryKind {
        self.entry_kind
    }

    /// Requested key size in bits. For asymmetric suites this is also the
    /// minimum acceptable modulus length of a generated key.
    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn is_asymmetric(&self) -> bool {
        self.entry_kind == EntryKind::PrivateKey
    }
}

/// RSA-2048 suite backing device proof-of-possession keys (NIST-advised
/// minimum size for RSA pairs).
pub const DEVICE_POP_SUITE: CryptoSuite = CryptoSuite::new(
    "device-pop-rsa",
    "RSA/ECB/PKCS1Padding",
    "SHA256withRSA",
    EntryKind::PrivateKey,
    2048,
);

/// AES-256-GCM suite used for symmetric session transport keys.
pub const SESSION_TRANSPORT_SUITE: CryptoSuite = CryptoSuite::new(
    "session-transport-aes",
    "AES/GCM/NoPadding",
    "HmacSHA256",
    EntryKind::SecretKey,
    256,
);
