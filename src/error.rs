//! Error types for the popauth library
//!
//! Errors are organized hierarchically and use thiserror for implementation.
//! Low-level backend failures are re-wrapped into exactly one typed error at
//! the narrowest possible boundary, preserving the original cause; they never
//! cross the key-manager boundary as raw backend errors.

use thiserror::Error;

use crate::model::ErrorCode;

/// Result type alias for popauth operations
pub type PopAuthResult<T> = Result<T, PopAuthError>;

/// Top-level error type for all popauth operations
#[derive(Error, Debug)]
pub enum PopAuthError {
    /// Key storage errors
    #[error("Keystore error: {0}")]
    Keystore(#[from] KeystoreError),

    /// Cryptographic operation errors
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// Command execution errors
    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

impl PopAuthError {
    /// The recoverable error code carried by this error, if any.
    ///
    /// Only service failures carry codes; everything else is fatal as far
    /// as controller fallback is concerned.
    pub fn error_code(&self) -> Option<&ErrorCode> {
        match self {
            PopAuthError::Command(CommandError::Service { code, .. }) => Some(code),
            PopAuthError::Command(CommandError::UiRequired { code, .. }) => Some(code),
            _ => None,
        }
    }
}

/// Errors raised by the key storage boundary
#[derive(Error, Debug)]
pub enum KeystoreError {
    /// The backing store could not be opened or queried
    #[error("Keystore is not initialized: {reason}")]
    NotInitialized { reason: String },

    /// The entry exists but could not be recovered with the supplied protection parameters
    #[error("Invalid entry protection parameters: {reason}")]
    InvalidProtectionParams { reason: String },

    /// No private key material is present for the alias
    #[error("No private key entry found for alias: {alias}")]
    InvalidKeyMissing { alias: String },

    /// A blocking wait on a background keystore operation was interrupted
    #[error("Interrupted while waiting for a keystore operation to complete")]
    InterruptedOperation,
}

/// Cryptographic operation errors
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Algorithm not supported by the backend
    #[error("Algorithm not supported: {algorithm}")]
    NoSuchAlgorithm { algorithm: String },

    /// Key rejected by the backend
    #[error("Invalid key: {reason}")]
    InvalidKey { reason: String },

    /// Padding validation failed during a cipher operation
    #[error("Bad padding: {reason}")]
    BadPadding { reason: String },

    /// Data length incompatible with the cipher block size
    #[error("Invalid block size: {reason}")]
    InvalidBlockSize { reason: String },

    /// Padding scheme not supported by the backend
    #[error("Padding scheme not supported: {padding}")]
    NoSuchPadding { padding: String },

    /// Cipher parameter rejected by the backend
    #[error("Invalid algorithm parameter: {reason}")]
    InvalidAlgorithmParameter { reason: String },

    /// JWK thumbprint could not be computed
    #[error("Failed to compute JWK thumbprint: {reason}")]
    ThumbprintComputationFailure { reason: String },

    /// JWT could not be signed
    #[error("Failed to sign JWT: {reason}")]
    JwtSigningFailure { reason: String },

    /// Raw signing operation failed
    #[error("Failed to generate signature: {reason}")]
    SigningFailure { reason: String },

    /// Public key export requested in an unrecognized format
    #[error("Unrecognized or unsupported key export format: {format}")]
    UnknownExportFormat { format: String },

    /// Generated key never met the minimum size within the attempt budget
    #[error("Failed to generate a valid keypair of at least {minimum} bits, attempted {attempts} times")]
    BadKeySize { minimum: usize, attempts: usize },

    /// JSON claim/JWK construction failed
    #[error("Failed to construct JSON: {0}")]
    JsonConstructionFailed(#[from] serde_json::Error),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command's controller list was empty
    #[error("No controllers available")]
    NoControllersAvailable,

    /// The operation cannot complete without user interaction
    #[error("Interaction required ({code}): {message}")]
    UiRequired { code: ErrorCode, message: String },

    /// The user cancelled the request
    #[error("Request cancelled by user")]
    UserCancelled,

    /// A controller reported an error-code-bearing failure
    #[error("Service error ({code}): {message}")]
    Service { code: ErrorCode, message: String },

    /// The background executor dropped the request before delivering a result
    #[error("Result channel closed before the command completed")]
    ResultChannelClosed,
}

/// Convert rsa crate errors into our error type
impl From<rsa::Error> for PopAuthError {
    fn from(err: rsa::Error) -> Self {
        PopAuthError::Crypto(CryptoError::InvalidKey {
            reason: err.to_string(),
        })
    }
}

/// Convert RustCrypto signature errors
impl From<rsa::signature::Error> for PopAuthError {
    fn from(err: rsa::signature::Error) -> Self {
        PopAuthError::Crypto(CryptoError::SigningFailure {
            reason: err.to_string(),
        })
    }
}

impl From<serde_json::Error> for PopAuthError {
    fn from(err: serde_json::Error) -> Self {
        PopAuthError::Crypto(CryptoError::JsonConstructionFailed(err))
    }
}
