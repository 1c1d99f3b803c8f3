//! Device proof-of-possession key lifecycle.
//!
//! One RSA key pair per device, persisted under a fixed alias. Generation
//! runs a bounded retry loop that trades optional platform capabilities
//! away one by one instead of spending its attempt budget on them: a
//! classified capability failure disables that capability and retries for
//! free, undersized keys burn an attempt, and any other failure clears
//! partial material and aborts outright.

use std::str::FromStr;
use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex, MutexGuard};

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::adapters::WorkerPool;
use crate::error::{CryptoError, KeystoreError, PopAuthError, PopAuthResult};
use crate::logic::{jwk_thumbprint, rsa_jwk, sign_compact_rs256, verify_compact_rs256};
use crate::model::{CnfClaim, SecureHardwareState, ShrClaims, ShrParameters};
use crate::ports::{
    Capability, GeneratedKeyPair, GenerationFlags, KeyPairGenerator, StoredKey, TelemetryEvent,
    TelemetrySink,
};
use crate::use_cases::KeyAccessor;

/// Attempts allowed before an undersized result becomes a hard failure.
const GENERATION_ATTEMPT_BUDGET: usize = 4;

/// How a caller wants the public key serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyExportFormat {
    /// X.509 SubjectPublicKeyInfo, PEM encoded
    SubjectPublicKeyInfoPem,
    /// X.509 SubjectPublicKeyInfo DER, standard base64
    SubjectPublicKeyInfoBase64,
    /// Public JWK (RFC 7517)
    Jwk,
}

impl FromStr for PublicKeyExportFormat {
    type Err = PopAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pem" => Ok(Self::SubjectPublicKeyInfoPem),
            "base64" => Ok(Self::SubjectPublicKeyInfoBase64),
            "jwk" => Ok(Self::Jwk),
            other => Err(CryptoError::UnknownExportFormat {
                format: other.to_string(),
            }
            .into()),
        }
    }
}

/// Manages the device key and everything minted with it.
///
/// Key lifecycle transitions (generate, load-or-generate, clear) are
/// serialized by one lock; two concurrent callers never mint distinct
/// keys for the same alias.
pub struct DevicePopManager {
    accessor: KeyAccessor,
    generator: Arc<dyn KeyPairGenerator>,
    telemetry: Arc<dyn TelemetrySink>,
    lifecycle_guard: Mutex<()>,
}

impl DevicePopManager {
    pub fn new(
        accessor: KeyAccessor,
        generator: Arc<dyn KeyPairGenerator>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            accessor,
            generator,
            telemetry,
            lifecycle_guard: Mutex::new(()),
        }
    }

    pub fn asymmetric_key_exists(&self) -> PopAuthResult<bool> {
        self.accessor.exists()
    }

    /// Generate and persist a fresh device key, replacing any existing one.
    /// Returns the new key's JWK thumbprint.
    pub fn generate_asymmetric_key(&self) -> PopAuthResult<String> {
        let _guard = self.lock_lifecycle();
        self.generate_and_store()
    }

    fn generate_and_store(&self) -> PopAuthResult<String> {
        let pair = self.generate_with_degradation()?;
        let stored = StoredKey {
            private_key: pair.private_key,
            secure_hardware: pair.secure_hardware,
        };
        self.accessor.save(stored.clone())?;
        self.telemetry.record(TelemetryEvent::KeyGenerated {
            secure_hardware: stored.secure_hardware,
        });
        Self::thumbprint_of(&stored)
    }

    /// Generate on a worker thread, invoking `on_done` with the outcome.
    pub fn generate_asymmetric_key_async(
        self: &Arc<Self>,
        pool: &WorkerPool,
        on_done: impl FnOnce(PopAuthResult<String>) + Send + 'static,
    ) {
        let manager = Arc::clone(self);
        pool.execute(Box::new(move || on_done(manager.generate_asymmetric_key())));
    }

    /// Generate on a worker thread and block until it finishes.
    pub fn generate_asymmetric_key_blocking(
        self: &Arc<Self>,
        pool: &WorkerPool,
    ) -> PopAuthResult<String> {
        let (tx, rx) = channel();
        self.generate_asymmetric_key_async(pool, move |result| {
            let _ = tx.send(result);
        });
        rx.recv()
            .map_err(|_| PopAuthError::from(KeystoreError::InterruptedOperation))?
    }

    /// Thumbprint of the existing key, generating one first if absent.
    ///
    /// The load check and any generation run under the lifecycle lock, so
    /// concurrent callers agree on a single key.
    pub fn get_or_generate_thumbprint(&self) -> PopAuthResult<String> {
        let _guard = self.lock_lifecycle();
        match self.accessor.load()? {
            Some(stored) => Self::thumbprint_of(&stored),
            None => self.generate_and_store(),
        }
    }

    /// RFC 7638 thumbprint of the existing key.
    pub fn get_asymmetric_key_thumbprint(&self) -> PopAuthResult<String> {
        Self::thumbprint_of(&self.accessor.require()?)
    }

    /// Delete the device key. Returns whether one existed.
    pub fn clear_asymmetric_key(&self) -> PopAuthResult<bool> {
        let _guard = self.lock_lifecycle();
        let removed = self.accessor.clear()?;
        if removed {
            self.telemetry.record(TelemetryEvent::KeyCleared);
        }
        Ok(removed)
    }

    pub fn get_secure_hardware_state(&self) -> PopAuthResult<SecureHardwareState> {
        Ok(self.accessor.require()?.secure_hardware)
    }

    /// When the device key was persisted, if the store tracks it.
    pub fn key_creation_date(&self) -> PopAuthResult<Option<std::time::SystemTime>> {
        self.accessor.creation_date()
    }

    /// Whether the existing device key has the given thumbprint.
    pub fn has_thumbprint(&self, thumbprint: &str) -> PopAuthResult<bool> {
        match self.accessor.load()? {
            Some(stored) => Ok(Self::thumbprint_of(&stored)? == thumbprint),
            None => Ok(false),
        }
    }

    /// The `req_cnf` value sent during token requests: base64url JSON
    /// naming the key by thumbprint plus its key storage location.
    pub fn get_request_confirmation(&self) -> PopAuthResult<String> {
        let stored = self.accessor.require()?;
        let kid = Self::thumbprint_of(&stored)?;
        let ksl = match stored.secure_hardware {
            SecureHardwareState::HardwareBacked => "hw",
            SecureHardwareState::SoftwareBacked | SecureHardwareState::Unknown => "sw",
        };
        let req_cnf = json!({ "kid": kid, "xms_ksl": ksl });
        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(&req_cnf)?))
    }

    /// [`Self::get_request_confirmation`] on a worker thread.
    pub fn get_request_confirmation_async(
        self: &Arc<Self>,
        pool: &WorkerPool,
        on_done: impl FnOnce(PopAuthResult<String>) + Send + 'static,
    ) {
        let manager = Arc::clone(self);
        pool.execute(Box::new(move || on_done(manager.get_request_confirmation())));
    }

    /// Export the public half of the device key.
    pub fn get_public_key(&self, format: PublicKeyExportFormat) -> PopAuthResult<String> {
        let public_key = self.accessor.require()?.private_key.to_public_key();
        match format {
            PublicKeyExportFormat::SubjectPublicKeyInfoPem => public_key
                .to_public_key_pem(LineEnding::LF)
                .map_err(|e| {
                    CryptoError::InvalidKey {
                        reason: e.to_string(),
                    }
                    .into()
                }),
            PublicKeyExportFormat::SubjectPublicKeyInfoBase64 => {
                let der = public_key.to_public_key_der().map_err(|e| {
                    PopAuthError::from(CryptoError::InvalidKey {
                        reason: e.to_string(),
                    })
                })?;
                Ok(STANDARD.encode(der.as_bytes()))
            }
            PublicKeyExportFormat::Jwk => {
                Ok(serde_json::to_string(&rsa_jwk(&public_key))?)
            }
        }
    }

    /// Mint a signed HTTP request over the device key.
    ///
    /// `timestamp` is seconds since the Unix epoch; callers that just want
    /// "now" should use [`Self::mint_signed_http_request_now`].
    pub fn mint_signed_http_request(
        &self,
        params: &ShrParameters,
        access_token: Option<&str>,
        timestamp: i64,
    ) -> PopAuthResult<String> {
        let stored = self.accessor.require()?;
        let jwk = rsa_jwk(&stored.private_key.to_public_key());
        let kid = jwk_thumbprint(&jwk)?;

        let claims = ShrClaims {
            at: access_token.map(str::to_string),
            ts: timestamp,
            method: params
                .http_method
                .clone()
                .filter(|method| !method.is_empty()),
            host: url_authority(&params.url),
            path: url_path_claim(&params.url),
            nonce: params.nonce.clone(),
            client_claims: params.client_claims.clone(),
            cnf: CnfClaim { jwk },
        };

        match sign_compact_rs256(&claims, &kid, &stored.private_key) {
            Ok(token) => Ok(token),
            Err(err) => {
                // An unusable key stays unusable; replace it so the next
                // mint has a chance.
                warn!(error = %err, "signing failed, replacing device key");
                let _ = self.accessor.clear();
                if let Err(regen) = self.generate_asymmetric_key() {
                    warn!(error = %regen, "device key regeneration failed");
                }
                Err(err)
            }
        }
    }

    /// [`Self::mint_signed_http_request`] on a worker thread.
    pub fn mint_signed_http_request_async(
        self: &Arc<Self>,
        pool: &WorkerPool,
        params: ShrParameters,
        access_token: Option<String>,
        timestamp: i64,
        on_done: impl FnOnce(PopAuthResult<String>) + Send + 'static,
    ) {
        let manager = Arc::clone(self);
        pool.execute(Box::new(move || {
            on_done(manager.mint_signed_http_request(&params, access_token.as_deref(), timestamp))
        }));
    }

    pub fn mint_signed_http_request_now(
        &self,
        params: &ShrParameters,
        access_token: Option<&str>,
    ) -> PopAuthResult<String> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        self.mint_signed_http_request(params, access_token, timestamp)
    }

    /// Check a previously minted request against the device key and return
    /// its claims.
    pub fn verify_signed_http_request(&self, token: &str) -> PopAuthResult<serde_json::Value> {
        let public_key = self.accessor.require()?.private_key.to_public_key();
        verify_compact_rs256(token, &public_key)
    }

    fn thumbprint_of(stored: &StoredKey) -> PopAuthResult<String> {
        jwk_thumbprint(&rsa_jwk(&stored.private_key.to_public_key()))
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, ()> {
        match self.lifecycle_guard.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn generate_with_degradation(&self) -> PopAuthResult<GeneratedKeyPair> {
        let suite = self.accessor.suite().clone();
        let minimum = suite.key_size();
        let mut flags = GenerationFlags::default();
        let mut attempts = 0;

        while attempts < GENERATION_ATTEMPT_BUDGET {
            self.telemetry.record(TelemetryEvent::KeyGenerationAttempt {
                attempt: attempts as u32 + 1,
            });
            match self.generator.generate(&suite, flags) {
                Ok(pair) => match pair.measured_length {
                    Some(length) if length < minimum => {
                        // The platform produced a key but it is too small
                        // to trust; this counts against the budget.
                        warn!(length, minimum, "generated key is undersized");
                        attempts += 1;
                    }
                    // A length the platform cannot measure is accepted.
                    _ => return Ok(pair),
                },
                Err(err) => match err.implicated_capability() {
                    Some(capability) => {
                        if !flags.is_enabled(capability) {
                            return Err(CryptoError::InvalidAlgorithmParameter {
                                reason: format!(
                                    "generation failed on {capability} after it was already disabled: {err}"
                                ),
                            }
                            .into());
                        }
                        self.degrade(&mut flags, capability);
                        // Hardware-isolated stores are the usual reason an
                        // import is rejected, so give that up too.
                        if capability == Capability::Import
                            && flags.is_enabled(Capability::HardwareIsolation)
                        {
                            self.degrade(&mut flags, Capability::HardwareIsolation);
                        }
                    }
                    None => {
                        // Ordinary faults are not retried: leave no partial
                        // state and surface the failure.
                        warn!(error = %err, "key generation failed");
                        let _ = self.accessor.clear();
                        return Err(CryptoError::InvalidKey {
                            reason: err.to_string(),
                        }
                        .into());
                    }
                },
            }
        }

        // Nothing usable after the full budget: leave no partial state.
        let _ = self.accessor.clear();
        Err(CryptoError::BadKeySize {
            minimum,
            attempts: GENERATION_ATTEMPT_BUDGET,
        }
        .into())
    }

    fn degrade(&self, flags: &mut GenerationFlags, capability: Capability) {
        debug!(%capability, "degrading generation capability");
        flags.disable(capability);
        self.telemetry
            .record(TelemetryEvent::CapabilityDegraded { capability });
    }
}

/// Host plus explicit port, matching how URL authorities are quoted in
/// the `u` claim.
fn url_authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}

/// The `p` claim, omitted entirely for empty or root paths.
fn url_path_claim(url: &Url) -> Option<String> {
    match url.path() {
        "" | "/" => None,
        path => Some(path.to_string()),
    }
}
