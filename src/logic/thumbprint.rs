//! RFC 7638 JWK thumbprints for RSA public keys.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use sha2::{Digest, Sha256};

use crate::error::PopAuthResult;
use crate::model::RsaJwk;

/// Build the minimal public JWK for an RSA key.
///
/// `n` and `e` are big-endian, base64url without padding.
pub fn rsa_jwk(public_key: &RsaPublicKey) -> RsaJwk {
    RsaJwk {
        e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        kty: "RSA".to_string(),
        n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
    }
}

/// Compute the RFC 7638 thumbprint of an RSA JWK.
///
/// The hash input is the JSON object containing exactly the required
/// members `e`, `kty`, `n`, in that lexicographic order with no
/// whitespace. [`RsaJwk`] declares its fields in that order, so its
/// serialized form is already canonical.
pub fn jwk_thumbprint(jwk: &RsaJwk) -> PopAuthResult<String> {
    let canonical = serde_json::to_vec(jwk)?;
    Ok(URL_SAFE_NO_PAD.encode(Sha256::digest(&canonical)))
}
