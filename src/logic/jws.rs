//! Compact JWS signing and verification (RS256 only).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{CryptoError, PopAuthResult};
use crate::model::SigningAlgorithm;

#[derive(Serialize)]
struct JoseHeader<'a> {
    alg: &'a str,
    kid: &'a str,
}

/// Serialize `claims` and sign them as a compact JWS.
///
/// The protected header carries exactly `alg` and the caller's `kid` (the
/// key's JWK thumbprint); relying parties match on that shape.
pub fn sign_compact_rs256<C: Serialize>(
    claims: &C,
    kid: &str,
    private_key: &RsaPrivateKey,
) -> PopAuthResult<String> {
    let header = JoseHeader {
        alg: SigningAlgorithm::Rs256.jose_name(),
        kid,
    };
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?),
    );

    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let signature = signing_key
        .try_sign(signing_input.as_bytes())
        .map_err(|e| CryptoError::JwtSigningFailure {
            reason: e.to_string(),
        })?;

    Ok(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature.to_bytes())
    ))
}

/// Check a compact JWS signature and return the decoded claims JSON.
pub fn verify_compact_rs256(
    token: &str,
    public_key: &RsaPublicKey,
) -> PopAuthResult<serde_json::Value> {
    let mut parts = token.split('.');
    let (header, payload, signature) = match (parts.next(), parts.next(), parts.next(), parts.next())
    {
        (Some(h), Some(p), Some(s), None) => (h, p, s),
        _ => {
            return Err(CryptoError::SigningFailure {
                reason: "token is not a three-part compact JWS".to_string(),
            }
            .into())
        }
    };

    let signature_bytes =
        URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| CryptoError::SigningFailure {
                reason: format!("signature is not base64url: {e}"),
            })?;
    let signature =
        Signature::try_from(signature_bytes.as_slice()).map_err(|e| CryptoError::SigningFailure {
            reason: e.to_string(),
        })?;

    let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());
    verifying_key
        .verify(format!("{header}.{payload}").as_bytes(), &signature)
        .map_err(|e| CryptoError::SigningFailure {
            reason: format!("signature verification failed: {e}"),
        })?;

    let payload_bytes =
        URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| CryptoError::SigningFailure {
                reason: format!("payload is not base64url: {e}"),
            })?;
    Ok(serde_json::from_slice(&payload_bytes)?)
}
