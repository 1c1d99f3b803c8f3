//! Wire shapes for signed HTTP requests.
//!
//! `RsaJwk` is the public-key JWK carried inside the `cnf` claim, with its
//! members in the canonical order required for thumbprint computation
//! (RFC 7638 section 3).

use serde::{Deserialize, Serialize};

/// Minimal RSA public key JWK: base64url-encoded big-endian integers,
/// no padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaJwk {
    pub e: String,
    pub kty: String,
    pub n: String,
}

/// The `cnf` (confirmation) claim binding a request to a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnfClaim {
    pub jwk: RsaJwk,
}

/// Claim set of a signed HTTP request token.
///
/// Optional members are omitted from the serialized form entirely rather
/// than emitted as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShrClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
    pub ts: i64,
    #[serde(rename = "m", skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(rename = "u")]
    pub host: String,
    #[serde(rename = "p", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_claims: Option<String>,
    pub cnf: CnfClaim,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwk() -> RsaJwk {
        RsaJwk {
            e: "AQAB".to_string(),
            kty: "RSA".to_string(),
            n: "0vx7".to_string(),
        }
    }

    #[test]
    fn test_optional_claims_are_omitted_not_null() {
        let claims = ShrClaims {
            at: None,
            ts: 1_700_000_000,
            method: None,
            host: "contoso.example".to_string(),
            path: None,
            nonce: None,
            client_claims: None,
            cnf: CnfClaim { jwk: jwk() },
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("null"));
        assert!(!json.contains("\"at\""));
        assert!(json.contains("\"ts\":1700000000"));
        assert!(json.contains("\"u\":\"contoso.example\""));
    }

    #[test]
    fn test_short_claim_names_on_the_wire() {
        let claims = ShrClaims {
            at: Some("token".to_string()),
            ts: 1,
            method: Some("POST".to_string()),
            host: "h".to_string(),
            path: Some("/p".to_string()),
            nonce: Some("n".to_string()),
            client_claims: Some("c".to_string()),
            cnf: CnfClaim { jwk: jwk() },
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"m\":\"POST\""));
        assert!(json.contains("\"p\":\"/p\""));
        assert!(!json.contains("\"method\""));
        assert!(!json.contains("\"path\""));
    }
}
