//! Command parameter value objects
//!
//! Parameters are immutable once built and define the logical identity of a
//! request: two commands with equal parameters describe the same backend
//! work even when they come from different callers. Everything here derives
//! `Eq`/`Hash` so the dispatcher can coalesce duplicate in-flight requests.

use url::Url;

/// Parameters for an interactive token acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenParameters {
    pub client_id: String,
    pub authority: String,
    pub scopes: Vec<String>,
    pub login_hint: Option<String>,
}

/// Parameters for a silent (cache/refresh) token acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SilentTokenParameters {
    pub client_id: String,
    pub authority: String,
    pub scopes: Vec<String>,
    pub home_account_id: String,
    pub force_refresh: bool,
}

/// Parameters for the device code flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceCodeFlowParameters {
    pub client_id: String,
    pub authority: String,
    pub scopes: Vec<String>,
}

/// Parameters for minting a signed HTTP request.
///
/// The timestamp is not part of the parameters; it is chosen at minting
/// time by whichever controller services the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShrParameters {
    pub home_account_id: String,
    pub http_method: Option<String>,
    pub url: Url,
    pub nonce: Option<String>,
    pub client_claims: Option<String>,
}

/// Parameters for account queries and removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountParameters {
    pub client_id: String,
    pub home_account_id: Option<String>,
}
