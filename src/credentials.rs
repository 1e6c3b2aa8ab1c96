//! Credential parsing and configuration-time validation
//!
//! The host hands every invocation a string-keyed credential map. This
//! module parses that map into a typed [`Credentials`] record and provides
//! the one-time validation entry point the host calls when credentials are
//! saved or updated. Validation is field-specific and performs no network
//! I/O; once validated, credentials are trusted for the rest of the
//! plugin's lifetime.

use std::collections::HashMap;

use crate::auth::signature::parse_public_key;
use crate::endpoints;
use crate::error::CashfreeError;

/// Default API version sent to the Payments API as `x-api-version`
pub const DEFAULT_API_VERSION: &str = "2025-01-01";

/// Target Cashfree environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Sandbox/test hosts
    Sandbox,
    /// Production hosts
    Production,
}

impl Environment {
    /// Parse an environment from its credential-map string value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sandbox" => Some(Self::Sandbox),
            "production" => Some(Self::Production),
            _ => None,
        }
    }
}

/// Authentication method selected in the credential map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Static `X-Client-Id` / `X-Client-Secret` headers
    ClientCredentials,
    /// Pre-supplied static bearer token
    BearerToken,
    /// RSA public key; payout calls derive a fresh bearer token per call
    PublicKey,
}

impl AuthMethod {
    /// Parse an auth method from its credential-map string value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "client_credentials" => Some(Self::ClientCredentials),
            "bearer_token" => Some(Self::BearerToken),
            "public_key" => Some(Self::PublicKey),
            _ => None,
        }
    }
}

/// Typed credential record parsed from the host-supplied map
///
/// Exactly the fields required by the selected auth method are expected to
/// be non-empty; this is enforced once by [`validate_credential_map`] and
/// trusted thereafter. The optional base-URL overrides exist so tests can
/// point the plugin at a local mock server; production configurations leave
/// them unset and the fixed per-environment hosts apply.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Target environment (sandbox or production)
    pub environment: Environment,
    /// Selected authentication method
    pub auth_method: AuthMethod,
    /// Client identifier (`cashfree_client_id`)
    pub client_id: Option<String>,
    /// Client secret (`cashfree_client_secret`)
    pub client_secret: Option<String>,
    /// Static bearer token (`bearer_token`)
    pub bearer_token: Option<String>,
    /// RSA public key PEM text (`cashfree_public_key`)
    pub public_key: Option<String>,
    /// API version for the Payments surface (`cashfree_api_version`)
    pub api_version: String,
    /// Override for the Payments API base URL (testing only)
    pub payments_api_base: Option<String>,
    /// Override for the Payout API base URL (testing only)
    pub payout_api_base: Option<String>,
}

/// Read a key from the map, treating empty strings as absent
fn non_empty(map: &HashMap<String, String>, key: &str) -> Option<String> {
    map.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Credentials {
    /// Parse the host-supplied credential map into a typed record
    ///
    /// Missing `cashfree_environment` defaults to sandbox and missing
    /// `auth_method` defaults to client credentials, matching how tools
    /// resolve credentials at invocation time. Values that are present but
    /// unrecognized are rejected.
    ///
    /// # Errors
    ///
    /// Returns `CashfreeError::CredentialConfig` if the environment or auth
    /// method value is not one of the accepted strings.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, CashfreeError> {
        let environment = match non_empty(map, "cashfree_environment") {
            Some(value) => Environment::parse(&value).ok_or_else(|| {
                CashfreeError::CredentialConfig(
                    "Environment must be 'sandbox' or 'production'".to_string(),
                )
            })?,
            None => Environment::Sandbox,
        };

        let auth_method = match non_empty(map, "auth_method") {
            Some(value) => AuthMethod::parse(&value).ok_or_else(|| {
                CashfreeError::CredentialConfig(
                    "Invalid authentication method. Must be 'client_credentials', \
                     'bearer_token' or 'public_key'"
                        .to_string(),
                )
            })?,
            None => AuthMethod::ClientCredentials,
        };

        Ok(Self {
            environment,
            auth_method,
            client_id: non_empty(map, "cashfree_client_id"),
            client_secret: non_empty(map, "cashfree_client_secret"),
            bearer_token: non_empty(map, "bearer_token"),
            public_key: non_empty(map, "cashfree_public_key"),
            api_version: non_empty(map, "cashfree_api_version")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            payments_api_base: non_empty(map, "payments_api_base"),
            payout_api_base: non_empty(map, "payout_api_base"),
        })
    }

    /// Base URL for the Payments API surface (`.../pg`)
    pub fn payments_base_url(&self) -> String {
        match &self.payments_api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => endpoints::payments_base_url(self.environment).to_string(),
        }
    }

    /// Base URL for the Payout API surface
    pub fn payout_base_url(&self) -> String {
        match &self.payout_api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => endpoints::payout_base_url(self.environment).to_string(),
        }
    }
}

/// Validate a credential map at configuration time
///
/// Invoked once by the host when credentials are saved or updated. Checks
/// that the environment is one of sandbox/production and that exactly the
/// fields required by the selected auth method are present; for the
/// `public_key` method the key must also parse. No network call is made.
///
/// # Errors
///
/// Returns `CashfreeError::CredentialConfig` with a field-specific message,
/// or `CashfreeError::KeyFormat` when the supplied public key does not
/// parse.
pub fn validate_credential_map(map: &HashMap<String, String>) -> Result<(), CashfreeError> {
    let environment = non_empty(map, "cashfree_environment").ok_or_else(|| {
        CashfreeError::CredentialConfig("Missing required field: cashfree_environment".to_string())
    })?;

    if Environment::parse(&environment).is_none() {
        return Err(CashfreeError::CredentialConfig(
            "Environment must be 'sandbox' or 'production'".to_string(),
        ));
    }

    let auth_method = non_empty(map, "auth_method")
        .unwrap_or_else(|| "client_credentials".to_string());

    match AuthMethod::parse(&auth_method) {
        Some(AuthMethod::ClientCredentials) => {
            for field in ["cashfree_client_id", "cashfree_client_secret"] {
                if non_empty(map, field).is_none() {
                    return Err(CashfreeError::CredentialConfig(format!(
                        "Missing required field for client credentials: {}",
                        field
                    )));
                }
            }
        }
        Some(AuthMethod::BearerToken) => {
            if non_empty(map, "bearer_token").is_none() {
                return Err(CashfreeError::CredentialConfig(
                    "Missing required field for bearer token authentication: bearer_token"
                        .to_string(),
                ));
            }
        }
        Some(AuthMethod::PublicKey) => {
            for field in [
                "cashfree_client_id",
                "cashfree_client_secret",
                "cashfree_public_key",
            ] {
                if non_empty(map, field).is_none() {
                    return Err(CashfreeError::CredentialConfig(format!(
                        "Missing required field for public key authentication: {}",
                        field
                    )));
                }
            }
            // The key must parse now so a bad paste fails at save time,
            // not on the first payout call.
            let pem = non_empty(map, "cashfree_public_key").unwrap_or_default();
            parse_public_key(&pem)?;
        }
        None => {
            return Err(CashfreeError::CredentialConfig(
                "Invalid authentication method. Must be 'client_credentials', \
                 'bearer_token' or 'public_key'"
                    .to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_map() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("cashfree_environment".to_string(), "sandbox".to_string());
        map.insert("auth_method".to_string(), "client_credentials".to_string());
        map.insert("cashfree_client_id".to_string(), "CF123".to_string());
        map.insert("cashfree_client_secret".to_string(), "secret".to_string());
        map
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("sandbox"), Some(Environment::Sandbox));
        assert_eq!(
            Environment::parse("production"),
            Some(Environment::Production)
        );
        assert_eq!(Environment::parse("staging"), None);
    }

    #[test]
    fn test_auth_method_parse() {
        assert_eq!(
            AuthMethod::parse("client_credentials"),
            Some(AuthMethod::ClientCredentials)
        );
        assert_eq!(
            AuthMethod::parse("bearer_token"),
            Some(AuthMethod::BearerToken)
        );
        assert_eq!(AuthMethod::parse("public_key"), Some(AuthMethod::PublicKey));
        assert_eq!(AuthMethod::parse("oauth"), None);
    }

    #[test]
    fn test_from_map_defaults() {
        let map = HashMap::new();
        let creds = Credentials::from_map(&map).unwrap();
        assert_eq!(creds.environment, Environment::Sandbox);
        assert_eq!(creds.auth_method, AuthMethod::ClientCredentials);
        assert_eq!(creds.api_version, DEFAULT_API_VERSION);
        assert!(creds.client_id.is_none());
    }

    #[test]
    fn test_from_map_rejects_bad_environment() {
        let mut map = base_map();
        map.insert("cashfree_environment".to_string(), "staging".to_string());
        assert!(Credentials::from_map(&map).is_err());
    }

    #[test]
    fn test_from_map_treats_empty_as_absent() {
        let mut map = base_map();
        map.insert("cashfree_client_id".to_string(), "  ".to_string());
        let creds = Credentials::from_map(&map).unwrap();
        assert!(creds.client_id.is_none());
    }

    #[test]
    fn test_base_urls_by_environment() {
        let mut map = base_map();
        let creds = Credentials::from_map(&map).unwrap();
        assert_eq!(creds.payments_base_url(), "https://sandbox.cashfree.com/pg");
        assert_eq!(creds.payout_base_url(), "https://payout-gamma.cashfree.com");

        map.insert("cashfree_environment".to_string(), "production".to_string());
        let creds = Credentials::from_map(&map).unwrap();
        assert_eq!(creds.payments_base_url(), "https://api.cashfree.com/pg");
        assert_eq!(creds.payout_base_url(), "https://payout-api.cashfree.com");
    }

    #[test]
    fn test_base_url_override_wins() {
        let mut map = base_map();
        map.insert(
            "payments_api_base".to_string(),
            "http://127.0.0.1:9000/pg/".to_string(),
        );
        let creds = Credentials::from_map(&map).unwrap();
        assert_eq!(creds.payments_base_url(), "http://127.0.0.1:9000/pg");
    }

    #[test]
    fn test_validate_requires_environment() {
        let mut map = base_map();
        map.remove("cashfree_environment");
        let err = validate_credential_map(&map).unwrap_err();
        assert!(err.to_string().contains("cashfree_environment"));
    }

    #[test]
    fn test_validate_rejects_unknown_environment() {
        let mut map = base_map();
        map.insert("cashfree_environment".to_string(), "qa".to_string());
        let err = validate_credential_map(&map).unwrap_err();
        assert!(err.to_string().contains("sandbox"));
    }

    #[test]
    fn test_validate_client_credentials_requires_secret() {
        let mut map = base_map();
        map.remove("cashfree_client_secret");
        let err = validate_credential_map(&map).unwrap_err();
        assert!(err.to_string().contains("cashfree_client_secret"));
    }

    #[test]
    fn test_validate_bearer_token_requires_token() {
        let mut map = base_map();
        map.insert("auth_method".to_string(), "bearer_token".to_string());
        let err = validate_credential_map(&map).unwrap_err();
        assert!(err.to_string().contains("bearer_token"));

        map.insert("bearer_token".to_string(), "tok_123".to_string());
        assert!(validate_credential_map(&map).is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_auth_method() {
        let mut map = base_map();
        map.insert("auth_method".to_string(), "oauth".to_string());
        let err = validate_credential_map(&map).unwrap_err();
        assert!(err.to_string().contains("Invalid authentication method"));
    }

    #[test]
    fn test_validate_public_key_requires_all_fields() {
        let mut map = base_map();
        map.insert("auth_method".to_string(), "public_key".to_string());
        let err = validate_credential_map(&map).unwrap_err();
        assert!(err.to_string().contains("cashfree_public_key"));
    }

    #[test]
    fn test_validate_public_key_rejects_garbage_key() {
        let mut map = base_map();
        map.insert("auth_method".to_string(), "public_key".to_string());
        map.insert(
            "cashfree_public_key".to_string(),
            "not a valid key".to_string(),
        );
        let err = validate_credential_map(&map).unwrap_err();
        assert!(matches!(err, CashfreeError::KeyFormat(_)));
    }
}
