//! Test utilities
//!
//! Credential-map builders shared by unit and integration tests.

use std::collections::HashMap;

use crate::credentials::Credentials;

/// Credential map for a sandbox merchant using static client credentials
pub fn sandbox_credential_map() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("cashfree_environment".to_string(), "sandbox".to_string());
    map.insert("auth_method".to_string(), "client_credentials".to_string());
    map.insert("cashfree_client_id".to_string(), "test_client_id".to_string());
    map.insert(
        "cashfree_client_secret".to_string(),
        "test_client_secret".to_string(),
    );
    map
}

/// Parsed sandbox credentials with static client credentials
pub fn sandbox_credentials() -> Credentials {
    Credentials::from_map(&sandbox_credential_map())
        .expect("sandbox credential map must parse")
}

/// Sandbox credentials with extra or overridden entries
pub fn credentials_with(overrides: &[(&str, &str)]) -> Credentials {
    let mut map = sandbox_credential_map();
    for (key, value) in overrides {
        map.insert((*key).to_string(), (*value).to_string());
    }
    Credentials::from_map(&map).expect("credential map must parse")
}
