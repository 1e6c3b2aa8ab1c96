//! Authentication header selection
//!
//! Builds the header set for an outgoing request from the configured auth
//! method and the target API surface. The `public_key` method only derives
//! a bearer token for Payout API calls; for Payments API calls it falls
//! back to static client-id/secret headers. That asymmetry is a deliberate
//! Cashfree policy, not an oversight. Schemes are never mixed within one
//! request.

use std::collections::HashMap;

use crate::auth::signature::{generate_signature, parse_public_key};
use crate::auth::token::fetch_bearer_token;
use crate::credentials::{AuthMethod, Credentials};
use crate::error::CashfreeError;

/// Header names shared across the plugin
pub mod names {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const X_API_VERSION: &str = "X-Api-Version";
    pub const X_CLIENT_ID: &str = "X-Client-Id";
    pub const X_CLIENT_SECRET: &str = "X-Client-Secret";
    pub const AUTHORIZATION: &str = "Authorization";
}

/// Build the authentication header map for one request
///
/// Selects among three schemes based on the configured auth method and the
/// target API surface:
///
/// * `client_credentials` - static `X-Client-Id`/`X-Client-Secret`
/// * `bearer_token` - `Authorization: Bearer <static token>`
/// * `public_key` + Payout surface - fresh signature, fresh token
///   exchange, `Authorization: Bearer <fetched token>`
/// * `public_key` + Payments surface - static `X-Client-Id`/`X-Client-Secret`
///
/// `X-Api-Version` is added only when `include_api_version` is set AND the
/// target is not the Payout API, which neither accepts nor requires it.
///
/// # Errors
///
/// Returns `CashfreeError::CredentialConfig` when a field the selected
/// scheme needs is absent, or any signature/exchange error from the
/// `public_key` payout path.
pub async fn build_auth_headers(
    client: &reqwest::Client,
    credentials: &Credentials,
    include_api_version: bool,
    is_payout_api: bool,
) -> Result<HashMap<String, String>, CashfreeError> {
    let mut headers = HashMap::new();
    headers.insert(
        names::CONTENT_TYPE.to_string(),
        "application/json".to_string(),
    );

    if include_api_version && !is_payout_api {
        headers.insert(
            names::X_API_VERSION.to_string(),
            credentials.api_version.clone(),
        );
    }

    match credentials.auth_method {
        AuthMethod::ClientCredentials => {
            insert_client_credentials(&mut headers, credentials)?;
        }
        AuthMethod::BearerToken => {
            let token = credentials.bearer_token.as_deref().ok_or_else(|| {
                CashfreeError::CredentialConfig("Cashfree bearer token is missing.".to_string())
            })?;
            headers.insert(
                names::AUTHORIZATION.to_string(),
                format!("Bearer {}", token),
            );
        }
        AuthMethod::PublicKey => {
            if is_payout_api {
                let token = derive_bearer_token(client, credentials).await?;
                headers.insert(
                    names::AUTHORIZATION.to_string(),
                    format!("Bearer {}", token),
                );
            } else {
                // Payments API calls under public_key auth use static
                // credentials; the derived token is payout-only.
                insert_client_credentials(&mut headers, credentials)?;
            }
        }
    }

    Ok(headers)
}

fn insert_client_credentials(
    headers: &mut HashMap<String, String>,
    credentials: &Credentials,
) -> Result<(), CashfreeError> {
    let client_id = credentials.client_id.as_deref().ok_or_else(|| {
        CashfreeError::CredentialConfig(
            "Cashfree client credentials (Client ID/Secret) are missing.".to_string(),
        )
    })?;
    let client_secret = credentials.client_secret.as_deref().ok_or_else(|| {
        CashfreeError::CredentialConfig(
            "Cashfree client credentials (Client ID/Secret) are missing.".to_string(),
        )
    })?;
    headers.insert(names::X_CLIENT_ID.to_string(), client_id.to_string());
    headers.insert(
        names::X_CLIENT_SECRET.to_string(),
        client_secret.to_string(),
    );
    Ok(())
}

/// Run the signature + exchange round trip for a payout call
async fn derive_bearer_token(
    client: &reqwest::Client,
    credentials: &Credentials,
) -> Result<String, CashfreeError> {
    let client_id = credentials.client_id.as_deref().ok_or_else(|| {
        CashfreeError::CredentialConfig(
            "Cashfree client credentials (Client ID/Secret) are missing.".to_string(),
        )
    })?;
    let client_secret = credentials.client_secret.as_deref().ok_or_else(|| {
        CashfreeError::CredentialConfig(
            "Cashfree client credentials (Client ID/Secret) are missing.".to_string(),
        )
    })?;
    let pem = credentials.public_key.as_deref().ok_or_else(|| {
        CashfreeError::CredentialConfig("Cashfree public key is missing".to_string())
    })?;

    let public_key = parse_public_key(pem)?;
    let signature = generate_signature(client_id, &public_key)?;

    fetch_bearer_token(
        client,
        &credentials.payout_base_url(),
        client_id,
        client_secret,
        &signature,
    )
    .await
}
