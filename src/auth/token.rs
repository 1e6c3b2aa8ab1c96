//! Bearer-token exchange against the Payout authorize endpoint
//!
//! One POST per call, no retries and no caching: every payout-style
//! invocation that needs a derived token performs a fresh signature and a
//! fresh exchange. A failure here is fatal for that invocation only.

use serde_json::Value;

use crate::endpoints::PAYOUT_AUTHORIZE_PATH;
use crate::error::CashfreeError;

/// Exchange an RSA-OAEP signature for a bearer token
///
/// POSTs an empty JSON body to `{payout_base}/payout/v1/authorize` with
/// the `X-Client-Id`, `X-Client-Secret` and `X-Cf-Signature` headers and
/// extracts `data.token` from the 200 response.
///
/// # Arguments
///
/// * `client` - Shared HTTP client (carries the 30-second timeout)
/// * `payout_base` - Payout API base URL for the target environment
/// * `client_id` - Cashfree client identifier
/// * `client_secret` - Cashfree client secret
/// * `signature` - Base64 signature from [`crate::auth::generate_signature`]
///
/// # Errors
///
/// * `CashfreeError::Network` on transport failure (timeout, refused, DNS)
/// * `CashfreeError::AuthExchange` on a non-200 response, carrying the
///   status code and any `message`/`subCode`/`status` fields the server
///   surfaced
/// * `CashfreeError::TokenExtraction` when a 200 response has no
///   `data.token`, including the raw response shape for diagnosis
pub async fn fetch_bearer_token(
    client: &reqwest::Client,
    payout_base: &str,
    client_id: &str,
    client_secret: &str,
    signature: &str,
) -> Result<String, CashfreeError> {
    let url = format!("{}{}", payout_base, PAYOUT_AUTHORIZE_PATH);
    tracing::debug!(url = %url, "Requesting bearer token");

    let response = client
        .post(&url)
        .header("Content-Type", "application/json")
        .header("X-Client-Id", client_id)
        .header("X-Client-Secret", client_secret)
        .header("X-Cf-Signature", signature)
        .json(&serde_json::json!({}))
        .send()
        .await
        .map_err(|e| CashfreeError::Network(format!("Authorize request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CashfreeError::Network(format!("Failed to read authorize response: {}", e)))?;

    if !status.is_success() {
        return Err(CashfreeError::AuthExchange {
            status_code: status.as_u16(),
            message: describe_exchange_failure(&body),
        });
    }

    let parsed: Value = serde_json::from_str(&body).map_err(|_| {
        CashfreeError::TokenExtraction(format!(
            "Authorize response was not JSON: {}",
            truncate(&body, 200)
        ))
    })?;

    match parsed.get("data").and_then(|d| d.get("token")).and_then(Value::as_str) {
        Some(token) => {
            tracing::debug!("Bearer token obtained");
            Ok(token.to_string())
        }
        None => Err(CashfreeError::TokenExtraction(format!(
            "Bearer token not found in response. Response structure: {}",
            parsed
        ))),
    }
}

/// Build a diagnostic message from an authorize error body
///
/// Surfaces the server's `message`, `subCode` and `status` fields when the
/// body is JSON, or the raw text otherwise.
fn describe_exchange_failure(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(parsed) => {
            let mut message = parsed
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            if let Some(sub_code) = parsed.get("subCode").and_then(Value::as_str) {
                message.push_str(&format!(", SubCode: {}", sub_code));
            }
            if let Some(status) = parsed.get("status").and_then(Value::as_str) {
                message.push_str(&format!(", Status: {}", status));
            }
            message
        }
        Err(_) => format!("Response: {}", truncate(body, 200)),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
