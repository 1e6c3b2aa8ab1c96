//! Shared HTTP execution and result normalization
//!
//! Every tool issues exactly one HTTP call through the shared client and
//! folds whatever comes back (or fails to come back) into a [`ToolOutcome`]
//! record. Transport failures never surface as errors to the host; they
//! become a result with `status_code = 0`. All I/O uses a fixed 30-second
//! timeout with no retry or backoff.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CashfreeError, Result};

/// Fixed timeout applied to every outbound request
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build the shared HTTP client with the plugin-wide timeout
///
/// # Errors
///
/// Returns error if the underlying TLS backend fails to initialize.
pub fn build_http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| CashfreeError::Network(format!("Failed to create HTTP client: {}", e)))?;
    Ok(client)
}

/// HTTP method for a tool's single API call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One raw upstream response: status plus body in both forms
///
/// `json` is `None` when the server returned a non-JSON body; `text`
/// always holds the raw payload.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status_code: u16,
    /// Parsed JSON body, when the body parses
    pub json: Option<Value>,
    /// Raw body text
    pub text: String,
}

impl RawResponse {
    /// Server's `message` field, or a generic status description
    pub fn error_message(&self) -> String {
        self.json
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("API returned error status {}", self.status_code))
    }
}

/// Issue the single HTTP call for a tool invocation
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `method` - GET or POST
/// * `url` - Fully assembled endpoint URL
/// * `headers` - Header map from the auth builder plus per-tool headers
/// * `body` - Optional JSON request body (POST only)
///
/// # Errors
///
/// Returns `CashfreeError::Network` on transport failure; HTTP error
/// statuses are NOT errors here - they come back as a [`RawResponse`] for
/// the tool to classify.
pub async fn execute(
    client: &reqwest::Client,
    method: HttpMethod,
    url: &str,
    headers: &HashMap<String, String>,
    body: Option<&Value>,
) -> std::result::Result<RawResponse, CashfreeError> {
    tracing::debug!(method = ?method, url = %url, "Dispatching API request");

    let mut request = match method {
        HttpMethod::Get => client.get(url),
        HttpMethod::Post => client.post(url),
    };
    for (name, value) in headers {
        request = request.header(name, value);
    }
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request.send().await.map_err(|e| {
        CashfreeError::Network(format!(
            "Could not connect to API within timeout. Details: {}",
            e
        ))
    })?;

    let status_code = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| CashfreeError::Network(format!("Failed to read response body: {}", e)))?;
    let json = serde_json::from_str::<Value>(&text).ok();

    tracing::debug!(status = status_code, "API response received");

    Ok(RawResponse {
        status_code,
        json,
        text,
    })
}

/// Normalized result record produced by every tool invocation
///
/// Serializes to `{status_code, success, api_response, message, ...}`.
/// `status_code` is `null` when no HTTP call was attempted (validation or
/// credential failure), `0` when the transport failed before a response
/// arrived, and the HTTP status otherwise. Operation-specific fields ride
/// along in `extra`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutcome {
    /// HTTP status; `None` before any call, `Some(0)` on transport failure
    pub status_code: Option<u16>,
    /// True exactly when the API returned 200
    pub success: bool,
    /// Parsed body, or `{"raw_text": ...}` for non-JSON bodies
    pub api_response: Option<Value>,
    /// Human-readable summary of the invocation
    pub message: String,
    /// Operation-specific fields merged into the serialized record
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolOutcome {
    /// Create an empty outcome with pre-seeded operation-specific fields
    pub fn new(extra_fields: &[(&str, Value)]) -> Self {
        let mut extra = Map::new();
        for (key, value) in extra_fields {
            extra.insert((*key).to_string(), value.clone());
        }
        Self {
            status_code: None,
            success: false,
            api_response: None,
            message: String::new(),
            extra,
        }
    }

    /// Record a validation or credential failure (no HTTP call attempted)
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Record a transport-level failure (`status_code = 0`)
    pub fn network_failure(mut self, message: impl Into<String>) -> Self {
        self.status_code = Some(0);
        self.success = false;
        self.message = format!("Network Error: {}", message.into());
        self
    }

    /// Fold a raw upstream response into the record
    ///
    /// Sets `status_code`, `success` and `api_response`; the caller then
    /// refines `message` and the extra fields from the parsed body.
    pub fn absorb(&mut self, response: &RawResponse) {
        self.status_code = Some(response.status_code);
        self.success = response.status_code == 200;
        self.api_response = Some(match &response.json {
            Some(json) => json.clone(),
            None => serde_json::json!({ "raw_text": response.text }),
        });
        if response.json.is_none() {
            self.message = format!(
                "API returned non-JSON response with status code {}.",
                response.status_code
            );
        }
    }

    /// Set an operation-specific field
    pub fn set_extra(&mut self, key: &str, value: Value) {
        self.extra.insert(key.to_string(), value);
    }

    /// Set the human-readable message
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Render the record as the JSON value handed back to the host
    pub fn into_json(self) -> Value {
        serde_json::to_value(&self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_validation_failure_has_null_status() {
        let outcome = ToolOutcome::new(&[("order_id", Value::Null)])
            .fail("Fatal Error: order_id is required");
        let record = outcome.into_json();
        assert!(record["status_code"].is_null());
        assert_eq!(record["success"], json!(false));
        assert_eq!(record["order_id"], Value::Null);
        assert!(record["message"]
            .as_str()
            .unwrap()
            .contains("order_id is required"));
    }

    #[test]
    fn test_outcome_network_failure_is_status_zero() {
        let outcome = ToolOutcome::new(&[]).network_failure("connection refused");
        let record = outcome.into_json();
        assert_eq!(record["status_code"], json!(0));
        assert_eq!(record["success"], json!(false));
        assert!(record["message"]
            .as_str()
            .unwrap()
            .starts_with("Network Error:"));
    }

    #[test]
    fn test_absorb_json_success() {
        let mut outcome = ToolOutcome::new(&[]);
        outcome.absorb(&RawResponse {
            status_code: 200,
            json: Some(json!({"order_id": "order_1"})),
            text: String::new(),
        });
        assert!(outcome.success);
        assert_eq!(outcome.status_code, Some(200));
        assert_eq!(outcome.api_response.unwrap()["order_id"], "order_1");
    }

    #[test]
    fn test_absorb_non_json_body_becomes_raw_text() {
        let mut outcome = ToolOutcome::new(&[]);
        outcome.absorb(&RawResponse {
            status_code: 502,
            json: None,
            text: "<html>bad gateway</html>".to_string(),
        });
        assert!(!outcome.success);
        let api_response = outcome.api_response.clone().unwrap();
        assert_eq!(api_response["raw_text"], "<html>bad gateway</html>");
        assert!(outcome.message.contains("non-JSON"));
        assert!(outcome.message.contains("502"));
    }

    #[test]
    fn test_raw_response_error_message_prefers_server_message() {
        let response = RawResponse {
            status_code: 400,
            json: Some(json!({"message": "order already exists"})),
            text: String::new(),
        };
        assert_eq!(response.error_message(), "order already exists");

        let no_message = RawResponse {
            status_code: 500,
            json: Some(json!({"code": "SERVER_ERROR"})),
            text: String::new(),
        };
        assert_eq!(no_message.error_message(), "API returned error status 500");
    }

    #[test]
    fn test_into_json_merges_extra_fields() {
        let mut outcome = ToolOutcome::new(&[("refund_id", Value::Null)]);
        outcome.set_extra("refund_id", json!("refund123"));
        outcome.set_extra("refund_status", json!("PENDING"));
        let record = outcome.into_json();
        assert_eq!(record["refund_id"], "refund123");
        assert_eq!(record["refund_status"], "PENDING");
    }
}
