//! Error types for the Cashfree tool plugin
//!
//! This module defines all error types used throughout the plugin,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Cashfree plugin operations
///
/// This enum encompasses all possible errors that can occur during
/// credential validation, signature generation, the bearer-token
/// exchange, and tool execution. Every variant is caught inside a
/// single tool invocation and converted into the normalized result
/// record; none escape to the host.
#[derive(Error, Debug)]
pub enum CashfreeError {
    /// Missing or invalid credentials for the selected auth method
    #[error("Credential configuration error: {0}")]
    CredentialConfig(String),

    /// Public key could not be base64-decoded or DER-parsed
    #[error("Key format error: {0}")]
    KeyFormat(String),

    /// RSA-OAEP encryption of the signature payload failed
    #[error("Signature error: {0}")]
    Signature(String),

    /// The authorize endpoint rejected the signature exchange
    #[error("Auth exchange failed: status={status_code}, {message}")]
    AuthExchange {
        /// HTTP status returned by the authorize endpoint
        status_code: u16,
        /// Server message, including subCode/status when present
        message: String,
    },

    /// The authorize endpoint returned 200 without a usable token
    #[error("Token extraction failed: {0}")]
    TokenExtraction(String),

    /// Transport-level failure (timeout, connection refused, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Cashfree plugin operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
