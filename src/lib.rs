//! Cashfree Tools - payment tool plugin library
//!
//! This library implements a plugin exposing tools that wrap the Cashfree
//! Payments API (orders, refunds, payment links) and Payout API (cashgram
//! disbursement). Each tool validates its parameters, builds authentication
//! headers from the host-supplied credentials, issues a single HTTP call,
//! and normalizes the response into a structured JSON result.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: Signature generation, bearer-token exchange, and header policy
//! - `client`: Shared HTTP client and response normalization
//! - `credentials`: Credential parsing and configuration-time validation
//! - `endpoints`: Per-environment Cashfree API base URLs
//! - `error`: Error types and result aliases
//! - `plugin`: Host-facing entry points (validate credentials, invoke tool)
//! - `test_utils`: Credential builders shared by the test suites
//! - `tools`: One module per operation plus the tool registry
//! - `validate`: Shared parameter validators
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use cashfree_tools::CashfreePlugin;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut credentials = HashMap::new();
//!     credentials.insert("cashfree_environment".to_string(), "sandbox".to_string());
//!     credentials.insert("auth_method".to_string(), "client_credentials".to_string());
//!     credentials.insert("cashfree_client_id".to_string(), "id".to_string());
//!     credentials.insert("cashfree_client_secret".to_string(), "secret".to_string());
//!
//!     let plugin = CashfreePlugin::new()?;
//!     plugin.validate_credentials(&credentials)?;
//!
//!     let params = serde_json::json!({ "order_id": "order_12345" });
//!     let result = plugin.invoke("get_order", params, &credentials).await;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod plugin;
pub mod test_utils;
pub mod tools;
pub mod validate;

// Re-export commonly used types
pub use client::ToolOutcome;
pub use credentials::{AuthMethod, Credentials, Environment};
pub use error::{CashfreeError, Result};
pub use plugin::CashfreePlugin;
pub use tools::{CashfreeTool, ToolRegistry};
