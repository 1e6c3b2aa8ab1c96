//! Cashfree API base URLs
//!
//! Two distinct REST surfaces with different hosts per environment: the
//! Payments API (`.../pg/...`) and the Payout API (`.../payout/v1/...`).

use crate::credentials::Environment;

/// Payments API base URL, production
pub const PAYMENTS_PRODUCTION_URL: &str = "https://api.cashfree.com/pg";
/// Payments API base URL, sandbox
pub const PAYMENTS_SANDBOX_URL: &str = "https://sandbox.cashfree.com/pg";
/// Payout API base URL, production
pub const PAYOUT_PRODUCTION_URL: &str = "https://payout-api.cashfree.com";
/// Payout API base URL, sandbox (Cashfree's gamma host)
pub const PAYOUT_SANDBOX_URL: &str = "https://payout-gamma.cashfree.com";

/// Payout authorize endpoint path used by the bearer-token exchange
pub const PAYOUT_AUTHORIZE_PATH: &str = "/payout/v1/authorize";

/// Resolve the Payments API base URL for an environment
pub fn payments_base_url(environment: Environment) -> &'static str {
    match environment {
        Environment::Production => PAYMENTS_PRODUCTION_URL,
        Environment::Sandbox => PAYMENTS_SANDBOX_URL,
    }
}

/// Resolve the Payout API base URL for an environment
pub fn payout_base_url(environment: Environment) -> &'static str {
    match environment {
        Environment::Production => PAYOUT_PRODUCTION_URL,
        Environment::Sandbox => PAYOUT_SANDBOX_URL,
    }
}
