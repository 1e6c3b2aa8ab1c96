//! Cashfree tool implementations
//!
//! One module per operation: five order/refund tools and three payment
//! link tools against the Payments API, plus two Cashgram tools against
//! the Payout API. Each tool validates its parameters, performs at most
//! one HTTP call, and returns the normalized result record as JSON.

pub mod cancel_payment_link;
pub mod create_cashgram;
pub mod create_order;
pub mod create_payment_link;
pub mod create_refund;
pub mod deactivate_cashgram;
pub mod get_order;
pub mod get_order_refunds;
pub mod get_payment_link_orders;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::build_auth_headers;
use crate::client::ToolOutcome;
use crate::credentials::Credentials;
use crate::error::CashfreeError;

/// Shared state handed to every tool invocation
pub struct ToolContext<'a> {
    /// HTTP client carrying the plugin-wide timeout
    pub client: &'a reqwest::Client,
    /// Resolved credentials for this invocation
    pub credentials: &'a Credentials,
}

/// A single Cashfree operation exposed to the host
///
/// Implementations never return errors: every failure mode is folded
/// into the normalized result record so the host always receives one
/// JSON value per invocation.
#[async_trait]
pub trait CashfreeTool: Send + Sync {
    /// Tool definition in function-calling format
    ///
    /// ```json
    /// {
    ///   "name": "tool_name",
    ///   "description": "Tool description",
    ///   "parameters": {
    ///     "type": "object",
    ///     "properties": { "param1": {"type": "string", "description": "..."} },
    ///     "required": ["param1"]
    ///   }
    /// }
    /// ```
    fn definition(&self) -> Value;

    /// Run the operation and return the normalized result record
    async fn invoke(&self, params: &Value, ctx: &ToolContext<'_>) -> Value;
}

/// Registry of available tools, keyed by name
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn CashfreeTool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool under a name
    pub fn register(&mut self, name: impl Into<String>, tool: Arc<dyn CashfreeTool>) {
        self.tools.insert(name.into(), tool);
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn CashfreeTool>> {
        self.tools.get(name).cloned()
    }

    /// Names of all registered tools
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Definitions of all registered tools
    pub fn definitions(&self) -> Vec<Value> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the registry holding all nine Cashfree tools
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register("create_order", Arc::new(create_order::CreateOrderTool));
    registry.register("get_order", Arc::new(get_order::GetOrderTool));
    registry.register("create_refund", Arc::new(create_refund::CreateRefundTool));
    registry.register(
        "get_order_refunds",
        Arc::new(get_order_refunds::GetOrderRefundsTool),
    );
    registry.register(
        "create_payment_link",
        Arc::new(create_payment_link::CreatePaymentLinkTool),
    );
    registry.register(
        "cancel_payment_link",
        Arc::new(cancel_payment_link::CancelPaymentLinkTool),
    );
    registry.register(
        "get_payment_link_orders",
        Arc::new(get_payment_link_orders::GetPaymentLinkOrdersTool),
    );
    registry.register(
        "create_cashgram",
        Arc::new(create_cashgram::CreateCashgramTool),
    );
    registry.register(
        "deactivate_cashgram",
        Arc::new(deactivate_cashgram::DeactivateCashgramTool),
    );
    registry
}

/// Prefix a validation or credential failure message
pub(crate) fn fatal(message: impl std::fmt::Display) -> String {
    format!("Fatal Error: {}", message)
}

/// Headers for a Payments API call: auth plus Accept and a fresh request id
pub(crate) async fn payments_headers(
    ctx: &ToolContext<'_>,
) -> Result<HashMap<String, String>, CashfreeError> {
    let mut headers = build_auth_headers(ctx.client, ctx.credentials, true, false).await?;
    headers.insert("Accept".to_string(), "application/json".to_string());
    headers.insert("x-request-id".to_string(), Uuid::new_v4().to_string());
    Ok(headers)
}

/// Headers for a Payout API call: auth only, no API version header
pub(crate) async fn payout_headers(
    ctx: &ToolContext<'_>,
) -> Result<HashMap<String, String>, CashfreeError> {
    build_auth_headers(ctx.client, ctx.credentials, false, true).await
}

/// Unwrap the transport error detail for the network-failure message
pub(crate) fn network_message(err: CashfreeError) -> String {
    match err {
        CashfreeError::Network(message) => message,
        other => other.to_string(),
    }
}

/// Fold a header-building failure into the result record
///
/// A transport failure during the payout token exchange reports as a
/// network error (`status_code = 0`); everything else never reached the
/// network and keeps the `null` status code.
pub(crate) fn auth_failure(outcome: ToolOutcome, err: CashfreeError) -> Value {
    match err {
        CashfreeError::Network(message) => outcome.network_failure(message).into_json(),
        other => outcome.fail(fatal(other)).into_json(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_holds_all_tools() {
        let registry = default_registry();
        assert_eq!(registry.len(), 9);
        assert_eq!(
            registry.names(),
            vec![
                "cancel_payment_link",
                "create_cashgram",
                "create_order",
                "create_payment_link",
                "create_refund",
                "deactivate_cashgram",
                "get_order",
                "get_order_refunds",
                "get_payment_link_orders",
            ]
        );
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_registry_lookup() {
        let registry = default_registry();
        assert!(registry.get("create_order").is_some());
        assert!(registry.get("unknown_tool").is_none());
    }

    #[test]
    fn test_definitions_carry_names() {
        let registry = default_registry();
        let definitions = registry.definitions();
        assert_eq!(definitions.len(), 9);
        for definition in definitions {
            assert!(definition.get("name").and_then(Value::as_str).is_some());
            assert!(definition.get("parameters").is_some());
        }
    }

    #[test]
    fn test_fatal_prefix() {
        assert_eq!(fatal("order_id is required"), "Fatal Error: order_id is required");
    }
}
