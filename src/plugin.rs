//! Host-facing plugin surface
//!
//! Two entry points mirror the plugin lifecycle: credential validation at
//! configuration time, and tool invocation at runtime. Invocation never
//! returns an error; anything that goes wrong is reported inside the
//! normalized result record.

use std::collections::HashMap;

use serde_json::Value;

use crate::client::{build_http_client, ToolOutcome};
use crate::credentials::{validate_credential_map, Credentials};
use crate::error::{CashfreeError, Result};
use crate::tools::{default_registry, fatal, ToolContext, ToolRegistry};

/// The Cashfree tool plugin
///
/// Holds the shared HTTP client and the registry of all nine tools.
/// Credentials are passed per invocation, so one plugin instance serves
/// any number of merchant configurations.
pub struct CashfreePlugin {
    client: reqwest::Client,
    registry: ToolRegistry,
}

impl CashfreePlugin {
    /// Create the plugin with the default tool registry
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            registry: default_registry(),
        })
    }

    /// Validate a credential map at configuration time
    ///
    /// Checks the environment, the auth-method selection, and the fields
    /// the selected method requires; for `public_key` the key must also
    /// parse. No network call is made.
    ///
    /// # Errors
    ///
    /// Returns `CashfreeError::CredentialConfig` or
    /// `CashfreeError::KeyFormat` describing the first problem found.
    pub fn validate_credentials(
        &self,
        credentials: &HashMap<String, String>,
    ) -> std::result::Result<(), CashfreeError> {
        validate_credential_map(credentials)
    }

    /// Names of all registered tools
    pub fn tool_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Definitions of all registered tools, in function-calling format
    pub fn tool_definitions(&self) -> Vec<Value> {
        self.registry.definitions()
    }

    /// Invoke a tool by name and return its normalized result record
    ///
    /// Credential parsing failures and unknown tool names produce a
    /// failure record with a `null` status code, the same shape every
    /// tool returns.
    pub async fn invoke(
        &self,
        tool_name: &str,
        params: Value,
        credentials: &HashMap<String, String>,
    ) -> Value {
        tracing::debug!(tool = %tool_name, "Invoking tool");

        let credentials = match Credentials::from_map(credentials) {
            Ok(credentials) => credentials,
            Err(e) => return ToolOutcome::new(&[]).fail(fatal(e)).into_json(),
        };

        let Some(tool) = self.registry.get(tool_name) else {
            return ToolOutcome::new(&[])
                .fail(fatal(format!(
                    "Unknown tool: {}. Available tools: {}",
                    tool_name,
                    self.registry.names().join(", ")
                )))
                .into_json();
        };

        let ctx = ToolContext {
            client: &self.client,
            credentials: &credentials,
        };
        tool.invoke(&params, &ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sandbox_credential_map;
    use serde_json::json;

    #[test]
    fn test_new_builds_default_registry() {
        let plugin = CashfreePlugin::new().unwrap();
        assert_eq!(plugin.tool_names().len(), 9);
        assert_eq!(plugin.tool_definitions().len(), 9);
    }

    #[test]
    fn test_validate_credentials_accepts_sandbox_map() {
        let plugin = CashfreePlugin::new().unwrap();
        assert!(plugin.validate_credentials(&sandbox_credential_map()).is_ok());
    }

    #[test]
    fn test_validate_credentials_rejects_empty_map() {
        let plugin = CashfreePlugin::new().unwrap();
        assert!(plugin.validate_credentials(&HashMap::new()).is_err());
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let plugin = CashfreePlugin::new().unwrap();
        let record = plugin
            .invoke("transfer_funds", json!({}), &sandbox_credential_map())
            .await;
        assert!(record["status_code"].is_null());
        assert_eq!(record["success"], json!(false));
        let message = record["message"].as_str().unwrap();
        assert!(message.starts_with("Fatal Error: Unknown tool: transfer_funds"));
        assert!(message.contains("create_order"));
    }

    #[tokio::test]
    async fn test_invoke_with_bad_credentials_reports_failure() {
        let plugin = CashfreePlugin::new().unwrap();
        let mut map = sandbox_credential_map();
        map.insert("cashfree_environment".to_string(), "staging".to_string());
        let record = plugin.invoke("get_order", json!({}), &map).await;
        assert!(record["status_code"].is_null());
        assert!(record["message"].as_str().unwrap().starts_with("Fatal Error:"));
    }
}
