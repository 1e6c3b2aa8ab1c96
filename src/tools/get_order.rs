//! Fetch order details
//!
//! GET `{payments_base}/orders/{order_id}`.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{execute, HttpMethod, ToolOutcome};
use crate::tools::{
    auth_failure, fatal, network_message, payments_headers, CashfreeTool, ToolContext,
};
use crate::validate::required_str;

pub struct GetOrderTool;

#[async_trait]
impl CashfreeTool for GetOrderTool {
    fn definition(&self) -> Value {
        json!({
            "name": "get_order",
            "description": "Fetch the current details and status of a Cashfree order",
            "parameters": {
                "type": "object",
                "properties": {
                    "order_id": {"type": "string", "description": "Order identifier to look up"}
                },
                "required": ["order_id"]
            }
        })
    }

    async fn invoke(&self, params: &Value, ctx: &ToolContext<'_>) -> Value {
        let outcome = ToolOutcome::new(&[]);

        let order_id =
            match required_str(params, "order_id", "order_id is required but was not provided.") {
                Ok(order_id) => order_id,
                Err(e) => return outcome.fail(fatal(e)).into_json(),
            };

        let headers = match payments_headers(ctx).await {
            Ok(headers) => headers,
            Err(e) => return auth_failure(outcome, e),
        };

        let url = format!("{}/orders/{}", ctx.credentials.payments_base_url(), order_id);
        let mut outcome = outcome;
        match execute(ctx.client, HttpMethod::Get, &url, &headers, None).await {
            Ok(raw) => {
                outcome.absorb(&raw);
                if let Some(data) = &raw.json {
                    if outcome.success {
                        let order_status = data
                            .get("order_status")
                            .and_then(Value::as_str)
                            .unwrap_or("UNKNOWN");
                        outcome.set_message(format!(
                            "Details fetched successfully. Order Status: {}",
                            order_status
                        ));
                    } else {
                        outcome.set_message(raw.error_message());
                    }
                }
                outcome.into_json()
            }
            Err(e) => outcome.network_failure(network_message(e)).into_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sandbox_credentials;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_order_id() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let record = GetOrderTool.invoke(&json!({}), &ctx).await;
        assert!(record["status_code"].is_null());
        assert_eq!(record["success"], json!(false));
        assert_eq!(
            record["message"],
            "Fatal Error: order_id is required but was not provided."
        );
        assert!(record["api_response"].is_null());
    }

    #[tokio::test]
    async fn test_empty_order_id_counts_as_missing() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let record = GetOrderTool.invoke(&json!({"order_id": ""}), &ctx).await;
        assert_eq!(
            record["message"],
            "Fatal Error: order_id is required but was not provided."
        );
    }
}
