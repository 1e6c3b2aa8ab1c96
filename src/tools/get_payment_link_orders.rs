//! List orders created against a payment link
//!
//! GET `{payments_base}/links/{link_id}/orders?status={ALL|PAID}`. The
//! status filter defaults to PAID and is always sent.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{execute, HttpMethod, ToolOutcome};
use crate::tools::{
    auth_failure, fatal, network_message, payments_headers, CashfreeTool, ToolContext,
};
use crate::validate::{check_one_of, optional_str, required_str};

pub struct GetPaymentLinkOrdersTool;

#[async_trait]
impl CashfreeTool for GetPaymentLinkOrdersTool {
    fn definition(&self) -> Value {
        json!({
            "name": "get_payment_link_orders",
            "description": "List the orders created against a Cashfree payment link",
            "parameters": {
                "type": "object",
                "properties": {
                    "link_id": {"type": "string", "description": "Payment link whose orders to list"},
                    "status": {"type": "string", "description": "Filter: ALL or PAID, defaults to PAID"}
                },
                "required": ["link_id"]
            }
        })
    }

    async fn invoke(&self, params: &Value, ctx: &ToolContext<'_>) -> Value {
        let mut outcome = ToolOutcome::new(&[
            ("link_id", Value::Null),
            ("orders_count", json!(0)),
            ("orders", json!([])),
        ]);

        let link_id =
            match required_str(params, "link_id", "link_id is required but was not provided.") {
                Ok(link_id) => link_id.to_string(),
                Err(e) => return outcome.fail(fatal(e)).into_json(),
            };
        outcome.set_extra("link_id", json!(link_id));

        let status = optional_str(params, "status").unwrap_or("PAID");
        if let Err(e) = check_one_of(status, "status", &["ALL", "PAID"]) {
            return outcome.fail(fatal(e)).into_json();
        }

        let headers = match payments_headers(ctx).await {
            Ok(headers) => headers,
            Err(e) => return auth_failure(outcome, e),
        };

        let url = format!(
            "{}/links/{}/orders?status={}",
            ctx.credentials.payments_base_url(),
            link_id,
            status
        );
        match execute(ctx.client, HttpMethod::Get, &url, &headers, None).await {
            Ok(raw) => {
                outcome.absorb(&raw);
                if let Some(data) = &raw.json {
                    if outcome.success {
                        let orders = extract_orders(data);
                        let count = orders.len();
                        outcome.set_extra("orders", Value::Array(orders));
                        outcome.set_extra("orders_count", json!(count));
                        if count > 0 {
                            outcome.set_message(format!(
                                "Retrieved {} order(s) for payment link {} with status filter: {}",
                                count, link_id, status
                            ));
                        } else {
                            outcome.set_message(format!(
                                "No orders found for payment link {} with status filter: {}",
                                link_id, status
                            ));
                        }
                    } else {
                        outcome.set_message(refine_error(
                            raw.status_code,
                            &raw.error_message(),
                            &link_id,
                        ));
                    }
                }
                outcome.into_json()
            }
            Err(e) => outcome.network_failure(network_message(e)).into_json(),
        }
    }
}

/// Accept both the bare-array and `{"orders": [...]}` response shapes
fn extract_orders(data: &Value) -> Vec<Value> {
    match data {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map
            .get("orders")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn refine_error(status_code: u16, error_message: &str, link_id: &str) -> String {
    match status_code {
        404 => format!(
            "Payment link not found: {}. Please verify the link_id.",
            link_id
        ),
        400 => format!(
            "Bad Request: {}. Please check the link_id format and status parameter.",
            error_message
        ),
        _ => error_message.to_string(),
    }
}
