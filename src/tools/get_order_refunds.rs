//! List all refunds for an order
//!
//! GET `{payments_base}/orders/{order_id}/refunds`. The response may be a
//! bare array or an object with a `refunds` field; both shapes are
//! accepted. The summary sums every numeric `refund_amount`.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{execute, HttpMethod, ToolOutcome};
use crate::tools::{
    auth_failure, fatal, network_message, payments_headers, CashfreeTool, ToolContext,
};
use crate::validate::required_str;

pub struct GetOrderRefundsTool;

#[async_trait]
impl CashfreeTool for GetOrderRefundsTool {
    fn definition(&self) -> Value {
        json!({
            "name": "get_order_refunds",
            "description": "List all refunds raised against a Cashfree order with a refunded-amount summary",
            "parameters": {
                "type": "object",
                "properties": {
                    "order_id": {"type": "string", "description": "Order whose refunds to list"}
                },
                "required": ["order_id"]
            }
        })
    }

    async fn invoke(&self, params: &Value, ctx: &ToolContext<'_>) -> Value {
        let mut outcome = ToolOutcome::new(&[
            ("order_id", Value::Null),
            ("refunds_count", json!(0)),
            ("total_refunded_amount", json!(0.0)),
            ("refunds", json!([])),
        ]);

        let order_id =
            match required_str(params, "order_id", "order_id is required but was not provided.") {
                Ok(order_id) => order_id.to_string(),
                Err(e) => return outcome.fail(fatal(e)).into_json(),
            };
        outcome.set_extra("order_id", json!(order_id));

        let headers = match payments_headers(ctx).await {
            Ok(headers) => headers,
            Err(e) => return auth_failure(outcome, e),
        };

        let url = format!(
            "{}/orders/{}/refunds",
            ctx.credentials.payments_base_url(),
            order_id
        );
        match execute(ctx.client, HttpMethod::Get, &url, &headers, None).await {
            Ok(raw) => {
                outcome.absorb(&raw);
                if let Some(data) = &raw.json {
                    if outcome.success {
                        let refunds = extract_refunds(data);
                        let total_refunded: f64 = refunds
                            .iter()
                            .filter_map(|r| r.get("refund_amount"))
                            .filter_map(Value::as_f64)
                            .sum();
                        let count = refunds.len();

                        outcome.set_extra("refunds", Value::Array(refunds));
                        outcome.set_extra("refunds_count", json!(count));
                        outcome.set_extra("total_refunded_amount", json!(total_refunded));
                        if count > 0 {
                            outcome.set_message(format!(
                                "Retrieved {} refund(s) for order {}. Total refunded amount: \u{20b9}{:.2}",
                                count, order_id, total_refunded
                            ));
                        } else {
                            outcome.set_message(format!("No refunds found for order {}", order_id));
                        }
                    } else {
                        outcome.set_message(refine_error(
                            raw.status_code,
                            &raw.error_message(),
                            &order_id,
                        ));
                    }
                }
                outcome.into_json()
            }
            Err(e) => outcome.network_failure(network_message(e)).into_json(),
        }
    }
}

/// Accept both the bare-array and `{"refunds": [...]}` response shapes
fn extract_refunds(data: &Value) -> Vec<Value> {
    match data {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map
            .get("refunds")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn refine_error(status_code: u16, error_message: &str, order_id: &str) -> String {
    match status_code {
        404 => format!("Order not found: {}. Please verify the order_id.", order_id),
        400 => format!(
            "Bad Request: {}. Please check the order_id format.",
            error_message
        ),
        _ => error_message.to_string(),
    }
}
