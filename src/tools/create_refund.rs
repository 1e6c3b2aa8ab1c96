//! Initiate a refund against a paid order
//!
//! POST `{payments_base}/orders/{order_id}/refunds`. Refund identifiers
//! are strictly alphanumeric, unlike order and link identifiers which
//! also allow underscore and hyphen. Common 400 responses get refined
//! explanations from the server's message text.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::client::{execute, HttpMethod, ToolOutcome};
use crate::tools::{
    auth_failure, fatal, network_message, payments_headers, CashfreeTool, ToolContext,
};
use crate::validate::{
    check_alphanumeric, check_length, check_one_of, missing_required, optional_str,
    required_amount_positive,
};

pub struct CreateRefundTool;

#[async_trait]
impl CashfreeTool for CreateRefundTool {
    fn definition(&self) -> Value {
        json!({
            "name": "create_refund",
            "description": "Initiate a full or partial refund for a Cashfree order",
            "parameters": {
                "type": "object",
                "properties": {
                    "order_id": {"type": "string", "description": "Order to refund"},
                    "refund_amount": {"type": "number", "description": "Amount to refund, must be greater than 0"},
                    "refund_id": {"type": "string", "description": "Unique refund id, 3-40 alphanumeric characters"},
                    "refund_note": {"type": "string", "description": "Optional note, 3-100 characters"},
                    "refund_speed": {"type": "string", "description": "STANDARD or INSTANT, defaults to STANDARD"}
                },
                "required": ["order_id", "refund_amount", "refund_id"]
            }
        })
    }

    async fn invoke(&self, params: &Value, ctx: &ToolContext<'_>) -> Value {
        let mut outcome = ToolOutcome::new(&[
            ("refund_id", Value::Null),
            ("refund_status", Value::Null),
            ("order_id", Value::Null),
        ]);

        let missing = missing_required(params, &["order_id", "refund_amount", "refund_id"]);
        if !missing.is_empty() {
            return outcome
                .fail(fatal(format!(
                    "Required parameters missing: {}",
                    missing.join(", ")
                )))
                .into_json();
        }

        let order_id = params
            .get("order_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let refund_id = params
            .get("refund_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        outcome.set_extra("order_id", json!(order_id));
        outcome.set_extra("refund_id", json!(refund_id));

        let refund_amount =
            match required_amount_positive(params, "refund_amount", "refund_amount") {
                Ok(amount) => amount,
                Err(e) => return outcome.fail(fatal(e)).into_json(),
            };

        if let Err(e) = check_length(&refund_id, "refund_id", 3, 40) {
            return outcome.fail(fatal(e)).into_json();
        }
        if let Err(e) = check_alphanumeric(&refund_id, "refund_id") {
            return outcome.fail(fatal(e)).into_json();
        }

        let refund_note = optional_str(params, "refund_note");
        if let Some(refund_note) = refund_note {
            if let Err(e) = check_length(refund_note, "refund_note", 3, 100) {
                return outcome.fail(fatal(e)).into_json();
            }
        }

        let refund_speed = optional_str(params, "refund_speed").unwrap_or("STANDARD");
        if let Err(e) = check_one_of(refund_speed, "refund_speed", &["STANDARD", "INSTANT"]) {
            return outcome.fail(fatal(e)).into_json();
        }

        let headers = match payments_headers(ctx).await {
            Ok(headers) => headers,
            Err(e) => return auth_failure(outcome, e),
        };

        let mut body = Map::new();
        body.insert("refund_amount".to_string(), json!(refund_amount));
        body.insert("refund_id".to_string(), json!(refund_id));
        if let Some(refund_note) = refund_note {
            body.insert("refund_note".to_string(), json!(refund_note));
        }
        body.insert("refund_speed".to_string(), json!(refund_speed));

        let url = format!(
            "{}/orders/{}/refunds",
            ctx.credentials.payments_base_url(),
            order_id
        );
        match execute(ctx.client, HttpMethod::Post, &url, &headers, Some(&Value::Object(body)))
            .await
        {
            Ok(raw) => {
                outcome.absorb(&raw);
                if let Some(data) = &raw.json {
                    if outcome.success {
                        let refund_status =
                            data.get("refund_status").cloned().unwrap_or(Value::Null);
                        outcome.set_message(format!(
                            "Refund created successfully for order {}. Refund ID: {}, Status: {}",
                            order_id,
                            refund_id,
                            refund_status.as_str().unwrap_or_default()
                        ));
                        outcome.set_extra("refund_status", refund_status);
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

/// Add context to common refund rejections
fn refine_error(status_code: u16, error_message: &str, order_id: &str) -> String {
    let lowered = error_message.to_lowercase();
    match status_code {
        400 => {
            if lowered.contains("already refunded") {
                format!(
                    "Refund failed: {}. The payment may have already been fully refunded.",
                    error_message
                )
            } else if lowered.contains("insufficient") || lowered.contains("exceeds") {
                format!(
                    "Refund failed: {}. Refund amount may exceed the available refundable amount.",
                    error_message
                )
            } else if lowered.contains("six months") || lowered.contains("expired") {
                format!(
                    "Refund failed: {}. Refunds can only be initiated within six months of the original transaction.",
                    error_message
                )
            } else if lowered.contains("duplicate") {
                format!(
                    "Refund failed: {}. The refund_id may already exist.",
                    error_message
                )
            } else {
                format!("Bad Request: {}", error_message)
            }
        }
        404 => format!("Order not found: {}. Please verify the order_id.", order_id),
        _ => error_message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sandbox_credentials;
    use serde_json::json;

    fn valid_params() -> Value {
        json!({
            "order_id": "order_12345",
            "refund_amount": 50.0,
            "refund_id": "refund12345"
        })
    }

    #[tokio::test]
    async fn test_missing_required_parameters() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let record = CreateRefundTool
            .invoke(&json!({"order_id": "order_12345"}), &ctx)
            .await;
        assert!(record["status_code"].is_null());
        let message = record["message"].as_str().unwrap();
        assert!(message.starts_with("Fatal Error: Required parameters missing:"));
        assert!(message.contains("refund_amount"));
        assert!(message.contains("refund_id"));
    }

    #[tokio::test]
    async fn test_refund_id_rejects_hyphen() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let mut params = valid_params();
        params["refund_id"] = json!("refund-123");
        let record = CreateRefundTool.invoke(&params, &ctx).await;
        assert!(record["status_code"].is_null());
        assert_eq!(
            record["message"],
            "Fatal Error: refund_id must contain only alphanumeric characters"
        );
    }

    #[tokio::test]
    async fn test_refund_amount_must_be_positive() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let mut params = valid_params();
        params["refund_amount"] = json!(0);
        let record = CreateRefundTool.invoke(&params, &ctx).await;
        assert_eq!(
            record["message"],
            "Fatal Error: refund_amount must be greater than 0"
        );
    }

    #[tokio::test]
    async fn test_refund_speed_must_be_known() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let mut params = valid_params();
        params["refund_speed"] = json!("FAST");
        let record = CreateRefundTool.invoke(&params, &ctx).await;
        assert_eq!(
            record["message"],
            "Fatal Error: refund_speed must be either 'STANDARD' or 'INSTANT'"
        );
    }

    #[test]
    fn test_refine_error_classifies_400_variants() {
        let already = refine_error(400, "Order already refunded", "order_1");
        assert!(already.contains("already been fully refunded"));

        let exceeds = refine_error(400, "Amount exceeds refundable balance", "order_1");
        assert!(exceeds.contains("available refundable amount"));

        let expired = refine_error(400, "Transaction expired", "order_1");
        assert!(expired.contains("within six months"));

        let duplicate = refine_error(400, "Duplicate refund request", "order_1");
        assert!(duplicate.contains("refund_id may already exist"));

        let other = refine_error(400, "Malformed body", "order_1");
        assert_eq!(other, "Bad Request: Malformed body");
    }

    #[test]
    fn test_refine_error_404_names_order() {
        let message = refine_error(404, "whatever", "order_42");
        assert_eq!(message, "Order not found: order_42. Please verify the order_id.");
    }

    #[test]
    fn test_refine_error_passthrough_other_statuses() {
        assert_eq!(refine_error(500, "server blew up", "order_1"), "server blew up");
    }
}
