//! Cancel an active payment link
//!
//! POST `{payments_base}/links/{link_id}/cancel` with no request body.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{execute, HttpMethod, ToolOutcome};
use crate::tools::{
    auth_failure, fatal, network_message, payments_headers, CashfreeTool, ToolContext,
};
use crate::validate::{check_identifier_charset, check_length, required_str};

pub struct CancelPaymentLinkTool;

#[async_trait]
impl CashfreeTool for CancelPaymentLinkTool {
    fn definition(&self) -> Value {
        json!({
            "name": "cancel_payment_link",
            "description": "Cancel an active Cashfree payment link so it can no longer be paid",
            "parameters": {
                "type": "object",
                "properties": {
                    "link_id": {"type": "string", "description": "Payment link to cancel"}
                },
                "required": ["link_id"]
            }
        })
    }

    async fn invoke(&self, params: &Value, ctx: &ToolContext<'_>) -> Value {
        let mut outcome =
            ToolOutcome::new(&[("link_id", Value::Null), ("link_status", Value::Null)]);

        let link_id = match required_str(params, "link_id", "link_id is required") {
            Ok(link_id) => link_id.to_string(),
            Err(e) => return outcome.fail(fatal(e)).into_json(),
        };
        if let Err(e) = check_length(&link_id, "link_id", 1, 50) {
            return outcome.fail(fatal(e)).into_json();
        }
        if let Err(e) = check_identifier_charset(&link_id, "link_id") {
            return outcome.fail(fatal(e)).into_json();
        }

        let headers = match payments_headers(ctx).await {
            Ok(headers) => headers,
            Err(e) => return auth_failure(outcome, e),
        };

        let url = format!(
            "{}/links/{}/cancel",
            ctx.credentials.payments_base_url(),
            link_id
        );
        match execute(ctx.client, HttpMethod::Post, &url, &headers, None).await {
            Ok(raw) => {
                outcome.absorb(&raw);
                if let Some(data) = &raw.json {
                    if outcome.success {
                        let cancelled_link_id =
                            data.get("link_id").cloned().unwrap_or(Value::Null);
                        let link_status = data.get("link_status").cloned().unwrap_or(Value::Null);
                        outcome.set_message(format!(
                            "Payment link cancelled successfully. Link ID: {}, Status: {}",
                            cancelled_link_id.as_str().unwrap_or_default(),
                            link_status.as_str().unwrap_or_default()
                        ));
                        outcome.set_extra("link_id", cancelled_link_id);
                        outcome.set_extra("link_status", link_status);
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

/// Add context to common cancellation rejections
fn refine_error(status_code: u16, error_message: &str, link_id: &str) -> String {
    let lowered = error_message.to_lowercase();
    match status_code {
        400 => {
            if lowered.contains("already cancelled") {
                format!("Payment link '{}' is already cancelled", link_id)
            } else if lowered.contains("expired") {
                format!("Payment link '{}' has expired and cannot be cancelled", link_id)
            } else if lowered.contains("not found") {
                format!("Payment link '{}' not found", link_id)
            } else {
                format!("Cannot cancel payment link: {}", error_message)
            }
        }
        404 => format!("Payment link '{}' not found", link_id),
        422 => format!(
            "Payment link '{}' cannot be cancelled (may have active payments)",
            link_id
        ),
        _ => error_message.to_string(),
    }
}
