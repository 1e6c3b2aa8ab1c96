//! Deactivate an unclaimed Cashgram
//!
//! POST `{payout_base}/payout/v1/deactivateCashgram` with a body holding
//! only the cashgram id. Payout API call: no `X-Api-Version` header.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{execute, HttpMethod, ToolOutcome};
use crate::tools::{
    auth_failure, fatal, network_message, payout_headers, CashfreeTool, ToolContext,
};
use crate::validate::{check_identifier_charset, check_length, required_str};

pub struct DeactivateCashgramTool;

#[async_trait]
impl CashfreeTool for DeactivateCashgramTool {
    fn definition(&self) -> Value {
        json!({
            "name": "deactivate_cashgram",
            "description": "Deactivate an unclaimed Cashfree Cashgram so it can no longer be redeemed",
            "parameters": {
                "type": "object",
                "properties": {
                    "cashgramId": {"type": "string", "description": "Cashgram to deactivate"}
                },
                "required": ["cashgramId"]
            }
        })
    }

    async fn invoke(&self, params: &Value, ctx: &ToolContext<'_>) -> Value {
        let mut outcome =
            ToolOutcome::new(&[("cashgram_id", Value::Null), ("status", Value::Null)]);

        let cashgram_id = match required_str(params, "cashgramId", "cashgramId is required") {
            Ok(cashgram_id) => cashgram_id.to_string(),
            Err(e) => return outcome.fail(fatal(e)).into_json(),
        };
        if let Err(e) = check_length(&cashgram_id, "cashgramId", 1, 35) {
            return outcome.fail(fatal(e)).into_json();
        }
        if let Err(e) = check_identifier_charset(&cashgram_id, "cashgramId") {
            return outcome.fail(fatal(e)).into_json();
        }

        let headers = match payout_headers(ctx).await {
            Ok(headers) => headers,
            Err(e) => return auth_failure(outcome, e),
        };

        let body = json!({ "cashgramId": cashgram_id });
        let url = format!(
            "{}/payout/v1/deactivateCashgram",
            ctx.credentials.payout_base_url()
        );
        match execute(ctx.client, HttpMethod::Post, &url, &headers, Some(&body)).await {
            Ok(raw) => {
                outcome.absorb(&raw);
                if let Some(data) = &raw.json {
                    if outcome.success {
                        let deactivated_id =
                            data.get("cashgramId").cloned().unwrap_or(Value::Null);
                        let status = data.get("status").cloned().unwrap_or(Value::Null);
                        outcome.set_message(format!(
                            "Cashgram deactivated successfully. Cashgram ID: {}, Status: {}",
                            deactivated_id.as_str().unwrap_or_default(),
                            status.as_str().unwrap_or_default()
                        ));
                        outcome.set_extra("cashgram_id", deactivated_id);
                        outcome.set_extra("status", status);
                    } else {
                        outcome.set_message(refine_error(
                            raw.status_code,
                            &raw.error_message(),
                            &cashgram_id,
                        ));
                    }
                }
                outcome.into_json()
            }
            Err(e) => outcome.network_failure(network_message(e)).into_json(),
        }
    }
}

/// Add context to common deactivation rejections
fn refine_error(status_code: u16, error_message: &str, cashgram_id: &str) -> String {
    let lowered = error_message.to_lowercase();
    match status_code {
        400 => {
            if lowered.contains("already deactivated") {
                format!("Cashgram '{}' is already deactivated", cashgram_id)
            } else if lowered.contains("expired") {
                format!("Cashgram '{}' has already expired", cashgram_id)
            } else if lowered.contains("not found") {
                format!("Cashgram '{}' not found", cashgram_id)
            } else if lowered.contains("claimed") {
                format!(
                    "Cashgram '{}' has already been claimed and cannot be deactivated",
                    cashgram_id
                )
            } else {
                format!("Cannot deactivate Cashgram: {}", error_message)
            }
        }
        401 => "Authentication failed. Please check your credentials".to_string(),
        403 => "Access forbidden. Please check your permissions".to_string(),
        404 => format!("Cashgram '{}' not found", cashgram_id),
        422 => format!(
            "Cashgram '{}' cannot be deactivated (may have been claimed or expired)",
            cashgram_id
        ),
        _ => error_message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sandbox_credentials;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_cashgram_id() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let record = DeactivateCashgramTool.invoke(&json!({}), &ctx).await;
        assert!(record["status_code"].is_null());
        assert_eq!(record["message"], "Fatal Error: cashgramId is required");
    }

    #[tokio::test]
    async fn test_cashgram_id_too_long() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let record = DeactivateCashgramTool
            .invoke(&json!({"cashgramId": "x".repeat(36)}), &ctx)
            .await;
        assert_eq!(
            record["message"],
            "Fatal Error: cashgramId must be between 1 and 35 characters"
        );
    }

    #[test]
    fn test_refine_error_classifies_states() {
        assert_eq!(
            refine_error(400, "Cashgram already deactivated", "cg_1"),
            "Cashgram 'cg_1' is already deactivated"
        );
        assert_eq!(
            refine_error(400, "Link expired", "cg_1"),
            "Cashgram 'cg_1' has already expired"
        );
        assert_eq!(
            refine_error(400, "entity not found", "cg_1"),
            "Cashgram 'cg_1' not found"
        );
        assert_eq!(
            refine_error(400, "Already claimed by recipient", "cg_1"),
            "Cashgram 'cg_1' has already been claimed and cannot be deactivated"
        );
        assert_eq!(
            refine_error(400, "other", "cg_1"),
            "Cannot deactivate Cashgram: other"
        );
        assert_eq!(
            refine_error(404, "unused", "cg_1"),
            "Cashgram 'cg_1' not found"
        );
        assert_eq!(
            refine_error(422, "unused", "cg_1"),
            "Cashgram 'cg_1' cannot be deactivated (may have been claimed or expired)"
        );
        assert_eq!(refine_error(500, "boom", "cg_1"), "boom");
    }
}
