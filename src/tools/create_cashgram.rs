//! Create a Cashgram payout link
//!
//! POST `{payout_base}/payout/v1/createCashgram`. This is a Payout API
//! call: no `X-Api-Version` header is sent, and under `public_key` auth
//! a fresh signature and bearer-token exchange happen per invocation.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::client::{execute, HttpMethod, ToolOutcome};
use crate::tools::{
    auth_failure, fatal, network_message, payout_headers, CashfreeTool, ToolContext,
};
use crate::validate::{
    check_email, check_expiry_window, check_identifier_charset, check_length, check_phone,
    missing_required, optional_str, parse_amount, ValidationError,
};

pub struct CreateCashgramTool;

#[async_trait]
impl CashfreeTool for CreateCashgramTool {
    fn definition(&self) -> Value {
        json!({
            "name": "create_cashgram",
            "description": "Create a Cashfree Cashgram payout link that a recipient can claim",
            "parameters": {
                "type": "object",
                "properties": {
                    "cashgramId": {"type": "string", "description": "Unique cashgram id, 1-35 chars, alphanumeric with '_' and '-'"},
                    "amount": {"type": "number", "description": "Payout amount, minimum 1.00"},
                    "name": {"type": "string", "description": "Recipient name"},
                    "phone": {"type": "string", "description": "Recipient phone number"},
                    "linkExpiry": {"type": "string", "description": "Expiry date in YYYY/MM/DD, a future date at most 30 days out"},
                    "email": {"type": "string", "description": "Optional recipient email"},
                    "remarks": {"type": "string", "description": "Optional remarks shown to the recipient"},
                    "notifyCustomer": {"type": "boolean", "description": "Send the link to the recipient over SMS/email"}
                },
                "required": ["cashgramId", "amount", "name", "phone", "linkExpiry"]
            }
        })
    }

    async fn invoke(&self, params: &Value, ctx: &ToolContext<'_>) -> Value {
        let outcome = ToolOutcome::new(&[
            ("cashgram_id", Value::Null),
            ("cashgram_link", Value::Null),
        ]);

        let missing = missing_required(
            params,
            &["cashgramId", "amount", "name", "phone", "linkExpiry"],
        );
        if !missing.is_empty() {
            return outcome
                .fail(fatal(format!(
                    "Required parameters missing: {}",
                    missing.join(", ")
                )))
                .into_json();
        }

        let cashgram_id = params
            .get("cashgramId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if let Err(e) = check_length(&cashgram_id, "cashgramId", 1, 35) {
            return outcome.fail(fatal(e)).into_json();
        }
        if let Err(e) = check_identifier_charset(&cashgram_id, "cashgramId") {
            return outcome.fail(fatal(e)).into_json();
        }

        let amount = match parse_amount(params, "amount", "amount") {
            Ok(Some(amount)) if amount >= 1.0 => amount,
            Ok(Some(_)) => {
                return outcome
                    .fail(fatal(ValidationError::new("amount must be >= 1.00")))
                    .into_json()
            }
            Ok(None) => {
                return outcome
                    .fail(fatal(ValidationError::new("amount must be a valid number")))
                    .into_json()
            }
            Err(e) => return outcome.fail(fatal(e)).into_json(),
        };

        let link_expiry = params
            .get("linkExpiry")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if let Err(e) = check_expiry_window(&link_expiry, "linkExpiry") {
            return outcome.fail(fatal(e)).into_json();
        }

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if name.trim().is_empty() {
            return outcome
                .fail(fatal(ValidationError::new("name cannot be empty")))
                .into_json();
        }

        let phone = params
            .get("phone")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if let Err(e) = check_phone(&phone, "phone number") {
            return outcome.fail(fatal(e)).into_json();
        }

        let email = optional_str(params, "email");
        if let Some(email) = email {
            if let Err(e) = check_email(email) {
                return outcome.fail(fatal(e)).into_json();
            }
        }

        let headers = match payout_headers(ctx).await {
            Ok(headers) => headers,
            Err(e) => return auth_failure(outcome, e),
        };

        let mut body = Map::new();
        body.insert("cashgramId".to_string(), json!(cashgram_id));
        body.insert("amount".to_string(), json!(amount));
        body.insert("name".to_string(), json!(name));
        body.insert("phone".to_string(), json!(phone));
        body.insert("linkExpiry".to_string(), json!(link_expiry));
        if let Some(email) = email {
            body.insert("email".to_string(), json!(email));
        }
        if let Some(remarks) = optional_str(params, "remarks") {
            body.insert("remarks".to_string(), json!(remarks));
        }
        if let Some(notify_customer) = params.get("notifyCustomer").and_then(Value::as_bool) {
            body.insert("notifyCustomer".to_string(), json!(notify_customer));
        }

        let url = format!(
            "{}/payout/v1/createCashgram",
            ctx.credentials.payout_base_url()
        );
        let mut outcome = outcome;
        match execute(ctx.client, HttpMethod::Post, &url, &headers, Some(&Value::Object(body)))
            .await
        {
            Ok(raw) => {
                outcome.absorb(&raw);
                if let Some(data) = &raw.json {
                    if outcome.success {
                        let created_id = data.get("cashgramId").cloned().unwrap_or(Value::Null);
                        outcome.set_message(format!(
                            "Cashgram created successfully. Cashgram ID: {}",
                            created_id.as_str().unwrap_or_default()
                        ));
                        outcome.set_extra("cashgram_id", created_id);
                        outcome.set_extra(
                            "cashgram_link",
                            data.get("link").cloned().unwrap_or(Value::Null),
                        );
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

/// Add context to common creation rejections
fn refine_error(status_code: u16, error_message: &str, cashgram_id: &str) -> String {
    let lowered = error_message.to_lowercase();
    match status_code {
        400 => {
            if lowered.contains("duplicate") {
                format!("Cashgram with ID '{}' already exists", cashgram_id)
            } else if lowered.contains("invalid amount") {
                "Invalid amount specified".to_string()
            } else if lowered.contains("invalid date") {
                "Invalid expiry date format or date range".to_string()
            } else {
                format!("Cannot create Cashgram: {}", error_message)
            }
        }
        401 => "Authentication failed. Please check your credentials".to_string(),
        403 => "Access forbidden. Please check your permissions".to_string(),
        _ => error_message.to_string(),
    }
}
