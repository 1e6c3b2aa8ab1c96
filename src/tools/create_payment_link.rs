//! Create a shareable payment link
//!
//! POST `{payments_base}/links`. Customer contact nests under
//! `customer_details`, notification toggles under `link_notify`, and
//! webhook/redirect/payment-method settings under `link_meta`, each
//! emitted only when at least one member is present.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::client::{execute, HttpMethod, ToolOutcome};
use crate::tools::{
    auth_failure, fatal, network_message, payments_headers, CashfreeTool, ToolContext,
};
use crate::validate::{
    check_https_url, check_identifier_charset, check_length, check_max_length, check_url_length,
    missing_required, optional_str, parse_amount, required_amount_positive, ValidationError,
};

pub struct CreatePaymentLinkTool;

#[async_trait]
impl CashfreeTool for CreatePaymentLinkTool {
    fn definition(&self) -> Value {
        json!({
            "name": "create_payment_link",
            "description": "Create a Cashfree payment link that can be shared with a customer",
            "parameters": {
                "type": "object",
                "properties": {
                    "link_id": {"type": "string", "description": "Unique link id, 1-50 chars, alphanumeric with '_' and '-'"},
                    "link_amount": {"type": "number", "description": "Link amount, must be greater than 0"},
                    "link_currency": {"type": "string", "description": "Currency code, defaults to INR"},
                    "link_purpose": {"type": "string", "description": "Purpose shown to the customer, max 500 characters"},
                    "customer_phone": {"type": "string", "description": "Customer phone number"},
                    "customer_email": {"type": "string", "description": "Optional customer email"},
                    "customer_name": {"type": "string", "description": "Optional customer name"},
                    "customer_bank_account_number": {"type": "string", "description": "Optional bank account for TPV"},
                    "customer_bank_ifsc": {"type": "string", "description": "Optional bank IFSC for TPV"},
                    "link_partial_payments": {"type": "boolean", "description": "Allow partial payments"},
                    "link_minimum_partial_amount": {"type": "number", "description": "Minimum partial amount, must be less than link_amount"},
                    "link_expiry_time": {"type": "string", "description": "Optional ISO-8601 expiry timestamp"},
                    "link_auto_reminders": {"type": "boolean", "description": "Send automatic payment reminders"},
                    "send_sms": {"type": "boolean", "description": "Notify the customer over SMS"},
                    "send_email": {"type": "boolean", "description": "Notify the customer over email"},
                    "return_url": {"type": "string", "description": "Optional redirect URL, max 250 characters"},
                    "notify_url": {"type": "string", "description": "Optional HTTPS webhook URL"},
                    "payment_methods": {"type": "string", "description": "Optional comma-separated payment method filter"},
                    "upi_intent": {"type": "boolean", "description": "Open the UPI intent flow directly"}
                },
                "required": ["link_id", "link_amount", "link_purpose", "customer_phone"]
            }
        })
    }

    async fn invoke(&self, params: &Value, ctx: &ToolContext<'_>) -> Value {
        let outcome = ToolOutcome::new(&[("link_id", Value::Null), ("link_url", Value::Null)]);

        let missing = missing_required(
            params,
            &["link_id", "link_amount", "link_purpose", "customer_phone"],
        );
        if !missing.is_empty() {
            return outcome
                .fail(fatal(format!(
                    "Required parameters missing: {}",
                    missing.join(", ")
                )))
                .into_json();
        }

        let link_id = params
            .get("link_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if let Err(e) = check_length(&link_id, "link_id", 1, 50) {
            return outcome.fail(fatal(e)).into_json();
        }
        if let Err(e) = check_identifier_charset(&link_id, "link_id") {
            return outcome.fail(fatal(e)).into_json();
        }

        let link_amount = match required_amount_positive(params, "link_amount", "link_amount") {
            Ok(amount) => amount,
            Err(e) => return outcome.fail(fatal(e)).into_json(),
        };

        let link_purpose = params
            .get("link_purpose")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if let Err(e) = check_max_length(&link_purpose, "link_purpose", 500) {
            return outcome.fail(fatal(e)).into_json();
        }

        let minimum_partial =
            match parse_amount(params, "link_minimum_partial_amount", "link_minimum_partial_amount")
            {
                Ok(minimum_partial) => minimum_partial,
                Err(e) => return outcome.fail(fatal(e)).into_json(),
            };
        if let Some(minimum_partial) = minimum_partial {
            if minimum_partial >= link_amount {
                return outcome
                    .fail(fatal(ValidationError::new(
                        "link_minimum_partial_amount must be less than link_amount",
                    )))
                    .into_json();
            }
        }

        let return_url = optional_str(params, "return_url");
        if let Some(return_url) = return_url {
            if let Err(e) = check_url_length(return_url, "return_url") {
                return outcome.fail(fatal(e)).into_json();
            }
        }

        let notify_url = optional_str(params, "notify_url");
        if let Some(notify_url) = notify_url {
            if let Err(e) = check_https_url(notify_url, "notify_url") {
                return outcome.fail(fatal(e)).into_json();
            }
        }

        let headers = match payments_headers(ctx).await {
            Ok(headers) => headers,
            Err(e) => return auth_failure(outcome, e),
        };

        let link_currency = optional_str(params, "link_currency").unwrap_or("INR");
        let mut customer_details = Map::new();
        customer_details.insert(
            "customer_phone".to_string(),
            json!(params.get("customer_phone").and_then(Value::as_str).unwrap_or_default()),
        );
        for key in [
            "customer_email",
            "customer_name",
            "customer_bank_account_number",
            "customer_bank_ifsc",
        ] {
            if let Some(value) = optional_str(params, key) {
                customer_details.insert(key.to_string(), json!(value));
            }
        }

        let mut body = Map::new();
        body.insert("link_id".to_string(), json!(link_id));
        body.insert("link_amount".to_string(), json!(link_amount));
        body.insert("link_currency".to_string(), json!(link_currency));
        body.insert("link_purpose".to_string(), json!(link_purpose));
        body.insert("customer_details".to_string(), Value::Object(customer_details));

        if params
            .get("link_partial_payments")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            body.insert("link_partial_payments".to_string(), json!(true));
            if let Some(minimum_partial) = minimum_partial {
                body.insert(
                    "link_minimum_partial_amount".to_string(),
                    json!(minimum_partial),
                );
            }
        }
        if let Some(expiry) = optional_str(params, "link_expiry_time") {
            body.insert("link_expiry_time".to_string(), json!(expiry));
        }
        if params
            .get("link_auto_reminders")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            body.insert("link_auto_reminders".to_string(), json!(true));
        }

        let send_sms = params.get("send_sms").and_then(Value::as_bool);
        let send_email = params.get("send_email").and_then(Value::as_bool);
        if send_sms.is_some() || send_email.is_some() {
            let mut link_notify = Map::new();
            if let Some(send_sms) = send_sms {
                link_notify.insert("send_sms".to_string(), json!(send_sms));
            }
            if let Some(send_email) = send_email {
                link_notify.insert("send_email".to_string(), json!(send_email));
            }
            body.insert("link_notify".to_string(), Value::Object(link_notify));
        }

        let mut link_meta = Map::new();
        if let Some(notify_url) = notify_url {
            link_meta.insert("notify_url".to_string(), json!(notify_url));
        }
        if let Some(return_url) = return_url {
            link_meta.insert("return_url".to_string(), json!(return_url));
        }
        if let Some(payment_methods) = optional_str(params, "payment_methods") {
            link_meta.insert("payment_methods".to_string(), json!(payment_methods));
        }
        if let Some(upi_intent) = params.get("upi_intent").and_then(Value::as_bool) {
            link_meta.insert("upi_intent".to_string(), json!(upi_intent));
        }
        if !link_meta.is_empty() {
            body.insert("link_meta".to_string(), Value::Object(link_meta));
        }

        let url = format!("{}/links", ctx.credentials.payments_base_url());
        let mut outcome = outcome;
        match execute(ctx.client, HttpMethod::Post, &url, &headers, Some(&Value::Object(body)))
            .await
        {
            Ok(raw) => {
                outcome.absorb(&raw);
                if let Some(data) = &raw.json {
                    if outcome.success {
                        let created_link_id = data.get("link_id").cloned().unwrap_or(Value::Null);
                        outcome.set_message(format!(
                            "Payment link created successfully. Link ID: {}",
                            created_link_id.as_str().unwrap_or_default()
                        ));
                        outcome.set_extra("link_id", created_link_id);
                        outcome.set_extra(
                            "link_url",
                            data.get("link_url").cloned().unwrap_or(Value::Null),
                        );
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

    fn valid_params() -> Value {
        json!({
            "link_id": "link_2026_001",
            "link_amount": 500.0,
            "link_purpose": "Invoice INV-42",
            "customer_phone": "9876543210"
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

        let record = CreatePaymentLinkTool
            .invoke(&json!({"link_id": "link_1"}), &ctx)
            .await;
        assert!(record["status_code"].is_null());
        let message = record["message"].as_str().unwrap();
        assert!(message.starts_with("Fatal Error: Required parameters missing:"));
        assert!(message.contains("link_amount"));
        assert!(message.contains("link_purpose"));
        assert!(message.contains("customer_phone"));
    }

    #[tokio::test]
    async fn test_link_id_length_bounds() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let mut params = valid_params();
        params["link_id"] = json!("x".repeat(51));
        let record = CreatePaymentLinkTool.invoke(&params, &ctx).await;
        assert_eq!(
            record["message"],
            "Fatal Error: link_id must be between 1 and 50 characters"
        );
    }

    #[tokio::test]
    async fn test_minimum_partial_must_be_below_amount() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let mut params = valid_params();
        params["link_minimum_partial_amount"] = json!(500.0);
        let record = CreatePaymentLinkTool.invoke(&params, &ctx).await;
        assert_eq!(
            record["message"],
            "Fatal Error: link_minimum_partial_amount must be less than link_amount"
        );
    }

    #[tokio::test]
    async fn test_link_amount_zero_rejected() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let mut params = valid_params();
        params["link_amount"] = json!(0);
        let record = CreatePaymentLinkTool.invoke(&params, &ctx).await;
        assert_eq!(
            record["message"],
            "Fatal Error: link_amount must be greater than 0"
        );
    }
}
