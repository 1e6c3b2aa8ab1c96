//! Create a payment order
//!
//! POST `{payments_base}/orders`. Required customer details nest under
//! `customer_details`; `return_url`, `notify_url` and `payment_methods`
//! nest under `order_meta` only when at least one is present.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::client::{execute, HttpMethod, ToolOutcome};
use crate::tools::{
    auth_failure, fatal, network_message, payments_headers, CashfreeTool, ToolContext,
};
use crate::validate::{
    check_https_url, check_identifier_charset, check_length, check_url_length, missing_required,
    optional_str, required_amount_min,
};

pub struct CreateOrderTool;

#[async_trait]
impl CashfreeTool for CreateOrderTool {
    fn definition(&self) -> Value {
        json!({
            "name": "create_order",
            "description": "Create a Cashfree payment order and obtain a payment session id",
            "parameters": {
                "type": "object",
                "properties": {
                    "order_amount": {"type": "number", "description": "Order amount, minimum 1"},
                    "order_currency": {"type": "string", "description": "Currency code, defaults to INR"},
                    "customer_id": {"type": "string", "description": "Unique customer identifier"},
                    "customer_email": {"type": "string", "description": "Customer email address"},
                    "customer_phone": {"type": "string", "description": "Customer phone number"},
                    "customer_name": {"type": "string", "description": "Customer name"},
                    "order_id": {"type": "string", "description": "Optional order id, 3-45 chars, alphanumeric with '_' and '-'"},
                    "order_note": {"type": "string", "description": "Optional note, 3-200 characters"},
                    "order_expiry_time": {"type": "string", "description": "Optional ISO-8601 expiry timestamp"},
                    "customer_bank_account_number": {"type": "string", "description": "Optional bank account for TPV"},
                    "customer_bank_ifsc": {"type": "string", "description": "Optional bank IFSC for TPV"},
                    "return_url": {"type": "string", "description": "Optional redirect URL, max 250 characters"},
                    "notify_url": {"type": "string", "description": "Optional HTTPS webhook URL, max 250 characters"},
                    "payment_methods": {"type": "string", "description": "Optional comma-separated payment method filter"}
                },
                "required": ["order_amount", "customer_id", "customer_email", "customer_phone", "customer_name"]
            }
        })
    }

    async fn invoke(&self, params: &Value, ctx: &ToolContext<'_>) -> Value {
        let outcome = ToolOutcome::new(&[
            ("order_id", Value::Null),
            ("payment_session_id", Value::Null),
        ]);

        let missing = missing_required(
            params,
            &[
                "order_amount",
                "customer_id",
                "customer_email",
                "customer_phone",
                "customer_name",
            ],
        );
        if !missing.is_empty() {
            return outcome
                .fail(fatal(format!(
                    "Required parameters missing: {}",
                    missing.join(", ")
                )))
                .into_json();
        }

        let order_amount =
            match required_amount_min(params, "order_amount", "order_amount", 1.0) {
                Ok(amount) => amount,
                Err(e) => return outcome.fail(fatal(e)).into_json(),
            };

        let order_id = optional_str(params, "order_id");
        if let Some(order_id) = order_id {
            if let Err(e) = check_length(order_id, "order_id", 3, 45) {
                return outcome.fail(fatal(e)).into_json();
            }
            if let Err(e) = check_identifier_charset(order_id, "order_id") {
                return outcome.fail(fatal(e)).into_json();
            }
        }

        if let Some(order_note) = optional_str(params, "order_note") {
            if let Err(e) = check_length(order_note, "order_note", 3, 200) {
                return outcome.fail(fatal(e)).into_json();
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
            if let Err(e) = check_url_length(notify_url, "notify_url") {
                return outcome.fail(fatal(e)).into_json();
            }
            if let Err(e) = check_https_url(notify_url, "notify_url") {
                return outcome.fail(fatal(e)).into_json();
            }
        }

        let headers = match payments_headers(ctx).await {
            Ok(headers) => headers,
            Err(e) => return auth_failure(outcome, e),
        };

        let order_currency = optional_str(params, "order_currency").unwrap_or("INR");
        let mut customer_details = Map::new();
        for key in ["customer_id", "customer_email", "customer_phone", "customer_name"] {
            if let Some(value) = optional_str(params, key) {
                customer_details.insert(key.to_string(), json!(value));
            }
        }
        for key in ["customer_bank_account_number", "customer_bank_ifsc"] {
            if let Some(value) = optional_str(params, key) {
                customer_details.insert(key.to_string(), json!(value));
            }
        }

        let mut body = Map::new();
        body.insert("order_amount".to_string(), json!(order_amount));
        body.insert("order_currency".to_string(), json!(order_currency));
        body.insert("customer_details".to_string(), Value::Object(customer_details));
        for key in ["order_id", "order_note", "order_expiry_time"] {
            if let Some(value) = optional_str(params, key) {
                body.insert(key.to_string(), json!(value));
            }
        }

        let mut order_meta = Map::new();
        if let Some(return_url) = return_url {
            order_meta.insert("return_url".to_string(), json!(return_url));
        }
        if let Some(notify_url) = notify_url {
            order_meta.insert("notify_url".to_string(), json!(notify_url));
        }
        if let Some(payment_methods) = optional_str(params, "payment_methods") {
            order_meta.insert("payment_methods".to_string(), json!(payment_methods));
        }
        if !order_meta.is_empty() {
            body.insert("order_meta".to_string(), Value::Object(order_meta));
        }

        let url = format!("{}/orders", ctx.credentials.payments_base_url());
        let mut outcome = outcome;
        match execute(ctx.client, HttpMethod::Post, &url, &headers, Some(&Value::Object(body)))
            .await
        {
            Ok(raw) => {
                outcome.absorb(&raw);
                match &raw.json {
                    Some(data) => {
                        if outcome.success {
                            let created_order_id =
                                data.get("order_id").cloned().unwrap_or(Value::Null);
                            outcome.set_message(format!(
                                "Order created successfully. Order ID: {}",
                                created_order_id.as_str().unwrap_or_default()
                            ));
                            outcome.set_extra("order_id", created_order_id);
                            outcome.set_extra(
                                "payment_session_id",
                                data.get("payment_session_id").cloned().unwrap_or(Value::Null),
                            );
                        } else {
                            outcome.set_message(format!("API Error: {}", raw.error_message()));
                        }
                    }
                    None => {
                        let snippet: String = raw.text.chars().take(200).collect();
                        outcome.set_message(format!(
                            "API returned non-JSON response with status code {}. Response: {}",
                            raw.status_code, snippet
                        ));
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
            "order_amount": 100,
            "customer_id": "cust_1",
            "customer_email": "dev@example.com",
            "customer_phone": "9876543210",
            "customer_name": "Dev"
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

        let params = json!({"order_amount": 100.0, "customer_id": "cust_1"});
        let record = CreateOrderTool.invoke(&params, &ctx).await;
        assert!(record["status_code"].is_null());
        assert_eq!(record["success"], json!(false));
        let message = record["message"].as_str().unwrap();
        assert!(message.starts_with("Fatal Error: Required parameters missing:"));
        assert!(message.contains("customer_email"));
        assert!(message.contains("customer_phone"));
        assert!(message.contains("customer_name"));
    }

    #[tokio::test]
    async fn test_order_amount_below_minimum() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let mut params = valid_params();
        params["order_amount"] = json!(0.5);
        let record = CreateOrderTool.invoke(&params, &ctx).await;
        assert!(record["status_code"].is_null());
        assert_eq!(
            record["message"],
            "Fatal Error: order_amount must be at least 1"
        );
    }

    #[tokio::test]
    async fn test_order_amount_accepts_numeric_string() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let mut params = valid_params();
        params["order_amount"] = json!("abc");
        let record = CreateOrderTool.invoke(&params, &ctx).await;
        assert_eq!(
            record["message"],
            "Fatal Error: order_amount must be a valid number"
        );
    }

    #[tokio::test]
    async fn test_order_id_charset_rejected() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let mut params = valid_params();
        params["order_id"] = json!("order id with spaces");
        let record = CreateOrderTool.invoke(&params, &ctx).await;
        assert_eq!(
            record["message"],
            "Fatal Error: order_id can only contain alphanumeric characters, '_' and '-'"
        );
    }

    #[tokio::test]
    async fn test_order_id_length_bounds() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let mut params = valid_params();
        params["order_id"] = json!("ab");
        let record = CreateOrderTool.invoke(&params, &ctx).await;
        assert_eq!(
            record["message"],
            "Fatal Error: order_id must be between 3 and 45 characters"
        );
    }

    #[tokio::test]
    async fn test_notify_url_must_be_https() {
        let client = reqwest::Client::new();
        let credentials = sandbox_credentials();
        let ctx = ToolContext {
            client: &client,
            credentials: &credentials,
        };

        let mut params = valid_params();
        params["notify_url"] = json!("http://example.com/hook");
        let record = CreateOrderTool.invoke(&params, &ctx).await;
        assert_eq!(
            record["message"],
            "Fatal Error: notify_url must use HTTPS protocol"
        );
    }
}
