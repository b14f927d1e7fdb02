// Stripe REST client for invoicing and subscriptions
//
// All calls go over the form-encoded v1 API. Invoices are collected by
// email (send_invoice) with a 30 day due window, and every object we
// create carries the job id in its metadata so webhook deliveries can
// be routed back to the right job.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::app_config::StripeConfig;

/// Signed webhook deliveries older than this are rejected.
const WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Due window for emailed invoices.
const INVOICE_DAYS_UNTIL_DUE: u32 = 30;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Error, Debug)]
pub enum StripeError {
    #[error("Stripe API error: {0}")]
    Api(String),

    #[error("Stripe request failed: {0}")]
    Network(String),

    #[error("Invalid webhook: {0}")]
    InvalidWebhook(String),

    #[error("Failed to parse Stripe response: {0}")]
    Parse(String),
}

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeProduct {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripePrice {
    pub id: String,
    pub product: String,
    pub unit_amount: Option<i64>,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeInvoice {
    pub id: String,
    pub customer: String,
    pub status: Option<String>,
    pub amount_due: i64,
    pub amount_paid: i64,
    pub customer_email: Option<String>,
    pub hosted_invoice_url: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeInvoiceItem {
    pub id: String,
    pub invoice: Option<String>,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub customer: String,
    pub status: String,
    pub latest_invoice: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeWebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeWebhookData,
    pub created: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeWebhookData {
    pub object: serde_json::Value,
}

/// Webhook events this service acts on. Everything else comes back as
/// `Unhandled` and is only logged.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    InvoiceCreated(StripeInvoice),
    InvoicePaid(StripeInvoice),
    InvoicePaymentFailed(StripeInvoice),
    InvoiceFinalized(StripeInvoice),
    InvoiceSent(StripeInvoice),
    InvoiceUpdated(StripeInvoice),
    SubscriptionDeleted(StripeSubscription),
    Unhandled(String),
}

// ============================================================================
// CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct StripeClient {
    api_key: String,
    webhook_secret: String,
    base_url: String,
    client: reqwest::Client,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            api_key: config.secret_key.clone(),
            webhook_secret: config.webhook_secret.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    // ------------------------------------------------------------------
    // Customers
    // ------------------------------------------------------------------

    /// Looks up an existing Stripe customer by email, returning the first
    /// match if any.
    pub async fn search_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StripeCustomer>, StripeError> {
        // Stripe search query syntax quotes the value in single quotes
        let escaped = email.replace('\'', "\\'");
        let query = format!("email:'{}'", escaped);

        let response = self
            .client
            .get(format!("{}/customers/search", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .query(&[("query", query.as_str())])
            .send()
            .await
            .map_err(|e| StripeError::Network(e.to_string()))?;

        #[derive(Deserialize)]
        struct CustomerList {
            data: Vec<StripeCustomer>,
        }

        let list: CustomerList = self.handle_response(response).await?;
        Ok(list.data.into_iter().next())
    }

    pub async fn create_customer(
        &self,
        email: &str,
        name: &str,
        phone: Option<&str>,
        address_line1: Option<&str>,
        customer_id: Uuid,
    ) -> Result<StripeCustomer, StripeError> {
        let mut form: Vec<(String, String)> = vec![
            ("email".to_string(), email.to_string()),
            ("name".to_string(), name.to_string()),
            ("preferred_locales[0]".to_string(), "en-US".to_string()),
            (
                "metadata[customer_id]".to_string(),
                customer_id.to_string(),
            ),
        ];

        if let Some(phone) = phone {
            form.push(("phone".to_string(), phone.to_string()));
        }
        if let Some(line1) = address_line1 {
            form.push(("address[line1]".to_string(), line1.to_string()));
        }

        self.post_form("/customers", &form).await
    }

    // ------------------------------------------------------------------
    // Products and prices
    // ------------------------------------------------------------------

    pub async fn create_job_product(&self, job_id: Uuid) -> Result<StripeProduct, StripeError> {
        let form = vec![
            (
                "name".to_string(),
                format!("Ramp Rental - Job #{}", job_id),
            ),
            ("metadata[job_id]".to_string(), job_id.to_string()),
        ];

        self.post_form("/products", &form).await
    }

    pub async fn create_monthly_price(
        &self,
        product_id: &str,
        amount_cents: i32,
    ) -> Result<StripePrice, StripeError> {
        let form = vec![
            ("product".to_string(), product_id.to_string()),
            ("unit_amount".to_string(), amount_cents.to_string()),
            ("currency".to_string(), "usd".to_string()),
            ("recurring[interval]".to_string(), "month".to_string()),
        ];

        self.post_form("/prices", &form).await
    }

    // ------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------

    /// Creates an empty draft invoice collected by email. Line items are
    /// attached separately before finalization.
    pub async fn create_draft_invoice(
        &self,
        stripe_customer_id: &str,
        job_id: Uuid,
        invoice_type: &str,
        customer_name: &str,
        customer_email: &str,
        installation_address: Option<&str>,
        description: &str,
        footer: &str,
    ) -> Result<StripeInvoice, StripeError> {
        let address = installation_address.unwrap_or("Not provided");

        let form = vec![
            ("customer".to_string(), stripe_customer_id.to_string()),
            ("collection_method".to_string(), "send_invoice".to_string()),
            (
                "days_until_due".to_string(),
                INVOICE_DAYS_UNTIL_DUE.to_string(),
            ),
            ("metadata[job_id]".to_string(), job_id.to_string()),
            ("metadata[type]".to_string(), invoice_type.to_string()),
            (
                "metadata[customer_name]".to_string(),
                customer_name.to_string(),
            ),
            (
                "metadata[customer_email]".to_string(),
                customer_email.to_string(),
            ),
            (
                "metadata[installation_address]".to_string(),
                address.to_string(),
            ),
            ("custom_fields[0][name]".to_string(), "Job ID".to_string()),
            ("custom_fields[0][value]".to_string(), job_id.to_string()),
            (
                "custom_fields[1][name]".to_string(),
                "Installation Address".to_string(),
            ),
            ("custom_fields[1][value]".to_string(), address.to_string()),
            ("description".to_string(), description.to_string()),
            ("footer".to_string(), footer.to_string()),
        ];

        self.post_form("/invoices", &form).await
    }

    pub async fn create_invoice_item(
        &self,
        stripe_customer_id: &str,
        invoice_id: &str,
        amount_cents: i32,
        description: &str,
    ) -> Result<StripeInvoiceItem, StripeError> {
        let form = vec![
            ("customer".to_string(), stripe_customer_id.to_string()),
            ("invoice".to_string(), invoice_id.to_string()),
            ("amount".to_string(), amount_cents.to_string()),
            ("currency".to_string(), "usd".to_string()),
            ("description".to_string(), description.to_string()),
        ];

        self.post_form("/invoiceitems", &form).await
    }

    pub async fn retrieve_invoice(&self, invoice_id: &str) -> Result<StripeInvoice, StripeError> {
        let response = self
            .client
            .get(format!("{}/invoices/{}", self.base_url, invoice_id))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .send()
            .await
            .map_err(|e| StripeError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Attaches job metadata and display fields to a subscription's
    /// auto-generated invoice before it is finalized.
    pub async fn annotate_invoice(
        &self,
        invoice_id: &str,
        job_id: Uuid,
        invoice_type: &str,
        customer_name: &str,
        customer_email: &str,
        installation_address: Option<&str>,
        description: &str,
        footer: &str,
    ) -> Result<StripeInvoice, StripeError> {
        let address = installation_address.unwrap_or("Not provided");

        let form = vec![
            ("metadata[job_id]".to_string(), job_id.to_string()),
            ("metadata[type]".to_string(), invoice_type.to_string()),
            (
                "metadata[customer_name]".to_string(),
                customer_name.to_string(),
            ),
            (
                "metadata[customer_email]".to_string(),
                customer_email.to_string(),
            ),
            (
                "metadata[installation_address]".to_string(),
                address.to_string(),
            ),
            ("custom_fields[0][name]".to_string(), "Job ID".to_string()),
            ("custom_fields[0][value]".to_string(), job_id.to_string()),
            (
                "custom_fields[1][name]".to_string(),
                "Installation Address".to_string(),
            ),
            ("custom_fields[1][value]".to_string(), address.to_string()),
            (
                "custom_fields[2][name]".to_string(),
                "Billing Cycle".to_string(),
            ),
            ("custom_fields[2][value]".to_string(), "Monthly".to_string()),
            ("description".to_string(), description.to_string()),
            ("footer".to_string(), footer.to_string()),
        ];

        self.post_form(&format!("/invoices/{}", invoice_id), &form)
            .await
    }

    pub async fn finalize_invoice(&self, invoice_id: &str) -> Result<StripeInvoice, StripeError> {
        let form = vec![("auto_advance".to_string(), "true".to_string())];
        self.post_form(&format!("/invoices/{}/finalize", invoice_id), &form)
            .await
    }

    pub async fn send_invoice(&self, invoice_id: &str) -> Result<StripeInvoice, StripeError> {
        self.post_form(&format!("/invoices/{}/send", invoice_id), &[])
            .await
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    pub async fn create_subscription(
        &self,
        stripe_customer_id: &str,
        price_id: &str,
        job_id: Uuid,
    ) -> Result<StripeSubscription, StripeError> {
        let form = vec![
            ("customer".to_string(), stripe_customer_id.to_string()),
            ("items[0][price]".to_string(), price_id.to_string()),
            ("metadata[job_id]".to_string(), job_id.to_string()),
            ("metadata[type]".to_string(), "monthly".to_string()),
            ("collection_method".to_string(), "send_invoice".to_string()),
            (
                "days_until_due".to_string(),
                INVOICE_DAYS_UNTIL_DUE.to_string(),
            ),
            ("proration_behavior".to_string(), "none".to_string()),
        ];

        self.post_form("/subscriptions", &form).await
    }

    pub async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, StripeError> {
        let response = self
            .client
            .delete(format!(
                "{}/subscriptions/{}",
                self.base_url, subscription_id
            ))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .send()
            .await
            .map_err(|e| StripeError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    // ------------------------------------------------------------------
    // Webhooks
    // ------------------------------------------------------------------

    /// Verifies a `Stripe-Signature` header against the raw request body
    /// and returns the decoded event. The header carries `t=<unix ts>` and
    /// `v1=<hex hmac>` pairs; the HMAC-SHA256 is computed over
    /// `"{t}.{body}"` with the endpoint secret.
    pub fn verify_webhook_signature(
        &self,
        payload: &str,
        signature_header: &str,
    ) -> Result<StripeWebhookEvent, StripeError> {
        let parts: HashMap<&str, &str> = signature_header
            .split(',')
            .filter_map(|part| {
                let mut split = part.trim().splitn(2, '=');
                Some((split.next()?, split.next()?))
            })
            .collect();

        let timestamp = parts
            .get("t")
            .ok_or_else(|| StripeError::InvalidWebhook("missing timestamp".to_string()))?;
        let received_sig = parts
            .get("v1")
            .ok_or_else(|| StripeError::InvalidWebhook("missing v1 signature".to_string()))?;

        let signed_payload = format!("{}.{}", timestamp, payload);

        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| StripeError::InvalidWebhook("invalid webhook secret".to_string()))?;
        mac.update(signed_payload.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        if expected.as_bytes().ct_eq(received_sig.as_bytes()).unwrap_u8() != 1 {
            return Err(StripeError::InvalidWebhook("signature mismatch".to_string()));
        }

        let timestamp: i64 = timestamp
            .parse()
            .map_err(|_| StripeError::InvalidWebhook("invalid timestamp".to_string()))?;
        let now = chrono::Utc::now().timestamp();
        if (now - timestamp).abs() > WEBHOOK_TOLERANCE_SECS {
            return Err(StripeError::InvalidWebhook(
                "timestamp outside tolerance".to_string(),
            ));
        }

        serde_json::from_str(payload).map_err(|e| StripeError::Parse(e.to_string()))
    }

    pub fn parse_webhook_event(
        &self,
        event: &StripeWebhookEvent,
    ) -> Result<WebhookEvent, StripeError> {
        let invoice = |event: &StripeWebhookEvent| -> Result<StripeInvoice, StripeError> {
            serde_json::from_value(event.data.object.clone())
                .map_err(|e| StripeError::Parse(e.to_string()))
        };

        match event.event_type.as_str() {
            "invoice.created" => Ok(WebhookEvent::InvoiceCreated(invoice(event)?)),
            "invoice.paid" => Ok(WebhookEvent::InvoicePaid(invoice(event)?)),
            "invoice.payment_failed" => Ok(WebhookEvent::InvoicePaymentFailed(invoice(event)?)),
            "invoice.finalized" => Ok(WebhookEvent::InvoiceFinalized(invoice(event)?)),
            "invoice.sent" => Ok(WebhookEvent::InvoiceSent(invoice(event)?)),
            "invoice.updated" => Ok(WebhookEvent::InvoiceUpdated(invoice(event)?)),
            "customer.subscription.deleted" => {
                let subscription: StripeSubscription =
                    serde_json::from_value(event.data.object.clone())
                        .map_err(|e| StripeError::Parse(e.to_string()))?;
                Ok(WebhookEvent::SubscriptionDeleted(subscription))
            }
            other => Ok(WebhookEvent::Unhandled(other.to_string())),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, StripeError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(form)
            .send()
            .await
            .map_err(|e| StripeError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StripeError::Network(e.to_string()))?;

        if !status.is_success() {
            #[derive(Deserialize)]
            struct ApiError {
                error: ApiErrorDetail,
            }

            #[derive(Deserialize)]
            struct ApiErrorDetail {
                message: String,
            }

            if let Ok(parsed) = serde_json::from_str::<ApiError>(&body) {
                return Err(StripeError::Api(parsed.error.message));
            }

            return Err(StripeError::Api(format!("HTTP {}: {}", status, body)));
        }

        serde_json::from_str(&body).map_err(|e| StripeError::Parse(e.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::StripeConfig;

    fn test_client(secret: &str) -> StripeClient {
        StripeClient::new(&StripeConfig {
            secret_key: "sk_test_123".to_string(),
            webhook_secret: secret.to_string(),
            api_base_url: "https://api.stripe.com/v1".to_string(),
        })
    }

    fn sign(secret: &str, timestamp: i64, payload: &str) -> String {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn sample_event_payload() -> String {
        serde_json::json!({
            "id": "evt_test_1",
            "type": "invoice.paid",
            "created": chrono::Utc::now().timestamp(),
            "data": {
                "object": {
                    "id": "in_test_1",
                    "customer": "cus_test_1",
                    "status": "paid",
                    "amount_due": 25000,
                    "amount_paid": 25000,
                    "customer_email": "jane@example.com",
                    "hosted_invoice_url": "https://invoice.stripe.com/i/in_test_1",
                    "metadata": {
                        "job_id": "4a0b9f9e-14c8-4cb1-9f31-5a3d0b2a16f7",
                        "type": "setup"
                    }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn accepts_valid_signature() {
        let secret = "whsec_test_secret";
        let client = test_client(secret);
        let payload = sample_event_payload();
        let ts = chrono::Utc::now().timestamp();
        let header = format!("t={},v1={}", ts, sign(secret, ts, &payload));

        let event = client.verify_webhook_signature(&payload, &header).unwrap();
        assert_eq!(event.event_type, "invoice.paid");
    }

    #[test]
    fn rejects_wrong_secret() {
        let client = test_client("whsec_right");
        let payload = sample_event_payload();
        let ts = chrono::Utc::now().timestamp();
        let header = format!("t={},v1={}", ts, sign("whsec_wrong", ts, &payload));

        let result = client.verify_webhook_signature(&payload, &header);
        assert!(matches!(result, Err(StripeError::InvalidWebhook(_))));
    }

    #[test]
    fn rejects_stale_timestamp() {
        let secret = "whsec_test_secret";
        let client = test_client(secret);
        let payload = sample_event_payload();
        let ts = chrono::Utc::now().timestamp() - WEBHOOK_TOLERANCE_SECS - 60;
        let header = format!("t={},v1={}", ts, sign(secret, ts, &payload));

        let result = client.verify_webhook_signature(&payload, &header);
        assert!(matches!(result, Err(StripeError::InvalidWebhook(_))));
    }

    #[test]
    fn rejects_tampered_payload() {
        let secret = "whsec_test_secret";
        let client = test_client(secret);
        let payload = sample_event_payload();
        let ts = chrono::Utc::now().timestamp();
        let header = format!("t={},v1={}", ts, sign(secret, ts, &payload));

        let tampered = payload.replace("25000", "1");
        let result = client.verify_webhook_signature(&tampered, &header);
        assert!(matches!(result, Err(StripeError::InvalidWebhook(_))));
    }

    #[test]
    fn rejects_missing_signature_parts() {
        let client = test_client("whsec_test_secret");
        let result = client.verify_webhook_signature("{}", "t=123");
        assert!(matches!(result, Err(StripeError::InvalidWebhook(_))));
    }

    #[test]
    fn parses_invoice_paid_event() {
        let client = test_client("whsec_test_secret");
        let event: StripeWebhookEvent =
            serde_json::from_str(&sample_event_payload()).unwrap();

        match client.parse_webhook_event(&event).unwrap() {
            WebhookEvent::InvoicePaid(invoice) => {
                assert_eq!(invoice.id, "in_test_1");
                assert_eq!(invoice.amount_paid, 25000);
                assert_eq!(invoice.metadata.get("type").map(String::as_str), Some("setup"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn unknown_event_type_is_unhandled() {
        let client = test_client("whsec_test_secret");
        let event = StripeWebhookEvent {
            id: "evt_x".to_string(),
            event_type: "charge.refunded".to_string(),
            data: StripeWebhookData {
                object: serde_json::json!({}),
            },
            created: 0,
        };

        match client.parse_webhook_event(&event).unwrap() {
            WebhookEvent::Unhandled(name) => assert_eq!(name, "charge.refunded"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
