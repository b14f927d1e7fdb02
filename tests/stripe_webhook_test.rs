// Stripe webhook verification and event decoding against realistic payloads

use hmac::{Hmac, Mac};
use rampdesk_backend::app_config::StripeConfig;
use rampdesk_backend::services::stripe::{StripeClient, WebhookEvent};
use sha2::Sha256;

const WEBHOOK_SECRET: &str = "whsec_integration_test_secret";

fn client() -> StripeClient {
    StripeClient::new(&StripeConfig {
        secret_key: "sk_test_abc".to_string(),
        webhook_secret: WEBHOOK_SECRET.to_string(),
        api_base_url: "https://api.stripe.com/v1".to_string(),
    })
}

fn signature_header(payload: &str) -> String {
    let ts = chrono::Utc::now().timestamp();
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(format!("{}.{}", ts, payload).as_bytes());
    format!("t={},v1={}", ts, hex::encode(mac.finalize().into_bytes()))
}

fn invoice_event(event_type: &str, status: &str, amount_due: i64, amount_paid: i64) -> String {
    serde_json::json!({
        "id": "evt_1",
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "data": {
            "object": {
                "id": "in_123",
                "customer": "cus_456",
                "status": status,
                "amount_due": amount_due,
                "amount_paid": amount_paid,
                "customer_email": "customer@example.com",
                "hosted_invoice_url": "https://invoice.stripe.com/i/in_123",
                "metadata": {
                    "job_id": "6a3f7a3e-0f4d-42d3-8f8e-2f1f1b1c9d0a",
                    "type": "setup",
                    "customer_name": "Jane Doe"
                }
            }
        }
    })
    .to_string()
}

#[test]
fn verified_invoice_paid_event_decodes_to_paid_variant() {
    let client = client();
    let payload = invoice_event("invoice.paid", "paid", 25000, 25000);
    let header = signature_header(&payload);

    let event = client.verify_webhook_signature(&payload, &header).unwrap();
    match client.parse_webhook_event(&event).unwrap() {
        WebhookEvent::InvoicePaid(invoice) => {
            assert_eq!(invoice.amount_paid, 25000);
            assert_eq!(
                invoice.metadata.get("job_id").map(String::as_str),
                Some("6a3f7a3e-0f4d-42d3-8f8e-2f1f1b1c9d0a")
            );
        },
        other => panic!("expected InvoicePaid, got {:?}", other),
    }
}

#[test]
fn invoice_created_and_failed_events_decode() {
    let client = client();

    let created: rampdesk_backend::services::stripe::StripeWebhookEvent =
        serde_json::from_str(&invoice_event("invoice.created", "draft", 25000, 0)).unwrap();
    assert!(matches!(
        client.parse_webhook_event(&created).unwrap(),
        WebhookEvent::InvoiceCreated(_)
    ));

    let failed: rampdesk_backend::services::stripe::StripeWebhookEvent =
        serde_json::from_str(&invoice_event("invoice.payment_failed", "open", 25000, 0)).unwrap();
    match client.parse_webhook_event(&failed).unwrap() {
        WebhookEvent::InvoicePaymentFailed(invoice) => assert_eq!(invoice.amount_due, 25000),
        other => panic!("expected InvoicePaymentFailed, got {:?}", other),
    }
}

#[test]
fn subscription_deleted_event_decodes() {
    let client = client();
    let payload = serde_json::json!({
        "id": "evt_2",
        "type": "customer.subscription.deleted",
        "created": chrono::Utc::now().timestamp(),
        "data": {
            "object": {
                "id": "sub_789",
                "customer": "cus_456",
                "status": "canceled",
                "latest_invoice": null,
                "metadata": { "job_id": "6a3f7a3e-0f4d-42d3-8f8e-2f1f1b1c9d0a", "type": "monthly" }
            }
        }
    })
    .to_string();

    let event: rampdesk_backend::services::stripe::StripeWebhookEvent =
        serde_json::from_str(&payload).unwrap();
    match client.parse_webhook_event(&event).unwrap() {
        WebhookEvent::SubscriptionDeleted(sub) => assert_eq!(sub.id, "sub_789"),
        other => panic!("expected SubscriptionDeleted, got {:?}", other),
    }
}

#[test]
fn tampered_body_fails_verification() {
    let client = client();
    let payload = invoice_event("invoice.paid", "paid", 25000, 25000);
    let header = signature_header(&payload);

    let tampered = payload.replace("cus_456", "cus_evil");
    assert!(client.verify_webhook_signature(&tampered, &header).is_err());
}

#[test]
fn metadata_free_invoice_still_decodes() {
    // Stripe sends invoices without metadata for objects created outside
    // this system; decoding must not fail on the missing map
    let client = client();
    let payload = serde_json::json!({
        "id": "evt_3",
        "type": "invoice.paid",
        "created": chrono::Utc::now().timestamp(),
        "data": {
            "object": {
                "id": "in_external",
                "customer": "cus_999",
                "status": "paid",
                "amount_due": 1000,
                "amount_paid": 1000,
                "customer_email": null,
                "hosted_invoice_url": null
            }
        }
    })
    .to_string();

    let event: rampdesk_backend::services::stripe::StripeWebhookEvent =
        serde_json::from_str(&payload).unwrap();
    match client.parse_webhook_event(&event).unwrap() {
        WebhookEvent::InvoicePaid(invoice) => assert!(invoice.metadata.is_empty()),
        other => panic!("expected InvoicePaid, got {:?}", other),
    }
}
