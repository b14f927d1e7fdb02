// Applying verified Stripe events to the database

use std::collections::HashMap;
use std::sync::Arc;

use rampdesk_backend::{
    app::AppState,
    app_config,
    db::{create_diesel_pool, DieselDatabaseConfig},
    models::customer::{CreateCustomerRequest, CustomerStatus},
    models::job::CreateJobRequest,
    services::{
        billing::BillingService,
        customer::CustomerService,
        job::JobService,
        stripe::{StripeInvoice, WebhookEvent},
        EsignClient, JwtService, StripeClient,
    },
    utils::ServiceError,
};
use uuid::Uuid;

async fn setup_test_state() -> AppState {
    // Load environment for testing
    dotenv::from_filename(".env.test").ok();
    dotenv::dotenv().ok();

    let db_config = DieselDatabaseConfig::default();
    let max_connections = db_config.max_connections;
    let diesel_pool = create_diesel_pool(db_config).await.unwrap();

    let config = app_config::config();

    AppState {
        config: Arc::new(config.clone()),
        diesel_pool,
        jwt_service: Arc::new(JwtService::from_config()),
        stripe: Arc::new(StripeClient::new(&config.stripe)),
        esignatures: Arc::new(EsignClient::new(&config.esignatures)),
        max_connections,
    }
}

// Customer with one draft job carrying a setup fee, returns (customer_id, job_id)
async fn create_customer_with_job(state: &AppState) -> (Uuid, Uuid) {
    let customers = CustomerService::new(state);
    let jobs = JobService::new(state);

    let customer = customers
        .create_customer(CreateCustomerRequest {
            first_name: "Walter".to_string(),
            last_name: "Finch".to_string(),
            email: format!("walter{}@example.com", Uuid::new_v4()),
            phone: "555-0177".to_string(),
            installation_address: Some("5 Quarry Rd".to_string()),
            city: None,
            state: None,
            zip_code: None,
            status: CustomerStatus::Active,
        })
        .await
        .unwrap();

    let job = jobs
        .create_job(CreateJobRequest {
            customer_id: customer.id,
            setup_fee_cents: 45000,
            monthly_rate_cents: 0,
            installation_date: None,
            removal_date: None,
        })
        .await
        .unwrap();

    (customer.id, job.id)
}

fn paid_setup_invoice(job_id: Uuid, amount: i64) -> StripeInvoice {
    let mut metadata = HashMap::new();
    metadata.insert("job_id".to_string(), job_id.to_string());
    metadata.insert("type".to_string(), "setup".to_string());

    StripeInvoice {
        id: format!("in_{}", Uuid::new_v4().simple()),
        customer: "cus_test".to_string(),
        status: Some("paid".to_string()),
        amount_due: amount,
        amount_paid: amount,
        customer_email: Some("walter@example.com".to_string()),
        hosted_invoice_url: None,
        metadata,
    }
}

#[tokio::test]
#[ignore] // Requires database
async fn test_paid_setup_invoice_writes_one_paid_row_and_marks_job_paid() {
    use diesel::prelude::*;
    use diesel_async::RunQueryDsl;
    use rampdesk_backend::schema::{job_payments, jobs};

    let state = setup_test_state().await;
    let (customer_id, job_id) = create_customer_with_job(&state).await;

    let billing = BillingService::new(&state);
    let invoice = paid_setup_invoice(job_id, 45000);
    let invoice_id = invoice.id.clone();

    billing
        .apply_webhook_event(WebhookEvent::InvoicePaid(invoice))
        .await
        .unwrap();

    let mut conn = state.diesel_pool.get().await.unwrap();
    let rows: Vec<(String, i32, Option<String>)> = job_payments::table
        .filter(job_payments::job_id.eq(job_id))
        .select((
            job_payments::status,
            job_payments::amount_cents,
            job_payments::stripe_invoice_id,
        ))
        .load(&mut conn)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1, "exactly one ledger row per paid event");
    assert_eq!(rows[0].0, "paid");
    assert_eq!(rows[0].1, 45000);
    assert_eq!(rows[0].2.as_deref(), Some(invoice_id.as_str()));

    let job_status: String = jobs::table
        .find(job_id)
        .select(jobs::status)
        .first(&mut conn)
        .await
        .unwrap();
    assert_eq!(job_status, "paid");
    drop(conn);

    // Cleanup
    CustomerService::new(&state)
        .delete_customers(&[customer_id])
        .await
        .unwrap();
}

#[tokio::test]
#[ignore] // Requires database
async fn test_invoice_amount_beyond_i32_is_rejected() {
    use diesel::prelude::*;
    use diesel_async::RunQueryDsl;
    use rampdesk_backend::schema::job_payments;

    let state = setup_test_state().await;
    let (customer_id, job_id) = create_customer_with_job(&state).await;

    let billing = BillingService::new(&state);
    let oversized = i64::from(i32::MAX) + 1;
    let result = billing
        .apply_webhook_event(WebhookEvent::InvoicePaid(paid_setup_invoice(
            job_id, oversized,
        )))
        .await;

    assert!(matches!(result, Err(ServiceError::BadRequest(_))));

    // The ledger stays empty when the amount does not fit
    let mut conn = state.diesel_pool.get().await.unwrap();
    let payment_count: i64 = job_payments::table
        .filter(job_payments::job_id.eq(job_id))
        .count()
        .get_result(&mut conn)
        .await
        .unwrap();
    assert_eq!(payment_count, 0);
    drop(conn);

    CustomerService::new(&state)
        .delete_customers(&[customer_id])
        .await
        .unwrap();
}
