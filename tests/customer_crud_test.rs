// Customer CRUD and cascade-delete tests against a live database

use std::sync::Arc;

use chrono::Utc;
use rampdesk_backend::{
    app::AppState,
    app_config,
    db::{create_diesel_pool, DieselDatabaseConfig},
    models::customer::{CreateCustomerRequest, CustomerStatus},
    models::job::{AddJobPaymentRequest, CreateJobRequest, PaymentStatus, PaymentType},
    models::lead::NewRentalRequest,
    services::{
        customer::CustomerService, job::JobService, EsignClient, JwtService, StripeClient,
    },
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

fn customer_request() -> CreateCustomerRequest {
    CreateCustomerRequest {
        first_name: "Marge".to_string(),
        last_name: "Holloway".to_string(),
        email: format!("marge{}@example.com", Uuid::new_v4()),
        phone: "555-0144".to_string(),
        installation_address: Some("88 Beacon St".to_string()),
        city: Some("Portland".to_string()),
        state: Some("ME".to_string()),
        zip_code: Some("04101".to_string()),
        status: CustomerStatus::Active,
    }
}

#[tokio::test]
#[ignore] // Requires database
async fn test_customer_create_and_fetch_round_trip() {
    let state = setup_test_state().await;
    let service = CustomerService::new(&state);

    let request = customer_request();
    let email = request.email.clone();
    let created = service.create_customer(request).await.unwrap();
    let fetched = service.get_customer(created.id).await.unwrap();

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.first_name, "Marge");
    assert_eq!(fetched.last_name, "Holloway");
    assert_eq!(fetched.email, email);
    assert_eq!(fetched.status, "active");
    assert_eq!(
        fetched.installation_address.as_deref(),
        Some("88 Beacon St")
    );

    // Cleanup
    service.delete_customers(&[created.id]).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires database
async fn test_bulk_delete_removes_dependent_rows() {
    use diesel::prelude::*;
    use diesel_async::RunQueryDsl;
    use rampdesk_backend::schema::{job_payments, jobs, rental_requests};

    let state = setup_test_state().await;
    let customers = CustomerService::new(&state);
    let jobs_service = JobService::new(&state);

    let customer = customers.create_customer(customer_request()).await.unwrap();

    let job = jobs_service
        .create_job(CreateJobRequest {
            customer_id: customer.id,
            setup_fee_cents: 45000,
            monthly_rate_cents: 15000,
            installation_date: None,
            removal_date: None,
        })
        .await
        .unwrap();

    jobs_service
        .add_payment(
            job.id,
            AddJobPaymentRequest {
                amount_cents: 45000,
                payment_type: PaymentType::Setup,
                status: PaymentStatus::Paid,
                stripe_invoice_id: None,
            },
        )
        .await
        .unwrap();

    // A lead already converted to this customer
    let now = Utc::now();
    let mut conn = state.diesel_pool.get().await.unwrap();
    diesel::insert_into(rental_requests::table)
        .values(&NewRentalRequest {
            id: Uuid::new_v4(),
            customer_id: Some(customer.id),
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            installation_address: "88 Beacon St".to_string(),
            status: "contacted".to_string(),
            urgency: "medium".to_string(),
            notes: None,
            created_at: now,
            updated_at: now,
        })
        .execute(&mut conn)
        .await
        .unwrap();
    drop(conn);

    customers.delete_customers(&[customer.id]).await.unwrap();

    let mut conn = state.diesel_pool.get().await.unwrap();
    let job_count: i64 = jobs::table
        .filter(jobs::customer_id.eq(customer.id))
        .count()
        .get_result(&mut conn)
        .await
        .unwrap();
    let payment_count: i64 = job_payments::table
        .filter(job_payments::job_id.eq(job.id))
        .count()
        .get_result(&mut conn)
        .await
        .unwrap();
    let lead_count: i64 = rental_requests::table
        .filter(rental_requests::customer_id.eq(Some(customer.id)))
        .count()
        .get_result(&mut conn)
        .await
        .unwrap();

    assert_eq!(job_count, 0, "jobs must not outlive their customer");
    assert_eq!(payment_count, 0, "payments must not outlive their job");
    assert_eq!(lead_count, 0, "leads must not dangle on a deleted customer");
}
