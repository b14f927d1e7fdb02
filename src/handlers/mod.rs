// HTTP handlers and route builders

pub mod customers;
pub mod docs;
pub mod jobs;
pub mod leads;
pub mod roles;
pub mod webhooks;

use crate::app::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

// Customer routes (protected)
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(customers::list_customers)
                .post(customers::create_customer)
                .delete(customers::delete_customers),
        )
        .route("/search", get(customers::search_customers))
        .route("/status", put(customers::update_customers_status))
        .route(
            "/{id}",
            get(customers::get_customer).put(customers::update_customer),
        )
        .route(
            "/{id}/accessibility",
            get(customers::get_accessibility).put(customers::upsert_accessibility),
        )
}

// Job routes (protected)
pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(jobs::list_jobs)
                .post(jobs::create_job)
                .delete(jobs::delete_jobs),
        )
        .route("/status", put(jobs::update_jobs_status))
        .route("/{id}", get(jobs::get_job).put(jobs::update_job))
        .route("/{id}/notes", post(jobs::add_job_note))
        .route("/{id}/locations", post(jobs::add_job_location))
        .route("/{id}/payments", post(jobs::add_job_payment))
        .route("/{id}/installation", put(jobs::upsert_installation_details))
        .route("/{id}/invoice", post(jobs::create_job_invoice))
        .route(
            "/{id}/subscription/cancel",
            post(jobs::cancel_job_subscription),
        )
        .route("/{id}/agreement", post(jobs::send_agreement))
}

// Lead routes (protected)
pub fn lead_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(leads::list_leads))
        .route("/{id}", get(leads::get_lead).put(leads::update_lead))
}

// Role routes (protected)
pub fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/assign", post(roles::assign_role))
        .route("/remove", post(roles::remove_role))
        .route("/me", get(roles::my_roles))
}

// Public intake route
pub fn intake_routes() -> Router<AppState> {
    Router::new().route("/requests", post(leads::submit_rental_request))
}

// Webhook routes (public, authenticated by signature/token)
pub fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route("/stripe", post(webhooks::stripe_webhook))
        .route("/esignatures", post(webhooks::esignatures_webhook))
}

// Documentation routes
pub fn docs_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(docs::serve_swagger_ui))
        .route("/openapi.json", get(docs::serve_openapi_spec))
}
