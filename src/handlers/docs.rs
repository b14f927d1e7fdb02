// OpenAPI document and Swagger UI serving

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    handlers,
    models::{
        agreement::{RentalAgreement, SendAgreementRequest},
        customer::{
            AccessibilityRequirements, CreateCustomerRequest, Customer, DeleteCustomersRequest,
            UpdateCustomerRequest, UpdateCustomersStatusRequest, UpsertAccessibilityRequest,
        },
        job::{
            AddJobLocationRequest, AddJobNoteRequest, AddJobPaymentRequest, CreateJobRequest,
            DeleteJobsRequest, InstallationDetails, Job, JobDetailResponse, JobLocation, JobNote,
            JobPayment, JobWithRelations, UpdateJobRequest, UpdateJobsStatusRequest,
            UpsertInstallationDetailsRequest,
        },
        lead::{CreateLeadRequest, RentalRequest, UpdateLeadRequest},
        role::RoleChangeRequest,
    },
    services::billing::CreateJobInvoiceResponse,
    utils::status::StatusIndicator,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RampDesk Backend API",
        description = "Admin dashboard backend for wheelchair ramp rentals: customers, jobs, leads, invoicing, and e-signature agreements",
        version = "1.0.0"
    ),
    paths(
        handlers::customers::list_customers,
        handlers::customers::search_customers,
        handlers::customers::get_customer,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customers,
        handlers::customers::update_customers_status,
        handlers::customers::get_accessibility,
        handlers::customers::upsert_accessibility,
        handlers::jobs::list_jobs,
        handlers::jobs::get_job,
        handlers::jobs::create_job,
        handlers::jobs::update_job,
        handlers::jobs::delete_jobs,
        handlers::jobs::update_jobs_status,
        handlers::jobs::add_job_note,
        handlers::jobs::add_job_location,
        handlers::jobs::add_job_payment,
        handlers::jobs::upsert_installation_details,
        handlers::jobs::create_job_invoice,
        handlers::jobs::cancel_job_subscription,
        handlers::jobs::send_agreement,
        handlers::leads::list_leads,
        handlers::leads::get_lead,
        handlers::leads::submit_rental_request,
        handlers::leads::update_lead,
        handlers::roles::assign_role,
        handlers::roles::remove_role,
        handlers::roles::my_roles,
        handlers::webhooks::stripe_webhook,
        handlers::webhooks::esignatures_webhook,
    ),
    components(schemas(
        Customer,
        CreateCustomerRequest,
        UpdateCustomerRequest,
        DeleteCustomersRequest,
        UpdateCustomersStatusRequest,
        AccessibilityRequirements,
        UpsertAccessibilityRequest,
        Job,
        JobWithRelations,
        JobDetailResponse,
        JobLocation,
        JobNote,
        JobPayment,
        InstallationDetails,
        CreateJobRequest,
        UpdateJobRequest,
        DeleteJobsRequest,
        UpdateJobsStatusRequest,
        AddJobNoteRequest,
        AddJobLocationRequest,
        AddJobPaymentRequest,
        UpsertInstallationDetailsRequest,
        CreateJobInvoiceResponse,
        RentalAgreement,
        SendAgreementRequest,
        RentalRequest,
        CreateLeadRequest,
        UpdateLeadRequest,
        RoleChangeRequest,
        StatusIndicator,
    )),
    tags(
        (name = "Customers", description = "Customer records and accessibility surveys"),
        (name = "Jobs", description = "Ramp installation jobs and billing"),
        (name = "Leads", description = "Rental request intake and triage"),
        (name = "Roles", description = "Coarse role-based access control"),
        (name = "Webhooks", description = "Inbound provider notifications"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token from the identity provider"))
                        .build(),
                ),
            );
        }
    }
}

/// Serve the OpenAPI JSON document at /v1/docs/openapi.json
pub async fn serve_openapi_spec() -> Response {
    match ApiDoc::openapi().to_json() {
        Ok(spec) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            spec,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize OpenAPI document: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
    }
}

/// Serve Swagger UI HTML at /v1/docs
pub async fn serve_swagger_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>RampDesk API Documentation</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui.css" />
    <style>
        body { margin: 0; padding: 0; }
        #swagger-ui { max-width: 1460px; margin: 0 auto; padding: 20px; }
        .topbar { display: none; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            SwaggerUIBundle({
                url: 'openapi.json',
                dom_id: '#swagger-ui',
                presets: [SwaggerUIBundle.presets.apis],
                layout: 'BaseLayout',
                tryItOutEnabled: true
            });
        };
    </script>
</body>
</html>"#;
