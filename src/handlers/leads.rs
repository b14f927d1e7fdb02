// Lead intake and triage endpoints

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        lead::{CreateLeadRequest, RentalRequest, UpdateLeadRequest},
        role::RoleName,
    },
    services::{lead::LeadService, roles::RoleService},
};

/// List leads, newest first
/// GET /api/v1/leads
#[utoipa::path(
    get,
    path = "/v1/leads",
    tag = "Leads",
    operation_id = "listLeads",
    responses(
        (status = 200, description = "Lead list", body = [RentalRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_leads(State(state): State<AppState>) -> impl IntoResponse {
    let service = LeadService::new(&state);
    match service.list_leads().await {
        Ok(leads) => Json(leads).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Fetch one lead
/// GET /api/v1/leads/:id
#[utoipa::path(
    get,
    path = "/v1/leads/{id}",
    tag = "Leads",
    operation_id = "getLead",
    params(("id" = Uuid, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead", body = RentalRequest),
        (status = 404, description = "Lead not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = LeadService::new(&state);
    match service.get_lead(lead_id).await {
        Ok(lead) => Json(lead).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Public rental request intake
/// POST /api/v1/requests
#[utoipa::path(
    post,
    path = "/v1/requests",
    tag = "Leads",
    operation_id = "submitRentalRequest",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Request received", body = RentalRequest),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn submit_rental_request(
    State(state): State<AppState>,
    Json(request): Json<CreateLeadRequest>,
) -> impl IntoResponse {
    let service = LeadService::new(&state);
    match service.create_lead(request).await {
        Ok(lead) => (StatusCode::CREATED, Json(lead)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Triage a lead (admin)
/// PUT /api/v1/leads/:id
#[utoipa::path(
    put,
    path = "/v1/leads/{id}",
    tag = "Leads",
    operation_id = "updateLead",
    params(("id" = Uuid, Path, description = "Lead ID")),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Lead updated", body = RentalRequest),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Lead not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_lead(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(lead_id): Path<Uuid>,
    Json(request): Json<UpdateLeadRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = LeadService::new(&state);
    match service.update_lead(lead_id, request).await {
        Ok(lead) => Json(lead).into_response(),
        Err(e) => e.into_response(),
    }
}
