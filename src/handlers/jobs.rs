// Job management endpoints, including invoicing and agreements

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        agreement::{RentalAgreement, SendAgreementRequest},
        job::{
            AddJobLocationRequest, AddJobNoteRequest, AddJobPaymentRequest, CreateJobRequest,
            DeleteJobsRequest, InstallationDetails, Job, JobDetailResponse, JobLocation, JobNote,
            JobPayment, JobWithRelations, UpdateJobRequest, UpdateJobsStatusRequest,
            UpsertInstallationDetailsRequest,
        },
        role::RoleName,
    },
    services::{
        agreement::AgreementService,
        billing::{BillingService, CreateJobInvoiceResponse},
        job::JobService,
        roles::RoleService,
    },
};

/// List jobs with nested locations, payments and notes
/// GET /api/v1/jobs
#[utoipa::path(
    get,
    path = "/v1/jobs",
    tag = "Jobs",
    operation_id = "listJobs",
    responses(
        (status = 200, description = "Job list", body = [JobWithRelations]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    let service = JobService::new(&state);
    match service.list_jobs().await {
        Ok(jobs) => Json(jobs).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Job detail with customer, agreement, installation and indicators
/// GET /api/v1/jobs/:id
#[utoipa::path(
    get,
    path = "/v1/jobs/{id}",
    tag = "Jobs",
    operation_id = "getJob",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job detail", body = JobDetailResponse),
        (status = 404, description = "Job not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = JobService::new(&state);
    match service.get_job_detail(job_id).await {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a job in draft status (admin)
/// POST /api/v1/jobs
#[utoipa::path(
    post,
    path = "/v1/jobs",
    tag = "Jobs",
    operation_id = "createJob",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created", body = Job),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Customer not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateJobRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = JobService::new(&state);
    match service.create_job(request).await {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Partially update a job (admin)
/// PUT /api/v1/jobs/:id
#[utoipa::path(
    put,
    path = "/v1/jobs/{id}",
    tag = "Jobs",
    operation_id = "updateJob",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated", body = Job),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Job not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<UpdateJobRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = JobService::new(&state);
    match service.update_job(job_id, request).await {
        Ok(job) => Json(job).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Bulk delete jobs with manual cascade (admin)
/// DELETE /api/v1/jobs
#[utoipa::path(
    delete,
    path = "/v1/jobs",
    tag = "Jobs",
    operation_id = "deleteJobs",
    request_body = DeleteJobsRequest,
    responses(
        (status = 200, description = "Jobs deleted"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_jobs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<DeleteJobsRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = JobService::new(&state);
    match service.delete_jobs(&request.job_ids).await {
        Ok(deleted) => Json(json!({ "deleted": deleted })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Bulk status update (admin)
/// PUT /api/v1/jobs/status
#[utoipa::path(
    put,
    path = "/v1/jobs/status",
    tag = "Jobs",
    operation_id = "updateJobsStatus",
    request_body = UpdateJobsStatusRequest,
    responses(
        (status = 200, description = "Statuses updated"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_jobs_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateJobsStatusRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = JobService::new(&state);
    match service
        .update_jobs_status(&request.job_ids, request.status)
        .await
    {
        Ok(updated) => Json(json!({ "updated": updated })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Append a note to a job (admin)
/// POST /api/v1/jobs/:id/notes
#[utoipa::path(
    post,
    path = "/v1/jobs/{id}/notes",
    tag = "Jobs",
    operation_id = "addJobNote",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = AddJobNoteRequest,
    responses(
        (status = 201, description = "Note added", body = JobNote),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Job not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn add_job_note(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<AddJobNoteRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = JobService::new(&state);
    match service.add_note(job_id, auth_user.user_id, request).await {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Append an installation/removal visit to a job (admin)
/// POST /api/v1/jobs/:id/locations
#[utoipa::path(
    post,
    path = "/v1/jobs/{id}/locations",
    tag = "Jobs",
    operation_id = "addJobLocation",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = AddJobLocationRequest,
    responses(
        (status = 201, description = "Location added", body = JobLocation),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Job not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn add_job_location(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<AddJobLocationRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = JobService::new(&state);
    match service.add_location(job_id, request).await {
        Ok(location) => (StatusCode::CREATED, Json(location)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a manual payment on a job (admin)
/// POST /api/v1/jobs/:id/payments
#[utoipa::path(
    post,
    path = "/v1/jobs/{id}/payments",
    tag = "Jobs",
    operation_id = "addJobPayment",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = AddJobPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = JobPayment),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Job not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn add_job_payment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<AddJobPaymentRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = JobService::new(&state);
    match service.add_payment(job_id, request).await {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Upsert the installation survey for a job (admin)
/// PUT /api/v1/jobs/:id/installation
#[utoipa::path(
    put,
    path = "/v1/jobs/{id}/installation",
    tag = "Jobs",
    operation_id = "upsertInstallationDetails",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = UpsertInstallationDetailsRequest,
    responses(
        (status = 200, description = "Survey saved", body = InstallationDetails),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Job not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn upsert_installation_details(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<UpsertInstallationDetailsRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = JobService::new(&state);
    match service.upsert_installation_details(job_id, request).await {
        Ok(details) => Json(details).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Run the invoicing workflow for a job (admin)
/// POST /api/v1/jobs/:id/invoice
#[utoipa::path(
    post,
    path = "/v1/jobs/{id}/invoice",
    tag = "Jobs",
    operation_id = "createJobInvoice",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Invoices sent", body = CreateJobInvoiceResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Job not found"),
        (status = 502, description = "Payment provider error")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_job_invoice(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = BillingService::new(&state);
    match service.create_job_invoice(job_id).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Cancel a job's subscription (admin)
/// POST /api/v1/jobs/:id/subscription/cancel
#[utoipa::path(
    post,
    path = "/v1/jobs/{id}/subscription/cancel",
    tag = "Jobs",
    operation_id = "cancelJobSubscription",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Subscription cancelled"),
        (status = 400, description = "Job has no subscription"),
        (status = 403, description = "Admin role required"),
        (status = 502, description = "Payment provider error")
    ),
    security(("bearerAuth" = []))
)]
pub async fn cancel_job_subscription(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = BillingService::new(&state);
    match service.cancel_job_subscription(job_id).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Send the rental agreement for signature (admin)
/// POST /api/v1/jobs/:id/agreement
#[utoipa::path(
    post,
    path = "/v1/jobs/{id}/agreement",
    tag = "Jobs",
    operation_id = "sendAgreement",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = SendAgreementRequest,
    responses(
        (status = 200, description = "Agreement sent", body = RentalAgreement),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Job not found"),
        (status = 502, description = "E-signature provider error")
    ),
    security(("bearerAuth" = []))
)]
pub async fn send_agreement(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<SendAgreementRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = AgreementService::new(&state);
    match service.send_agreement(job_id, request).await {
        Ok(agreement) => Json(agreement).into_response(),
        Err(e) => e.into_response(),
    }
}
