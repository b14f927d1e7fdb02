// Customer management endpoints

use axum::{
    extract::{Extension, Path, Query, State},
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
        customer::{
            AccessibilityRequirements, CreateCustomerRequest, Customer, CustomerSearchParams,
            DeleteCustomersRequest, UpdateCustomerRequest, UpdateCustomersStatusRequest,
            UpsertAccessibilityRequest,
        },
        role::RoleName,
    },
    services::{customer::CustomerService, roles::RoleService},
};

/// List all customers, newest first
/// GET /api/v1/customers
#[utoipa::path(
    get,
    path = "/v1/customers",
    tag = "Customers",
    operation_id = "listCustomers",
    responses(
        (status = 200, description = "Customer list", body = [Customer]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_customers(State(state): State<AppState>) -> impl IntoResponse {
    let service = CustomerService::new(&state);
    match service.list_customers().await {
        Ok(customers) => Json(customers).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Typeahead search over names and email
/// GET /api/v1/customers/search?q=
#[utoipa::path(
    get,
    path = "/v1/customers/search",
    tag = "Customers",
    operation_id = "searchCustomers",
    params(CustomerSearchParams),
    responses(
        (status = 200, description = "Matching customers (max 5)", body = [Customer]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
pub async fn search_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerSearchParams>,
) -> impl IntoResponse {
    let service = CustomerService::new(&state);
    match service.search_customers(&params.q).await {
        Ok(customers) => Json(customers).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Fetch one customer
/// GET /api/v1/customers/:id
#[utoipa::path(
    get,
    path = "/v1/customers/{id}",
    tag = "Customers",
    operation_id = "getCustomer",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer", body = Customer),
        (status = 404, description = "Customer not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CustomerService::new(&state);
    match service.get_customer(customer_id).await {
        Ok(customer) => Json(customer).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a customer (admin)
/// POST /api/v1/customers
#[utoipa::path(
    post,
    path = "/v1/customers",
    tag = "Customers",
    operation_id = "createCustomer",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateCustomerRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = CustomerService::new(&state);
    match service.create_customer(request).await {
        Ok(customer) => (StatusCode::CREATED, Json(customer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Partially update a customer (admin)
/// PUT /api/v1/customers/:id
#[utoipa::path(
    put,
    path = "/v1/customers/{id}",
    tag = "Customers",
    operation_id = "updateCustomer",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Customer not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(customer_id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = CustomerService::new(&state);
    match service.update_customer(customer_id, request).await {
        Ok(customer) => Json(customer).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Bulk delete customers with manual cascade (admin)
/// DELETE /api/v1/customers
#[utoipa::path(
    delete,
    path = "/v1/customers",
    tag = "Customers",
    operation_id = "deleteCustomers",
    request_body = DeleteCustomersRequest,
    responses(
        (status = 200, description = "Customers deleted"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_customers(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<DeleteCustomersRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = CustomerService::new(&state);
    match service.delete_customers(&request.customer_ids).await {
        Ok(deleted) => Json(json!({ "deleted": deleted })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Bulk status update (admin)
/// PUT /api/v1/customers/status
#[utoipa::path(
    put,
    path = "/v1/customers/status",
    tag = "Customers",
    operation_id = "updateCustomersStatus",
    request_body = UpdateCustomersStatusRequest,
    responses(
        (status = 200, description = "Statuses updated"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_customers_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateCustomersStatusRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = CustomerService::new(&state);
    match service
        .update_customers_status(&request.customer_ids, request.status)
        .await
    {
        Ok(updated) => Json(json!({ "updated": updated })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Fetch a customer's accessibility survey
/// GET /api/v1/customers/:id/accessibility
#[utoipa::path(
    get,
    path = "/v1/customers/{id}/accessibility",
    tag = "Customers",
    operation_id = "getAccessibility",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Accessibility survey", body = AccessibilityRequirements),
        (status = 404, description = "No survey on file")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_accessibility(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CustomerService::new(&state);
    match service.get_accessibility(customer_id).await {
        Ok(survey) => Json(survey).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Upsert a customer's accessibility survey (admin)
/// PUT /api/v1/customers/:id/accessibility
#[utoipa::path(
    put,
    path = "/v1/customers/{id}/accessibility",
    tag = "Customers",
    operation_id = "upsertAccessibility",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = UpsertAccessibilityRequest,
    responses(
        (status = 200, description = "Survey saved", body = AccessibilityRequirements),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Customer not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn upsert_accessibility(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(customer_id): Path<Uuid>,
    Json(request): Json<UpsertAccessibilityRequest>,
) -> impl IntoResponse {
    let roles = RoleService::new(&state);
    if let Err(e) = roles.require_role(auth_user.user_id, RoleName::Admin).await {
        return e.into_response();
    }

    let service = CustomerService::new(&state);
    match service.upsert_accessibility(customer_id, request).await {
        Ok(survey) => Json(survey).into_response(),
        Err(e) => e.into_response(),
    }
}
