// Customer database models and request/response DTOs

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::{customer_accessibility_requirements, customers};

// =============================================================================
// STATUS ENUM
// =============================================================================

/// Customer lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Inactive,
    Pending,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "active",
            CustomerStatus::Inactive => "inactive",
            CustomerStatus::Pending => "pending",
        }
    }
}

impl FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CustomerStatus::Active),
            "inactive" => Ok(CustomerStatus::Inactive),
            "pending" => Ok(CustomerStatus::Pending),
            _ => Err(format!("Invalid customer status: {}", s)),
        }
    }
}

// =============================================================================
// DATABASE MODELS
// =============================================================================

/// Customer record
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Customer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub installation_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub installation_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial customer update
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = customers)]
pub struct UpdateCustomer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub installation_address: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub zip_code: Option<Option<String>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Post-sale accessibility survey for a customer
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = customer_accessibility_requirements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccessibilityRequirements {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub mobility_device: String,
    pub device_width: Option<i32>,
    pub device_length: Option<i32>,
    pub device_turning_radius: Option<i32>,
    pub user_weight: Option<i32>,
    pub assistance_required: Option<bool>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub special_requirements: Option<Vec<Option<String>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customer_accessibility_requirements)]
pub struct NewAccessibilityRequirements {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub mobility_device: String,
    pub device_width: Option<i32>,
    pub device_length: Option<i32>,
    pub device_turning_radius: Option<i32>,
    pub user_weight: Option<i32>,
    pub assistance_required: Option<bool>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub special_requirements: Option<Vec<Option<String>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// REQUEST/RESPONSE DTOs
// =============================================================================

/// Request to create a new customer
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 7, max = 50, message = "Phone must be 7-50 characters"))]
    pub phone: String,

    pub installation_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,

    #[serde(default = "default_customer_status")]
    pub status: CustomerStatus,
}

fn default_customer_status() -> CustomerStatus {
    CustomerStatus::Pending
}

/// Request to partially update a customer
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub installation_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub status: Option<CustomerStatus>,
}

/// Bulk delete request (cascades through dependent tables)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteCustomersRequest {
    pub customer_ids: Vec<Uuid>,
}

/// Bulk status update request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCustomersStatusRequest {
    pub customer_ids: Vec<Uuid>,
    pub status: CustomerStatus,
}

/// Search query parameters
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct CustomerSearchParams {
    /// Term matched against first name, last name, and email
    pub q: String,
}

/// Request to upsert the accessibility survey for a customer
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertAccessibilityRequest {
    #[validate(length(min = 1, max = 100, message = "Mobility device must be 1-100 characters"))]
    pub mobility_device: String,

    pub device_width: Option<i32>,
    pub device_length: Option<i32>,
    pub device_turning_radius: Option<i32>,
    pub user_weight: Option<i32>,
    pub assistance_required: Option<bool>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub special_requirements: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_status_round_trip() {
        for status in [
            CustomerStatus::Active,
            CustomerStatus::Inactive,
            CustomerStatus::Pending,
        ] {
            assert_eq!(status.as_str().parse::<CustomerStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_customer_status_rejects_unknown() {
        assert!("archived".parse::<CustomerStatus>().is_err());
    }
}
