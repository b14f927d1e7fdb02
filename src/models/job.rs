// Job database models and request/response DTOs
// A job is one rental engagement: pricing, schedule, payments, notes,
// locations, and the post-install survey

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::agreement::RentalAgreement;
use crate::models::customer::Customer;
use crate::schema::{installation_details, job_locations, job_notes, job_payments, jobs};

// =============================================================================
// STATUS ENUMS
// =============================================================================

/// Job lifecycle status. Any value may be written from any other value;
/// transitions are not validated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Draft,
    Quoted,
    Approved,
    Paid,
    Scheduled,
    Installed,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Quoted => "quoted",
            JobStatus::Approved => "approved",
            JobStatus::Paid => "paid",
            JobStatus::Scheduled => "scheduled",
            JobStatus::Installed => "installed",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Badge color used by table views.
    pub fn badge_variant(&self) -> &'static str {
        match self {
            JobStatus::Completed => "success",
            JobStatus::Cancelled => "destructive",
            _ => "warning",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(JobStatus::Draft),
            "quoted" => Ok(JobStatus::Quoted),
            "approved" => Ok(JobStatus::Approved),
            "paid" => Ok(JobStatus::Paid),
            "scheduled" => Ok(JobStatus::Scheduled),
            "installed" => Ok(JobStatus::Installed),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" => Ok(JobStatus::Cancelled),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

/// Payment ledger entry type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Setup,
    Monthly,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Setup => "setup",
            PaymentType::Monthly => "monthly",
        }
    }
}

impl FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setup" => Ok(PaymentType::Setup),
            "monthly" => Ok(PaymentType::Monthly),
            _ => Err(format!("Invalid payment type: {}", s)),
        }
    }
}

/// Payment ledger entry status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// Installation vs removal scheduling record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Installation,
    Removal,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Installation => "installation",
            LocationType::Removal => "removal",
        }
    }
}

impl FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "installation" => Ok(LocationType::Installation),
            "removal" => Ok(LocationType::Removal),
            _ => Err(format!("Invalid location type: {}", s)),
        }
    }
}

// =============================================================================
// DATABASE MODELS
// =============================================================================

/// Job record
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Job {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: String,
    pub setup_fee_cents: i32,
    pub monthly_rate_cents: i32,
    pub installation_date: Option<DateTime<Utc>>,
    pub removal_date: Option<DateTime<Utc>>,
    pub setup_fee_payment_url: Option<String>,
    pub monthly_payment_url: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJob {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: String,
    pub setup_fee_cents: i32,
    pub monthly_rate_cents: i32,
    pub installation_date: Option<DateTime<Utc>>,
    pub removal_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial job update
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = jobs)]
pub struct UpdateJob {
    pub status: Option<String>,
    pub setup_fee_cents: Option<i32>,
    pub monthly_rate_cents: Option<i32>,
    pub installation_date: Option<Option<DateTime<Utc>>>,
    pub removal_date: Option<Option<DateTime<Utc>>>,
    pub setup_fee_payment_url: Option<Option<String>>,
    pub monthly_payment_url: Option<Option<String>>,
    pub stripe_subscription_id: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payment ledger row, one per invoice event
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = job_payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobPayment {
    pub id: Uuid,
    pub job_id: Uuid,
    pub amount_cents: i32,
    #[diesel(column_name = type_)]
    #[serde(rename = "type")]
    pub payment_type: String,
    pub status: String,
    pub stripe_invoice_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = job_payments)]
pub struct NewJobPayment {
    pub id: Uuid,
    pub job_id: Uuid,
    pub amount_cents: i32,
    #[diesel(column_name = type_)]
    pub payment_type: String,
    pub status: String,
    pub stripe_invoice_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Installation or removal scheduling record
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = job_locations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobLocation {
    pub id: Uuid,
    pub job_id: Uuid,
    #[diesel(column_name = type_)]
    #[serde(rename = "type")]
    pub location_type: String,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = job_locations)]
pub struct NewJobLocation {
    pub id: Uuid,
    pub job_id: Uuid,
    #[diesel(column_name = type_)]
    pub location_type: String,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Free-text annotation on a job
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = job_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobNote {
    pub id: Uuid,
    pub job_id: Uuid,
    pub content: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = job_notes)]
pub struct NewJobNote {
    pub id: Uuid,
    pub job_id: Uuid,
    pub content: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post-installation survey
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = installation_details)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InstallationDetails {
    pub id: Uuid,
    pub job_id: Uuid,
    pub installed_by: Option<Vec<Option<String>>>,
    pub equipment_used: Option<Vec<Option<String>>>,
    pub installation_start: Option<DateTime<Utc>>,
    pub installation_end: Option<DateTime<Utc>>,
    pub actual_length: Option<i32>,
    pub actual_rise: Option<i32>,
    pub number_of_sections: Option<i32>,
    pub surface_stable: Option<bool>,
    pub proper_slope: Option<bool>,
    pub handrails_secure: Option<bool>,
    pub platform_secure: Option<bool>,
    pub modifications_required: Option<bool>,
    pub modification_details: Option<String>,
    pub photos: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = installation_details)]
pub struct NewInstallationDetails {
    pub id: Uuid,
    pub job_id: Uuid,
    pub installed_by: Option<Vec<Option<String>>>,
    pub equipment_used: Option<Vec<Option<String>>>,
    pub installation_start: Option<DateTime<Utc>>,
    pub installation_end: Option<DateTime<Utc>>,
    pub actual_length: Option<i32>,
    pub actual_rise: Option<i32>,
    pub number_of_sections: Option<i32>,
    pub surface_stable: Option<bool>,
    pub proper_slope: Option<bool>,
    pub handrails_secure: Option<bool>,
    pub platform_secure: Option<bool>,
    pub modifications_required: Option<bool>,
    pub modification_details: Option<String>,
    pub photos: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// REQUEST/RESPONSE DTOs
// =============================================================================

/// Request to create a new job. Status is always forced to draft.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateJobRequest {
    pub customer_id: Uuid,

    #[validate(range(min = 0, message = "Setup fee cannot be negative"))]
    pub setup_fee_cents: i32,

    #[validate(range(min = 0, message = "Monthly rate cannot be negative"))]
    pub monthly_rate_cents: i32,

    pub installation_date: Option<DateTime<Utc>>,
    pub removal_date: Option<DateTime<Utc>>,
}

/// Request to partially update a job
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateJobRequest {
    pub status: Option<JobStatus>,

    #[validate(range(min = 0, message = "Setup fee cannot be negative"))]
    pub setup_fee_cents: Option<i32>,

    #[validate(range(min = 0, message = "Monthly rate cannot be negative"))]
    pub monthly_rate_cents: Option<i32>,

    // Explicit null clears the date; an absent field leaves it alone
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub installation_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub removal_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteJobsRequest {
    pub job_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateJobsStatusRequest {
    pub job_ids: Vec<Uuid>,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddJobNoteRequest {
    #[validate(length(min = 1, message = "Note content cannot be empty"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddJobLocationRequest {
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
}

/// Manually recorded payment (outside the webhook path)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddJobPaymentRequest {
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_cents: i32,

    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub stripe_invoice_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpsertInstallationDetailsRequest {
    pub installed_by: Option<Vec<String>>,
    pub equipment_used: Option<Vec<String>>,
    pub installation_start: Option<DateTime<Utc>>,
    pub installation_end: Option<DateTime<Utc>>,
    pub actual_length: Option<i32>,
    pub actual_rise: Option<i32>,
    pub number_of_sections: Option<i32>,
    pub surface_stable: Option<bool>,
    pub proper_slope: Option<bool>,
    pub handrails_secure: Option<bool>,
    pub platform_secure: Option<bool>,
    pub modifications_required: Option<bool>,
    pub modification_details: Option<String>,
    pub photos: Option<serde_json::Value>,
}

/// Job list entry with its dependent rows
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobWithRelations {
    #[serde(flatten)]
    pub job: Job,
    /// Badge color for the jobs table, derived from the status
    pub status_badge: String,
    pub locations: Vec<JobLocation>,
    pub payments: Vec<JobPayment>,
    pub notes: Vec<JobNote>,
}

/// Full job detail for the overview screen
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobDetailResponse {
    #[serde(flatten)]
    pub job: Job,
    pub customer: Customer,
    pub locations: Vec<JobLocation>,
    pub payments: Vec<JobPayment>,
    pub notes: Vec<JobNote>,
    pub installation: Option<InstallationDetails>,
    pub agreement: Option<RentalAgreement>,
    pub indicators: Vec<crate::utils::status::StatusIndicator>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_round_trip() {
        for status in [
            JobStatus::Draft,
            JobStatus::Quoted,
            JobStatus::Approved,
            JobStatus::Paid,
            JobStatus::Scheduled,
            JobStatus::Installed,
            JobStatus::Completed,
            JobStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_badge_variant_per_status() {
        assert_eq!(JobStatus::Completed.badge_variant(), "success");
        assert_eq!(JobStatus::Cancelled.badge_variant(), "destructive");
        for status in [
            JobStatus::Draft,
            JobStatus::Quoted,
            JobStatus::Approved,
            JobStatus::Paid,
            JobStatus::Scheduled,
            JobStatus::Installed,
        ] {
            assert_eq!(status.badge_variant(), "warning");
        }
    }

    #[test]
    fn test_payment_status_includes_failed() {
        // The webhook receiver records failed invoices; the ledger must
        // accept that status
        assert_eq!(
            "failed".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::Failed
        );
    }

    #[test]
    fn test_location_type_serde_names() {
        let json = serde_json::to_string(&LocationType::Installation).unwrap();
        assert_eq!(json, "\"installation\"");
    }
}
