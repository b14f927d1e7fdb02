// Lead (rental request) models
// A lead is a prospective customer inquiry prior to conversion

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::rental_requests;

/// Lead pipeline status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Quoted,
    Closed,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Quoted => "quoted",
            LeadStatus::Closed => "closed",
            LeadStatus::Lost => "lost",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "quoted" => Ok(LeadStatus::Quoted),
            "closed" => Ok(LeadStatus::Closed),
            "lost" => Ok(LeadStatus::Lost),
            _ => Err(format!("Invalid lead status: {}", s)),
        }
    }
}

/// Lead urgency as self-reported on the intake form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeadUrgency {
    Low,
    Medium,
    High,
}

impl LeadUrgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadUrgency::Low => "low",
            LeadUrgency::Medium => "medium",
            LeadUrgency::High => "high",
        }
    }
}

impl FromStr for LeadUrgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(LeadUrgency::Low),
            "medium" => Ok(LeadUrgency::Medium),
            "high" => Ok(LeadUrgency::High),
            _ => Err(format!("Invalid lead urgency: {}", s)),
        }
    }
}

/// Rental request record
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = rental_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RentalRequest {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub installation_address: String,
    pub status: String,
    pub urgency: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rental_requests)]
pub struct NewRentalRequest {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub installation_address: String,
    pub status: String,
    pub urgency: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial lead update
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = rental_requests)]
pub struct UpdateRentalRequest {
    pub customer_id: Option<Option<Uuid>>,
    pub status: Option<String>,
    pub urgency: Option<String>,
    pub notes: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Public intake form payload. Status is always forced to new.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLeadRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 7, max = 50, message = "Phone must be 7-50 characters"))]
    pub phone: String,

    #[validate(length(min = 1, message = "Installation address is required"))]
    pub installation_address: String,

    #[serde(default = "default_urgency")]
    pub urgency: LeadUrgency,

    pub notes: Option<String>,
}

fn default_urgency() -> LeadUrgency {
    LeadUrgency::Medium
}

/// Admin-side lead update (status changes, notes, customer conversion link)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateLeadRequest {
    pub status: Option<LeadStatus>,
    pub urgency: Option<LeadUrgency>,
    // Explicit null clears the value; an absent field leaves it alone
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub customer_id: Option<Option<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_status_round_trip() {
        for status in [
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::Quoted,
            LeadStatus::Closed,
            LeadStatus::Lost,
        ] {
            assert_eq!(status.as_str().parse::<LeadStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_intake_defaults_to_medium_urgency() {
        let req: CreateLeadRequest = serde_json::from_str(
            r#"{
                "first_name": "Pat",
                "last_name": "Doe",
                "email": "pat@example.com",
                "phone": "555-0100",
                "installation_address": "12 Oak St"
            }"#,
        )
        .unwrap();
        assert_eq!(req.urgency, LeadUrgency::Medium);
    }
}
