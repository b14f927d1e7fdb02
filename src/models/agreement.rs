// Rental agreement models
// Lifecycle record for the externally hosted e-signature contract

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::rental_agreements;

/// Agreement lifecycle status, driven by provider webhooks after send
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AgreementStatus {
    Sent,
    Viewed,
    Signed,
    Withdrawn,
}

impl AgreementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementStatus::Sent => "sent",
            AgreementStatus::Viewed => "viewed",
            AgreementStatus::Signed => "signed",
            AgreementStatus::Withdrawn => "withdrawn",
        }
    }
}

impl FromStr for AgreementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(AgreementStatus::Sent),
            "viewed" => Ok(AgreementStatus::Viewed),
            "signed" => Ok(AgreementStatus::Signed),
            "withdrawn" => Ok(AgreementStatus::Withdrawn),
            _ => Err(format!("Invalid agreement status: {}", s)),
        }
    }
}

/// Rental agreement record, keyed to the provider contract id
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = rental_agreements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RentalAgreement {
    pub id: Uuid,
    pub job_id: Uuid,
    pub contract_id: String,
    pub status: String,
    pub sign_page_url: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rental_agreements)]
pub struct NewRentalAgreement {
    pub id: Uuid,
    pub job_id: Uuid,
    pub contract_id: String,
    pub status: String,
    pub sign_page_url: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Signer contact details for sending an agreement
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendAgreementRequest {
    #[validate(length(min = 1, max = 200, message = "Signer name must be 1-200 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid signer email"))]
    pub email: String,

    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agreement_status_round_trip() {
        for status in [
            AgreementStatus::Sent,
            AgreementStatus::Viewed,
            AgreementStatus::Signed,
            AgreementStatus::Withdrawn,
        ] {
            assert_eq!(status.as_str().parse::<AgreementStatus>().unwrap(), status);
        }
    }
}
