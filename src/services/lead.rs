// Lead intake and triage

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    models::lead::{
        CreateLeadRequest, LeadStatus, NewRentalRequest, RentalRequest, UpdateLeadRequest,
        UpdateRentalRequest,
    },
    utils::ServiceError,
};

pub struct LeadService {
    diesel_pool: DieselPool,
}

impl LeadService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    pub async fn list_leads(&self) -> Result<Vec<RentalRequest>, ServiceError> {
        use crate::schema::rental_requests::dsl;

        let mut conn = self.diesel_pool.get().await?;
        let rows = dsl::rental_requests
            .order(dsl::created_at.desc())
            .load::<RentalRequest>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn get_lead(&self, lead_id: Uuid) -> Result<RentalRequest, ServiceError> {
        use crate::schema::rental_requests::dsl;

        let mut conn = self.diesel_pool.get().await?;
        let lead = dsl::rental_requests
            .find(lead_id)
            .first::<RentalRequest>(&mut conn)
            .await?;
        Ok(lead)
    }

    /// Public intake endpoint. Status is always `new` regardless of
    /// anything in the submission.
    pub async fn create_lead(
        &self,
        request: CreateLeadRequest,
    ) -> Result<RentalRequest, ServiceError> {
        request.validate()?;

        use crate::schema::rental_requests::dsl;

        let now = Utc::now();
        let new_lead = NewRentalRequest {
            id: Uuid::new_v4(),
            customer_id: None,
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            installation_address: request.installation_address,
            status: LeadStatus::New.as_str().to_string(),
            urgency: request.urgency.as_str().to_string(),
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.diesel_pool.get().await?;
        let lead = diesel::insert_into(dsl::rental_requests)
            .values(&new_lead)
            .get_result::<RentalRequest>(&mut conn)
            .await?;

        info!(lead_id = %lead.id, "Rental request received");
        Ok(lead)
    }

    /// Admin triage: status, urgency, notes, and linking to a customer
    /// record once one is created from the lead.
    pub async fn update_lead(
        &self,
        lead_id: Uuid,
        request: UpdateLeadRequest,
    ) -> Result<RentalRequest, ServiceError> {
        use crate::schema::rental_requests::dsl;

        let changes = UpdateRentalRequest {
            customer_id: request.customer_id,
            status: request.status.map(|s| s.as_str().to_string()),
            urgency: request.urgency.map(|u| u.as_str().to_string()),
            notes: request.notes,
            updated_at: Some(Utc::now()),
        };

        let mut conn = self.diesel_pool.get().await?;
        let lead = diesel::update(dsl::rental_requests.find(lead_id))
            .set(&changes)
            .get_result::<RentalRequest>(&mut conn)
            .await?;

        Ok(lead)
    }
}
