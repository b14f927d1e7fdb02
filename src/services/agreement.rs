// Rental agreement sending and e-signature webhook application

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    models::agreement::{
        AgreementStatus, NewRentalAgreement, RentalAgreement, SendAgreementRequest,
    },
    services::esignatures::{EsignClient, EsignWebhookPayload, PlaceholderField},
    utils::ServiceError,
};

pub struct AgreementService {
    diesel_pool: DieselPool,
    esignatures: Arc<EsignClient>,
}

impl AgreementService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
            esignatures: state.esignatures.clone(),
        }
    }

    /// Creates a contract for the job and stores it as the job's current
    /// agreement. Re-sending replaces the previous agreement row.
    pub async fn send_agreement(
        &self,
        job_id: Uuid,
        request: SendAgreementRequest,
    ) -> Result<RentalAgreement, ServiceError> {
        request.validate()?;

        use crate::schema::{customers, jobs, rental_agreements};

        let mut conn = self.diesel_pool.get().await?;
        let job = jobs::table
            .find(job_id)
            .first::<crate::models::job::Job>(&mut conn)
            .await?;
        let customer = customers::table
            .find(job.customer_id)
            .first::<crate::models::customer::Customer>(&mut conn)
            .await?;
        drop(conn);

        let placeholders = vec![
            PlaceholderField {
                api_key: "customer_name".to_string(),
                value: request.name.clone(),
            },
            PlaceholderField {
                api_key: "job_id".to_string(),
                value: job.id.to_string(),
            },
            PlaceholderField {
                api_key: "setup_fee".to_string(),
                value: format!("${}.{:02}", job.setup_fee_cents / 100, job.setup_fee_cents % 100),
            },
            PlaceholderField {
                api_key: "monthly_rate".to_string(),
                value: format!(
                    "${}.{:02}",
                    job.monthly_rate_cents / 100,
                    job.monthly_rate_cents % 100
                ),
            },
            PlaceholderField {
                api_key: "installation_address".to_string(),
                value: customer
                    .installation_address
                    .unwrap_or_else(|| "Not provided".to_string()),
            },
        ];

        let contract = self
            .esignatures
            .create_agreement_contract(
                job_id,
                &request.name,
                &request.email,
                request.phone.as_deref(),
                placeholders,
            )
            .await?;

        let now = Utc::now();
        let new_agreement = NewRentalAgreement {
            id: Uuid::new_v4(),
            job_id,
            contract_id: contract.contract_id,
            status: AgreementStatus::Sent.as_str().to_string(),
            sign_page_url: contract.sign_page_url,
            sent_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.diesel_pool.get().await?;
        let agreement = diesel::insert_into(rental_agreements::table)
            .values(&new_agreement)
            .on_conflict(rental_agreements::job_id)
            .do_update()
            .set((
                rental_agreements::contract_id.eq(&new_agreement.contract_id),
                rental_agreements::status.eq(&new_agreement.status),
                rental_agreements::sign_page_url.eq(&new_agreement.sign_page_url),
                rental_agreements::sent_at.eq(new_agreement.sent_at),
                rental_agreements::viewed_at.eq(None::<chrono::DateTime<Utc>>),
                rental_agreements::signed_at.eq(None::<chrono::DateTime<Utc>>),
                rental_agreements::updated_at.eq(now),
            ))
            .get_result::<RentalAgreement>(&mut conn)
            .await?;

        info!(job_id = %job_id, contract_id = %agreement.contract_id, "Agreement sent");
        Ok(agreement)
    }

    /// Applies a webhook notification from the e-signature provider.
    /// Unknown contract ids and unknown statuses are logged and accepted.
    pub async fn apply_webhook(&self, payload: EsignWebhookPayload) -> Result<(), ServiceError> {
        use crate::schema::rental_agreements::dsl;

        if payload.status == "error" {
            error!(
                message = ?payload.data.error_message,
                "eSignatures reported a contract error"
            );
            return Ok(());
        }

        let Some(contract) = payload.data.contract else {
            warn!(status = %payload.status, "eSignatures webhook without contract");
            return Ok(());
        };

        let now = Utc::now();
        let mut conn = self.diesel_pool.get().await?;

        let updated = match payload.status.as_str() {
            "signer-viewed-the-contract" => {
                diesel::update(dsl::rental_agreements.filter(dsl::contract_id.eq(&contract.id)))
                    .set((
                        dsl::status.eq(AgreementStatus::Viewed.as_str()),
                        dsl::viewed_at.eq(now),
                        dsl::updated_at.eq(now),
                    ))
                    .execute(&mut conn)
                    .await?
            },
            "signer-signed" => {
                diesel::update(dsl::rental_agreements.filter(dsl::contract_id.eq(&contract.id)))
                    .set((
                        dsl::status.eq(AgreementStatus::Signed.as_str()),
                        dsl::signed_at.eq(now),
                        dsl::updated_at.eq(now),
                    ))
                    .execute(&mut conn)
                    .await?
            },
            "contract-withdrawn" => {
                diesel::update(dsl::rental_agreements.filter(dsl::contract_id.eq(&contract.id)))
                    .set((
                        dsl::status.eq(AgreementStatus::Withdrawn.as_str()),
                        dsl::updated_at.eq(now),
                    ))
                    .execute(&mut conn)
                    .await?
            },
            other => {
                info!(status = %other, "Ignoring unhandled eSignatures event");
                return Ok(());
            },
        };

        if updated == 0 {
            warn!(contract_id = %contract.id, "Webhook for unknown contract");
        }

        Ok(())
    }
}
