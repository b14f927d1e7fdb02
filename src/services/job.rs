// Job lifecycle: CRUD, dependent rows, and the detail aggregation

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    models::{
        agreement::RentalAgreement,
        customer::Customer,
        job::{
            AddJobLocationRequest, AddJobNoteRequest, AddJobPaymentRequest, CreateJobRequest,
            InstallationDetails, Job, JobDetailResponse, JobLocation, JobNote, JobPayment,
            JobStatus, JobWithRelations, NewInstallationDetails, NewJob, NewJobLocation,
            NewJobNote, NewJobPayment, UpdateJob, UpdateJobRequest,
            UpsertInstallationDetailsRequest,
        },
    },
    utils::{status::derive_status_overview, ServiceError},
};

pub struct JobService {
    diesel_pool: DieselPool,
}

impl JobService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Listing and detail
    // ------------------------------------------------------------------

    /// Lists all jobs, newest first, each with its locations, payments
    /// and notes attached.
    pub async fn list_jobs(&self) -> Result<Vec<JobWithRelations>, ServiceError> {
        use crate::schema::{job_locations, job_notes, job_payments, jobs};

        let mut conn = self.diesel_pool.get().await?;

        let job_rows = jobs::table
            .order(jobs::created_at.desc())
            .load::<Job>(&mut conn)
            .await?;

        let job_ids: Vec<Uuid> = job_rows.iter().map(|j| j.id).collect();

        let locations = job_locations::table
            .filter(job_locations::job_id.eq_any(&job_ids))
            .load::<JobLocation>(&mut conn)
            .await?;
        let payments = job_payments::table
            .filter(job_payments::job_id.eq_any(&job_ids))
            .order(job_payments::created_at.desc())
            .load::<JobPayment>(&mut conn)
            .await?;
        let notes = job_notes::table
            .filter(job_notes::job_id.eq_any(&job_ids))
            .order(job_notes::created_at.desc())
            .load::<JobNote>(&mut conn)
            .await?;

        let result = job_rows
            .into_iter()
            .map(|job| {
                let job_id = job.id;
                let status_badge = job
                    .status
                    .parse::<JobStatus>()
                    .map(|s| s.badge_variant())
                    .unwrap_or("warning")
                    .to_string();
                JobWithRelations {
                    job,
                    status_badge,
                    locations: locations
                        .iter()
                        .filter(|l| l.job_id == job_id)
                        .cloned()
                        .collect(),
                    payments: payments
                        .iter()
                        .filter(|p| p.job_id == job_id)
                        .cloned()
                        .collect(),
                    notes: notes.iter().filter(|n| n.job_id == job_id).cloned().collect(),
                }
            })
            .collect();

        Ok(result)
    }

    pub async fn get_job(&self, job_id: Uuid) -> Result<Job, ServiceError> {
        use crate::schema::jobs::dsl;

        let mut conn = self.diesel_pool.get().await?;
        let job = dsl::jobs.find(job_id).first::<Job>(&mut conn).await?;
        Ok(job)
    }

    /// Full detail screen payload: the job, its customer, dependent rows,
    /// the optional installation survey and agreement, plus the derived
    /// status indicators.
    pub async fn get_job_detail(&self, job_id: Uuid) -> Result<JobDetailResponse, ServiceError> {
        use crate::schema::{
            customers, installation_details, job_locations, job_notes, job_payments, jobs,
            rental_agreements,
        };

        let mut conn = self.diesel_pool.get().await?;

        let job = jobs::table.find(job_id).first::<Job>(&mut conn).await?;
        let customer = customers::table
            .find(job.customer_id)
            .first::<Customer>(&mut conn)
            .await?;

        let locations = job_locations::table
            .filter(job_locations::job_id.eq(job_id))
            .load::<JobLocation>(&mut conn)
            .await?;
        let payments = job_payments::table
            .filter(job_payments::job_id.eq(job_id))
            .order(job_payments::created_at.desc())
            .load::<JobPayment>(&mut conn)
            .await?;
        let notes = job_notes::table
            .filter(job_notes::job_id.eq(job_id))
            .order(job_notes::created_at.desc())
            .load::<JobNote>(&mut conn)
            .await?;
        let installation = installation_details::table
            .filter(installation_details::job_id.eq(job_id))
            .first::<InstallationDetails>(&mut conn)
            .await
            .optional()?;
        let agreement = rental_agreements::table
            .filter(rental_agreements::job_id.eq(job_id))
            .first::<RentalAgreement>(&mut conn)
            .await
            .optional()?;

        let indicators = derive_status_overview(&job, &locations, &payments);

        Ok(JobDetailResponse {
            job,
            customer,
            locations,
            payments,
            notes,
            installation,
            agreement,
            indicators,
        })
    }

    // ------------------------------------------------------------------
    // CRUD
    // ------------------------------------------------------------------

    pub async fn create_job(&self, request: CreateJobRequest) -> Result<Job, ServiceError> {
        request.validate()?;

        use crate::schema::{customers, jobs};

        let mut conn = self.diesel_pool.get().await?;

        // Reject jobs for customers that do not exist
        customers::table
            .find(request.customer_id)
            .select(customers::id)
            .first::<Uuid>(&mut conn)
            .await?;

        let now = Utc::now();
        let new_job = NewJob {
            id: Uuid::new_v4(),
            customer_id: request.customer_id,
            status: JobStatus::Draft.as_str().to_string(),
            setup_fee_cents: request.setup_fee_cents,
            monthly_rate_cents: request.monthly_rate_cents,
            installation_date: request.installation_date,
            removal_date: request.removal_date,
            created_at: now,
            updated_at: now,
        };

        let job = diesel::insert_into(jobs::table)
            .values(&new_job)
            .get_result::<Job>(&mut conn)
            .await?;

        info!(job_id = %job.id, customer_id = %job.customer_id, "Job created");
        Ok(job)
    }

    pub async fn update_job(
        &self,
        job_id: Uuid,
        request: UpdateJobRequest,
    ) -> Result<Job, ServiceError> {
        request.validate()?;

        use crate::schema::jobs::dsl;

        let changes = UpdateJob {
            status: request.status.map(|s| s.as_str().to_string()),
            setup_fee_cents: request.setup_fee_cents,
            monthly_rate_cents: request.monthly_rate_cents,
            installation_date: request.installation_date,
            removal_date: request.removal_date,
            setup_fee_payment_url: None,
            monthly_payment_url: None,
            stripe_subscription_id: None,
            updated_at: Some(Utc::now()),
        };

        let mut conn = self.diesel_pool.get().await?;
        let job = diesel::update(dsl::jobs.find(job_id))
            .set(&changes)
            .get_result::<Job>(&mut conn)
            .await?;

        Ok(job)
    }

    /// Deletes jobs and their dependent rows, one table per statement in
    /// dependency order. Not transactional.
    pub async fn delete_jobs(&self, job_ids: &[Uuid]) -> Result<usize, ServiceError> {
        use crate::schema::{
            installation_details, job_locations, job_notes, job_payments, jobs, rental_agreements,
        };

        if job_ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.diesel_pool.get().await?;

        diesel::delete(job_locations::table.filter(job_locations::job_id.eq_any(job_ids)))
            .execute(&mut conn)
            .await?;
        diesel::delete(job_payments::table.filter(job_payments::job_id.eq_any(job_ids)))
            .execute(&mut conn)
            .await?;
        diesel::delete(job_notes::table.filter(job_notes::job_id.eq_any(job_ids)))
            .execute(&mut conn)
            .await?;
        diesel::delete(
            installation_details::table.filter(installation_details::job_id.eq_any(job_ids)),
        )
        .execute(&mut conn)
        .await?;
        diesel::delete(
            rental_agreements::table.filter(rental_agreements::job_id.eq_any(job_ids)),
        )
        .execute(&mut conn)
        .await?;

        let deleted = diesel::delete(jobs::table.filter(jobs::id.eq_any(job_ids)))
            .execute(&mut conn)
            .await?;

        info!(count = deleted, "Jobs deleted");
        Ok(deleted)
    }

    pub async fn update_jobs_status(
        &self,
        job_ids: &[Uuid],
        status: JobStatus,
    ) -> Result<usize, ServiceError> {
        use crate::schema::jobs::dsl;

        if job_ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.diesel_pool.get().await?;
        let updated = diesel::update(dsl::jobs.filter(dsl::id.eq_any(job_ids)))
            .set((
                dsl::status.eq(status.as_str()),
                dsl::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await?;

        Ok(updated)
    }

    // ------------------------------------------------------------------
    // Dependent rows
    // ------------------------------------------------------------------

    pub async fn add_note(
        &self,
        job_id: Uuid,
        author_id: Uuid,
        request: AddJobNoteRequest,
    ) -> Result<JobNote, ServiceError> {
        request.validate()?;

        use crate::schema::job_notes::dsl;

        self.get_job(job_id).await?;

        let now = Utc::now();
        let new_note = NewJobNote {
            id: Uuid::new_v4(),
            job_id,
            content: request.content,
            created_by: author_id,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.diesel_pool.get().await?;
        let note = diesel::insert_into(dsl::job_notes)
            .values(&new_note)
            .get_result::<JobNote>(&mut conn)
            .await?;

        Ok(note)
    }

    pub async fn add_location(
        &self,
        job_id: Uuid,
        request: AddJobLocationRequest,
    ) -> Result<JobLocation, ServiceError> {
        use crate::schema::job_locations::dsl;

        self.get_job(job_id).await?;

        let now = Utc::now();
        let new_location = NewJobLocation {
            id: Uuid::new_v4(),
            job_id,
            location_type: request.location_type.as_str().to_string(),
            scheduled_date: request.scheduled_date,
            completed_date: request.completed_date,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.diesel_pool.get().await?;
        let location = diesel::insert_into(dsl::job_locations)
            .values(&new_location)
            .get_result::<JobLocation>(&mut conn)
            .await?;

        Ok(location)
    }

    /// Manual ledger entry, used when a payment arrives outside the
    /// webhook path (check, cash).
    pub async fn add_payment(
        &self,
        job_id: Uuid,
        request: AddJobPaymentRequest,
    ) -> Result<JobPayment, ServiceError> {
        request.validate()?;

        use crate::schema::job_payments::dsl;

        self.get_job(job_id).await?;

        let new_payment = NewJobPayment {
            id: Uuid::new_v4(),
            job_id,
            amount_cents: request.amount_cents,
            payment_type: request.payment_type.as_str().to_string(),
            status: request.status.as_str().to_string(),
            stripe_invoice_id: request.stripe_invoice_id,
            created_at: Utc::now(),
        };

        let mut conn = self.diesel_pool.get().await?;
        let payment = diesel::insert_into(dsl::job_payments)
            .values(&new_payment)
            .get_result::<JobPayment>(&mut conn)
            .await?;

        Ok(payment)
    }

    /// One installation survey per job; resubmission replaces it.
    pub async fn upsert_installation_details(
        &self,
        job_id: Uuid,
        request: UpsertInstallationDetailsRequest,
    ) -> Result<InstallationDetails, ServiceError> {
        use crate::schema::installation_details::dsl;

        self.get_job(job_id).await?;

        let now = Utc::now();
        let to_nullable = |items: Option<Vec<String>>| {
            items.map(|v| v.into_iter().map(Some).collect::<Vec<_>>())
        };

        let new_details = NewInstallationDetails {
            id: Uuid::new_v4(),
            job_id,
            installed_by: to_nullable(request.installed_by),
            equipment_used: to_nullable(request.equipment_used),
            installation_start: request.installation_start,
            installation_end: request.installation_end,
            actual_length: request.actual_length,
            actual_rise: request.actual_rise,
            number_of_sections: request.number_of_sections,
            surface_stable: request.surface_stable,
            proper_slope: request.proper_slope,
            handrails_secure: request.handrails_secure,
            platform_secure: request.platform_secure,
            modifications_required: request.modifications_required,
            modification_details: request.modification_details,
            photos: request.photos,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.diesel_pool.get().await?;
        let details = diesel::insert_into(dsl::installation_details)
            .values(&new_details)
            .on_conflict(dsl::job_id)
            .do_update()
            .set((
                dsl::installed_by.eq(&new_details.installed_by),
                dsl::equipment_used.eq(&new_details.equipment_used),
                dsl::installation_start.eq(new_details.installation_start),
                dsl::installation_end.eq(new_details.installation_end),
                dsl::actual_length.eq(new_details.actual_length),
                dsl::actual_rise.eq(new_details.actual_rise),
                dsl::number_of_sections.eq(new_details.number_of_sections),
                dsl::surface_stable.eq(new_details.surface_stable),
                dsl::proper_slope.eq(new_details.proper_slope),
                dsl::handrails_secure.eq(new_details.handrails_secure),
                dsl::platform_secure.eq(new_details.platform_secure),
                dsl::modifications_required.eq(new_details.modifications_required),
                dsl::modification_details.eq(&new_details.modification_details),
                dsl::photos.eq(&new_details.photos),
                dsl::updated_at.eq(now),
            ))
            .get_result::<InstallationDetails>(&mut conn)
            .await?;

        Ok(details)
    }
}
