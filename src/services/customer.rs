// Customer records and accessibility surveys

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    models::customer::{
        AccessibilityRequirements, CreateCustomerRequest, Customer, CustomerStatus,
        NewAccessibilityRequirements, NewCustomer, UpdateCustomer, UpdateCustomerRequest,
        UpsertAccessibilityRequest,
    },
    services::job::JobService,
    utils::ServiceError,
};

/// Result cap for the typeahead search endpoint.
const SEARCH_RESULT_LIMIT: i64 = 5;

pub struct CustomerService {
    diesel_pool: DieselPool,
    job_service: JobService,
}

impl CustomerService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
            job_service: JobService::new(state),
        }
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, ServiceError> {
        use crate::schema::customers::dsl;

        let mut conn = self.diesel_pool.get().await?;
        let rows = dsl::customers
            .order(dsl::created_at.desc())
            .load::<Customer>(&mut conn)
            .await?;
        Ok(rows)
    }

    /// Typeahead search over first name, last name and email.
    pub async fn search_customers(&self, term: &str) -> Result<Vec<Customer>, ServiceError> {
        use crate::schema::customers::dsl;

        let pattern = format!("%{}%", term);
        let mut conn = self.diesel_pool.get().await?;

        let rows = dsl::customers
            .filter(
                dsl::first_name
                    .ilike(pattern.clone())
                    .or(dsl::last_name.ilike(pattern.clone()))
                    .or(dsl::email.ilike(pattern)),
            )
            .order(dsl::created_at.desc())
            .limit(SEARCH_RESULT_LIMIT)
            .load::<Customer>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn get_customer(&self, customer_id: Uuid) -> Result<Customer, ServiceError> {
        use crate::schema::customers::dsl;

        let mut conn = self.diesel_pool.get().await?;
        let customer = dsl::customers
            .find(customer_id)
            .first::<Customer>(&mut conn)
            .await?;
        Ok(customer)
    }

    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, ServiceError> {
        request.validate()?;

        use crate::schema::customers::dsl;

        let now = Utc::now();
        let new_customer = NewCustomer {
            id: Uuid::new_v4(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            installation_address: request.installation_address,
            city: request.city,
            state: request.state,
            zip_code: request.zip_code,
            status: request.status.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.diesel_pool.get().await?;
        let customer = diesel::insert_into(dsl::customers)
            .values(&new_customer)
            .get_result::<Customer>(&mut conn)
            .await?;

        info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        request: UpdateCustomerRequest,
    ) -> Result<Customer, ServiceError> {
        request.validate()?;

        use crate::schema::customers::dsl;

        let changes = UpdateCustomer {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            installation_address: request.installation_address.map(Some),
            city: request.city.map(Some),
            state: request.state.map(Some),
            zip_code: request.zip_code.map(Some),
            status: request.status.map(|s| s.as_str().to_string()),
            updated_at: Some(Utc::now()),
        };

        let mut conn = self.diesel_pool.get().await?;
        let customer = diesel::update(dsl::customers.find(customer_id))
            .set(&changes)
            .get_result::<Customer>(&mut conn)
            .await?;

        Ok(customer)
    }

    /// Deletes customers and everything hanging off them. Each table is
    /// cleared with a separate statement in dependency order; a failure
    /// partway leaves earlier deletions in place.
    pub async fn delete_customers(&self, customer_ids: &[Uuid]) -> Result<usize, ServiceError> {
        use crate::schema::{
            customer_accessibility_requirements, customers, jobs, rental_requests,
        };

        if customer_ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.diesel_pool.get().await?;

        let job_ids: Vec<Uuid> = jobs::table
            .filter(jobs::customer_id.eq_any(customer_ids))
            .select(jobs::id)
            .load::<Uuid>(&mut conn)
            .await?;
        drop(conn);

        self.job_service.delete_jobs(&job_ids).await?;

        let mut conn = self.diesel_pool.get().await?;

        diesel::delete(
            rental_requests::table.filter(rental_requests::customer_id.eq_any(
                customer_ids.iter().map(|id| Some(*id)).collect::<Vec<_>>(),
            )),
        )
        .execute(&mut conn)
        .await?;

        diesel::delete(
            customer_accessibility_requirements::table
                .filter(customer_accessibility_requirements::customer_id.eq_any(customer_ids)),
        )
        .execute(&mut conn)
        .await?;

        let deleted = diesel::delete(customers::table.filter(customers::id.eq_any(customer_ids)))
            .execute(&mut conn)
            .await?;

        info!(count = deleted, "Customers deleted");
        Ok(deleted)
    }

    pub async fn update_customers_status(
        &self,
        customer_ids: &[Uuid],
        status: CustomerStatus,
    ) -> Result<usize, ServiceError> {
        use crate::schema::customers::dsl;

        if customer_ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.diesel_pool.get().await?;
        let updated = diesel::update(dsl::customers.filter(dsl::id.eq_any(customer_ids)))
            .set((
                dsl::status.eq(status.as_str()),
                dsl::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await?;

        Ok(updated)
    }

    // ------------------------------------------------------------------
    // Accessibility survey
    // ------------------------------------------------------------------

    pub async fn get_accessibility(
        &self,
        customer_id: Uuid,
    ) -> Result<AccessibilityRequirements, ServiceError> {
        use crate::schema::customer_accessibility_requirements::dsl;

        let mut conn = self.diesel_pool.get().await?;
        let survey = dsl::customer_accessibility_requirements
            .filter(dsl::customer_id.eq(customer_id))
            .first::<AccessibilityRequirements>(&mut conn)
            .await?;
        Ok(survey)
    }

    /// One survey per customer; a second submission replaces the first.
    pub async fn upsert_accessibility(
        &self,
        customer_id: Uuid,
        request: UpsertAccessibilityRequest,
    ) -> Result<AccessibilityRequirements, ServiceError> {
        request.validate()?;

        use crate::schema::customer_accessibility_requirements::dsl;

        // Ensure the customer exists before attaching a survey
        self.get_customer(customer_id).await?;

        let now = Utc::now();
        let special_requirements = request
            .special_requirements
            .map(|items| items.into_iter().map(Some).collect::<Vec<_>>());

        let new_survey = NewAccessibilityRequirements {
            id: Uuid::new_v4(),
            customer_id,
            mobility_device: request.mobility_device.clone(),
            device_width: request.device_width,
            device_length: request.device_length,
            device_turning_radius: request.device_turning_radius,
            user_weight: request.user_weight,
            assistance_required: request.assistance_required,
            emergency_contact_name: request.emergency_contact_name.clone(),
            emergency_contact_phone: request.emergency_contact_phone.clone(),
            emergency_contact_relationship: request.emergency_contact_relationship.clone(),
            special_requirements: special_requirements.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.diesel_pool.get().await?;
        let survey = diesel::insert_into(dsl::customer_accessibility_requirements)
            .values(&new_survey)
            .on_conflict(dsl::customer_id)
            .do_update()
            .set((
                dsl::mobility_device.eq(&new_survey.mobility_device),
                dsl::device_width.eq(new_survey.device_width),
                dsl::device_length.eq(new_survey.device_length),
                dsl::device_turning_radius.eq(new_survey.device_turning_radius),
                dsl::user_weight.eq(new_survey.user_weight),
                dsl::assistance_required.eq(new_survey.assistance_required),
                dsl::emergency_contact_name.eq(&new_survey.emergency_contact_name),
                dsl::emergency_contact_phone.eq(&new_survey.emergency_contact_phone),
                dsl::emergency_contact_relationship
                    .eq(&new_survey.emergency_contact_relationship),
                dsl::special_requirements.eq(&new_survey.special_requirements),
                dsl::updated_at.eq(now),
            ))
            .get_result::<AccessibilityRequirements>(&mut conn)
            .await?;

        Ok(survey)
    }
}
