// Invoicing workflow and Stripe webhook application
//
// The invoice flow is a sequence of remote calls with database writes in
// between. There is no compensation: if a later step fails, earlier
// remote objects stay as they are and the operator retries from the UI.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    app::AppState,
    db::DieselPool,
    models::{
        customer::Customer,
        job::{Job, JobStatus, NewJobPayment, PaymentStatus, PaymentType},
    },
    services::stripe::{StripeClient, StripeInvoice, WebhookEvent},
    utils::ServiceError,
};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CreateJobInvoiceResponse {
    pub setup_fee_invoice_url: Option<String>,
    pub monthly_invoice_url: Option<String>,
    pub subscription_id: Option<String>,
}

pub struct BillingService {
    diesel_pool: DieselPool,
    stripe: Arc<StripeClient>,
}

impl BillingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
            stripe: state.stripe.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Invoice workflow
    // ------------------------------------------------------------------

    /// Invoices a job: a one-off setup fee invoice when the job carries a
    /// setup fee, and a monthly subscription when it carries a monthly
    /// rate. Both are emailed to the customer with a 30 day due window,
    /// and the job is moved to `quoted` with the hosted payment URLs.
    pub async fn create_job_invoice(
        &self,
        job_id: Uuid,
    ) -> Result<CreateJobInvoiceResponse, ServiceError> {
        let (job, customer) = self.load_job_with_customer(job_id).await?;

        let customer_name = format!("{} {}", customer.first_name, customer.last_name);
        let address = customer.installation_address.as_deref();

        // Find or create the remote customer by email
        let stripe_customer = match self
            .stripe
            .search_customer_by_email(&customer.email)
            .await?
        {
            Some(existing) => existing,
            None => {
                let created = self
                    .stripe
                    .create_customer(
                        &customer.email,
                        &customer_name,
                        Some(&customer.phone),
                        address,
                        customer.id,
                    )
                    .await?;
                info!(stripe_customer_id = %created.id, "Stripe customer created");
                created
            },
        };

        let product = self.stripe.create_job_product(job.id).await?;

        let mut setup_fee_invoice_url = None;
        let mut monthly_invoice_url = None;
        let mut subscription_id = None;

        if job.setup_fee_cents > 0 {
            let invoice = self
                .invoice_setup_fee(&job, &customer, &customer_name, &stripe_customer.id)
                .await?;
            setup_fee_invoice_url = invoice.hosted_invoice_url.clone();

            self.write_setup_invoice_to_job(job.id, setup_fee_invoice_url.as_deref())
                .await?;
        }

        if job.monthly_rate_cents > 0 {
            let (invoice, sub_id) = self
                .start_monthly_subscription(
                    &job,
                    &customer,
                    &customer_name,
                    &stripe_customer.id,
                    &product.id,
                )
                .await?;
            monthly_invoice_url = invoice.hosted_invoice_url.clone();

            self.write_subscription_to_job(job.id, &sub_id, monthly_invoice_url.as_deref())
                .await?;
            subscription_id = Some(sub_id);
        }

        Ok(CreateJobInvoiceResponse {
            setup_fee_invoice_url,
            monthly_invoice_url,
            subscription_id,
        })
    }

    async fn invoice_setup_fee(
        &self,
        job: &Job,
        customer: &Customer,
        customer_name: &str,
        stripe_customer_id: &str,
    ) -> Result<StripeInvoice, ServiceError> {
        let address = customer.installation_address.as_deref();
        let description = format!("Setup Fee for Ramp Installation - Job #{}", job.id);
        let footer = format!("Thank you for your business, {}!", customer.first_name);

        let draft = self
            .stripe
            .create_draft_invoice(
                stripe_customer_id,
                job.id,
                PaymentType::Setup.as_str(),
                customer_name,
                &customer.email,
                address,
                &description,
                &footer,
            )
            .await?;

        let item_description = format!(
            "Ramp Installation Setup Fee - Job #{}\nCustomer: {}\nAddress: {}",
            job.id,
            customer_name,
            address.unwrap_or("Not provided")
        );
        self.stripe
            .create_invoice_item(
                stripe_customer_id,
                &draft.id,
                job.setup_fee_cents,
                &item_description,
            )
            .await?;

        // Verify the line item actually landed before finalizing
        let with_item = self.stripe.retrieve_invoice(&draft.id).await?;
        if with_item.amount_due == 0 {
            error!(invoice_id = %draft.id, "Setup fee invoice has zero amount");
            return Err(ServiceError::ExternalApi(
                "Setup fee invoice amount is zero".to_string(),
            ));
        }

        self.stripe.finalize_invoice(&draft.id).await?;
        let finalized = self.stripe.retrieve_invoice(&draft.id).await?;
        self.stripe.send_invoice(&draft.id).await?;

        info!(
            invoice_id = %finalized.id,
            amount_due = finalized.amount_due,
            "Setup fee invoice sent"
        );
        Ok(finalized)
    }

    async fn start_monthly_subscription(
        &self,
        job: &Job,
        customer: &Customer,
        customer_name: &str,
        stripe_customer_id: &str,
        product_id: &str,
    ) -> Result<(StripeInvoice, String), ServiceError> {
        let price = self
            .stripe
            .create_monthly_price(product_id, job.monthly_rate_cents)
            .await?;

        let subscription = self
            .stripe
            .create_subscription(stripe_customer_id, &price.id, job.id)
            .await?;

        let invoice_id = subscription.latest_invoice.clone().ok_or_else(|| {
            ServiceError::ExternalApi("Subscription has no initial invoice".to_string())
        })?;

        let description = format!("Monthly Ramp Rental Fee - Job #{}", job.id);
        let footer = format!(
            "Thank you for your business, {}!\nYour monthly rental period begins today.",
            customer.first_name
        );

        // Metadata must land before finalization or the webhook receiver
        // cannot route the invoice back to the job
        self.stripe
            .annotate_invoice(
                &invoice_id,
                job.id,
                PaymentType::Monthly.as_str(),
                customer_name,
                &customer.email,
                customer.installation_address.as_deref(),
                &description,
                &footer,
            )
            .await?;

        self.stripe.finalize_invoice(&invoice_id).await?;
        let finalized = self.stripe.retrieve_invoice(&invoice_id).await?;
        self.stripe.send_invoice(&invoice_id).await?;

        info!(
            invoice_id = %finalized.id,
            subscription_id = %subscription.id,
            "Monthly invoice sent"
        );
        Ok((finalized, subscription.id))
    }

    async fn write_setup_invoice_to_job(
        &self,
        job_id: Uuid,
        url: Option<&str>,
    ) -> Result<(), ServiceError> {
        use crate::schema::jobs::dsl;

        let mut conn = self.diesel_pool.get().await?;
        diesel::update(dsl::jobs.find(job_id))
            .set((
                dsl::setup_fee_payment_url.eq(url),
                dsl::status.eq(JobStatus::Quoted.as_str()),
                dsl::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn write_subscription_to_job(
        &self,
        job_id: Uuid,
        subscription_id: &str,
        url: Option<&str>,
    ) -> Result<(), ServiceError> {
        use crate::schema::jobs::dsl;

        let mut conn = self.diesel_pool.get().await?;
        diesel::update(dsl::jobs.find(job_id))
            .set((
                dsl::stripe_subscription_id.eq(subscription_id),
                dsl::monthly_payment_url.eq(url),
                dsl::status.eq(JobStatus::Quoted.as_str()),
                dsl::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Subscription cancellation
    // ------------------------------------------------------------------

    pub async fn cancel_job_subscription(&self, job_id: Uuid) -> Result<(), ServiceError> {
        let (job, _) = self.load_job_with_customer(job_id).await?;

        let subscription_id = job.stripe_subscription_id.as_deref().ok_or_else(|| {
            ServiceError::BadRequest("Job has no active subscription".to_string())
        })?;

        self.stripe.cancel_subscription(subscription_id).await?;
        self.set_job_status(job_id, JobStatus::Cancelled).await?;

        info!(job_id = %job_id, subscription_id = %subscription_id, "Subscription cancelled");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Webhook application
    // ------------------------------------------------------------------

    /// Applies a verified Stripe event to the database. Events without a
    /// `job_id` in their metadata are logged and acknowledged.
    pub async fn apply_webhook_event(&self, event: WebhookEvent) -> Result<(), ServiceError> {
        match event {
            WebhookEvent::InvoiceCreated(invoice) => {
                let Some(job_id) = Self::job_id_from_metadata(&invoice.metadata) else {
                    warn!(invoice_id = %invoice.id, "Invoice created without job_id metadata");
                    return Ok(());
                };
                self.insert_payment_row(
                    job_id,
                    &invoice,
                    invoice.amount_due,
                    PaymentStatus::Pending,
                )
                .await
            },
            WebhookEvent::InvoicePaid(invoice) => {
                let Some(job_id) = Self::job_id_from_metadata(&invoice.metadata) else {
                    warn!(invoice_id = %invoice.id, "Invoice paid without job_id metadata");
                    return Ok(());
                };
                self.insert_payment_row(job_id, &invoice, invoice.amount_paid, PaymentStatus::Paid)
                    .await?;

                // Only the one-off setup fee moves the job forward;
                // recurring payments leave the status alone
                if invoice.metadata.get("type").map(String::as_str)
                    == Some(PaymentType::Setup.as_str())
                {
                    self.set_job_status(job_id, JobStatus::Paid).await?;
                    info!(job_id = %job_id, "Job marked paid after setup invoice");
                }
                Ok(())
            },
            WebhookEvent::InvoicePaymentFailed(invoice) => {
                let Some(job_id) = Self::job_id_from_metadata(&invoice.metadata) else {
                    warn!(invoice_id = %invoice.id, "Failed invoice without job_id metadata");
                    return Ok(());
                };
                self.insert_payment_row(
                    job_id,
                    &invoice,
                    invoice.amount_due,
                    PaymentStatus::Failed,
                )
                .await
            },
            WebhookEvent::SubscriptionDeleted(subscription) => {
                let Some(job_id) = Self::job_id_from_metadata(&subscription.metadata) else {
                    warn!(
                        subscription_id = %subscription.id,
                        "Subscription deleted without job_id metadata"
                    );
                    return Ok(());
                };
                self.set_job_status(job_id, JobStatus::Cancelled).await?;
                info!(job_id = %job_id, "Job cancelled after subscription deletion");
                Ok(())
            },
            WebhookEvent::InvoiceFinalized(invoice) => {
                info!(invoice_id = %invoice.id, "Invoice finalized");
                Ok(())
            },
            WebhookEvent::InvoiceSent(invoice) => {
                info!(
                    invoice_id = %invoice.id,
                    email = ?invoice.customer_email,
                    "Invoice emailed"
                );
                Ok(())
            },
            WebhookEvent::InvoiceUpdated(invoice) => {
                info!(invoice_id = %invoice.id, status = ?invoice.status, "Invoice updated");
                Ok(())
            },
            WebhookEvent::Unhandled(event_type) => {
                info!(event_type = %event_type, "Ignoring unhandled Stripe event");
                Ok(())
            },
        }
    }

    fn job_id_from_metadata(
        metadata: &std::collections::HashMap<String, String>,
    ) -> Option<Uuid> {
        metadata.get("job_id").and_then(|id| id.parse().ok())
    }

    async fn insert_payment_row(
        &self,
        job_id: Uuid,
        invoice: &StripeInvoice,
        amount_cents: i64,
        status: PaymentStatus,
    ) -> Result<(), ServiceError> {
        use crate::schema::job_payments::dsl;

        let payment_type = invoice
            .metadata
            .get("type")
            .cloned()
            .unwrap_or_else(|| PaymentType::Setup.as_str().to_string());

        let amount_cents = i32::try_from(amount_cents).map_err(|_| {
            ServiceError::BadRequest(format!(
                "Invoice amount {} cents is outside the supported range",
                amount_cents
            ))
        })?;

        let new_payment = NewJobPayment {
            id: Uuid::new_v4(),
            job_id,
            amount_cents,
            payment_type,
            status: status.as_str().to_string(),
            stripe_invoice_id: Some(invoice.id.clone()),
            created_at: Utc::now(),
        };

        let mut conn = self.diesel_pool.get().await?;
        diesel::insert_into(dsl::job_payments)
            .values(&new_payment)
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn set_job_status(&self, job_id: Uuid, status: JobStatus) -> Result<(), ServiceError> {
        use crate::schema::jobs::dsl;

        let mut conn = self.diesel_pool.get().await?;
        diesel::update(dsl::jobs.find(job_id))
            .set((
                dsl::status.eq(status.as_str()),
                dsl::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn load_job_with_customer(
        &self,
        job_id: Uuid,
    ) -> Result<(Job, Customer), ServiceError> {
        use crate::schema::{customers, jobs};

        let mut conn = self.diesel_pool.get().await?;
        let job = jobs::table.find(job_id).first::<Job>(&mut conn).await?;
        let customer = customers::table
            .find(job.customer_id)
            .first::<Customer>(&mut conn)
            .await?;
        Ok((job, customer))
    }
}
