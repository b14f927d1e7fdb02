// Derived status summaries for job detail views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::job::{Job, JobLocation, JobPayment, LocationType, PaymentStatus, PaymentType};

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorStatus {
    Success,
    Warning,
    Error,
    Default,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusIndicator {
    pub label: String,
    pub status: IndicatorStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

// ============================================================================
// DERIVATION
// ============================================================================

fn format_dollars(cents: i32) -> String {
    format!("${}.{:02}", cents / 100, (cents % 100).abs())
}

fn setup_fee_indicator(job: &Job, payments: &[JobPayment]) -> StatusIndicator {
    let label = "Setup Fee".to_string();

    if job.setup_fee_cents == 0 {
        return StatusIndicator {
            label,
            status: IndicatorStatus::Default,
            message: "No setup fee required".to_string(),
            date: None,
        };
    }

    let setup_payment = payments
        .iter()
        .find(|p| p.payment_type == PaymentType::Setup.as_str());

    match setup_payment {
        Some(p) if p.status == PaymentStatus::Paid.as_str() => StatusIndicator {
            label,
            status: IndicatorStatus::Success,
            message: "Payment received".to_string(),
            date: Some(p.created_at),
        },
        Some(p) if p.status == PaymentStatus::Pending.as_str() => StatusIndicator {
            label,
            status: IndicatorStatus::Warning,
            message: "Awaiting payment".to_string(),
            date: Some(p.created_at),
        },
        Some(p) if p.status == PaymentStatus::Failed.as_str() => StatusIndicator {
            label,
            status: IndicatorStatus::Error,
            message: "Payment failed".to_string(),
            date: Some(p.created_at),
        },
        _ => StatusIndicator {
            label,
            status: IndicatorStatus::Default,
            message: format!("{} - Not invoiced", format_dollars(job.setup_fee_cents)),
            date: None,
        },
    }
}

fn subscription_indicator(job: &Job) -> StatusIndicator {
    let label = "Monthly Rental".to_string();

    if job.monthly_rate_cents == 0 {
        return StatusIndicator {
            label,
            status: IndicatorStatus::Default,
            message: "No monthly rental fee".to_string(),
            date: None,
        };
    }

    if job.stripe_subscription_id.is_some() {
        return StatusIndicator {
            label,
            status: IndicatorStatus::Success,
            message: format!("{}/month - Active", format_dollars(job.monthly_rate_cents)),
            date: None,
        };
    }

    StatusIndicator {
        label,
        status: IndicatorStatus::Default,
        message: format!(
            "{}/month - Not started",
            format_dollars(job.monthly_rate_cents)
        ),
        date: None,
    }
}

fn visit_indicator(
    label: &str,
    location_type: LocationType,
    job_date: Option<DateTime<Utc>>,
    locations: &[JobLocation],
) -> StatusIndicator {
    let location = locations
        .iter()
        .find(|l| l.location_type == location_type.as_str());

    if let Some(completed) = location.and_then(|l| l.completed_date) {
        return StatusIndicator {
            label: label.to_string(),
            status: IndicatorStatus::Success,
            message: "Completed".to_string(),
            date: Some(completed),
        };
    }

    if let Some(scheduled) = job_date {
        return StatusIndicator {
            label: label.to_string(),
            status: IndicatorStatus::Warning,
            message: "Scheduled".to_string(),
            date: Some(scheduled),
        };
    }

    StatusIndicator {
        label: label.to_string(),
        status: IndicatorStatus::Default,
        message: "Not scheduled".to_string(),
        date: None,
    }
}

/// Builds the four summary indicators shown on a job detail page:
/// setup fee, monthly rental, installation and removal.
pub fn derive_status_overview(
    job: &Job,
    locations: &[JobLocation],
    payments: &[JobPayment],
) -> Vec<StatusIndicator> {
    vec![
        setup_fee_indicator(job, payments),
        subscription_indicator(job),
        visit_indicator(
            "Installation",
            LocationType::Installation,
            job.installation_date,
            locations,
        ),
        visit_indicator("Removal", LocationType::Removal, job.removal_date, locations),
    ]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_job() -> Job {
        Job {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            status: "active".to_string(),
            setup_fee_cents: 25_000,
            monthly_rate_cents: 15_000,
            installation_date: None,
            removal_date: None,
            setup_fee_payment_url: None,
            monthly_payment_url: None,
            stripe_subscription_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payment(job_id: Uuid, payment_type: &str, status: &str) -> JobPayment {
        JobPayment {
            id: Uuid::new_v4(),
            job_id,
            amount_cents: 25_000,
            payment_type: payment_type.to_string(),
            status: status.to_string(),
            stripe_invoice_id: Some("in_test".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn setup_fee_not_invoiced_shows_amount() {
        let job = sample_job();
        let indicator = setup_fee_indicator(&job, &[]);
        assert_eq!(indicator.status, IndicatorStatus::Default);
        assert_eq!(indicator.message, "$250.00 - Not invoiced");
    }

    #[test]
    fn setup_fee_zero_means_not_required() {
        let mut job = sample_job();
        job.setup_fee_cents = 0;
        let indicator = setup_fee_indicator(&job, &[]);
        assert_eq!(indicator.message, "No setup fee required");
    }

    #[test]
    fn paid_setup_payment_is_success() {
        let job = sample_job();
        let payments = vec![payment(job.id, "setup", "paid")];
        let indicator = setup_fee_indicator(&job, &payments);
        assert_eq!(indicator.status, IndicatorStatus::Success);
        assert_eq!(indicator.message, "Payment received");
        assert!(indicator.date.is_some());
    }

    #[test]
    fn pending_setup_payment_is_warning() {
        let job = sample_job();
        let payments = vec![payment(job.id, "setup", "pending")];
        let indicator = setup_fee_indicator(&job, &payments);
        assert_eq!(indicator.status, IndicatorStatus::Warning);
        assert_eq!(indicator.message, "Awaiting payment");
    }

    #[test]
    fn failed_setup_payment_is_error() {
        let job = sample_job();
        let payments = vec![payment(job.id, "setup", "failed")];
        let indicator = setup_fee_indicator(&job, &payments);
        assert_eq!(indicator.status, IndicatorStatus::Error);
    }

    #[test]
    fn monthly_payment_does_not_affect_setup_indicator() {
        let job = sample_job();
        let payments = vec![payment(job.id, "monthly", "paid")];
        let indicator = setup_fee_indicator(&job, &payments);
        assert_eq!(indicator.status, IndicatorStatus::Default);
    }

    #[test]
    fn subscription_active_when_id_present() {
        let mut job = sample_job();
        job.stripe_subscription_id = Some("sub_123".to_string());
        let indicator = subscription_indicator(&job);
        assert_eq!(indicator.status, IndicatorStatus::Success);
        assert_eq!(indicator.message, "$150.00/month - Active");
    }

    #[test]
    fn installation_completed_beats_scheduled() {
        let mut job = sample_job();
        job.installation_date = Some(Utc::now());
        let locations = vec![JobLocation {
            id: Uuid::new_v4(),
            job_id: job.id,
            location_type: "installation".to_string(),
            scheduled_date: Some(Utc::now()),
            completed_date: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }];
        let indicator = visit_indicator(
            "Installation",
            LocationType::Installation,
            job.installation_date,
            &locations,
        );
        assert_eq!(indicator.status, IndicatorStatus::Success);
        assert_eq!(indicator.message, "Completed");
    }

    #[test]
    fn overview_returns_four_indicators() {
        let job = sample_job();
        let overview = derive_status_overview(&job, &[], &[]);
        assert_eq!(overview.len(), 4);
        assert_eq!(overview[0].label, "Setup Fee");
        assert_eq!(overview[1].label, "Monthly Rental");
        assert_eq!(overview[2].label, "Installation");
        assert_eq!(overview[3].label, "Removal");
    }
}
