use serde::{Deserialize, Deserializer};

pub mod agreement;
pub mod auth;
pub mod customer;
pub mod job;
pub mod lead;
pub mod role;

// Re-export common types
pub use agreement::{AgreementStatus, NewRentalAgreement, RentalAgreement, SendAgreementRequest};
pub use auth::AccessTokenClaims;
pub use customer::{
    AccessibilityRequirements, CreateCustomerRequest, Customer, CustomerStatus,
    DeleteCustomersRequest, NewCustomer, UpdateCustomer, UpdateCustomerRequest,
    UpdateCustomersStatusRequest, UpsertAccessibilityRequest,
};
pub use job::{
    AddJobLocationRequest, AddJobNoteRequest, AddJobPaymentRequest, CreateJobRequest,
    InstallationDetails, Job, JobDetailResponse, JobLocation, JobNote, JobPayment, JobStatus,
    JobWithRelations, LocationType, NewJob, PaymentStatus, PaymentType, UpdateJob,
    UpdateJobRequest, UpsertInstallationDetailsRequest,
};
pub use lead::{
    CreateLeadRequest, LeadStatus, LeadUrgency, NewRentalRequest, RentalRequest,
    UpdateLeadRequest,
};
pub use role::{NewUserRole, Role, RoleChangeRequest, RoleName, UserRole};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in partial-update payloads, so nullable columns can be
/// cleared through the update endpoints.
pub(crate) fn double_option<'de, T, D>(
    deserializer: D,
) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
