pub mod agreement;
pub mod billing;
pub mod customer;
pub mod esignatures;
pub mod job;
pub mod jwt;
pub mod lead;
pub mod roles;
pub mod stripe;

pub use agreement::AgreementService;
pub use billing::BillingService;
pub use customer::CustomerService;
pub use esignatures::EsignClient;
pub use job::JobService;
pub use jwt::JwtService;
pub use lead::LeadService;
pub use roles::RoleService;
pub use stripe::StripeClient;
