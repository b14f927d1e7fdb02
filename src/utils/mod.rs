pub mod service_error;
pub mod status;

pub use service_error::ServiceError;
