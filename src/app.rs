// Application state and configuration
use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    db::DieselPool,
    services::{EsignClient, JwtService, StripeClient},
};

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub diesel_pool: DieselPool,
    pub jwt_service: Arc<JwtService>,
    pub stripe: Arc<StripeClient>,
    pub esignatures: Arc<EsignClient>,
    pub max_connections: u32,
}
