// Centralized configuration management for RampDesk Backend
// Load ALL env vars ONCE at startup

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Global application configuration loaded once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    // For tests, load .env file first
    #[cfg(test)]
    dotenv::dotenv().ok();

    AppConfig::from_env().expect("Failed to load configuration")
});

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Server
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_connect_timeout: u64,
    pub database_idle_timeout: u64,
    pub database_max_lifetime: u64,

    // JWT
    pub jwt: JwtConfig,

    // Stripe
    pub stripe: StripeConfig,

    // eSignatures
    pub esignatures: EsignConfig,

    // Security
    pub cors_allowed_origins: Vec<String>,

    // Features
    pub enable_swagger_ui: bool,
    pub disable_embedded_migrations: bool,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub audience: String,
    pub issuer: String,
}

/// Stripe API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub api_base_url: String,
}

/// eSignatures API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsignConfig {
    pub api_token: String,
    pub api_base_url: String,
    pub agreement_template_id: String,
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Helper function to get required env var
        let get_required = |key: &str| -> Result<String, ConfigError> {
            env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))
        };

        // Helper function to get optional env var with default
        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        // Helper function to parse env var with default
        let parse_or_default = |key: &str, default: &str| -> Result<u32, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u32".to_string())
            })
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        let parse_bool_or_default = |key: &str, default: &str| -> bool {
            get_or_default(key, default).to_lowercase() == "true"
        };

        // Parse bind address to extract port
        let bind_address = get_or_default("BIND_ADDRESS", "0.0.0.0:8080");
        let port = bind_address
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let environment = Environment::from(get_or_default("ENVIRONMENT", "development"));

        // JWT secret validation
        let jwt_access_secret = get_required("JWT_ACCESS_SECRET")?;
        if jwt_access_secret.len() < 32 {
            return Err(ConfigError::InvalidValue(
                "JWT_ACCESS_SECRET".to_string(),
                "Secret must be at least 32 characters long".to_string(),
            ));
        }

        let database_url = get_required("DATABASE_URL")?;
        let database_max_connections = parse_or_default("DATABASE_MAX_CONNECTIONS", "50")?;
        let database_min_connections = parse_or_default("DATABASE_MIN_CONNECTIONS", "5")?;
        let database_connect_timeout = parse_u64_or_default("DATABASE_CONNECT_TIMEOUT", "30")?;
        let database_idle_timeout = parse_u64_or_default("DATABASE_IDLE_TIMEOUT", "600")?;
        let database_max_lifetime = parse_u64_or_default("DATABASE_MAX_LIFETIME", "1800")?;

        let jwt_audience = get_or_default("JWT_AUDIENCE", "rampdesk");
        let jwt_issuer = get_or_default("JWT_ISSUER", "rampdesk");

        // Stripe keys are required: invoicing and the webhook receiver
        // cannot function without them
        let stripe_secret_key = get_required("STRIPE_SECRET_KEY")?;
        let stripe_webhook_secret = get_required("STRIPE_WEBHOOK_SECRET")?;
        let stripe_api_base_url =
            get_or_default("STRIPE_API_BASE_URL", "https://api.stripe.com/v1");

        let esignatures_api_token = get_required("ESIGNATURES_API_TOKEN")?;
        let esignatures_api_base_url =
            get_or_default("ESIGNATURES_API_BASE_URL", "https://esignatures.com/api");
        let esignatures_template_id = get_or_default("ESIGNATURES_AGREEMENT_TEMPLATE_ID", "");

        let cors_allowed_origins: Vec<String> = get_or_default("CORS_ALLOWED_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let enable_swagger_ui = parse_bool_or_default("ENABLE_SWAGGER_UI", "true");
        let disable_embedded_migrations =
            parse_bool_or_default("DISABLE_EMBEDDED_MIGRATIONS", "false");

        Ok(Self {
            bind_address,
            port,
            environment,
            database_url,
            database_max_connections,
            database_min_connections,
            database_connect_timeout,
            database_idle_timeout,
            database_max_lifetime,
            jwt: JwtConfig {
                access_secret: jwt_access_secret,
                audience: jwt_audience,
                issuer: jwt_issuer,
            },
            stripe: StripeConfig {
                secret_key: stripe_secret_key,
                webhook_secret: stripe_webhook_secret,
                api_base_url: stripe_api_base_url,
            },
            esignatures: EsignConfig {
                api_token: esignatures_api_token,
                api_base_url: esignatures_api_base_url,
                agreement_template_id: esignatures_template_id,
            },
            cors_allowed_origins,
            enable_swagger_ui,
            disable_embedded_migrations,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Accessor for the global configuration
pub fn config() -> &'static AppConfig {
    &CONFIG
}
