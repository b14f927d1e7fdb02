// Library exports for the RampDesk backend

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use db::DieselPool;
pub use middleware::auth_middleware;
pub use middleware::AuthenticatedUser;
pub use models::auth::AccessTokenClaims;
pub use services::{JwtService, StripeClient};
pub use utils::ServiceError;

// Diesel database pool type alias
use bb8::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

pub type DbPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

// Initializes config, database pool, migrations and external clients
pub async fn initialize_app_state() -> Result<AppState, Box<dyn std::error::Error>> {
    use std::sync::Arc;
    use tracing::info;

    dotenv::dotenv().ok();

    let config = app_config::config();

    info!("Initializing database pool...");
    let db_config = db::DieselDatabaseConfig::default();
    let max_connections = db_config.max_connections;
    let diesel_pool = db::create_diesel_pool(db_config).await?;

    if migrations::should_run_migrations() {
        info!("Running embedded migrations...");
        migrations::run_migrations(&diesel_pool)
            .await
            .map_err(|e| format!("Migration failed: {}", e))?;
    }

    let jwt_service = Arc::new(JwtService::from_config());
    let stripe = Arc::new(StripeClient::new(&config.stripe));
    let esignatures = Arc::new(services::EsignClient::new(&config.esignatures));

    Ok(AppState {
        config: Arc::new(config.clone()),
        diesel_pool,
        jwt_service,
        stripe,
        esignatures,
        max_connections,
    })
}

// Assembles the full application router
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{middleware as axum_middleware, routing::get, Router};
    use tower_http::trace::TraceLayer;

    let protected = Router::new()
        .nest("/customers", handlers::customer_routes())
        .nest("/jobs", handlers::job_routes())
        .nest("/leads", handlers::lead_routes())
        .nest("/roles", handlers::role_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let mut api = Router::new()
        .merge(protected)
        .merge(handlers::intake_routes());

    if state.config.enable_swagger_ui {
        api = api.nest("/docs", handlers::docs_routes());
    }

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .nest("/webhooks", handlers::webhook_routes())
        .layer(axum_middleware::from_fn(
            middleware::cors::dynamic_cors_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Health check handler
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    use axum::http::StatusCode;
    use axum::Json;

    let timestamp = chrono::Utc::now().to_rfc3339();

    let (overall_healthy, postgres_health) = match db::check_diesel_health(&state.diesel_pool).await
    {
        Ok(_) => (
            true,
            serde_json::json!({
                "status": "healthy",
                "max_connections": state.max_connections,
                "error": null
            }),
        ),
        Err(e) => (
            false,
            serde_json::json!({
                "status": "unhealthy",
                "error": format!("Database connection failed: {}", e)
            }),
        ),
    };

    let response = serde_json::json!({
        "status": if overall_healthy { "healthy" } else { "degraded" },
        "service": "rampdesk-backend",
        "timestamp": timestamp,
        "components": {
            "postgresql": postgres_health
        }
    });

    if overall_healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
