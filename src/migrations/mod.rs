// Migration runner for RampDesk Backend
// Embedded Diesel migrations so distroless containers need no diesel CLI

use crate::db::{diesel_pool::MIGRATIONS, DieselPool};
use diesel::Connection;
use diesel::PgConnection;
use diesel_migrations::MigrationHarness;
use std::error::Error;
use tracing::{debug, info};

/// Run all pending Diesel migrations
/// Returns the number of migrations applied
pub async fn run_migrations(_pool: &DieselPool) -> Result<usize, Box<dyn Error + Send + Sync>> {
    info!("[MIGRATIONS] Starting migration process...");

    // MigrationHarness is sync, so run on a blocking task with its own connection
    let database_url = crate::app_config::config().database_url.clone();

    let applied_migrations =
        tokio::task::spawn_blocking(move || -> Result<usize, Box<dyn Error + Send + Sync>> {
            debug!("[MIGRATIONS] Establishing sync connection for migrations...");

            let mut conn = PgConnection::establish(&database_url)
                .map_err(|e| format!("Failed to establish sync connection: {}", e))?;

            let pending_migrations = conn
                .pending_migrations(MIGRATIONS)
                .map_err(|e| format!("Failed to check pending migrations: {}", e))?;

            let pending_count = pending_migrations.len();

            if pending_count == 0 {
                debug!("[MIGRATIONS] No pending migrations found");
                return Ok(0);
            }

            info!("[MIGRATIONS] Found {} pending migrations", pending_count);

            let applied = conn
                .run_pending_migrations(MIGRATIONS)
                .map_err(|e| format!("Failed to run migrations: {}", e))?;

            for migration in &applied {
                debug!("[MIGRATIONS] Applied migration: {}", migration);
            }

            Ok(applied.len())
        })
        .await
        .map_err(|e| format!("Migration task panicked: {}", e))??;

    info!(
        "[MIGRATIONS] Migration process completed - applied {} migrations",
        applied_migrations
    );
    Ok(applied_migrations)
}

/// Check if migrations should run based on configuration
pub fn should_run_migrations() -> bool {
    !crate::app_config::config().disable_embedded_migrations
}
