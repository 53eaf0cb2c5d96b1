/// Database migration runner
///
/// Migrations live in the `migrations/` directory of this crate and are
/// embedded into the binary via `sqlx::migrate!`. The API server runs them
/// on startup; the same runner can be invoked from maintenance tools.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration file fails to apply. Each migration runs
/// in its own transaction, so a failure leaves previously applied
/// migrations in place.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!("migration failed: {}", e);
            Err(e)
        }
    }
}

/// Returns the number of applied migrations
///
/// Reads sqlx's bookkeeping table; returns 0 when it does not exist yet.
pub async fn applied_migrations(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await
}
