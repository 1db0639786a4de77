/// Database migration runner
///
/// Migrations live in the `migrations/` directory at the crate root and are
/// embedded into the binary via `sqlx::migrate!`, so deployments don't need
/// the SQL files on disk.

use sqlx::PgPool;
use tracing::info;

/// Runs all pending migrations
///
/// Idempotent: already-applied migrations are skipped.
///
/// # Errors
///
/// Returns an error if a migration fails to execute or a previously applied
/// migration's checksum no longer matches.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("database schema is up to date");
    Ok(())
}
