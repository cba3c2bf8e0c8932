/// Database migration runner
///
/// Migrations live in `fieldbook-shared/migrations/` and are embedded into the
/// binary at compile time by `sqlx::migrate!`. Each file is named
/// `{timestamp}_{name}.sql`.
///
/// # Example
///
/// ```no_run
/// use fieldbook_shared::db::pool::{create_pool, DatabaseConfig};
/// use fieldbook_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Already-applied migrations are skipped, so this is safe to call on every
/// startup.
///
/// # Errors
///
/// Returns an error if a migration fails to apply or its checksum no longer
/// matches the applied version.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!(
                count = migrations.iter().count(),
                "Database schema is up to date"
            );
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
