//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! sk-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string, unless `--database-url` is given
//!
//! # Migration Files
//!
//! Migrations live in `crates/api/migrations/` and are embedded at build time.

use secrecy::SecretString;
use thiserror::Error;

use storekeep_api::db;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the API database migrations.
///
/// # Errors
///
/// Returns an error if no connection string is available, the database is
/// unreachable, or a migration fails.
pub async fn run(database_url: Option<String>) -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .map(SecretString::from)
        .ok_or(MigrationError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
