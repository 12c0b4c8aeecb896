//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! orchard-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ORCHARD_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string
//!
//! Migration files live in `crates/api/migrations/`.

use super::{CliError, database_url};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = orchard_api::db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
