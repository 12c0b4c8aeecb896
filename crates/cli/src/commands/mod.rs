//! CLI subcommand implementations.

pub mod migrate;
pub mod purge;
pub mod seed;

use secrecy::SecretString;

/// Errors shared by the CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error from the API crate.
    #[error("{0}")]
    Repository(#[from] orchard_api::db::RepositoryError),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Read the database URL from `ORCHARD_DATABASE_URL` (or `DATABASE_URL`).
pub fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("ORCHARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("ORCHARD_DATABASE_URL"))
}
