//! Seeding commands.
//!
//! # Usage
//!
//! ```bash
//! orchard-cli seed admin -e admin@example.com -p 'a-strong-password' -f Ada -l Lovelace
//! ```
//!
//! Admin accounts have no customer profile or cart; they exist to manage
//! the catalog and users, not to shop.

use orchard_core::{Email, UserId, UserProfileId};

use super::{CliError, database_url};

/// Create an admin account with a profile.
///
/// # Errors
///
/// Returns `CliError::InvalidInput` for a malformed email or weak
/// password, and a database error if the email is already registered.
pub async fn admin(
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let password_hash = orchard_api::services::auth::hash_password(password)
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = orchard_api::db::create_pool(&database_url).await?;

    tracing::info!("Creating admin account: {email}");

    let existing: Option<(UserId,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(CliError::InvalidInput(format!(
            "account already exists with email: {email}"
        )));
    }

    let user_id = UserId::generate();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, $3, 'ADMIN')",
    )
    .bind(user_id)
    .bind(&email)
    .bind(&password_hash)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO user_profiles (id, user_id, first_name, last_name) VALUES ($1, $2, $3, $4)",
    )
    .bind(UserProfileId::generate())
    .bind(user_id)
    .bind(first_name)
    .bind(last_name)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Admin account created successfully! ID: {user_id}, Email: {email}");
    Ok(())
}
