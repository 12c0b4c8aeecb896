//! Denylist maintenance command.
//!
//! The API has no background workers, so expired rows in
//! `invalidated_tokens` pile up until this command (run from cron or by
//! hand) clears them. Purging is safe at any time: an expired token is
//! already rejected by signature validation.

use chrono::Utc;

use orchard_api::db::InvalidatedTokenRepository;

use super::{CliError, database_url};

/// Delete denylist rows whose tokens have expired on their own.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or the delete fails.
pub async fn expired_tokens() -> Result<(), CliError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = orchard_api::db::create_pool(&database_url).await?;

    let purged = InvalidatedTokenRepository::new(&pool)
        .purge_expired(Utc::now())
        .await?;

    tracing::info!("Purged {purged} expired denylist entries");
    Ok(())
}
