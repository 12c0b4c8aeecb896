//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::jwt::JwtService;
use crate::services::upload::UploadService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; hands out the database pool, configuration
/// and the two long-lived collaborators (JWT signing, blob-store client).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    jwt: JwtService,
    uploads: UploadService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let jwt = JwtService::new(&config.jwt_secret, config.jwt_ttl_secs);
        let uploads = UploadService::new(config.blob_store.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                jwt,
                uploads,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the JWT service.
    #[must_use]
    pub fn jwt(&self) -> &JwtService {
        &self.inner.jwt
    }

    /// Get a reference to the blob-store upload service.
    #[must_use]
    pub fn uploads(&self) -> &UploadService {
        &self.inner.uploads
    }
}
