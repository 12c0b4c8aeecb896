//! Database operations for the Orchard `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `users`, `user_profiles`, `customers` - accounts and commerce profiles
//! - `categories`, `products` - catalog (soft-deleted, never dropped)
//! - `featured_products` - promotional windows, non-overlapping per product
//! - `carts`, `cart_items` - one cart per customer, one row per product
//! - `reviews` - one row per (customer, product)
//! - `orders`, `order_items`, `shipping_addresses` - checkout snapshots
//! - `invalidated_tokens` - logout/refresh JWT denylist
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p orchard-cli -- migrate
//! ```
//! They are never applied on server startup.

pub mod carts;
pub mod categories;
pub mod featured;
pub mod products;
pub mod reviews;
pub mod tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use featured::FeaturedProductRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use tokens::InvalidatedTokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email), already mapped to a
    /// client-safe message by the repository that hit it.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

// =============================================================================
// Pagination
// =============================================================================

/// The sortable columns a listing accepts, plus its default.
///
/// Every listing endpoint declares one of these as a `const`; the request's
/// `sort_by` is matched against `allowed` and the matched `&'static str` is
/// what gets interpolated into `ORDER BY` - caller input never reaches the
/// SQL text.
#[derive(Debug, Clone, Copy)]
pub struct SortColumns {
    pub allowed: &'static [&'static str],
    pub default: &'static str,
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Error resolving pagination parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    /// `sort_by` is not a sortable column for this listing.
    #[error("invalid sort field: {0}")]
    InvalidSortField(String),

    /// `sort_dir` is neither `asc` nor `desc`.
    #[error("invalid sort direction: {0}")]
    InvalidSortDir(String),
}

/// Validated pagination + ordering, ready to splice into a query.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort_by: &'static str,
    sort_dir: SortDir,
}

impl PageRequest {
    /// Default page size when the client sends none.
    pub const DEFAULT_SIZE: u32 = 10;

    /// Upper bound on page size; larger requests are clamped.
    pub const MAX_SIZE: u32 = 100;

    /// Resolve raw query parameters against a listing's sortable columns.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidSortField`] if `sort_by` names a column
    /// outside `columns.allowed`, and [`PageError::InvalidSortDir`] for a
    /// direction other than `asc`/`desc` (case-insensitive).
    pub fn resolve(
        page: Option<u32>,
        size: Option<u32>,
        sort_by: Option<&str>,
        sort_dir: Option<&str>,
        columns: SortColumns,
    ) -> Result<Self, PageError> {
        let sort_by = match sort_by {
            None => columns.default,
            Some(requested) => columns
                .allowed
                .iter()
                .find(|col| **col == requested)
                .copied()
                .ok_or_else(|| PageError::InvalidSortField(requested.to_owned()))?,
        };

        let sort_dir = match sort_dir {
            None => SortDir::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDir::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDir::Desc,
            Some(other) => return Err(PageError::InvalidSortDir(other.to_owned())),
        };

        Ok(Self {
            page: page.unwrap_or(0),
            size: size.unwrap_or(Self::DEFAULT_SIZE).clamp(1, Self::MAX_SIZE),
            sort_by,
            sort_dir,
        })
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// `LIMIT` value.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.size as i64
    }

    /// `OFFSET` value.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.page as i64 * self.size as i64
    }

    /// `ORDER BY` clause body, e.g. `"name ASC"`. Both parts come from
    /// whitelisted constants.
    #[must_use]
    pub fn order_by(&self) -> String {
        format!("{} {}", self.sort_by, self.sort_dir.as_sql())
    }

    /// Same as [`Self::order_by`] with a table alias prefix, e.g.
    /// `"p.name ASC"`.
    #[must_use]
    pub fn order_by_aliased(&self, alias: &str) -> String {
        format!("{alias}.{} {}", self.sort_by, self.sort_dir.as_sql())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const COLUMNS: SortColumns = SortColumns {
        allowed: &["name", "created_at", "price"],
        default: "name",
    };

    #[test]
    fn test_defaults() {
        let page = PageRequest::resolve(None, None, None, None, COLUMNS).unwrap();
        assert_eq!(page.page(), 0);
        assert_eq!(page.size(), PageRequest::DEFAULT_SIZE);
        assert_eq!(page.order_by(), "name ASC");
    }

    #[test]
    fn test_explicit_sort() {
        let page =
            PageRequest::resolve(Some(2), Some(25), Some("price"), Some("desc"), COLUMNS).unwrap();
        assert_eq!(page.limit(), 25);
        assert_eq!(page.offset(), 50);
        assert_eq!(page.order_by(), "price DESC");
        assert_eq!(page.order_by_aliased("p"), "p.price DESC");
    }

    #[test]
    fn test_rejects_unknown_column() {
        let err =
            PageRequest::resolve(None, None, Some("password_hash"), None, COLUMNS).unwrap_err();
        assert_eq!(err, PageError::InvalidSortField("password_hash".to_owned()));
    }

    #[test]
    fn test_rejects_injection_attempt() {
        let err = PageRequest::resolve(None, None, Some("name; DROP TABLE"), None, COLUMNS);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_bad_direction() {
        let err = PageRequest::resolve(None, None, None, Some("sideways"), COLUMNS).unwrap_err();
        assert_eq!(err, PageError::InvalidSortDir("sideways".to_owned()));
    }

    #[test]
    fn test_size_clamped() {
        let page = PageRequest::resolve(None, Some(10_000), None, None, COLUMNS).unwrap();
        assert_eq!(page.size(), PageRequest::MAX_SIZE);

        let page = PageRequest::resolve(None, Some(0), None, None, COLUMNS).unwrap();
        assert_eq!(page.size(), 1);
    }
}
