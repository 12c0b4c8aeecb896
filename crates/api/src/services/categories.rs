//! Category catalog service.

use sqlx::PgPool;

use orchard_core::{CategoryId, UserId, slug::slugify};

use crate::db::{CategoryRepository, PageRequest, RepositoryError, SortColumns};
use crate::models::Category;

/// Sortable columns for category listings.
pub const SORT_COLUMNS: SortColumns = SortColumns {
    allowed: &["name", "created_at"],
    default: "name",
};

/// Errors from category operations.
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// The category id or slug doesn't resolve.
    #[error("category not found")]
    NotFound,

    /// A category with this name already exists.
    #[error("category name already exists")]
    DuplicateName,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Category catalog service.
pub struct CategoryService<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories by soft-delete state.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::Repository` on query failure.
    pub async fn list(
        &self,
        is_deleted: bool,
        page: PageRequest,
    ) -> Result<(Vec<Category>, i64), CategoryError> {
        let listed = CategoryRepository::new(self.pool)
            .list_by_deleted(is_deleted, page)
            .await?;
        Ok(listed)
    }

    /// Get a category by id.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError::NotFound`] if the id doesn't resolve.
    pub async fn get(&self, id: CategoryId) -> Result<Category, CategoryError> {
        CategoryRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(CategoryError::NotFound)
    }

    /// Get a category by slug.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError::NotFound`] if the slug doesn't resolve.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, CategoryError> {
        CategoryRepository::new(self.pool)
            .get_by_slug(slug)
            .await?
            .ok_or(CategoryError::NotFound)
    }

    /// Create a category. The slug is `"{name-slug}-{id}"`.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError::DuplicateName`] if the name is taken.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        created_by: UserId,
    ) -> Result<Category, CategoryError> {
        let id = CategoryId::generate();
        let slug = format!("{}-{id}", slugify(name));

        CategoryRepository::new(self.pool)
            .insert(id, name, description, &slug, created_by)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CategoryError::DuplicateName,
                other => CategoryError::Repository(other),
            })
    }

    /// Update a category's name and description, re-deriving the slug.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError::NotFound`] if the id doesn't resolve and
    /// [`CategoryError::DuplicateName`] if the new name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        name: &str,
        description: Option<&str>,
        modified_by: UserId,
    ) -> Result<Category, CategoryError> {
        let slug = format!("{}-{id}", slugify(name));

        CategoryRepository::new(self.pool)
            .update(id, name, description, &slug, modified_by)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CategoryError::NotFound,
                RepositoryError::Conflict(_) => CategoryError::DuplicateName,
                other => CategoryError::Repository(other),
            })
    }

    /// Flip the soft-delete flag, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError::NotFound`] if the id doesn't resolve.
    pub async fn toggle(&self, id: CategoryId, modified_by: UserId) -> Result<bool, CategoryError> {
        CategoryRepository::new(self.pool)
            .toggle_deleted(id, modified_by)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CategoryError::NotFound,
                other => CategoryError::Repository(other),
            })
    }
}
