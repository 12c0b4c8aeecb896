//! Common timestamp and audit fields.
//!
//! Entities embed these small value structs instead of inheriting from a
//! base class: every row carries a [`Stamp`], and rows touched by admin
//! actions additionally carry an [`Audit`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Creation/modification timestamps present on every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stamp {
    /// A stamp for a freshly created row.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Return a copy with `updated_at` advanced to `now`.
    #[must_use]
    pub const fn touched(self, now: DateTime<Utc>) -> Self {
        Self {
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

/// Who created and last modified an admin-managed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created_by: UserId,
    pub modified_by: UserId,
}

impl Audit {
    /// An audit record for a row created by `user`.
    #[must_use]
    pub const fn created_by(user: UserId) -> Self {
        Self {
            created_by: user,
            modified_by: user,
        }
    }

    /// Return a copy recording `user` as the last modifier.
    #[must_use]
    pub const fn modified_by(self, user: UserId) -> Self {
        Self {
            created_by: self.created_by,
            modified_by: user,
        }
    }
}

// FromRow support so entity structs can `#[sqlx(flatten)]` these fields.
#[cfg(feature = "postgres")]
impl sqlx::FromRow<'_, sqlx::postgres::PgRow> for Stamp {
    fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(feature = "postgres")]
impl sqlx::FromRow<'_, sqlx::postgres::PgRow> for Audit {
    fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            created_by: row.try_get("created_by")?,
            modified_by: row.try_get("modified_by")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touched_preserves_created_at() {
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(5);
        let stamp = Stamp::new(t0).touched(t1);
        assert_eq!(stamp.created_at, t0);
        assert_eq!(stamp.updated_at, t1);
    }

    #[test]
    fn test_audit_modification_keeps_creator() {
        let creator = UserId::generate();
        let editor = UserId::generate();
        let audit = Audit::created_by(creator).modified_by(editor);
        assert_eq!(audit.created_by, creator);
        assert_eq!(audit.modified_by, editor);
    }
}
