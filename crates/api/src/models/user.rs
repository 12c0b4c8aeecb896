//! Account entities: users, profiles, customers.

use orchard_core::{Audit, CustomerId, Email, Role, Stamp, UserId, UserProfileId};

/// An authentication account.
///
/// The password hash lives in the same table but is deliberately absent
/// from this struct; only the login path reads it, via a dedicated
/// repository method.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub is_active: bool,
    pub role: Role,
    #[sqlx(flatten)]
    pub stamp: Stamp,
}

/// Display/contact details for a user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserProfile {
    pub id: UserProfileId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    #[sqlx(flatten)]
    pub stamp: Stamp,
}

impl UserProfile {
    /// "First Last" display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The commerce-facing profile linked 1:1 to a [`User`], owning the cart,
/// reviews and orders.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: UserId,
    #[sqlx(flatten)]
    pub stamp: Stamp,
    #[sqlx(flatten)]
    pub audit: Audit,
}
