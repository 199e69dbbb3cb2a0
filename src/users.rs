//! Users
//!
//! Registered accounts, identified by their email address

use chrono::naive::NaiveDateTime;
use uuid::Uuid;

/// A registered account
///
/// The email address doubles as the principal identity that alias ownership
/// is compared against
#[derive(Clone, Debug)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct User {
    /// User ID
    pub id: Uuid,

    /// Email address, unique among users
    pub email: String,

    /// Argon2 hash of the password, in PHC string format
    pub hashed_password: String,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    #[expect(dead_code)] // used by sqlx
    pub updated_at: NaiveDateTime,

    /// Soft-deleted at
    pub deleted_at: Option<NaiveDateTime>,
}
