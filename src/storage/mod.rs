//! All things related to the storage of users and aliases

use async_trait::async_trait;
use thiserror::Error;

use crate::aliases::Alias;
use crate::users::User;

#[cfg(not(feature = "postgres"))]
use memory::Memory;
#[cfg(feature = "postgres")]
use postgres::Postgres;

#[cfg(not(feature = "postgres"))]
mod memory;
#[cfg(feature = "postgres")]
mod postgres;

/// Setup the storage
#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
pub async fn setup() -> Memory {
    Memory::new()
}

/// Setup the storage
#[cfg(feature = "postgres")]
pub async fn setup() -> Postgres {
    Postgres::new().await
}

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),

    /// A uniqueness violation: the code or email is already taken
    ///
    /// Soft-deleted rows count, codes and emails are never reused
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create a User
pub struct CreateUserValues<'a> {
    /// The email address
    pub email: &'a str,

    /// The hashed password
    pub hashed_password: &'a str,
}

/// Values to create an Alias
pub struct CreateAliasValues<'a> {
    /// The short code
    pub code: &'a str,

    /// The target the code redirects to
    pub target: &'a str,

    /// Email of the creating user, `None` for anonymous creations
    pub owner: Option<&'a str>,
}

/// Values to update an Alias
pub struct UpdateAliasValues<'a> {
    /// New target of the alias
    pub target: &'a str,
}

/// Storage with all supported operations
///
/// A cheap-to-clone handle, one clone per request. Every alias operation is
/// keyed by code and only sees rows that are not soft-deleted, making a
/// deleted alias indistinguishable from one that never existed; the single
/// exception is the uniqueness check on insert, which spans all rows ever
/// written.
///
/// Implementations must make each operation atomic with respect to a single
/// code: the insert collision check, the access-count adjustment and the
/// update/delete transitions may never interleave for the same code.
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Finds a single user by its email address
    ///
    /// Respects the soft-delete
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Create a single user
    ///
    /// Fails with [`Error::Conflict`] when the email is already registered
    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User>;

    /// Find all active aliases, optionally restricted to an owner
    ///
    /// Without an owner every active alias is returned; callers decide
    /// whether to expose that
    async fn find_all_aliases(&self, owner: Option<&str>) -> Result<Vec<Alias>>;

    /// Find a single active alias by its code
    ///
    /// Respects the soft-delete
    async fn find_single_alias_by_code(&self, code: &str) -> Result<Option<Alias>>;

    /// Create an alias
    ///
    /// Fails with [`Error::Conflict`] when the code exists in any row,
    /// active or soft-deleted
    async fn create_alias(&self, values: &CreateAliasValues<'_>) -> Result<Alias>;

    /// Replace the target of an active alias, refreshing `updated_at`
    ///
    /// `None` when the code is absent or soft-deleted
    async fn update_alias(
        &self,
        code: &str,
        values: &UpdateAliasValues<'_>,
    ) -> Result<Option<Alias>>;

    /// Soft-delete an active alias
    ///
    /// `None` when the code is absent or already deleted, so a repeated
    /// delete reads as not-found. Does not touch `updated_at`.
    async fn delete_alias(&self, code: &str) -> Result<Option<Alias>>;

    /// Count one access on an active alias, refreshing `updated_at`
    ///
    /// The increment is an adjustment of the stored value, concurrent
    /// accesses are all counted. `None` when the code is absent or deleted.
    async fn record_access(&self, code: &str) -> Result<Option<Alias>>;
}
