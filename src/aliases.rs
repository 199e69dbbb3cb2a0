//! Aliases
//!
//! The short codes and the targets they redirect to

use chrono::naive::NaiveDateTime;
use rand_core::OsRng;
use rand_core::TryRngCore;
use uuid::Uuid;

use crate::storage::CreateAliasValues;
use crate::storage::Error;
use crate::storage::Result;
use crate::storage::Storage;

/// Length of a generated code, in characters
pub const CODE_LENGTH: usize = 6;

/// Random bytes behind a code, two hex characters each
const CODE_BYTES: usize = CODE_LENGTH / 2;

/// Collision retry budget for creating an alias
///
/// Exhausting it means the code space is saturated, which is a server
/// problem, not a caller problem
const CODE_ATTEMPTS: usize = 5;

/// A short code mapped to a target URL
#[derive(Clone, Debug)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Alias {
    /// Alias ID
    pub id: Uuid,

    /// The short code, unique across all aliases that ever existed
    pub code: String,

    /// Location an access of the code is redirected to
    ///
    /// Stored as-is, Curtly does not validate it as a well-formed URL
    pub target: String,

    /// Email of the creating user, or `None` for anonymous creations
    pub owner: Option<String>,

    /// Number of times the code has been accessed
    pub access_count: i64,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at: creation, access or edit
    pub updated_at: NaiveDateTime,

    /// Soft-deleted at
    pub deleted_at: Option<NaiveDateTime>,
}

impl Alias {
    /// Whether a principal may change or delete this alias
    ///
    /// Only the exact owner may; anonymous aliases have no owner and can not
    /// be claimed or mutated by anyone
    pub fn is_owned_by(&self, principal: &str) -> bool {
        self.owner.as_deref() == Some(principal)
    }
}

/// Generate a candidate code
///
/// Uniqueness is not guaranteed here, storage enforces it on insert
pub fn generate_code() -> String {
    let mut bytes = [0u8; CODE_BYTES];

    OsRng.try_fill_bytes(&mut bytes).expect("OS random source");

    hex::encode(bytes)
}

/// Create an alias with a freshly generated code
///
/// A code collision is retried with a new candidate, a bounded number of
/// times; running out of attempts fails the creation with [`Error::Conflict`]
pub async fn shorten<S: Storage>(
    storage: &S,
    target: &str,
    owner: Option<&str>,
) -> Result<Alias> {
    shorten_with_generator(storage, generate_code, target, owner).await
}

async fn shorten_with_generator<S, G>(
    storage: &S,
    mut generate: G,
    target: &str,
    owner: Option<&str>,
) -> Result<Alias>
where
    S: Storage,
    G: FnMut() -> String + Send,
{
    for _ in 0..CODE_ATTEMPTS {
        let code = generate();

        let values = CreateAliasValues {
            code: &code,
            target,
            owner,
        };

        match storage.create_alias(&values).await {
            Err(Error::Conflict(_)) => {
                tracing::debug!(r#"Code "{code}" collided, generating a new one"#);
            }
            result => return result,
        }
    }

    Err(Error::Conflict(format!(
        "No unique code in {CODE_ATTEMPTS} attempts"
    )))
}
