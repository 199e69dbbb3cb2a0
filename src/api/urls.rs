//! URL management endpoints
//!
//! Shorten a URL, manage your own aliases, count accesses

use axum::Extension;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::aliases;
use crate::aliases::Alias;
use crate::storage::Storage;
use crate::storage::UpdateAliasValues;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;

/// Base of the public short URLs
///
/// Generated codes are joined onto this to form the address served back to
/// the caller
#[derive(Clone)]
pub struct BaseUrl(Url);

impl BaseUrl {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    fn join(&self, code: &str) -> Result<Url, url::ParseError> {
        self.0.join(code)
    }
}

/// Alias response going to the user
///
/// Basically filtering which fields are shown to the user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasResponse {
    /// Alias ID
    pub id: Uuid,

    /// The short code
    pub code: String,

    /// Location the code redirects to
    pub target: String,

    /// Email of the creating user, absent for anonymous creations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Number of times the code has been accessed
    pub access_count: i64,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    pub updated_at: NaiveDateTime,
}

impl AliasResponse {
    /// Create a response from an [`Alias`](Alias)
    fn from_alias(alias: Alias) -> Self {
        Self {
            id: alias.id,
            code: alias.code,
            target: alias.target,
            owner: alias.owner,
            access_count: alias.access_count,
            created_at: alias.created_at,
            updated_at: alias.updated_at,
        }
    }

    /// Create a response from multiple [`Alias`](Alias)es
    fn from_alias_multiple(mut aliases: Vec<Alias>) -> Vec<Self> {
        aliases.drain(..).map(Self::from_alias).collect::<Vec<Self>>()
    }
}

/// Shorten form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenForm {
    /// The URL to shorten
    ///
    /// Stored as-is, anything the caller wants to redirect to
    url: String,
}

/// Response for a freshly shortened URL
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrlResponse {
    /// The generated code
    pub code: String,

    /// The publicly addressable short URL
    pub short_url: String,
}

/// Shorten a URL
///
/// No authentication required; a valid token makes the caller the owner of
/// the alias, without one the alias is anonymous and can never be changed
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "url": "https://www.example.com/" }' \
///     http://localhost:8000/api/url/shorten
/// ```
///
/// Response:
/// ```json
/// { "data": { "code": "1f9a30", "shortUrl": "http://localhost:8000/1f9a30" } }
/// ```
pub async fn shorten<S: Storage>(
    Extension(storage): Extension<S>,
    Extension(base_url): Extension<BaseUrl>,
    current_user: Option<CurrentUser>,
    Form(form): Form<ShortenForm>,
) -> Result<Success<ShortUrlResponse>, Error> {
    if form.url.is_empty() {
        return Err(Error::bad_request("URL is required"));
    }

    let owner = current_user.as_ref().map(|user| user.email.as_str());

    // collisions are retried inside, running out of the budget is a server
    // problem and surfaces as one
    let alias = aliases::shorten(&storage, &form.url, owner)
        .await
        .map_err(Error::internal_server_error)?;

    let short_url = base_url
        .join(&alias.code)
        .map_err(Error::internal_server_error)?;

    Ok(Success::created(ShortUrlResponse {
        code: alias.code,
        short_url: short_url.to_string(),
    }))
}

/// List the aliases of the current user
///
/// Only ever scoped to the authenticated principal
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:8000/api/url/list
/// ```
///
/// Response:
/// ```json
/// { "data": [ { "code": "1f9a30", "target": "https://www.example.com/", "accessCount": 3 ... } ] }
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser,
) -> Result<Success<Vec<AliasResponse>>, Error> {
    let aliases = storage
        .find_all_aliases(Some(&current_user.email))
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::ok(AliasResponse::from_alias_multiple(aliases)))
}

/// Edit form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditForm {
    /// Replacement target for the alias
    new_url: String,
}

/// Edit the target of an alias
///
/// Only the owner may; the code itself never changes
///
/// Request:
/// ```sh
/// curl -v -XPUT -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "newUrl": "https://www.dummy.com/" }' \
///     http://localhost:8000/api/url/1f9a30/edit
/// ```
///
/// Response:
/// ```json
/// { "data": { "code": "1f9a30", "target": "https://www.dummy.com/" ... } }
/// ```
pub async fn edit<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser,
    PathParameters(code): PathParameters<String>,
    Form(form): Form<EditForm>,
) -> Result<Success<AliasResponse>, Error> {
    if form.new_url.is_empty() {
        return Err(Error::bad_request("URL is required"));
    }

    let alias = fetch_alias(&storage, &code).await?;

    if !alias.is_owned_by(&current_user.email) {
        return Err(Error::forbidden(
            "You don't have permission to edit this URL",
        ));
    }

    let values = UpdateAliasValues {
        target: &form.new_url,
    };

    let updated_alias = storage
        .update_alias(&code, &values)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("URL not found or deleted"))?;

    Ok(Success::ok(AliasResponse::from_alias(updated_alias)))
}

/// Soft-delete an alias
///
/// Only the owner may; the row stays behind so the code is never handed out
/// again, but to every reader the alias is gone
///
/// Request:
/// ```sh
/// curl -v -XDELETE \
///     -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:8000/api/url/1f9a30/delete
/// ```
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser,
    PathParameters(code): PathParameters<String>,
) -> Result<Success<&'static str>, Error> {
    let alias = fetch_alias(&storage, &code).await?;

    if !alias.is_owned_by(&current_user.email) {
        return Err(Error::forbidden(
            "You don't have permission to delete this URL",
        ));
    }

    storage
        .delete_alias(&code)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("URL not found or deleted"))?;

    Ok(Success::ok("URL deleted"))
}

/// Access count response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCountResponse {
    /// The short code
    pub code: String,

    /// Number of accesses, including the one just counted
    pub access_count: i64,
}

/// Count an access without redirecting
///
/// Unauthenticated, like the redirect itself
///
/// Request:
/// ```sh
/// curl -v http://localhost:8000/api/url/1f9a30/increment
/// ```
///
/// Response:
/// ```json
/// { "data": { "code": "1f9a30", "accessCount": 4 } }
/// ```
pub async fn increment<S: Storage>(
    Extension(storage): Extension<S>,
    PathParameters(code): PathParameters<String>,
) -> Result<Success<AccessCountResponse>, Error> {
    let alias = storage
        .record_access(&code)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("URL not found or deleted"))?;

    Ok(Success::ok(AccessCountResponse {
        code: alias.code,
        access_count: alias.access_count,
    }))
}

/// Fetch an active alias from storage
async fn fetch_alias<S: Storage>(storage: &S, code: &str) -> Result<Alias, Error> {
    storage
        .find_single_alias_by_code(code)
        .await
        .map_err(Error::internal_server_error)?
        .map_or_else(|| Err(Error::not_found("URL not found or deleted")), Ok)
}
