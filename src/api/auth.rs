//! Account endpoints
//!
//! Registration and sessions around the alias management API

use axum::Extension;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::password::hash;
use crate::password::verify;
use crate::storage::CreateUserValues;
use crate::storage::Error as StorageError;
use crate::storage::Storage;
use crate::users::User;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::JwtKeys;
use super::Success;
use super::current_user::Token;
use super::current_user::generate_token;

/// The user response information
///
/// A subset of all the information, ready to be serialized for the outside
/// world
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// The user ID
    pub id: Uuid,

    /// The email address
    pub email: String,

    /// Creation date
    pub created_at: NaiveDateTime,
}

impl UserResponse {
    /// Create a user response from a [`User`](User)
    fn from_user(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Register form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    /// Email address to register with
    email: String,

    /// Password for the new account
    password: String,
}

/// Register a new account
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "someone@example.com", "password": "verysecret" }' \
///     http://localhost:8000/api/auth/register
/// ```
///
/// Response:
/// ```json
/// { "data": { "id": "<uuid>", "email": "someone@example.com" ... } }
/// ```
pub async fn register<S: Storage>(
    Extension(storage): Extension<S>,
    Form(form): Form<RegisterForm>,
) -> Result<Success<UserResponse>, Error> {
    if form.email.is_empty() || form.password.is_empty() {
        return Err(Error::bad_request("Email and password are required"));
    }

    let hashed_password = hash(&form.password).map_err(Error::internal_server_error)?;

    let values = CreateUserValues {
        email: &form.email,
        hashed_password: &hashed_password,
    };

    let user = match storage.create_user(&values).await {
        Ok(user) => user,
        Err(StorageError::Conflict(_)) => return Err(Error::conflict("Email already registered")),
        Err(err) => return Err(Error::internal_server_error(err)),
    };

    Ok(Success::created(UserResponse::from_user(user)))
}

/// Login form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    /// Email address of the user
    email: String,

    /// Password of the user
    password: String,
}

/// Get a token for a user "session"
///
/// The token can then be used to manage aliases by using it in the
/// `Authorization` header
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "someone@example.com", "password": "verysecret" }' \
///     http://localhost:8000/api/auth/login
/// ```
///
/// Response:
/// ```json
/// { "data": { "token_type": "Bearer", "access_token": "some token" } }
/// ```
pub async fn login<S: Storage>(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(storage): Extension<S>,
    Form(form): Form<LoginForm>,
) -> Result<Success<Token>, Error> {
    if form.email.is_empty() || form.password.is_empty() {
        return Err(Error::bad_request("Email and password are required"));
    }

    let user = storage
        .find_single_user_by_email(&form.email)
        .await
        .map_err(Error::internal_server_error)?;

    if let Some(user) = user {
        if verify(&user.hashed_password, &form.password) {
            let token = generate_token(&jwt_keys, &user.email)?;

            return Ok(Success::ok(token));
        }
    }

    Err(Error::unauthorized("Invalid credentials"))
}

/// Authentication check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    /// Whether the request carried a valid token
    pub is_authenticated: bool,
}

/// Report whether the request carries a valid token
///
/// Always a `200 OK`, an invalid or absent token simply reads as not
/// authenticated
pub async fn check(current_user: Option<CurrentUser>) -> Success<CheckResponse> {
    Success::ok(CheckResponse {
        is_authenticated: current_user.is_some(),
    })
}
