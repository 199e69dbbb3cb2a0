//! All API endpoint setup

use axum::Router;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;

pub use current_user::CurrentUser;
pub use current_user::JwtKeys;
pub use request::Form;
pub use request::PathParameters;
pub use response::Error;
pub use response::Success;
pub use urls::BaseUrl;

mod auth;
mod current_user;
mod request;
mod response;
mod urls;

use crate::storage::Storage;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let auth = Router::new()
        .route("/register", post(auth::register::<S>))
        .route("/login", post(auth::login::<S>))
        .route("/check", get(auth::check));

    let urls = Router::new()
        .route("/shorten", post(urls::shorten::<S>))
        .route("/list", get(urls::list::<S>))
        .route("/{code}/edit", put(urls::edit::<S>))
        .route("/{code}/delete", delete(urls::delete::<S>))
        .route("/{code}/increment", get(urls::increment::<S>));

    Router::new().nest("/auth", auth).nest("/url", urls)
}
