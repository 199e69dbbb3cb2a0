#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::net::SocketAddr;

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;
use url::Url;

use crate::api::BaseUrl;
use crate::api::JwtKeys;
use crate::api::router;
use crate::storage::Storage;
use crate::storage::setup;
use crate::utils::env_var_or_else;

mod aliases;
mod api;
mod graceful_shutdown;
mod password;
mod root;
mod storage;
#[cfg(all(test, not(feature = "postgres")))]
mod tests;
mod users;
mod utils;

const DEFAULT_RUST_LOG: &str = "curtly=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let app = setup_app().await?;

    let address = setup_address()?;
    tracing::info!("Listening on {}", address);

    let listener = tokio::net::TcpListener::bind(address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Storage connection
/// - Base URL configuration
pub async fn setup_app() -> Result<Router> {
    let storage = setup().await;
    let jwt_keys = setup_jwt_keys();
    let base_url = setup_base_url()?;

    Ok(create_router(storage, jwt_keys, base_url))
}

/// Create the router for Curtly
///
/// All dependencies are passed in explicitly, tests construct their own
fn create_router<S: Storage>(storage: S, jwt_keys: JwtKeys, base_url: BaseUrl) -> Router {
    Router::new()
        .nest("/api", router::<S>())
        .fallback(get(root::root::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(storage))
        .layer(Extension(jwt_keys))
        .layer(Extension(base_url))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}

fn setup_jwt_keys() -> JwtKeys {
    use crate::password::generate;

    let jwt_secret = env_var_or_else("JWT_SECRET", || {
        let jwt_secret = generate();
        tracing::info!("`JWT_SECRET` is not set, generating temporary one: {jwt_secret}");
        jwt_secret
    });

    JwtKeys::new(jwt_secret.as_bytes())
}

fn setup_base_url() -> Result<BaseUrl> {
    let base_url = env_var_or_else("BASE_URL", || String::from(DEFAULT_BASE_URL));

    Ok(BaseUrl::new(Url::parse(&base_url)?))
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Ok(port) = std::env::var("PORT") {
        // only check non-empty strings
        if !port.is_empty() {
            let port = port.parse::<u16>()?;

            address.set_port(port);
        }
    }

    Ok(address)
}
