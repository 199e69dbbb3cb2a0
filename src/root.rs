//! The root!
//!
//! The most important part of Curtly, the actual redirect logic

use std::str::Utf8Error;

use axum::Extension;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::LOCATION;
use percent_encoding::percent_decode_str;

use crate::storage::Storage;

/// The root!
///
/// All wildcard requests end up in this function.
///
/// The path is looked up as an alias code; on a hit the access is counted
/// and the target served as a temporary redirect. Soft-deleted codes answer
/// exactly like unknown ones.
pub async fn root<S: Storage>(
    Extension(storage): Extension<S>,
    uri: Uri,
) -> Result<(StatusCode, HeaderMap), (StatusCode, String)> {
    let code = uri.path().trim_matches('/');
    let code = url_decode_code(code).map_err(invalid_utf8)?;

    tracing::debug!("Looking for code: /{code}");

    let alias = storage
        .find_single_alias_by_code(&code)
        .await
        .map_err(internal_error)?;

    let mut headers = HeaderMap::new();

    let status_code = if let Some(alias) = alias {
        // the target is already in hand; a failed count is logged, never a
        // reason to deny a working redirect
        match storage.record_access(&code).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::debug!(r#"Code "{code}" disappeared before its access was counted"#);
            }
            Err(err) => tracing::error!(r#"Could not count access of "{code}": {err}"#),
        }

        tracing::debug!(r#"Code "{code}" redirecting to: {}"#, alias.target);

        let location = HeaderValue::from_str(&alias.target).map_err(internal_error)?;
        headers.insert(LOCATION, location);

        StatusCode::TEMPORARY_REDIRECT
    } else {
        tracing::debug!(r#"Code "{code}" not found"#);

        StatusCode::NOT_FOUND
    };

    Ok((status_code, headers))
}

/// Utility function for mapping any error into a `500 Internal Server Error`
/// response.
fn internal_error<E>(err: E) -> (StatusCode, String)
where
    E: std::error::Error,
{
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

fn invalid_utf8(_err: Utf8Error) -> (StatusCode, String) {
    (
        StatusCode::BAD_REQUEST,
        "URL contains invalid UTF-8 characters".to_string(),
    )
}

/// URL decode a code from the request path
///
/// Uses percentage encoding for the decoding, might error in case of invalid
/// UTF-8
fn url_decode_code(code: &str) -> Result<String, Utf8Error> {
    let decoded = percent_decode_str(code);

    decoded.decode_utf8().map(|decoded| decoded.to_string())
}
