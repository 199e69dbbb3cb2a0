use axum::http::StatusCode;

use crate::aliases::CODE_LENGTH;
use crate::tests::helper;

#[tokio::test]
async fn test_shorten_anonymous() {
    let mut app = helper::setup_test_app().await;

    let url = "https://www.example.com/";

    let short_url = helper::shorten(&mut app, None, url).await;

    // fixed-length code over the hex alphabet
    assert_eq!(CODE_LENGTH, short_url.code.len());
    assert!(short_url.code.chars().all(|ch| ch.is_ascii_hexdigit()));

    // the public address is the code joined onto the base URL
    assert_eq!(
        format!("http://localhost:8000/{}", short_url.code),
        short_url.short_url
    );

    // and the code redirects to the submitted target
    let (status_code, location, _) = helper::root(&mut app, &short_url.code).await;
    assert_eq!(StatusCode::TEMPORARY_REDIRECT, status_code);
    assert_eq!(Some(url.to_string()), location);
}

#[tokio::test]
async fn test_shorten_records_owner() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::register_and_login(&mut app, "someone@example.com").await;

    let url = "https://www.example.com/";

    let short_url = helper::shorten(&mut app, Some(&access_token), url).await;

    let (status_code, aliases) = helper::list_urls(&mut app, Some(&access_token)).await;
    assert_eq!(StatusCode::OK, status_code);

    let aliases = aliases.unwrap();
    assert_eq!(1, aliases.len());
    assert_eq!(short_url.code, aliases[0].code);
    assert_eq!(url.to_string(), aliases[0].target);
    assert_eq!(0, aliases[0].access_count);
}

#[tokio::test]
async fn test_shorten_requires_url() {
    let mut app = helper::setup_test_app().await;

    let (status_code, short_url, error) = helper::maybe_shorten(&mut app, None, "").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(short_url.is_none());
    assert_eq!(Some("URL is required".to_string()), error);
}

#[tokio::test]
async fn test_shorten_does_not_validate_the_target() {
    let mut app = helper::setup_test_app().await;

    // anything goes, the target is stored as-is
    let url = "not really a url";

    let short_url = helper::shorten(&mut app, None, url).await;

    let (status_code, location, _) = helper::root(&mut app, &short_url.code).await;
    assert_eq!(StatusCode::TEMPORARY_REDIRECT, status_code);
    assert_eq!(Some(url.to_string()), location);
}
