use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_edit_by_owner() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::register_and_login(&mut app, "owner@example.com").await;

    let url_one = "https://www.example.com/";
    let url_two = "https://www.dummy.com/";

    let short_url = helper::shorten(&mut app, Some(&access_token), url_one).await;

    let (status_code, _) =
        helper::maybe_edit_url(&mut app, Some(&access_token), &short_url.code, url_two).await;
    assert_eq!(StatusCode::OK, status_code);

    // the code is untouched, the redirect follows the new target
    let (status_code, location, _) = helper::root(&mut app, &short_url.code).await;
    assert_eq!(StatusCode::TEMPORARY_REDIRECT, status_code);
    assert_eq!(Some(url_two.to_string()), location);
}

#[tokio::test]
async fn test_edit_requires_authentication() {
    let mut app = helper::setup_test_app().await;

    let short_url = helper::shorten(&mut app, None, "https://www.example.com/").await;

    let (status_code, _) =
        helper::maybe_edit_url(&mut app, None, &short_url.code, "https://www.dummy.com/").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
}

#[tokio::test]
async fn test_edit_by_non_owner_is_forbidden() {
    let mut app = helper::setup_test_app().await;

    let owner_token = helper::register_and_login(&mut app, "owner@example.com").await;
    let other_token = helper::register_and_login(&mut app, "someone-else@example.com").await;

    let url = "https://www.example.com/";
    let short_url = helper::shorten(&mut app, Some(&owner_token), url).await;

    // the alias is visibly there, just not mutable: forbidden, not not-found
    let (status_code, error) = helper::maybe_edit_url(
        &mut app,
        Some(&other_token),
        &short_url.code,
        "https://www.dummy.com/",
    )
    .await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(
        Some("You don't have permission to edit this URL".to_string()),
        error
    );

    // and nothing changed
    let (status_code, location, _) = helper::root(&mut app, &short_url.code).await;
    assert_eq!(StatusCode::TEMPORARY_REDIRECT, status_code);
    assert_eq!(Some(url.to_string()), location);
}

#[tokio::test]
async fn test_edit_anonymous_alias_is_forbidden() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::register_and_login(&mut app, "someone@example.com").await;

    // anonymous alias: no owner, not even a logged in user may claim it
    let short_url = helper::shorten(&mut app, None, "https://www.example.com/").await;

    let (status_code, _) = helper::maybe_edit_url(
        &mut app,
        Some(&access_token),
        &short_url.code,
        "https://www.dummy.com/",
    )
    .await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
}

#[tokio::test]
async fn test_edit_unknown_code() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::register_and_login(&mut app, "someone@example.com").await;

    let (status_code, error) =
        helper::maybe_edit_url(&mut app, Some(&access_token), "abc123", "https://www.dummy.com/")
            .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("URL not found or deleted".to_string()), error);
}

#[tokio::test]
async fn test_edit_deleted_alias() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::register_and_login(&mut app, "owner@example.com").await;

    let short_url = helper::shorten(&mut app, Some(&access_token), "https://www.example.com/").await;

    let (status_code, _) =
        helper::maybe_delete_url(&mut app, Some(&access_token), &short_url.code).await;
    assert_eq!(StatusCode::OK, status_code);

    // a deleted alias reads as never having existed, even for the owner
    let (status_code, error) = helper::maybe_edit_url(
        &mut app,
        Some(&access_token),
        &short_url.code,
        "https://www.dummy.com/",
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("URL not found or deleted".to_string()), error);
}

#[tokio::test]
async fn test_edit_requires_url() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::register_and_login(&mut app, "owner@example.com").await;

    let url = "https://www.example.com/";
    let short_url = helper::shorten(&mut app, Some(&access_token), url).await;

    let (status_code, error) =
        helper::maybe_edit_url(&mut app, Some(&access_token), &short_url.code, "").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("URL is required".to_string()), error);

    // the target is untouched
    let (_, location, _) = helper::root(&mut app, &short_url.code).await;
    assert_eq!(Some(url.to_string()), location);
}
