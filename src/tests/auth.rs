use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_register_and_login() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _) = helper::maybe_register(&mut app, "someone@example.com", "verysecret").await;
    assert_eq!(StatusCode::CREATED, status_code);

    let (status_code, access_token) =
        helper::maybe_login(&mut app, "someone@example.com", "verysecret").await;
    assert_eq!(StatusCode::OK, status_code);

    assert!(helper::check(&mut app, access_token.as_deref()).await);
    assert!(!helper::check(&mut app, None).await);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _) = helper::maybe_register(&mut app, "someone@example.com", "verysecret").await;
    assert_eq!(StatusCode::CREATED, status_code);

    // even with a different password
    let (status_code, error) =
        helper::maybe_register(&mut app, "someone@example.com", "anothersecret").await;
    assert_eq!(StatusCode::CONFLICT, status_code);
    assert_eq!(Some("Email already registered".to_string()), error);
}

#[tokio::test]
async fn test_register_requires_email_and_password() {
    let mut app = helper::setup_test_app().await;

    let (status_code, error) = helper::maybe_register(&mut app, "", "verysecret").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Email and password are required".to_string()), error);

    let (status_code, error) = helper::maybe_register(&mut app, "someone@example.com", "").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Email and password are required".to_string()), error);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _) = helper::maybe_register(&mut app, "someone@example.com", "verysecret").await;
    assert_eq!(StatusCode::CREATED, status_code);

    let (status_code, access_token) =
        helper::maybe_login(&mut app, "someone@example.com", "not-the-password").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert!(access_token.is_none());
}

#[tokio::test]
async fn test_login_with_unknown_email() {
    let mut app = helper::setup_test_app().await;

    let (status_code, access_token) =
        helper::maybe_login(&mut app, "unknown@example.com", "verysecret").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert!(access_token.is_none());
}

#[tokio::test]
async fn test_check_with_garbage_token() {
    let mut app = helper::setup_test_app().await;

    assert!(!helper::check(&mut app, Some("Bearer not-a-token")).await);
}
