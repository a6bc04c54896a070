mod common;

use axum::http::StatusCode;
use common::{assert_redirect, body_string, TestApp, EMAIL, PASSWORD};

#[tokio::test]
async fn login_with_valid_credentials() {
    let app = TestApp::new().await;

    let resp = app
        .post_form("/login", "email=student%40example.com&password=lemon+pie", None)
        .await;

    assert_redirect(&resp, "/");
    assert!(resp.headers().get("set-cookie").is_some());
}

#[tokio::test]
async fn login_flashes_welcome_on_next_page() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let html = body_string(app.get("/", Some(&cookie)).await).await;
    assert!(html.contains("been logged in!"));

    // Flashes are shown once.
    let html = body_string(app.get("/", Some(&cookie)).await).await;
    assert!(!html.contains("been logged in!"));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_get_the_same_message() {
    let app = TestApp::new().await;

    let resp = app
        .post_form("/login", "email=student%40example.com&password=wrong", None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("location").is_none());
    let wrong_password = body_string(resp).await;

    let resp = app
        .post_form("/login", "email=nobody%40example.com&password=lemon+pie", None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let unknown_email = body_string(resp).await;

    let message = "Your email or password doesn";
    assert!(wrong_password.contains(message));
    assert!(unknown_email.contains(message));
    assert_eq!(
        wrong_password.replace(EMAIL, ""),
        unknown_email.replace("nobody@example.com", "")
    );
}

#[tokio::test]
async fn login_validates_email_format() {
    let app = TestApp::new().await;

    let resp = app
        .post_form("/login", "email=not-an-email&password=lemon+pie", None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Invalid email address"));
    assert!(!html.contains("Your email or password doesn"));
}

#[tokio::test]
async fn login_requires_password() {
    let app = TestApp::new().await;

    let resp = app
        .post_form("/login", "email=student%40example.com&password=", None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Password is required"));
}

#[tokio::test]
async fn logout_clears_session() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let resp = app.get("/logout", Some(&cookie)).await;
    assert_redirect(&resp, "/");

    // After logout, accessing / should redirect to login
    let resp = app.get("/", Some(&cookie)).await;
    assert_redirect(&resp, "/login");
}

#[tokio::test]
async fn unauthenticated_pages_redirect_to_login() {
    let app = TestApp::new().await;

    for uri in [
        "/",
        "/logout",
        "/entry/add",
        "/entries/entries/anything",
        "/entries/edit/anything",
        "/entries/delete/anything",
        "/entries/tag/go",
    ] {
        let resp = app.get(uri, None).await;
        assert_redirect(&resp, "/login");
    }
}

#[tokio::test]
async fn login_page_renders_without_session() {
    let app = TestApp::new().await;
    let resp = app.get("/login", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("name=\"password\""));
}

#[tokio::test]
async fn seed_user_is_created_once() {
    let app = TestApp::new().await;

    journal::bootstrap::ensure_seed_user(&app.db, EMAIL, PASSWORD)
        .await
        .unwrap();

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(EMAIL)
        .fetch_one(&app.db)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[tokio::test]
async fn duplicate_email_is_reported_as_already_exists() {
    let app = TestApp::new().await;

    let err = journal::models::User::create(&app.db, EMAIL, "hash")
        .await
        .unwrap_err();
    assert!(matches!(err, journal::models::CreateUserError::AlreadyExists));
}

#[tokio::test]
async fn stored_password_is_hashed() {
    let app = TestApp::new().await;

    let user = journal::models::User::find_by_email(&app.db, EMAIL)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(user.password_hash, PASSWORD);
    assert!(journal::auth::verify_password(PASSWORD, &user.password_hash).unwrap());
}
