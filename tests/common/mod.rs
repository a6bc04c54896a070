#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub const EMAIL: &str = "student@example.com";
pub const PASSWORD: &str = "lemon pie";

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        journal::bootstrap::ensure_seed_user(&pool, EMAIL, PASSWORD)
            .await
            .expect("Failed to create seed user");

        let router = journal::build_app(pool.clone(), false)
            .await
            .expect("Failed to build app");

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Log in as the seed user and return the session cookie string.
    pub async fn login(&self) -> String {
        let body = format!("email={}&password=lemon+pie", EMAIL.replace('@', "%40"));
        let resp = self.post_form("/login", &body, None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        session_cookie(&resp).expect("Login should set a session cookie")
    }

    /// Send a GET request with an optional session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a POST form request with an optional session cookie.
    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }

    /// Submit the new-entry form and assert it was accepted.
    pub async fn add_entry(&self, cookie: &str, title: &str, tags: &str) {
        let body = entry_form(title, "09-03-2024", tags);
        let resp = self.post_form("/entry/add", &body, Some(cookie)).await;
        assert_redirect(&resp, "/");
    }

    /// Tag names linked to the entry with this slug, in link order.
    pub async fn tag_names(&self, slug: &str) -> Vec<String> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT t.name FROM tags t
            JOIN entry_tags et ON et.tag_id = t.id
            JOIN entries e ON e.id = et.entry_id
            WHERE e.slug = ?
            ORDER BY et.rowid
            "#,
        )
        .bind(slug)
        .fetch_all(&self.db)
        .await
        .unwrap();
        rows.into_iter().map(|(name,)| name).collect()
    }
}

/// Form-encode an entry submission.
pub fn entry_form(title: &str, date: &str, tags: &str) -> String {
    format!(
        "title={}&date={}&time_spent=2+hours&what_i_learned=Lots&sources_to_remember=Docs&tags={}",
        encode(title),
        encode(date),
        encode(tags)
    )
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub fn session_cookie(resp: &Response) -> Option<String> {
    resp.headers()
        .get("set-cookie")?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Assert that a response is a redirect to the given location.
pub fn assert_redirect(resp: &Response, expected_location: &str) {
    assert!(
        resp.status().is_redirection(),
        "Expected redirect, got {}",
        resp.status()
    );
    let location = resp
        .headers()
        .get("location")
        .expect("Redirect should have location header")
        .to_str()
        .unwrap();
    assert_eq!(location, expected_location);
}
