//! Integration tests for Folio Books.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory router tests
//! cargo test -p folio-integration-tests
//!
//! # PostgreSQL tests (needs a migrated database)
//! STOREFRONT_DATABASE_URL=postgres://... cargo test -p folio-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `books_api`, `reviews_api`, `cart_api` - JSON API behaviour
//! - `pages` - HTML pages, HTMX fragments, and health checks
//! - `postgres_cart`, `postgres_catalog` - Repositories against a real database

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

use folio_storefront::db::{self, Storage};
use folio_storefront::routes::build_router;
use folio_storefront::state::AppState;

/// A fully wired storefront over fresh in-memory stores.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body parsed as JSON; `Value::Null` if it is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// Body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Value of a response header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(Storage::in_memory())
    }

    /// Wire the router around caller-supplied storage.
    #[must_use]
    pub fn with_storage(storage: Storage) -> Self {
        Self {
            router: build_router(AppState::new(storage)),
        }
    }

    /// Send one request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::unwrap_used)]
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<(&str, String)>,
    ) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some((content_type, payload)) => builder
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(payload)),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, uri, Some(("application/json", body.to_string())))
            .await
    }

    pub async fn put_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(("application/json", body.to_string())))
            .await
    }

    /// Post an HTML form (`application/x-www-form-urlencoded`).
    pub async fn post_form(&self, uri: &str, form: &str) -> TestResponse {
        self.send(
            Method::POST,
            uri,
            Some(("application/x-www-form-urlencoded", form.to_string())),
        )
        .await
    }

    /// Create a book through the API and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the API rejects the book.
    pub async fn create_book(&self, title: &str, price: &str) -> String {
        let response = self.post_json("/api/books", &book_json(title, price)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["book"]["id"]
            .as_str()
            .map(str::to_owned)
            .unwrap_or_default()
    }
}

/// Connect to the database in `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`)
/// and empty the storefront tables.
///
/// # Panics
///
/// Panics if no URL is set or the database is unreachable or unmigrated.
#[allow(clippy::unwrap_used)]
pub async fn scratch_pool() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap();
    let pool = db::create_pool(&SecretString::from(url), 20).await.unwrap();
    sqlx::query("TRUNCATE storefront.cart_line, storefront.review, storefront.book")
        .execute(&pool)
        .await
        .unwrap();
    pool
}

/// A complete book creation body.
#[must_use]
pub fn book_json(title: &str, price: &str) -> Value {
    json!({
        "title": title,
        "author": "Test Author",
        "description": "A book used in tests.",
        "price": price,
        "imageUrl": "/static/covers/test.jpg",
        "isbn": "9780000000000",
        "genres": ["Fiction"],
        "tags": ["test"],
        "publishedDate": "2020-01-01",
        "pageCount": 200,
        "language": "English",
        "publisher": "Test House",
        "rating": "4.0",
        "reviewCount": 0,
        "inStock": true,
        "featured": false
    })
}
