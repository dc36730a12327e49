//! Cart merge against `PostgreSQL`.
//!
//! These tests need a migrated database in `STOREFRONT_DATABASE_URL` and
//! truncate the storefront tables, so point them at a scratch database.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use folio_integration_tests::{TestApp, scratch_pool};
use folio_storefront::db::Storage;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_postgres_concurrent_adds_keep_one_line() {
    let app = TestApp::with_storage(Storage::postgres(scratch_pool().await));
    let book_id = app.create_book("Dune", "9.99").await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let app = app.clone();
        let book_id = book_id.clone();
        handles.push(tokio::spawn(async move {
            app.post_json("/api/cart", &json!({ "bookId": book_id, "quantity": 2 }))
                .await
                .status
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let cart = app.get("/api/cart").await.json();
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    assert_eq!(cart["lines"][0]["quantity"], 32);
    assert_eq!(cart["subtotal"], "319.68");
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_postgres_merge_overflow_is_rejected() {
    let app = TestApp::with_storage(Storage::postgres(scratch_pool().await));
    let book_id = app.create_book("Dune", "9.99").await;

    let first = app
        .post_json(
            "/api/cart",
            &json!({ "bookId": book_id, "quantity": i32::MAX }),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app
        .post_json("/api/cart", &json!({ "bookId": book_id, "quantity": 1 }))
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);

    let cart = app.get("/api/cart").await.json();
    assert_eq!(cart["lines"][0]["quantity"], i32::MAX);
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_postgres_readiness() {
    let app = TestApp::with_storage(Storage::postgres(scratch_pool().await));
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}
