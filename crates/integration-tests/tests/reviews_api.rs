//! Integration tests for the reviews JSON API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use folio_integration_tests::TestApp;
use serde_json::{Value, json};

fn review_json(book_id: &str, rating: i64, title: &str) -> Value {
    json!({
        "bookId": book_id,
        "authorName": "Reader",
        "rating": rating,
        "title": title,
        "comment": "Enjoyed it."
    })
}

#[tokio::test]
async fn test_create_review_sets_server_fields() {
    let app = TestApp::new();
    let book_id = app.create_book("Dune", "9.99").await;

    let response = app
        .post_json("/api/reviews", &review_json(&book_id, 5, "Great"))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let review = &response.json()["review"];
    assert_eq!(review["bookId"], book_id);
    assert_eq!(review["rating"], 5);
    assert_eq!(review["verifiedPurchase"], false);
    assert!(review["createdAt"].is_string());
    assert!(review["id"].is_string());
}

#[tokio::test]
async fn test_list_by_book_filters_and_orders_newest_first() {
    let app = TestApp::new();
    let dune = app.create_book("Dune", "9.99").await;
    let emma = app.create_book("Emma", "8.00").await;

    app.post_json("/api/reviews", &review_json(&dune, 4, "First")).await;
    app.post_json("/api/reviews", &review_json(&emma, 3, "Other")).await;
    app.post_json("/api/reviews", &review_json(&dune, 5, "Second")).await;

    let reviews = app.get(&format!("/api/reviews?bookId={dune}")).await.json();
    let titles: Vec<&str> = reviews
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Second", "First"]);

    let all = app.get("/api/reviews").await.json();
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_with_malformed_book_id_is_bad_request() {
    let app = TestApp::new();
    let response = app.get("/api/reviews?bookId=abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_out_of_range_rating() {
    let app = TestApp::new();
    let book_id = app.create_book("Dune", "9.99").await;

    let response = app
        .post_json("/api/reviews", &review_json(&book_id, 6, "Too good"))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_malformed_book_id() {
    let app = TestApp::new();
    let response = app
        .post_json("/api/reviews", &review_json("B1", 4, "Nope"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_delete_review() {
    let app = TestApp::new();
    let book_id = app.create_book("Dune", "9.99").await;
    let created = app
        .post_json("/api/reviews", &review_json(&book_id, 2, "Meh"))
        .await
        .json();
    let id = created["review"]["id"].as_str().unwrap().to_string();

    let response = app
        .put_json(&format!("/api/reviews/{id}"), &json!({ "rating": 4 }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let review = &response.json()["review"];
    assert_eq!(review["rating"], 4);
    assert_eq!(review["title"], "Meh");
    assert_eq!(review["createdAt"], created["review"]["createdAt"]);

    assert_eq!(
        app.delete(&format!("/api/reviews/{id}")).await.status,
        StatusCode::OK
    );
    assert_eq!(
        app.get(&format!("/api/reviews/{id}")).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_deleting_book_keeps_reviews() {
    let app = TestApp::new();
    let book_id = app.create_book("Dune", "9.99").await;
    app.post_json("/api/reviews", &review_json(&book_id, 5, "Kept"))
        .await;

    app.delete(&format!("/api/books/{book_id}")).await;

    let reviews = app.get(&format!("/api/reviews?bookId={book_id}")).await;
    assert_eq!(reviews.status, StatusCode::OK);
    assert_eq!(reviews.json().as_array().unwrap().len(), 1);
}
