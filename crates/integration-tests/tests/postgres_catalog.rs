//! Book and review repositories against `PostgreSQL`.
//!
//! These tests need a migrated database in `STOREFRONT_DATABASE_URL` and
//! truncate the storefront tables, so point them at a scratch database.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use folio_integration_tests::{TestApp, book_json, scratch_pool};
use folio_storefront::db::Storage;
use serde_json::{Value, json};

async fn postgres_app() -> TestApp {
    TestApp::with_storage(Storage::postgres(scratch_pool().await))
}

fn review_json(book_id: &str, rating: i64, title: &str) -> Value {
    json!({
        "bookId": book_id,
        "authorName": "Reader",
        "rating": rating,
        "title": title,
        "comment": "Enjoyed it."
    })
}

/// Every field of `input` comes back unchanged.
fn assert_matches_input(stored: &Value, input: &Value) {
    for (key, value) in input.as_object().unwrap() {
        assert_eq!(&stored[key], value, "field {key}");
    }
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_postgres_book_round_trip() {
    let app = postgres_app().await;

    for (price, rating) in [("12.99", "4.5"), ("99999999.99", "5.0"), ("0.00", "0.0")] {
        let mut input = book_json("Dune", price);
        input["rating"] = json!(rating);
        input["genres"] = json!(["Science Fiction", "Classics"]);

        let created = app.post_json("/api/books", &input).await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.text());
        let id = created.json()["book"]["id"].as_str().unwrap().to_string();

        let fetched = app.get(&format!("/api/books/{id}")).await;
        assert_eq!(fetched.status, StatusCode::OK);
        assert_eq!(fetched.json()["id"], id);
        assert_matches_input(&fetched.json(), &input);
    }
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_postgres_rejects_unstorable_values_as_bad_request() {
    let app = postgres_app().await;

    for (field, value) in [
        ("price", "12.999"),
        ("price", "1000000000"),
        ("rating", "4.25"),
    ] {
        let mut body = book_json("Dune", "9.99");
        body[field] = json!(value);

        let response = app.post_json("/api/books", &body).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{field}={value}");
    }

    assert!(app.get("/api/books").await.json().as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_postgres_partial_update_keeps_other_fields() {
    let app = postgres_app().await;
    let input = book_json("Dune", "9.99");
    let id = app.create_book("Dune", "9.99").await;

    let response = app
        .put_json(
            &format!("/api/books/{id}"),
            &json!({ "price": "7.50", "featured": true }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let book = app.get(&format!("/api/books/{id}")).await.json();
    assert_eq!(book["price"], "7.50");
    assert_eq!(book["featured"], true);

    let mut unchanged = input;
    let fields = unchanged.as_object_mut().unwrap();
    fields.remove("price");
    fields.remove("featured");
    assert_matches_input(&book, &unchanged);
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_postgres_listing_filters_and_sorts() {
    let app = postgres_app().await;
    app.create_book("Middlemarch", "12.50").await;
    let mut featured = book_json("Beloved", "14.00");
    featured["featured"] = json!(true);
    featured["genres"] = json!(["Literary Fiction"]);
    app.post_json("/api/books", &featured).await;

    let all = app.get("/api/books").await.json();
    assert_eq!(all[0]["title"], "Beloved");
    assert_eq!(all[1]["title"], "Middlemarch");

    let only_featured = app.get("/api/books?featured=true").await.json();
    assert_eq!(only_featured.as_array().unwrap().len(), 1);

    let by_genre = app.get("/api/books?genre=literary%20fiction").await.json();
    assert_eq!(by_genre.as_array().unwrap().len(), 1);
    assert_eq!(by_genre[0]["title"], "Beloved");
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_postgres_review_lifecycle() {
    let app = postgres_app().await;
    let dune = app.create_book("Dune", "9.99").await;
    let emma = app.create_book("Emma", "8.00").await;

    let first = app
        .post_json("/api/reviews", &review_json(&dune, 3, "First"))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    let first = first.json()["review"].clone();
    app.post_json("/api/reviews", &review_json(&emma, 4, "Other"))
        .await;
    app.post_json("/api/reviews", &review_json(&dune, 5, "Second"))
        .await;

    let listed = app.get(&format!("/api/reviews?bookId={dune}")).await.json();
    let titles: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Second", "First"]);

    let id = first["id"].as_str().unwrap();
    let updated = app
        .put_json(
            &format!("/api/reviews/{id}"),
            &json!({ "rating": 4, "bookId": emma }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    let review = &updated.json()["review"];
    assert_eq!(review["rating"], 4);
    assert_eq!(review["bookId"], emma);
    assert_eq!(review["title"], "First");
    assert_eq!(review["createdAt"], first["createdAt"]);

    let rejected = app
        .put_json(
            &format!("/api/reviews/{id}"),
            &json!({ "title": "Changed", "bookId": "B1" }),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    let stored = app.get(&format!("/api/reviews/{id}")).await.json();
    assert_eq!(stored["title"], "First");

    assert_eq!(
        app.delete(&format!("/api/reviews/{id}")).await.status,
        StatusCode::OK
    );
    assert_eq!(
        app.get(&format!("/api/reviews/{id}")).await.status,
        StatusCode::NOT_FOUND
    );
    let remaining = app.get(&format!("/api/reviews?bookId={emma}")).await.json();
    assert_eq!(remaining.as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_postgres_cart_summary_joins_books() {
    let app = postgres_app().await;
    let dune = app.create_book("Dune", "9.99").await;
    let emma = app.create_book("Emma", "12.50").await;

    app.post_json("/api/cart", &json!({ "bookId": dune, "quantity": 2 }))
        .await;
    app.post_json("/api/cart", &json!({ "bookId": emma })).await;

    let cart = app.get("/api/cart").await.json();
    assert_eq!(cart["lines"][0]["book"]["title"], "Dune");
    assert_eq!(cart["lines"][1]["book"]["title"], "Emma");
    assert_eq!(cart["itemCount"], 3);
    assert_eq!(cart["subtotal"], "32.48");
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database"]
async fn test_postgres_pages_render() {
    let app = postgres_app().await;
    let id = app.create_book("Dune", "9.99").await;
    app.post_json("/api/reviews", &review_json(&id, 5, "A desert epic"))
        .await;

    let home = app.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.text().contains("Dune"));

    let detail = app.get(&format!("/books/{id}")).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert!(detail.text().contains("A desert epic"));
}
