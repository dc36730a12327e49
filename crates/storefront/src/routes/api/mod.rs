//! JSON API routes.
//!
//! Every mutation replies with a `message` plus the affected entity (or
//! count); every failure replies with `{"error": "..."}` via [`AppError`].

pub mod books;
pub mod cart;
pub mod reviews;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
    routing::get,
};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejection is an [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejection is an [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Collects the names of absent required fields so they can be reported
/// together.
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<&'static str>,
}

impl RequiredFields {
    /// Pass `value` through, remembering `name` if it is absent.
    pub fn check<T>(&mut self, name: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.missing.push(name);
        }
        value
    }

    /// The validation error naming every absent field.
    #[must_use]
    pub fn into_error(self) -> AppError {
        AppError::Validation(format!(
            "Missing required fields: {}",
            self.missing.join(", ")
        ))
    }
}

/// Create the JSON API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(books::index).post(books::create))
        .route(
            "/books/{id}",
            get(books::show).put(books::update).delete(books::delete),
        )
        .route("/reviews", get(reviews::index).post(reviews::create))
        .route(
            "/reviews/{id}",
            get(reviews::show)
                .put(reviews::update)
                .delete(reviews::delete),
        )
        .route(
            "/cart",
            get(cart::show)
                .post(cart::add)
                .put(cart::update)
                .delete(cart::delete),
        )
}
