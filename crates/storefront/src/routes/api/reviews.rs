//! Review API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use folio_core::ReviewRating;

use super::{ApiJson, ApiQuery, RequiredFields};
use crate::error::{AppError, Result};
use crate::models::{NewReview, Review, ReviewUpdate};
use crate::state::AppState;

/// Query for `GET /api/reviews`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    pub book_id: Option<String>,
}

/// Body of `POST /api/reviews`.
///
/// A `createdAt` in the body is ignored; the server stamps it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateReviewRequest {
    pub book_id: Option<String>,
    pub author_name: Option<String>,
    pub rating: Option<ReviewRating>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub verified_purchase: Option<bool>,
}

impl CreateReviewRequest {
    /// Require every field except `verifiedPurchase`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every missing field.
    pub fn into_new_review(self) -> Result<NewReview> {
        let mut fields = RequiredFields::default();
        let book_id = fields.check("bookId", self.book_id);
        let author_name = fields.check("authorName", self.author_name);
        let rating = fields.check("rating", self.rating);
        let title = fields.check("title", self.title);
        let comment = fields.check("comment", self.comment);

        let (Some(book_id), Some(author_name), Some(rating), Some(title), Some(comment)) =
            (book_id, author_name, rating, title, comment)
        else {
            return Err(fields.into_error());
        };

        Ok(NewReview {
            book_id,
            author_name,
            rating,
            title,
            comment,
            verified_purchase: self.verified_purchase,
        })
    }
}

/// `GET /api/reviews[?bookId=]`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> Result<Json<Vec<Review>>> {
    let reviews = match query.book_id {
        Some(book_id) => state
            .reviews()
            .list_by_book(&book_id)
            .await?
            .ok_or(AppError::InvalidIdentifier(book_id))?,
        None => state.reviews().list_all().await?,
    };

    Ok(Json(reviews))
}

/// `POST /api/reviews`
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateReviewRequest>,
) -> Result<impl IntoResponse> {
    let review = body.into_new_review()?;
    let created = state.reviews().create(review).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Review created", "review": created })),
    ))
}

/// `GET /api/reviews/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Review>> {
    state
        .reviews()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Review".to_string()))
}

/// `PUT /api/reviews/{id}`
#[instrument(skip(state, update))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ReviewUpdate>,
) -> Result<impl IntoResponse> {
    let review = state
        .reviews()
        .update(&id, update)
        .await?
        .ok_or_else(|| AppError::NotFound("Review".to_string()))?;

    Ok(Json(json!({ "message": "Review updated", "review": review })))
}

/// `DELETE /api/reviews/{id}`
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    if !state.reviews().delete(&id).await? {
        return Err(AppError::NotFound("Review".to_string()));
    }

    Ok(Json(json!({ "message": "Review deleted", "id": id })))
}
