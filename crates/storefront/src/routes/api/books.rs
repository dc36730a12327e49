//! Catalog API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use folio_core::{BookRating, Price};

use super::{ApiJson, ApiQuery, RequiredFields};
use crate::error::{AppError, Result};
use crate::models::{Book, BookFilter, BookUpdate, NewBook};
use crate::state::AppState;

/// Body of `POST /api/books`.
///
/// Every field is optional here so that all missing fields can be reported
/// in one response; [`CreateBookRequest::into_new_book`] requires them all.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub image_url: Option<String>,
    pub isbn: Option<String>,
    pub genres: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub published_date: Option<NaiveDate>,
    pub page_count: Option<i32>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    pub rating: Option<BookRating>,
    pub review_count: Option<i32>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
}

impl CreateBookRequest {
    /// Require every attribute.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every missing field.
    pub fn into_new_book(self) -> Result<NewBook> {
        let mut fields = RequiredFields::default();
        let title = fields.check("title", self.title);
        let author = fields.check("author", self.author);
        let description = fields.check("description", self.description);
        let price = fields.check("price", self.price);
        let image_url = fields.check("imageUrl", self.image_url);
        let isbn = fields.check("isbn", self.isbn);
        let genres = fields.check("genres", self.genres);
        let tags = fields.check("tags", self.tags);
        let published_date = fields.check("publishedDate", self.published_date);
        let page_count = fields.check("pageCount", self.page_count);
        let language = fields.check("language", self.language);
        let publisher = fields.check("publisher", self.publisher);
        let rating = fields.check("rating", self.rating);
        let review_count = fields.check("reviewCount", self.review_count);
        let in_stock = fields.check("inStock", self.in_stock);
        let featured = fields.check("featured", self.featured);

        let (
            Some(title),
            Some(author),
            Some(description),
            Some(price),
            Some(image_url),
            Some(isbn),
            Some(genres),
            Some(tags),
            Some(published_date),
            Some(page_count),
            Some(language),
            Some(publisher),
            Some(rating),
            Some(review_count),
            Some(in_stock),
            Some(featured),
        ) = (
            title,
            author,
            description,
            price,
            image_url,
            isbn,
            genres,
            tags,
            published_date,
            page_count,
            language,
            publisher,
            rating,
            review_count,
            in_stock,
            featured,
        )
        else {
            return Err(fields.into_error());
        };

        Ok(NewBook {
            title,
            author,
            description,
            price,
            image_url,
            isbn,
            genres,
            tags,
            published_date,
            page_count,
            language,
            publisher,
            rating,
            review_count,
            in_stock,
            featured,
        })
    }
}

/// `GET /api/books`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<BookFilter>,
) -> Result<Json<Vec<Book>>> {
    Ok(Json(state.catalog().list(&filter).await?))
}

/// `POST /api/books`
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateBookRequest>,
) -> Result<impl IntoResponse> {
    let book = body.into_new_book()?;
    let created = state.catalog().create(book).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Book created", "book": created })),
    ))
}

/// `GET /api/books/{id}`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Book>> {
    state
        .catalog()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Book".to_string()))
}

/// `PUT /api/books/{id}`
#[instrument(skip(state, changes))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<BookUpdate>,
) -> Result<impl IntoResponse> {
    let book = state
        .catalog()
        .update(&id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Book".to_string()))?;

    Ok(Json(json!({ "message": "Book updated", "book": book })))
}

/// `DELETE /api/books/{id}`
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    if !state.catalog().delete(&id).await? {
        return Err(AppError::NotFound("Book".to_string()));
    }

    Ok(Json(json!({ "message": "Book deleted", "id": id })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_into_new_book_reports_every_missing_field() {
        let request = CreateBookRequest {
            title: Some("Kindred".to_string()),
            ..CreateBookRequest::default()
        };

        let err = request.into_new_book().unwrap_err();

        let message = err.to_string();
        assert!(message.contains("author"));
        assert!(message.contains("publishedDate"));
        assert!(message.contains("featured"));
        assert!(!message.contains("title"));
    }

    #[test]
    fn test_into_new_book_accepts_complete_body() {
        let body = serde_json::json!({
            "title": "Kindred",
            "author": "Octavia E. Butler",
            "description": "A woman is pulled back in time.",
            "price": "14.99",
            "imageUrl": "/images/kindred.jpg",
            "isbn": "978-0807083697",
            "genres": ["Science Fiction"],
            "tags": [],
            "publishedDate": "1979-06-01",
            "pageCount": 264,
            "language": "English",
            "publisher": "Doubleday",
            "rating": "4.6",
            "reviewCount": 0,
            "inStock": true,
            "featured": true
        });
        let request: CreateBookRequest = serde_json::from_value(body).unwrap();

        let book = request.into_new_book().unwrap();

        assert_eq!(book.title, "Kindred");
        assert_eq!(book.page_count, 264);
        assert!(book.featured);
    }
}
