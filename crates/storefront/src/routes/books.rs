//! Book detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::models::{Book, RatingSummary, Review};
use crate::state::AppState;

/// Full book display data for the detail page.
#[derive(Clone)]
pub struct BookDetailView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub isbn: String,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub published: String,
    pub page_count: i32,
    pub language: String,
    pub publisher: String,
    pub in_stock: bool,
}

impl From<&Book> for BookDetailView {
    fn from(book: &Book) -> Self {
        let d = &book.details;
        Self {
            id: book.id.to_string(),
            title: d.title.clone(),
            author: d.author.clone(),
            description: d.description.clone(),
            price: d.price.display(),
            image_url: d.image_url.clone(),
            isbn: d.isbn.clone(),
            genres: d.genres.clone(),
            tags: d.tags.clone(),
            published: d.published_date.format("%B %-d, %Y").to_string(),
            page_count: d.page_count,
            language: d.language.clone(),
            publisher: d.publisher.clone(),
            in_stock: d.in_stock,
        }
    }
}

/// Review display data.
#[derive(Clone)]
pub struct ReviewView {
    pub author_name: String,
    pub stars: u8,
    pub title: String,
    pub comment: String,
    pub date: String,
    pub verified_purchase: bool,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            author_name: review.author_name.clone(),
            stars: review.rating.stars(),
            title: review.title.clone(),
            comment: review.comment.clone(),
            date: review.created_at.format("%b %-d, %Y").to_string(),
            verified_purchase: review.verified_purchase,
        }
    }
}

/// Book detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "books/show.html")]
pub struct BookShowTemplate {
    pub book: BookDetailView,
    pub reviews: Vec<ReviewView>,
    pub review_count: usize,
    /// Average stars to one decimal, `None` without reviews.
    pub average_rating: Option<String>,
}

/// Not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate {
    pub what: &'static str,
}

/// Display a book with its reviews.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let Some(book) = state.catalog().get_by_id(&id).await? else {
        return Ok((StatusCode::NOT_FOUND, NotFoundTemplate { what: "Book" }).into_response());
    };

    let reviews = state
        .reviews()
        .list_by_book(&id)
        .await?
        .unwrap_or_default();
    let summary = RatingSummary::from_reviews(&reviews);

    Ok(BookShowTemplate {
        book: BookDetailView::from(&book),
        reviews: reviews.iter().map(ReviewView::from).collect(),
        review_count: summary.count,
        average_rating: summary.average.map(|avg| format!("{avg:.1}")),
    }
    .into_response())
}
