//! Catalog page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::models::{Book, BookFilter};
use crate::routes::api::ApiQuery;
use crate::state::AppState;

/// Book display data for catalog cards.
#[derive(Clone)]
pub struct BookCardView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub price: String,
    pub image_url: String,
    pub rating: String,
    pub primary_genre: Option<String>,
    pub in_stock: bool,
}

impl From<&Book> for BookCardView {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.to_string(),
            title: book.details.title.clone(),
            author: book.details.author.clone(),
            price: book.details.price.display(),
            image_url: book.details.image_url.clone(),
            rating: book.details.rating.to_string(),
            primary_genre: book.details.genres.first().cloned(),
            in_stock: book.details.in_stock,
        }
    }
}

/// Query for the catalog page.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub genre: Option<String>,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<BookCardView>,
    pub books: Vec<BookCardView>,
    pub genre: Option<String>,
}

/// Display the catalog.
///
/// The featured shelf is hidden while a genre filter is active.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CatalogQuery>,
) -> Result<HomeTemplate> {
    let genre = query.genre.filter(|g| !g.trim().is_empty());

    let featured = if genre.is_none() {
        state.catalog().list(&BookFilter::featured()).await?
    } else {
        Vec::new()
    };
    let filter = BookFilter {
        featured: None,
        genre: genre.clone(),
    };
    let books = state.catalog().list(&filter).await?;

    Ok(HomeTemplate {
        featured: featured.iter().map(BookCardView::from).collect(),
        books: books.iter().map(BookCardView::from).collect(),
        genre,
    })
}
