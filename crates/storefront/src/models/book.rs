//! Catalog domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use folio_core::{BookId, BookRating, Price};

/// A catalog record.
///
/// The identifier is assigned on insert and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique book ID.
    pub id: BookId,
    /// Everything else about the book.
    #[serde(flatten)]
    pub details: NewBook,
}

/// A book without an identifier, as submitted for creation.
///
/// Every attribute is required; there are no defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: Price,
    /// Cover image URL or static path.
    pub image_url: String,
    pub isbn: String,
    /// Ordered genre tags; the first is the primary genre.
    pub genres: Vec<String>,
    /// Free-text tags.
    pub tags: Vec<String>,
    pub published_date: NaiveDate,
    pub page_count: i32,
    pub language: String,
    pub publisher: String,
    /// Aggregate rating, 0 to 5.
    pub rating: BookRating,
    pub review_count: i32,
    pub in_stock: bool,
    pub featured: bool,
}

impl NewBook {
    /// Check the attributes the value types cannot express.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        validate_counts(Some(self.page_count), Some(self.review_count))
    }
}

/// A partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookUpdate {
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

impl BookUpdate {
    /// Check the attributes the value types cannot express.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        validate_counts(self.page_count, self.review_count)
    }

    /// Apply this update to an existing record.
    pub fn apply(&self, book: &mut NewBook) {
        fn set<T: Clone>(target: &mut T, value: Option<&T>) {
            if let Some(v) = value {
                target.clone_from(v);
            }
        }

        set(&mut book.title, self.title.as_ref());
        set(&mut book.author, self.author.as_ref());
        set(&mut book.description, self.description.as_ref());
        set(&mut book.price, self.price.as_ref());
        set(&mut book.image_url, self.image_url.as_ref());
        set(&mut book.isbn, self.isbn.as_ref());
        set(&mut book.genres, self.genres.as_ref());
        set(&mut book.tags, self.tags.as_ref());
        set(&mut book.published_date, self.published_date.as_ref());
        set(&mut book.page_count, self.page_count.as_ref());
        set(&mut book.language, self.language.as_ref());
        set(&mut book.publisher, self.publisher.as_ref());
        set(&mut book.rating, self.rating.as_ref());
        set(&mut book.review_count, self.review_count.as_ref());
        set(&mut book.in_stock, self.in_stock.as_ref());
        set(&mut book.featured, self.featured.as_ref());
    }
}

fn validate_counts(page_count: Option<i32>, review_count: Option<i32>) -> Result<(), String> {
    if page_count.is_some_and(|n| n < 0) {
        return Err("pageCount cannot be negative".to_owned());
    }
    if review_count.is_some_and(|n| n < 0) {
        return Err("reviewCount cannot be negative".to_owned());
    }
    Ok(())
}

/// Catalog listing filter. Empty means everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookFilter {
    /// Only books with this featured flag.
    pub featured: Option<bool>,
    /// Only books tagged with this genre (case-insensitive).
    pub genre: Option<String>,
}

impl BookFilter {
    /// Featured books only.
    #[must_use]
    pub fn featured() -> Self {
        Self {
            featured: Some(true),
            genre: None,
        }
    }

    /// Whether a book passes this filter.
    #[must_use]
    pub fn matches(&self, book: &Book) -> bool {
        let featured_ok = self
            .featured
            .is_none_or(|featured| book.details.featured == featured);
        let genre_ok = self.genre.as_deref().is_none_or(|genre| {
            book.details
                .genres
                .iter()
                .any(|g| g.eq_ignore_ascii_case(genre))
        });
        featured_ok && genre_ok
    }
}
