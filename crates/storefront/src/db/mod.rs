//! Storage for the storefront.
//!
//! # Database: `folio` (`PostgreSQL`, schema `storefront`)
//!
//! ## Tables
//!
//! - `book` - Catalog records
//! - `review` - Reviews; `book_id` is a plain reference with no foreign key,
//!   so deleting a book does not touch its reviews
//! - `cart_line` - The global cart, `UNIQUE (book_id)`
//!
//! # Stores
//!
//! Each collection sits behind an object-safe store trait so the services
//! do not care where data lives. [`Storage::postgres`] wires the
//! `PostgreSQL` repositories around one shared pool; [`Storage::in_memory`]
//! wires the in-memory stores used for development and tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p folio-cli -- migrate
//! ```

pub mod books;
pub mod cart;
pub mod memory;
pub mod reviews;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use folio_core::{BookId, CartLineId, Quantity, ReviewId};

pub use books::{BookRepository, insert_book};
pub use cart::CartRepository;
pub use memory::{InMemoryBookStore, InMemoryCartStore, InMemoryReviewStore};
pub use reviews::{ReviewRepository, insert_review};

use crate::models::{
    Book, BookFilter, BookUpdate, CartLine, NewBook, Review, ReviewChanges, ReviewDraft,
};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., cart quantity overflow).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// This is the one storage handle for the process. Create it once at
/// startup and hand clones to the repositories; clones share connections.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Catalog storage.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books passing `filter`, ordered by title.
    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, RepositoryError>;

    /// A single book.
    async fn get(&self, id: BookId) -> Result<Option<Book>, RepositoryError>;

    /// Every book among `ids` that exists, in no particular order.
    async fn get_many(&self, ids: &[BookId]) -> Result<Vec<Book>, RepositoryError>;

    /// Insert a book under a freshly assigned id.
    async fn insert(&self, book: &NewBook) -> Result<Book, RepositoryError>;

    /// Merge the present fields of `changes` into a book.
    ///
    /// Returns `None` if no book has this id.
    async fn update(
        &self,
        id: BookId,
        changes: &BookUpdate,
    ) -> Result<Option<Book>, RepositoryError>;

    /// Returns `true` if a book was deleted.
    async fn delete(&self, id: BookId) -> Result<bool, RepositoryError>;
}

/// Review storage.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// All reviews, newest first.
    async fn list(&self) -> Result<Vec<Review>, RepositoryError>;

    /// Reviews of one book, newest first.
    async fn list_by_book(&self, book_id: BookId) -> Result<Vec<Review>, RepositoryError>;

    async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError>;

    /// Insert a review under a freshly assigned id.
    async fn insert(&self, draft: &ReviewDraft) -> Result<Review, RepositoryError>;

    /// Returns `None` if no review has this id.
    async fn update(
        &self,
        id: ReviewId,
        changes: &ReviewChanges,
    ) -> Result<Option<Review>, RepositoryError>;

    /// Returns `true` if a review was deleted.
    async fn delete(&self, id: ReviewId) -> Result<bool, RepositoryError>;
}

/// Cart storage.
///
/// Implementations must keep at most one line per book, including under
/// concurrent [`CartStore::merge`] calls.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// All lines, oldest first.
    async fn list(&self) -> Result<Vec<CartLine>, RepositoryError>;

    /// Add `quantity` copies of a book as one atomic step.
    ///
    /// Creates the line (stamped `added_at`) if the book is not in the cart,
    /// otherwise adds to the existing line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the merged quantity overflows.
    async fn merge(
        &self,
        book_id: BookId,
        quantity: Quantity,
        added_at: DateTime<Utc>,
    ) -> Result<CartLine, RepositoryError>;

    /// Overwrite a line's quantity. Returns `None` if no line has this id.
    async fn set_quantity(
        &self,
        id: CartLineId,
        quantity: Quantity,
    ) -> Result<Option<CartLine>, RepositoryError>;

    /// Returns `true` if a line was deleted.
    async fn remove(&self, id: CartLineId) -> Result<bool, RepositoryError>;

    /// Delete every line, returning how many there were.
    async fn clear(&self) -> Result<u64, RepositoryError>;
}

/// The storefront's stores, shared by reference across handlers.
#[derive(Clone)]
pub struct Storage {
    pub books: Arc<dyn BookStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub cart: Arc<dyn CartStore>,
    pool: Option<PgPool>,
}

impl Storage {
    /// `PostgreSQL`-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            books: Arc::new(BookRepository::new(pool.clone())),
            reviews: Arc::new(ReviewRepository::new(pool.clone())),
            cart: Arc::new(CartRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Empty in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            books: Arc::new(InMemoryBookStore::new()),
            reviews: Arc::new(InMemoryReviewStore::new()),
            cart: Arc::new(InMemoryCartStore::new()),
            pool: None,
        }
    }

    /// The database pool, if this storage is backed by one.
    #[must_use]
    pub const fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Check that the backing database answers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the ping fails.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
