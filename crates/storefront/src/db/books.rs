//! Book repository for `PostgreSQL`.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use folio_core::{BookId, BookRating, Price};

use super::{BookStore, RepositoryError};
use crate::models::{Book, BookFilter, BookUpdate, NewBook};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for book queries.
#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: BookId,
    title: String,
    author: String,
    description: String,
    price: Decimal,
    image_url: String,
    isbn: String,
    genres: Vec<String>,
    tags: Vec<String>,
    published_date: NaiveDate,
    page_count: i32,
    language: String,
    publisher: String,
    rating: Decimal,
    review_count: i32,
    in_stock: bool,
    featured: bool,
}

impl TryFrom<BookRow> for Book {
    type Error = RepositoryError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        let rating = BookRating::new(row.rating).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid rating in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            details: NewBook {
                title: row.title,
                author: row.author,
                description: row.description,
                price,
                image_url: row.image_url,
                isbn: row.isbn,
                genres: row.genres,
                tags: row.tags,
                published_date: row.published_date,
                page_count: row.page_count,
                language: row.language,
                publisher: row.publisher,
                rating,
                review_count: row.review_count,
                in_stock: row.in_stock,
                featured: row.featured,
            },
        })
    }
}

fn into_books(rows: Vec<BookRow>) -> Result<Vec<Book>, RepositoryError> {
    rows.into_iter().map(Book::try_from).collect()
}

/// Insert a book through any executor, including an open transaction.
///
/// # Errors
///
/// Returns an error if the statement fails or the stored row is invalid.
pub async fn insert_book<'e, E>(executor: E, book: &NewBook) -> Result<Book, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, BookRow>(
        r"
        INSERT INTO storefront.book (
            title, author, description, price, image_url, isbn,
            genres, tags, published_date, page_count, language, publisher,
            rating, review_count, in_stock, featured
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING id, title, author, description, price, image_url, isbn,
                  genres, tags, published_date, page_count, language, publisher,
                  rating, review_count, in_stock, featured
        ",
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.description)
    .bind(book.price.amount())
    .bind(&book.image_url)
    .bind(&book.isbn)
    .bind(&book.genres)
    .bind(&book.tags)
    .bind(book.published_date)
    .bind(book.page_count)
    .bind(&book.language)
    .bind(&book.publisher)
    .bind(book.rating.value())
    .bind(book.review_count)
    .bind(book.in_stock)
    .bind(book.featured)
    .fetch_one(executor)
    .await?;

    row.try_into()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
#[derive(Clone)]
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// Create a new book repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BookRepository {
    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(
            r"
            SELECT id, title, author, description, price, image_url, isbn,
                   genres, tags, published_date, page_count, language, publisher,
                   rating, review_count, in_stock, featured
            FROM storefront.book
            WHERE ($1::boolean IS NULL OR featured = $1)
              AND ($2::text IS NULL OR EXISTS (
                    SELECT 1 FROM unnest(genres) AS g WHERE lower(g) = lower($2)
                  ))
            ORDER BY title ASC, id ASC
            ",
        )
        .bind(filter.featured)
        .bind(filter.genre.as_deref())
        .fetch_all(&self.pool)
        .await?;

        into_books(rows)
    }

    async fn get(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(
            r"
            SELECT id, title, author, description, price, image_url, isbn,
                   genres, tags, published_date, page_count, language, publisher,
                   rating, review_count, in_stock, featured
            FROM storefront.book
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Book::try_from).transpose()
    }

    async fn get_many(&self, ids: &[BookId]) -> Result<Vec<Book>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(BookId::as_uuid).collect();

        let rows = sqlx::query_as::<_, BookRow>(
            r"
            SELECT id, title, author, description, price, image_url, isbn,
                   genres, tags, published_date, page_count, language, publisher,
                   rating, review_count, in_stock, featured
            FROM storefront.book
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        into_books(rows)
    }

    async fn insert(&self, book: &NewBook) -> Result<Book, RepositoryError> {
        insert_book(&self.pool, book).await
    }

    async fn update(
        &self,
        id: BookId,
        changes: &BookUpdate,
    ) -> Result<Option<Book>, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(
            r"
            UPDATE storefront.book
            SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                image_url = COALESCE($6, image_url),
                isbn = COALESCE($7, isbn),
                genres = COALESCE($8, genres),
                tags = COALESCE($9, tags),
                published_date = COALESCE($10, published_date),
                page_count = COALESCE($11, page_count),
                language = COALESCE($12, language),
                publisher = COALESCE($13, publisher),
                rating = COALESCE($14, rating),
                review_count = COALESCE($15, review_count),
                in_stock = COALESCE($16, in_stock),
                featured = COALESCE($17, featured),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, author, description, price, image_url, isbn,
                      genres, tags, published_date, page_count, language, publisher,
                      rating, review_count, in_stock, featured
            ",
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.author)
        .bind(&changes.description)
        .bind(changes.price.map(Decimal::from))
        .bind(&changes.image_url)
        .bind(&changes.isbn)
        .bind(&changes.genres)
        .bind(&changes.tags)
        .bind(changes.published_date)
        .bind(changes.page_count)
        .bind(&changes.language)
        .bind(&changes.publisher)
        .bind(changes.rating.map(Decimal::from))
        .bind(changes.review_count)
        .bind(changes.in_stock)
        .bind(changes.featured)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Book::try_from).transpose()
    }

    async fn delete(&self, id: BookId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.book WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
