//! Review repository for `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use folio_core::{BookId, ReviewId, ReviewRating};

use super::{RepositoryError, ReviewStore};
use crate::models::{Review, ReviewChanges, ReviewDraft};

/// Internal row type for review queries.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    book_id: BookId,
    author_name: String,
    rating: i16,
    title: String,
    comment: String,
    created_at: DateTime<Utc>,
    verified_purchase: bool,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = ReviewRating::new(i64::from(row.rating)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid review rating in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            book_id: row.book_id,
            author_name: row.author_name,
            rating,
            title: row.title,
            comment: row.comment,
            created_at: row.created_at,
            verified_purchase: row.verified_purchase,
        })
    }
}

fn into_reviews(rows: Vec<ReviewRow>) -> Result<Vec<Review>, RepositoryError> {
    rows.into_iter().map(Review::try_from).collect()
}

fn rating_column(rating: ReviewRating) -> i16 {
    i16::from(rating.stars())
}

/// Insert a review through any executor.
///
/// # Errors
///
/// Returns an error if the statement fails or the stored row is invalid.
pub async fn insert_review<'e, E>(
    executor: E,
    draft: &ReviewDraft,
) -> Result<Review, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, ReviewRow>(
        r"
        INSERT INTO storefront.review (
            book_id, author_name, rating, title, comment,
            created_at, verified_purchase
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, book_id, author_name, rating, title, comment,
                  created_at, verified_purchase
        ",
    )
    .bind(draft.book_id)
    .bind(&draft.author_name)
    .bind(rating_column(draft.rating))
    .bind(&draft.title)
    .bind(&draft.comment)
    .bind(draft.created_at)
    .bind(draft.verified_purchase)
    .fetch_one(executor)
    .await?;

    row.try_into()
}

/// Repository for review database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for ReviewRepository {
    async fn list(&self) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT id, book_id, author_name, rating, title, comment,
                   created_at, verified_purchase
            FROM storefront.review
            ORDER BY created_at DESC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        into_reviews(rows)
    }

    async fn list_by_book(&self, book_id: BookId) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT id, book_id, author_name, rating, title, comment,
                   created_at, verified_purchase
            FROM storefront.review
            WHERE book_id = $1
            ORDER BY created_at DESC, id ASC
            ",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        into_reviews(rows)
    }

    async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT id, book_id, author_name, rating, title, comment,
                   created_at, verified_purchase
            FROM storefront.review
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Review::try_from).transpose()
    }

    async fn insert(&self, draft: &ReviewDraft) -> Result<Review, RepositoryError> {
        insert_review(&self.pool, draft).await
    }

    async fn update(
        &self,
        id: ReviewId,
        changes: &ReviewChanges,
    ) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            UPDATE storefront.review
            SET
                book_id = COALESCE($2, book_id),
                author_name = COALESCE($3, author_name),
                rating = COALESCE($4, rating),
                title = COALESCE($5, title),
                comment = COALESCE($6, comment),
                verified_purchase = COALESCE($7, verified_purchase)
            WHERE id = $1
            RETURNING id, book_id, author_name, rating, title, comment,
                      created_at, verified_purchase
            ",
        )
        .bind(id)
        .bind(changes.book_id)
        .bind(&changes.author_name)
        .bind(changes.rating.map(rating_column))
        .bind(&changes.title)
        .bind(&changes.comment)
        .bind(changes.verified_purchase)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Review::try_from).transpose()
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.review WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
