//! Cart repository for `PostgreSQL`.
//!
//! The cart holds at most one line per book, enforced by the
//! `UNIQUE (book_id)` constraint on `storefront.cart_line`. Merging is a
//! single upsert statement, so concurrent adds of the same book always
//! compound into one line.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use folio_core::{BookId, CartLineId, Quantity};

use super::{CartStore, RepositoryError};
use crate::models::CartLine;

/// SQLSTATE for `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Internal row type for cart queries.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: CartLineId,
    book_id: BookId,
    quantity: i32,
    added_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(i64::from(row.quantity)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid cart quantity in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            book_id: row.book_id,
            quantity,
            added_at: row.added_at,
        })
    }
}

/// Repository for cart database operations.
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for CartRepository {
    async fn list(&self) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, book_id, quantity, added_at
            FROM storefront.cart_line
            ORDER BY added_at ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    async fn merge(
        &self,
        book_id: BookId,
        quantity: Quantity,
        added_at: DateTime<Utc>,
    ) -> Result<CartLine, RepositoryError> {
        let result = sqlx::query_as::<_, CartLineRow>(
            r"
            INSERT INTO storefront.cart_line (book_id, quantity, added_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (book_id) DO UPDATE
            SET quantity = storefront.cart_line.quantity + EXCLUDED.quantity
            RETURNING id, book_id, quantity, added_at
            ",
        )
        .bind(book_id)
        .bind(quantity.get())
        .bind(added_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row.try_into(),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) => {
                Err(RepositoryError::Conflict(format!(
                    "cart quantity for book {book_id} would overflow"
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set_quantity(
        &self,
        id: CartLineId,
        quantity: Quantity,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            UPDATE storefront.cart_line
            SET quantity = $2
            WHERE id = $1
            RETURNING id, book_id, quantity, added_at
            ",
        )
        .bind(id)
        .bind(quantity.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CartLine::try_from).transpose()
    }

    async fn remove(&self, id: CartLineId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.cart_line WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.cart_line")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
