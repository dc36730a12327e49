//! The global cart.
//!
//! Adding a book already in the cart merges into its line instead of
//! creating a second one. The merge itself happens inside
//! [`CartStore::merge`](crate::db::CartStore::merge), which every store
//! implements as one atomic step.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use folio_core::{BookId, CartLineId, Quantity};

use super::ServiceError;
use crate::db::{BookStore, CartStore, RepositoryError};
use crate::models::{CartLine, CartSummary};

/// Result of [`CartService::set_quantity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetQuantityOutcome {
    /// The line now has the requested quantity.
    Updated(CartLine),
    /// A quantity of zero or less removed the line.
    Removed,
    /// No line has this id (or the id was malformed).
    NotFound,
}

/// Cart operations.
#[derive(Clone)]
pub struct CartService {
    cart: Arc<dyn CartStore>,
    books: Arc<dyn BookStore>,
}

fn parse_line_id(raw: &str) -> Option<CartLineId> {
    CartLineId::parse(raw)
        .inspect_err(|e| debug!(error = %e, "Rejected malformed cart line id"))
        .ok()
}

impl CartService {
    #[must_use]
    pub fn new(cart: Arc<dyn CartStore>, books: Arc<dyn BookStore>) -> Self {
        Self { cart, books }
    }

    /// Every line, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn list_cart(&self) -> Result<Vec<CartLine>, ServiceError> {
        Ok(self.cart.list().await?)
    }

    /// Add copies of a book, merging into its existing line if present.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidIdentifier` for a malformed book id,
    /// `ServiceError::InvalidQuantity` if `quantity` is not positive or the
    /// merged total would overflow, or `ServiceError::Storage` if the store
    /// fails.
    #[instrument(skip(self))]
    pub async fn add_or_merge(
        &self,
        raw_book_id: &str,
        quantity: i64,
    ) -> Result<CartLine, ServiceError> {
        let book_id = BookId::parse(raw_book_id)
            .map_err(|_| ServiceError::InvalidIdentifier(raw_book_id.to_owned()))?;
        let quantity =
            Quantity::new(quantity).map_err(|_| ServiceError::InvalidQuantity(quantity))?;

        let line = match self.cart.merge(book_id, quantity, Utc::now()).await {
            Ok(line) => line,
            Err(RepositoryError::Conflict(reason)) => {
                debug!(%reason, "Cart merge rejected");
                return Err(ServiceError::InvalidQuantity(i64::from(quantity.get())));
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            line_id = %line.id,
            book_id = %book_id,
            quantity = line.quantity.get(),
            "Cart line merged"
        );
        Ok(line)
    }

    /// Overwrite a line's quantity; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidIdentifier` for a malformed line id,
    /// `ServiceError::InvalidQuantity` if `quantity` does not fit a cart
    /// line, or `ServiceError::Storage` if the store fails.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        raw_line_id: &str,
        quantity: i64,
    ) -> Result<SetQuantityOutcome, ServiceError> {
        let id = CartLineId::parse(raw_line_id)
            .map_err(|_| ServiceError::InvalidIdentifier(raw_line_id.to_owned()))?;

        if quantity <= 0 {
            let removed = self.cart.remove(id).await?;
            if removed {
                info!(line_id = %id, "Cart line removed by zero quantity");
                return Ok(SetQuantityOutcome::Removed);
            }
            return Ok(SetQuantityOutcome::NotFound);
        }

        let quantity =
            Quantity::new(quantity).map_err(|_| ServiceError::InvalidQuantity(quantity))?;
        match self.cart.set_quantity(id, quantity).await? {
            Some(line) => {
                info!(line_id = %id, quantity = line.quantity.get(), "Cart quantity set");
                Ok(SetQuantityOutcome::Updated(line))
            }
            None => Ok(SetQuantityOutcome::NotFound),
        }
    }

    /// Returns `true` if a line was deleted.
    ///
    /// A malformed id and an absent line both yield `false`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    #[instrument(skip(self))]
    pub async fn remove(&self, raw_line_id: &str) -> Result<bool, ServiceError> {
        let Some(id) = parse_line_id(raw_line_id) else {
            return Ok(false);
        };
        let removed = self.cart.remove(id).await?;
        if removed {
            info!(line_id = %id, "Cart line removed");
        }
        Ok(removed)
    }

    /// Empty the cart, returning how many lines were deleted.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<u64, ServiceError> {
        let count = self.cart.clear().await?;
        info!(count, "Cart cleared");
        Ok(count)
    }

    /// The cart joined with the catalog, with totals.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if either store fails.
    pub async fn summary(&self) -> Result<CartSummary, ServiceError> {
        let lines = self.cart.list().await?;
        if lines.is_empty() {
            return Ok(CartSummary::empty());
        }
        let ids: Vec<BookId> = lines.iter().map(|line| line.book_id).collect();
        let books = self.books.get_many(&ids).await?;
        Ok(CartSummary::build(lines, books))
    }

    /// Total copies across all lines, for the cart badge.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn item_count(&self) -> Result<u64, ServiceError> {
        let lines = self.cart.list().await?;
        Ok(lines
            .iter()
            .map(|line| u64::from(line.quantity.as_u32()))
            .sum())
    }
}
