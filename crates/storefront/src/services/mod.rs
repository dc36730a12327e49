//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `catalog` - Book CRUD over a [`BookStore`](crate::db::BookStore)
//! - `reviews` - Review CRUD and rating summaries
//! - `cart` - The global cart, including the add-or-merge rule
//!
//! Services take raw external identifiers and translate them before any
//! storage call. A malformed identifier never reaches storage: lookups
//! report it as missing (`None` / `false`), writes that must reference a
//! record reject it with [`ServiceError::InvalidIdentifier`].

pub mod cart;
pub mod catalog;
pub mod reviews;

use thiserror::Error;

use crate::db::RepositoryError;

pub use cart::{CartService, SetQuantityOutcome};
pub use catalog::CatalogService;
pub use reviews::ReviewService;

/// Errors returned by the storefront services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// External identifier failed the format check.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Cart quantity is not a positive integer, or would overflow.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// A field value the types cannot express was rejected.
    #[error("validation error: {0}")]
    Validation(String),

    /// The underlying store failed.
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}
