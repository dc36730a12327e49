//! Domain models for the storefront.
//!
//! These types represent validated domain objects separate from database row types.
//! Identifiers are the typed ids from `folio_core`; they serialize to the
//! external string form, so these models are also the JSON API shapes.

pub mod book;
pub mod cart;
pub mod review;

pub use book::{Book, BookFilter, BookUpdate, NewBook};
pub use cart::{CartLine, CartSummary, CartSummaryLine};
pub use review::{NewReview, RatingSummary, Review, ReviewChanges, ReviewDraft, ReviewUpdate};
