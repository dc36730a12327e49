//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::Storage;
use crate::services::{CartService, CatalogService, ReviewService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the storage handle and the services built on it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    storage: Storage,
    catalog: CatalogService,
    reviews: ReviewService,
    cart: CartService,
}

impl AppState {
    /// Create a new application state around an initialized storage handle.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        let catalog = CatalogService::new(Arc::clone(&storage.books));
        let reviews = ReviewService::new(Arc::clone(&storage.reviews));
        let cart = CartService::new(Arc::clone(&storage.cart), Arc::clone(&storage.books));

        Self {
            inner: Arc::new(AppStateInner {
                storage,
                catalog,
                reviews,
                cart,
            }),
        }
    }

    /// Get a reference to the storage handle.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.inner.storage
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the review service.
    #[must_use]
    pub fn reviews(&self) -> &ReviewService {
        &self.inner.reviews
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }
}
