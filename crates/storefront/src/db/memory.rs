//! In-memory stores for development and tests.
//!
//! Each store keeps its collection behind a `tokio::sync::RwLock`. Cart
//! merges take the write lock for the whole lookup-then-write sequence,
//! which serializes concurrent adds the same way the `PostgreSQL` upsert
//! does.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use folio_core::{BookId, CartLineId, Quantity, ReviewId};

use super::{BookStore, CartStore, RepositoryError, ReviewStore};
use crate::models::{
    Book, BookFilter, BookUpdate, CartLine, NewBook, Review, ReviewChanges, ReviewDraft,
};

// =============================================================================
// Books
// =============================================================================

/// Catalog held in a map.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    books: RwLock<HashMap<BookId, Book>>,
}

impl InMemoryBookStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, RepositoryError> {
        let books = self.books.read().await;
        let mut matching: Vec<Book> = books
            .values()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.details
                .title
                .cmp(&b.details.title)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matching)
    }

    async fn get(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[BookId]) -> Result<Vec<Book>, RepositoryError> {
        let books = self.books.read().await;
        Ok(ids.iter().filter_map(|id| books.get(id).cloned()).collect())
    }

    async fn insert(&self, book: &NewBook) -> Result<Book, RepositoryError> {
        let book = Book {
            id: BookId::generate(),
            details: book.clone(),
        };
        self.books.write().await.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update(
        &self,
        id: BookId,
        changes: &BookUpdate,
    ) -> Result<Option<Book>, RepositoryError> {
        let mut books = self.books.write().await;
        Ok(books.get_mut(&id).map(|book| {
            changes.apply(&mut book.details);
            book.clone()
        }))
    }

    async fn delete(&self, id: BookId) -> Result<bool, RepositoryError> {
        Ok(self.books.write().await.remove(&id).is_some())
    }
}

// =============================================================================
// Reviews
// =============================================================================

/// Reviews held in a map.
#[derive(Debug, Default)]
pub struct InMemoryReviewStore {
    reviews: RwLock<HashMap<ReviewId, Review>>,
}

impl InMemoryReviewStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut reviews: Vec<Review>) -> Vec<Review> {
    reviews.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    reviews
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn list(&self) -> Result<Vec<Review>, RepositoryError> {
        let reviews = self.reviews.read().await;
        Ok(newest_first(reviews.values().cloned().collect()))
    }

    async fn list_by_book(&self, book_id: BookId) -> Result<Vec<Review>, RepositoryError> {
        let reviews = self.reviews.read().await;
        Ok(newest_first(
            reviews
                .values()
                .filter(|review| review.book_id == book_id)
                .cloned()
                .collect(),
        ))
    }

    async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        Ok(self.reviews.read().await.get(&id).cloned())
    }

    async fn insert(&self, draft: &ReviewDraft) -> Result<Review, RepositoryError> {
        let review = Review {
            id: ReviewId::generate(),
            book_id: draft.book_id,
            author_name: draft.author_name.clone(),
            rating: draft.rating,
            title: draft.title.clone(),
            comment: draft.comment.clone(),
            created_at: draft.created_at,
            verified_purchase: draft.verified_purchase,
        };
        self.reviews.write().await.insert(review.id, review.clone());
        Ok(review)
    }

    async fn update(
        &self,
        id: ReviewId,
        changes: &ReviewChanges,
    ) -> Result<Option<Review>, RepositoryError> {
        let mut reviews = self.reviews.write().await;
        Ok(reviews.get_mut(&id).map(|review| {
            changes.apply(review);
            review.clone()
        }))
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        Ok(self.reviews.write().await.remove(&id).is_some())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart lines in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    lines: RwLock<Vec<CartLine>>,
}

impl InMemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn list(&self) -> Result<Vec<CartLine>, RepositoryError> {
        Ok(self.lines.read().await.clone())
    }

    async fn merge(
        &self,
        book_id: BookId,
        quantity: Quantity,
        added_at: DateTime<Utc>,
    ) -> Result<CartLine, RepositoryError> {
        let mut lines = self.lines.write().await;

        if let Some(line) = lines.iter_mut().find(|line| line.book_id == book_id) {
            line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                RepositoryError::Conflict(format!(
                    "cart quantity for book {book_id} would overflow"
                ))
            })?;
            return Ok(line.clone());
        }

        let line = CartLine {
            id: CartLineId::generate(),
            book_id,
            quantity,
            added_at,
        };
        lines.push(line.clone());
        Ok(line)
    }

    async fn set_quantity(
        &self,
        id: CartLineId,
        quantity: Quantity,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let mut lines = self.lines.write().await;
        Ok(lines.iter_mut().find(|line| line.id == id).map(|line| {
            line.quantity = quantity;
            line.clone()
        }))
    }

    async fn remove(&self, id: CartLineId) -> Result<bool, RepositoryError> {
        let mut lines = self.lines.write().await;
        let before = lines.len();
        lines.retain(|line| line.id != id);
        Ok(lines.len() < before)
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let mut lines = self.lines.write().await;
        let removed = lines.len() as u64;
        lines.clear();
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::book::tests::sample_book;

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_merge_compounds_into_one_line() {
        let cart = InMemoryCartStore::new();
        let book = BookId::generate();

        let first = cart.merge(book, qty(2), Utc::now()).await.unwrap();
        let second = cart.merge(book, qty(3), Utc::now()).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, qty(5));
        assert_eq!(second.added_at, first.added_at);
        assert_eq!(cart.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_merge_overflow_is_conflict() {
        let cart = InMemoryCartStore::new();
        let book = BookId::generate();
        cart.merge(book, qty(i64::from(i32::MAX)), Utc::now())
            .await
            .unwrap();

        let result = cart.merge(book, qty(1), Utc::now()).await;

        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert_eq!(
            cart.list().await.unwrap()[0].quantity,
            qty(i64::from(i32::MAX))
        );
    }

    #[tokio::test]
    async fn test_concurrent_merges_never_duplicate() {
        let cart = Arc::new(InMemoryCartStore::new());
        let book = BookId::generate();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let cart = Arc::clone(&cart);
                tokio::spawn(async move { cart.merge(book, qty(1), Utc::now()).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let lines = cart.list().await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, qty(32));
    }

    #[tokio::test]
    async fn test_cart_keeps_insertion_order() {
        let cart = InMemoryCartStore::new();
        let a = BookId::generate();
        let b = BookId::generate();
        cart.merge(a, qty(1), Utc::now()).await.unwrap();
        cart.merge(b, qty(1), Utc::now()).await.unwrap();
        cart.merge(a, qty(1), Utc::now()).await.unwrap();

        let order: Vec<BookId> = cart
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.book_id)
            .collect();
        assert_eq!(order, vec![a, b]);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let cart = InMemoryCartStore::new();
        let line = cart
            .merge(BookId::generate(), qty(1), Utc::now())
            .await
            .unwrap();
        cart.merge(BookId::generate(), qty(1), Utc::now())
            .await
            .unwrap();

        assert!(cart.remove(line.id).await.unwrap());
        assert!(!cart.remove(line.id).await.unwrap());
        assert_eq!(cart.clear().await.unwrap(), 1);
        assert_eq!(cart.clear().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_books_list_sorted_and_filtered() {
        let store = InMemoryBookStore::new();
        let mut featured = sample_book("Middlemarch");
        featured.featured = true;
        store.insert(&sample_book("Wolf Hall")).await.unwrap();
        store.insert(&featured).await.unwrap();
        store.insert(&sample_book("Beloved")).await.unwrap();

        let titles: Vec<String> = store
            .list(&BookFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.details.title)
            .collect();
        assert_eq!(titles, vec!["Beloved", "Middlemarch", "Wolf Hall"]);

        let featured = store.list(&BookFilter::featured()).await.unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].details.title, "Middlemarch");
    }

    #[tokio::test]
    async fn test_book_update_missing_returns_none() {
        let store = InMemoryBookStore::new();
        let result = store
            .update(BookId::generate(), &BookUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
