//! Catalog accessor.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use folio_core::BookId;

use super::ServiceError;
use crate::db::BookStore;
use crate::models::{Book, BookFilter, BookUpdate, NewBook};

/// CRUD over the book collection.
#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn BookStore>,
}

/// Translate a raw book id, logging rejects.
fn parse_book_id(raw: &str) -> Option<BookId> {
    BookId::parse(raw)
        .inspect_err(|e| debug!(error = %e, "Rejected malformed book id"))
        .ok()
}

impl CatalogService {
    #[must_use]
    pub fn new(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }

    /// Every book, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn list_all(&self) -> Result<Vec<Book>, ServiceError> {
        self.list(&BookFilter::default()).await
    }

    /// Books passing `filter`, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, ServiceError> {
        Ok(self.books.list(filter).await?)
    }

    /// A single book. Malformed ids are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn get_by_id(&self, raw_id: &str) -> Result<Option<Book>, ServiceError> {
        let Some(id) = parse_book_id(raw_id) else {
            return Ok(None);
        };
        Ok(self.books.get(id).await?)
    }

    /// The books among `ids` that exist.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn get_many(&self, ids: &[BookId]) -> Result<Vec<Book>, ServiceError> {
        Ok(self.books.get_many(ids).await?)
    }

    /// Add a book under a freshly assigned id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for negative counts, or
    /// `ServiceError::Storage` if the store fails.
    #[instrument(skip(self, book), fields(title = %book.title))]
    pub async fn create(&self, book: NewBook) -> Result<Book, ServiceError> {
        book.validate().map_err(ServiceError::Validation)?;
        let created = self.books.insert(&book).await?;
        info!(book_id = %created.id, "Book created");
        Ok(created)
    }

    /// Merge the present fields of `changes` into a book.
    ///
    /// Returns `None` when the id is malformed or no such book exists.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for negative counts, or
    /// `ServiceError::Storage` if the store fails.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        raw_id: &str,
        changes: BookUpdate,
    ) -> Result<Option<Book>, ServiceError> {
        let Some(id) = parse_book_id(raw_id) else {
            return Ok(None);
        };
        changes.validate().map_err(ServiceError::Validation)?;
        let updated = self.books.update(id, &changes).await?;
        if updated.is_some() {
            info!(book_id = %id, "Book updated");
        }
        Ok(updated)
    }

    /// Returns `true` if a book was deleted. Reviews of the book are kept.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, raw_id: &str) -> Result<bool, ServiceError> {
        let Some(id) = parse_book_id(raw_id) else {
            return Ok(false);
        };
        let deleted = self.books.delete(id).await?;
        if deleted {
            info!(book_id = %id, "Book deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::InMemoryBookStore;
    use crate::models::book::tests::sample_book;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(InMemoryBookStore::new()))
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let catalog = service();
        let input = sample_book("The Dispossessed");

        let created = catalog.create(input.clone()).await.unwrap();
        let fetched = catalog
            .get_by_id(&created.id.to_string())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched.details, input);
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn test_malformed_ids_read_as_missing() {
        let catalog = service();
        catalog.create(sample_book("x")).await.unwrap();

        for raw in ["", "B1", "not-a-uuid", "67e55044-10b1-426f-9247-bb680e5fe0cZ"] {
            assert!(catalog.get_by_id(raw).await.unwrap().is_none());
            assert!(
                catalog
                    .update(raw, BookUpdate::default())
                    .await
                    .unwrap()
                    .is_none()
            );
            assert!(!catalog.delete(raw).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let catalog = service();
        let created = catalog.create(sample_book("Old")).await.unwrap();
        let changes = BookUpdate {
            title: Some("New".to_owned()),
            ..BookUpdate::default()
        };

        let updated = catalog
            .update(&created.id.to_string(), changes)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.details.title, "New");
        assert_eq!(updated.details.author, created.details.author);
    }

    #[tokio::test]
    async fn test_create_rejects_negative_page_count() {
        let mut book = sample_book("x");
        book.page_count = -3;
        let result = service().create(book).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_absent_is_false() {
        let catalog = service();
        let id = BookId::generate().to_string();
        assert!(!catalog.delete(&id).await.unwrap());
    }
}
