//! Review accessor.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use folio_core::{BookId, ReviewId};

use super::ServiceError;
use crate::db::ReviewStore;
use crate::models::{NewReview, Review, ReviewChanges, ReviewDraft, ReviewUpdate};

/// CRUD over the review collection.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewStore>,
}

fn parse_review_id(raw: &str) -> Option<ReviewId> {
    ReviewId::parse(raw)
        .inspect_err(|e| debug!(error = %e, "Rejected malformed review id"))
        .ok()
}

/// Translate a book reference at the write boundary.
fn translate_book_id(raw: &str) -> Result<BookId, ServiceError> {
    BookId::parse(raw).map_err(|_| ServiceError::InvalidIdentifier(raw.to_owned()))
}

impl ReviewService {
    #[must_use]
    pub fn new(reviews: Arc<dyn ReviewStore>) -> Self {
        Self { reviews }
    }

    /// Every review, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn list_all(&self) -> Result<Vec<Review>, ServiceError> {
        Ok(self.reviews.list().await?)
    }

    /// A single review. Malformed ids are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn get_by_id(&self, raw_id: &str) -> Result<Option<Review>, ServiceError> {
        let Some(id) = parse_review_id(raw_id) else {
            return Ok(None);
        };
        Ok(self.reviews.get(id).await?)
    }

    /// Reviews of one book, newest first.
    ///
    /// Returns `None` for a malformed book id; an empty list means the
    /// book has no reviews.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn list_by_book(&self, raw_book_id: &str) -> Result<Option<Vec<Review>>, ServiceError> {
        let Ok(book_id) = BookId::parse(raw_book_id) else {
            debug!(book_id = raw_book_id, "Rejected malformed book id");
            return Ok(None);
        };
        Ok(Some(self.reviews.list_by_book(book_id).await?))
    }

    /// Store a review, stamping its creation time.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidIdentifier` if `book_id` is malformed,
    /// or `ServiceError::Storage` if the store fails.
    #[instrument(skip(self, review), fields(book_id = %review.book_id))]
    pub async fn create(&self, review: NewReview) -> Result<Review, ServiceError> {
        let draft = ReviewDraft {
            book_id: translate_book_id(&review.book_id)?,
            author_name: review.author_name,
            rating: review.rating,
            title: review.title,
            comment: review.comment,
            verified_purchase: review.verified_purchase.unwrap_or(false),
            created_at: Utc::now(),
        };
        let created = self.reviews.insert(&draft).await?;
        info!(review_id = %created.id, "Review created");
        Ok(created)
    }

    /// Merge the present fields of `update` into a review.
    ///
    /// A malformed `book_id` rejects the whole call before anything is
    /// written. Returns `None` when the review id is malformed or absent.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidIdentifier` for a malformed `book_id`,
    /// or `ServiceError::Storage` if the store fails.
    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        raw_id: &str,
        update: ReviewUpdate,
    ) -> Result<Option<Review>, ServiceError> {
        let book_id = update
            .book_id
            .as_deref()
            .map(translate_book_id)
            .transpose()?;
        let Some(id) = parse_review_id(raw_id) else {
            return Ok(None);
        };

        let changes = ReviewChanges {
            book_id,
            author_name: update.author_name,
            rating: update.rating,
            title: update.title,
            comment: update.comment,
            verified_purchase: update.verified_purchase,
        };
        let updated = self.reviews.update(id, &changes).await?;
        if updated.is_some() {
            info!(review_id = %id, "Review updated");
        }
        Ok(updated)
    }

    /// Returns `true` if a review was deleted.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, raw_id: &str) -> Result<bool, ServiceError> {
        let Some(id) = parse_review_id(raw_id) else {
            return Ok(false);
        };
        let deleted = self.reviews.delete(id).await?;
        if deleted {
            info!(review_id = %id, "Review deleted");
        }
        Ok(deleted)
    }
}
