//! Review domain types.
//!
//! A review points at a book by id but does not own or depend on it:
//! deleting a book leaves its reviews in place.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use folio_core::{BookId, ReviewId, ReviewRating};

/// A stored review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Unique review ID.
    pub id: ReviewId,
    /// The reviewed book.
    pub book_id: BookId,
    /// Display name of the reviewer.
    pub author_name: String,
    pub rating: ReviewRating,
    pub title: String,
    pub comment: String,
    /// Set by the server on creation, never updated.
    pub created_at: DateTime<Utc>,
    pub verified_purchase: bool,
}

/// A review as submitted by a caller.
///
/// `book_id` is still the external string; it is translated at the write
/// boundary. Any caller-supplied creation time is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub book_id: String,
    pub author_name: String,
    pub rating: ReviewRating,
    pub title: String,
    pub comment: String,
    /// Defaults to `false` when omitted.
    #[serde(default)]
    pub verified_purchase: Option<bool>,
}

/// A review ready for storage, with translated ids and server-side fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub book_id: BookId,
    pub author_name: String,
    pub rating: ReviewRating,
    pub title: String,
    pub comment: String,
    pub verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

/// A partial update as submitted by a caller; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewUpdate {
    /// External book id; translated before anything is written.
    pub book_id: Option<String>,
    pub author_name: Option<String>,
    pub rating: Option<ReviewRating>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub verified_purchase: Option<bool>,
}

/// A partial update with translated ids, ready for storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewChanges {
    pub book_id: Option<BookId>,
    pub author_name: Option<String>,
    pub rating: Option<ReviewRating>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub verified_purchase: Option<bool>,
}

impl ReviewChanges {
    /// Apply these changes to a stored review.
    pub fn apply(&self, review: &mut Review) {
        if let Some(book_id) = self.book_id {
            review.book_id = book_id;
        }
        if let Some(author_name) = &self.author_name {
            review.author_name.clone_from(author_name);
        }
        if let Some(rating) = self.rating {
            review.rating = rating;
        }
        if let Some(title) = &self.title {
            review.title.clone_from(title);
        }
        if let Some(comment) = &self.comment {
            review.comment.clone_from(comment);
        }
        if let Some(verified) = self.verified_purchase {
            review.verified_purchase = verified;
        }
    }
}

/// Count and mean score of a set of reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub count: usize,
    /// Mean stars rounded to one decimal; `None` without reviews.
    pub average: Option<Decimal>,
}

impl RatingSummary {
    /// Summarize a set of reviews.
    #[must_use]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let count = reviews.len();
        let total: u32 = reviews.iter().map(|r| u32::from(r.rating.stars())).sum();
        let average =
            (count > 0).then(|| (Decimal::from(total) / Decimal::from(count)).round_dp(1));
        Self { count, average }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn review(stars: i64) -> Review {
        Review {
            id: ReviewId::generate(),
            book_id: BookId::generate(),
            author_name: "Reader".to_owned(),
            rating: ReviewRating::new(stars).unwrap(),
            title: "Title".to_owned(),
            comment: "Comment".to_owned(),
            created_at: Utc::now(),
            verified_purchase: false,
        }
    }

    #[test]
    fn test_rating_summary_empty() {
        let summary = RatingSummary::from_reviews(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, None);
    }

    #[test]
    fn test_rating_summary_average() {
        let summary = RatingSummary::from_reviews(&[review(5), review(4), review(4)]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, Some(Decimal::new(43, 1)));
    }

    #[test]
    fn test_changes_leave_book_reference_when_absent() {
        let mut stored = review(3);
        let original_book = stored.book_id;
        let changes = ReviewChanges {
            comment: Some("Changed my mind".to_owned()),
            ..ReviewChanges::default()
        };

        changes.apply(&mut stored);

        assert_eq!(stored.book_id, original_book);
        assert_eq!(stored.comment, "Changed my mind");
    }

    #[test]
    fn test_new_review_ignores_created_at() {
        let json = serde_json::json!({
            "bookId": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "authorName": "Ann",
            "rating": 4,
            "title": "Good",
            "comment": "Liked it",
            "createdAt": "1999-01-01T00:00:00Z"
        });
        let parsed: NewReview = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.verified_purchase, None);
        assert_eq!(parsed.rating.stars(), 4);
    }
}
