//! Star ratings for books and reviews.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a rating.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The value falls outside the allowed range.
    #[error("rating must be between {min} and {max} (got {value})")]
    OutOfRange {
        /// The rejected value.
        value: String,
        /// Lowest allowed value.
        min: u8,
        /// Highest allowed value.
        max: u8,
    },

    /// More decimal places than the rating carries.
    #[error("rating cannot have more than {max} decimal place (got {value})")]
    TooPrecise {
        /// The rejected value.
        value: String,
        /// Most decimal places allowed.
        max: u32,
    },
}

/// Aggregate catalog rating of a book, `0.0` to `5.0` inclusive, in tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct BookRating(Decimal);

impl BookRating {
    /// Highest possible rating.
    pub const MAX: u8 = 5;

    /// Decimal places a rating may carry.
    pub const SCALE: u32 = 1;

    /// Create a new book rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] outside `0..=5` and
    /// [`RatingError::TooPrecise`] for anything finer than tenths.
    pub fn new(value: Decimal) -> Result<Self, RatingError> {
        if value.normalize().scale() > Self::SCALE {
            return Err(RatingError::TooPrecise {
                value: value.to_string(),
                max: Self::SCALE,
            });
        }
        if value < Decimal::ZERO || value > Decimal::from(Self::MAX) {
            return Err(RatingError::OutOfRange {
                value: value.to_string(),
                min: 0,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// The rating value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for BookRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl TryFrom<Decimal> for BookRating {
    type Error = RatingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BookRating> for Decimal {
    fn from(rating: BookRating) -> Self {
        rating.0
    }
}

/// A single reviewer's score, 1 to 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ReviewRating(u8);

impl ReviewRating {
    /// Lowest allowed score.
    pub const MIN: u8 = 1;
    /// Highest allowed score.
    pub const MAX: u8 = 5;

    /// Create a new review rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or_else(|| RatingError::OutOfRange {
                value: value.to_string(),
                min: Self::MIN,
                max: Self::MAX,
            })
    }

    /// The number of stars.
    #[must_use]
    pub const fn stars(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for ReviewRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for ReviewRating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReviewRating> for i64 {
    fn from(rating: ReviewRating) -> Self {
        Self::from(rating.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_book_rating_bounds() {
        assert!(BookRating::new(Decimal::ZERO).is_ok());
        assert!(BookRating::new(Decimal::new(5, 0)).is_ok());
        assert!(BookRating::new(Decimal::new(42, 1)).is_ok());
        assert!(BookRating::new(Decimal::new(51, 1)).is_err());
        assert!(BookRating::new(Decimal::new(-1, 1)).is_err());
    }

    #[test]
    fn test_book_rating_is_in_tenths() {
        let err = BookRating::new(Decimal::new(425, 2)).unwrap_err();
        assert!(matches!(err, RatingError::TooPrecise { max: 1, .. }));
        assert!(BookRating::new(Decimal::new(430, 2)).is_ok());
        assert!(serde_json::from_str::<BookRating>("\"4.25\"").is_err());
    }

    #[test]
    fn test_book_rating_display() {
        let rating = BookRating::new(Decimal::new(4, 0)).unwrap();
        assert_eq!(rating.to_string(), "4.0");
    }

    #[test]
    fn test_review_rating_bounds() {
        assert!(ReviewRating::new(0).is_err());
        assert_eq!(ReviewRating::new(1).unwrap().stars(), 1);
        assert_eq!(ReviewRating::new(5).unwrap().stars(), 5);
        assert!(ReviewRating::new(6).is_err());
        assert!(ReviewRating::new(-3).is_err());
        assert!(ReviewRating::new(i64::MAX).is_err());
    }

    #[test]
    fn test_review_rating_error_message() {
        let err = ReviewRating::new(9).unwrap_err();
        assert_eq!(err.to_string(), "rating must be between 1 and 5 (got 9)");
    }

    #[test]
    fn test_review_rating_serde() {
        let rating: ReviewRating = serde_json::from_str("4").unwrap();
        assert_eq!(rating.stars(), 4);
        assert_eq!(serde_json::to_string(&rating).unwrap(), "4");
        assert!(serde_json::from_str::<ReviewRating>("0").is_err());
    }
}
