//! Cart line quantities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero and negative quantities are not quantities.
    #[error("quantity must be a positive integer (got {0})")]
    NotPositive(i64),
    /// Larger than a cart line can hold.
    #[error("quantity must be at most {max} (got {value})")]
    TooLarge {
        /// The rejected value.
        value: i64,
        /// Largest allowed value.
        max: i32,
    },
}

/// A positive number of copies on a cart line.
///
/// Stored as a 32-bit integer, matching the `INTEGER` column it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// A single copy.
    pub const ONE: Self = Self(1);

    /// Create a new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] for values below one and
    /// [`QuantityError::TooLarge`] for values that do not fit an `i32`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value <= 0 {
            return Err(QuantityError::NotPositive(value));
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge {
                value,
                max: i32::MAX,
            })
    }

    /// The quantity as stored.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// The quantity as an unsigned count, for totals.
    #[must_use]
    #[allow(clippy::cast_sign_loss)] // always positive by construction
    pub const fn as_u32(&self) -> u32 {
        self.0 as u32
    }

    /// Merge another addition into this quantity.
    ///
    /// Returns `None` if the sum would not fit.
    #[must_use]
    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_values() {
        assert_eq!(Quantity::new(1).unwrap(), Quantity::ONE);
        assert_eq!(Quantity::new(42).unwrap().get(), 42);
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::new(-2), Err(QuantityError::NotPositive(-2)));
    }

    #[test]
    fn test_too_large_rejected() {
        let value = i64::from(i32::MAX) + 1;
        assert!(matches!(
            Quantity::new(value),
            Err(QuantityError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_checked_add() {
        let two = Quantity::new(2).unwrap();
        let three = Quantity::new(3).unwrap();
        assert_eq!(two.checked_add(three).unwrap().get(), 5);

        let max = Quantity::new(i64::from(i32::MAX)).unwrap();
        assert!(max.checked_add(Quantity::ONE).is_none());
    }

    #[test]
    fn test_serde() {
        let quantity: Quantity = serde_json::from_str("3").unwrap();
        assert_eq!(quantity.get(), 3);
        assert_eq!(serde_json::to_string(&quantity).unwrap(), "3");
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }
}
