//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),

    /// More decimal places than whole cents.
    #[error("price cannot have more than {max} decimal places (got {value})")]
    TooPrecise {
        /// The rejected amount.
        value: Decimal,
        /// Most decimal places allowed.
        max: u32,
    },

    /// Larger than the catalog can store.
    #[error("price cannot exceed {max} (got {value})")]
    TooLarge {
        /// The rejected amount.
        value: Decimal,
        /// Largest allowed amount.
        max: Decimal,
    },
}

/// A non-negative catalog price in the store currency.
///
/// Catalog prices have at most two decimal places and stay below one
/// hundred million. Line totals built with [`Price::times`] and
/// [`Price::checked_add`] are not bound by that ceiling.
///
/// ```
/// use folio_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(1299, 2)).unwrap();
/// assert_eq!(price.display(), "$12.99");
///
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Decimal places a catalog price may carry.
    pub const SCALE: u32 = 2;

    /// Largest catalog price, `99999999.99`.
    pub const MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero,
    /// [`PriceError::TooPrecise`] for fractions of a cent, and
    /// [`PriceError::TooLarge`] above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise {
                value: amount,
                max: Self::SCALE,
            });
        }
        if amount > Self::MAX {
            return Err(PriceError::TooLarge {
                value: amount,
                max: Self::MAX,
            });
        }
        Ok(Self(amount))
    }

    /// The amount in the currency's standard unit (dollars, not cents).
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line quantity.
    ///
    /// Returns `None` on decimal overflow.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Add two prices, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0.round_dp(2))
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_allowed() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_negative_zero_is_allowed() {
        let neg_zero = Decimal::new(-0, 2);
        assert!(Price::new(neg_zero).is_ok());
    }

    #[test]
    fn test_negative_rejected() {
        let err = Price::new(Decimal::new(-500, 2)).unwrap_err();
        assert_eq!(err, PriceError::Negative(Decimal::new(-500, 2)));
    }

    #[test]
    fn test_display_pads_to_cents() {
        assert_eq!(Price::new(Decimal::new(5, 0)).unwrap().display(), "$5.00");
        assert_eq!(Price::new(Decimal::new(125, 1)).unwrap().display(), "$12.50");
    }

    #[test]
    fn test_fractions_of_a_cent_rejected() {
        let err = Price::new(Decimal::new(12999, 3)).unwrap_err();
        assert!(matches!(err, PriceError::TooPrecise { max: 2, .. }));

        // Trailing zeros are not extra precision
        assert!(Price::new(Decimal::new(12990, 3)).is_ok());
    }

    #[test]
    fn test_max_price() {
        assert_eq!(Price::MAX, Decimal::new(9_999_999_999, 2));
        assert!(Price::new(Price::MAX).is_ok());

        let err = Price::new(Decimal::new(1_000_000_000, 0)).unwrap_err();
        assert!(matches!(err, PriceError::TooLarge { .. }));
        assert!(Price::new(Decimal::new(10_000_000_000, 2)).is_err());
    }

    #[test]
    fn test_line_totals_may_exceed_max() {
        let total = Price::new(Price::MAX).unwrap().times(3).unwrap();
        assert!(total.amount() > Price::MAX);
    }

    #[test]
    fn test_times_and_add() {
        let price = Price::new(Decimal::new(1250, 2)).unwrap();
        let line = price.times(3).unwrap();
        assert_eq!(line.amount(), Decimal::new(3750, 2));
        assert_eq!(
            line.checked_add(price).unwrap().amount(),
            Decimal::new(5000, 2)
        );
    }

    #[test]
    fn test_deserialize_accepts_number_and_string() {
        let from_str: Price = serde_json::from_str("\"12.99\"").unwrap();
        let from_num: Price = serde_json::from_str("12.99").unwrap();
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        let result: Result<Price, _> = serde_json::from_str("-1");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_unstorable_amounts() {
        assert!(serde_json::from_str::<Price>("\"12.999\"").is_err());
        assert!(serde_json::from_str::<Price>("\"1000000000\"").is_err());
    }
}
