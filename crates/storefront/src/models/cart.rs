//! Cart domain types.
//!
//! The cart is a single process-wide collection with at most one line per
//! book. Adding a book that is already present merges into its line.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use folio_core::{BookId, CartLineId, Price, Quantity};

use super::Book;

/// One entry in the cart, keyed by book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Unique line ID.
    pub id: CartLineId,
    /// The book on this line. Unique across the cart.
    pub book_id: BookId,
    pub quantity: Quantity,
    /// When the line was first created; merges do not touch it.
    pub added_at: DateTime<Utc>,
}

/// A cart line joined with its catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummaryLine {
    #[serde(flatten)]
    pub line: CartLine,
    /// `None` when the book has since been deleted from the catalog.
    pub book: Option<Book>,
    /// Price times quantity; zero for lines without a book.
    pub line_total: Price,
}

/// The whole cart with totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub lines: Vec<CartSummaryLine>,
    /// Sum of quantities across all lines.
    pub item_count: u64,
    pub subtotal: Price,
}

impl CartSummary {
    /// Join cart lines with the books they reference and total them up.
    ///
    /// Line order is preserved. Books not referenced by any line are ignored.
    #[must_use]
    pub fn build(lines: Vec<CartLine>, books: Vec<Book>) -> Self {
        let mut by_id: HashMap<BookId, Book> =
            books.into_iter().map(|book| (book.id, book)).collect();

        let mut item_count = 0_u64;
        let mut subtotal = Price::ZERO;
        let lines = lines
            .into_iter()
            .map(|line| {
                let book = by_id.remove(&line.book_id);
                let line_total = book.as_ref().map_or(Price::ZERO, |b| {
                    b.details
                        .price
                        .times(line.quantity.as_u32())
                        .unwrap_or_else(|| {
                            warn!(line_id = %line.id, "Cart line total overflowed, showing zero");
                            Price::ZERO
                        })
                });

                item_count += u64::from(line.quantity.as_u32());
                subtotal = subtotal.checked_add(line_total).unwrap_or_else(|| {
                    warn!(line_id = %line.id, "Cart subtotal overflowed, line left out");
                    subtotal
                });

                CartSummaryLine {
                    line,
                    book,
                    line_total,
                }
            })
            .collect();

        Self {
            lines,
            item_count,
            subtotal,
        }
    }

    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            lines: Vec::new(),
            item_count: 0,
            subtotal: Price::ZERO,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::book::tests::sample_book;

    fn line(book_id: BookId, quantity: i64) -> CartLine {
        CartLine {
            id: CartLineId::generate(),
            book_id,
            quantity: Quantity::new(quantity).unwrap(),
            added_at: Utc::now(),
        }
    }

    fn book(price_cents: i64) -> Book {
        let mut details = sample_book("Priced");
        details.price = Price::new(Decimal::new(price_cents, 2)).unwrap();
        Book {
            id: BookId::generate(),
            details,
        }
    }

    #[test]
    fn test_build_totals() {
        let a = book(1000);
        let b = book(250);
        let lines = vec![line(a.id, 2), line(b.id, 3)];

        let summary = CartSummary::build(lines, vec![b, a]);

        assert_eq!(summary.item_count, 5);
        assert_eq!(summary.subtotal.amount(), Decimal::new(2750, 2));
        assert_eq!(summary.lines[0].line_total.amount(), Decimal::new(2000, 2));
        assert_eq!(summary.lines[1].line_total.amount(), Decimal::new(750, 2));
    }

    #[test]
    fn test_build_keeps_lines_for_deleted_books() {
        let orphan = line(BookId::generate(), 4);

        let summary = CartSummary::build(vec![orphan.clone()], Vec::new());

        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].line, orphan);
        assert!(summary.lines[0].book.is_none());
        assert_eq!(summary.lines[0].line_total, Price::ZERO);
        assert_eq!(summary.item_count, 4);
        assert_eq!(summary.subtotal, Price::ZERO);
    }

    #[test]
    fn test_build_totals_largest_cart_exactly() {
        let mut priciest = book(0);
        priciest.details.price = Price::new(Price::MAX).unwrap();
        let other = book(1);
        let most = i64::from(i32::MAX);
        let lines = vec![line(priciest.id, most), line(other.id, most)];

        let summary = CartSummary::build(lines, vec![priciest, other]);

        let expected_first = Price::MAX * Decimal::from(most);
        let expected_second = Decimal::new(most, 2);
        assert_eq!(summary.lines[0].line_total.amount(), expected_first);
        assert_eq!(summary.lines[1].line_total.amount(), expected_second);
        assert_eq!(summary.subtotal.amount(), expected_first + expected_second);
        assert_eq!(summary.item_count, 2 * u64::from(u32::try_from(most).unwrap()));
    }

    #[test]
    fn test_empty() {
        let summary = CartSummary::build(Vec::new(), Vec::new());
        assert_eq!(summary, CartSummary::empty());
    }
}
