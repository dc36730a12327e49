//! Seed the storefront database with books and reviews.
//!
//! This command reads a YAML seed file, validates it as a whole, and only
//! then connects to the database. Books are listed under a file-local `key`;
//! reviews name their book by that key. Every book receives a fresh id on
//! insert and its reviews are rewritten to point at it.
//!
//! ```yaml
//! books:
//!   - key: left-hand
//!     title: The Left Hand of Darkness
//!     # ... every other book attribute
//! reviews:
//!   - book: left-hand
//!     authorName: Sam
//!     rating: 5
//!     title: Still great
//!     comment: Holds up on every reread.
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use folio_core::{BookId, ReviewRating};
use folio_storefront::config::StorefrontConfig;
use folio_storefront::db::{self, RepositoryError, insert_book, insert_review};
use folio_storefront::models::{NewBook, ReviewDraft};

/// A parsed seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub books: Vec<SeedBook>,
    #[serde(default)]
    pub reviews: Vec<SeedReview>,
}

/// A book under its file-local key.
#[derive(Debug, Deserialize)]
pub struct SeedBook {
    pub key: String,
    #[serde(flatten)]
    pub book: NewBook,
}

/// A review naming its book by seed key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReview {
    pub book: String,
    pub author_name: String,
    pub rating: ReviewRating,
    pub title: String,
    pub comment: String,
    #[serde(default)]
    pub verified_purchase: bool,
    /// Defaults to the time of seeding.
    pub created_at: Option<DateTime<Utc>>,
}

/// Check a seed file without touching the database.
///
/// Reports every problem rather than stopping at the first one.
#[must_use]
pub fn validate_seed(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut keys = HashSet::new();

    for entry in &seed.books {
        if !keys.insert(entry.key.as_str()) {
            errors.push(format!("duplicate book key '{}'", entry.key));
        }
        if let Err(msg) = entry.book.validate() {
            errors.push(format!("book '{}': {msg}", entry.key));
        }
    }

    for (index, review) in seed.reviews.iter().enumerate() {
        if !keys.contains(review.book.as_str()) {
            errors.push(format!(
                "review #{} references unknown book key '{}'",
                index + 1,
                review.book
            ));
        }
    }

    errors
}

/// Rewrite reviews against the ids assigned to their books.
///
/// Reviews whose key has no id are skipped; [`validate_seed`] rules those out.
#[must_use]
pub fn remap_reviews(
    reviews: &[SeedReview],
    ids: &HashMap<String, BookId>,
    now: DateTime<Utc>,
) -> Vec<ReviewDraft> {
    reviews
        .iter()
        .filter_map(|review| {
            let book_id = *ids.get(&review.book)?;
            Some(ReviewDraft {
                book_id,
                author_name: review.author_name.clone(),
                rating: review.rating,
                title: review.title.clone(),
                comment: review.comment.clone(),
                verified_purchase: review.verified_purchase,
                created_at: review.created_at.unwrap_or(now),
            })
        })
        .collect()
}

/// Rows written by [`load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCounts {
    pub books: usize,
    pub reviews: usize,
}

/// Write a validated seed in a single transaction.
///
/// With `reset`, the truncate runs in the same transaction, so a failed
/// insert leaves the previous catalog in place.
///
/// # Errors
///
/// Returns an error if any statement fails; nothing is committed.
pub async fn load(
    pool: &PgPool,
    seed: &SeedFile,
    reset: bool,
    now: DateTime<Utc>,
) -> Result<SeedCounts, RepositoryError> {
    let mut tx = pool.begin().await?;

    if reset {
        sqlx::query("TRUNCATE storefront.cart_line, storefront.review, storefront.book")
            .execute(&mut *tx)
            .await?;
        info!("Cleared books, reviews, and cart");
    }

    let mut ids = HashMap::with_capacity(seed.books.len());
    for entry in &seed.books {
        let book = insert_book(&mut *tx, &entry.book).await?;
        ids.insert(entry.key.clone(), book.id);
    }

    let drafts = remap_reviews(&seed.reviews, &ids, now);
    for draft in &drafts {
        insert_review(&mut *tx, draft).await?;
    }

    tx.commit().await?;

    Ok(SeedCounts {
        books: ids.len(),
        reviews: drafts.len(),
    })
}

/// Seed books and reviews from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML seed file
/// * `reset` - If true, delete existing books, reviews, and cart lines first
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or fails validation, or database operations fail.
pub async fn catalog(file_path: &str, reset: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;

    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    info!(
        books = seed.books.len(),
        reviews = seed.reviews.len(),
        "Parsed seed file"
    );

    let errors = validate_seed(&seed);
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!("Seed file validated successfully");

    let pool = db::create_pool(&config.database_url, 2).await?;
    info!("Connected to database");

    let counts = load(&pool, &seed, reset, Utc::now()).await?;
    info!(
        books = counts.books,
        reviews = counts.reviews,
        "Inserted books and reviews"
    );

    info!("Seeding complete");
    Ok(())
}
