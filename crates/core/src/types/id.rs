//! Newtype IDs for type-safe entity references.
//!
//! Every stored entity is keyed by a UUID. Clients only ever see the
//! canonical hyphenated string form; [`is_valid_id`] is the format gate that
//! runs before any lookup, so malformed input never reaches the database.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

use uuid::Uuid;

/// Length of the canonical hyphenated form, e.g. `67e55044-10b1-426f-9247-bb680e5fe0c8`.
pub const ID_LENGTH: usize = 36;

const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Errors that can occur when translating an external identifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input is not a canonical hyphenated UUID.
    #[error("invalid identifier: {0:?}")]
    Invalid(String),
}

/// Check whether `raw` has the shape of an external identifier.
///
/// This is a format check only; it says nothing about whether a record
/// with that identifier exists. Hex digits may be either case.
#[must_use]
pub fn is_valid_id(raw: &str) -> bool {
    raw.len() == ID_LENGTH
        && raw.bytes().enumerate().all(|(i, b)| {
            if HYPHEN_POSITIONS.contains(&i) {
                b == b'-'
            } else {
                b.is_ascii_hexdigit()
            }
        })
}

/// Translate an external identifier into its storage form.
///
/// # Errors
///
/// Returns [`IdError::Invalid`] if the format check fails.
pub fn to_storage_id(raw: &str) -> Result<Uuid, IdError> {
    if !is_valid_id(raw) {
        return Err(IdError::Invalid(raw.to_owned()));
    }
    Uuid::try_parse(raw).map_err(|_| IdError::Invalid(raw.to_owned()))
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`Uuid`] with:
/// - `Serialize`/`Deserialize` as the canonical string (deserializing runs the format check)
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `parse()` (external -> storage), `Display` (storage -> external), `generate()`
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use folio_core::define_id;
/// define_id!(AuthorId);
/// define_id!(ShelfId);
///
/// let author = AuthorId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
/// assert_eq!(author.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = author;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Wrap an already-translated storage identifier.
            #[must_use]
            pub const fn from_uuid(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Translate an external identifier into this ID type.
            ///
            /// # Errors
            ///
            /// Returns `IdError::Invalid` if the format check fails.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                $crate::types::id::to_storage_id(raw).map(Self)
            }

            /// Get the underlying storage identifier.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::core::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::core::result::Result<Self, D::Error> {
                let raw = <::std::borrow::Cow<'de, str> as ::serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                Self::parse(&raw).map_err(::serde::de::Error::custom)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <::uuid::Uuid as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <::uuid::Uuid as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(BookId);
define_id!(ReviewId);
define_id!(CartLineId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    #[test]
    fn test_is_valid_id_accepts_canonical_form() {
        assert!(is_valid_id(SAMPLE));
        assert!(is_valid_id(&SAMPLE.to_uppercase()));
    }

    #[test]
    fn test_is_valid_id_rejects_wrong_length() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("B1"));
        assert!(!is_valid_id(&SAMPLE[..35]));
        assert!(!is_valid_id(&format!("{SAMPLE}0")));
    }

    #[test]
    fn test_is_valid_id_rejects_other_uuid_spellings() {
        // Simple, braced and URN forms parse as UUIDs but are not external ids
        assert!(!is_valid_id("67e5504410b1426f9247bb680e5fe0c8"));
        assert!(!is_valid_id("{67e55044-10b1-426f-9247-bb680e5fe0c8}"));
        assert!(!is_valid_id("urn:uuid:67e55044-10b1-426f-9247-bb680e5fe0c8"));
    }

    #[test]
    fn test_is_valid_id_rejects_bad_charset() {
        assert!(!is_valid_id("67e55044-10b1-426f-9247-bb680e5fe0cz"));
        assert!(!is_valid_id("67e55044_10b1_426f_9247_bb680e5fe0c8"));
        // Multi-byte characters must not be sliced into
        assert!(!is_valid_id("67e55044-10b1-426f-9247-bb680e5fé0c"));
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        let id = BookId::parse(SAMPLE).unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn test_display_is_lowercase() {
        let id = BookId::parse(&SAMPLE.to_uppercase()).unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn test_parse_invalid_carries_input() {
        let err = CartLineId::parse("not-an-id").unwrap_err();
        assert_eq!(err, IdError::Invalid("not-an-id".to_string()));
    }

    #[test]
    fn test_generate_is_valid_and_unique() {
        let a = ReviewId::generate();
        let b = ReviewId::generate();
        assert_ne!(a, b);
        assert!(is_valid_id(&a.to_string()));
    }

    #[test]
    fn test_serde_uses_external_form() {
        let id = BookId::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));

        let parsed: BookId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_deserialize_rejects_malformed() {
        let result: Result<BookId, _> = serde_json::from_str("\"B1\"");
        assert!(result.is_err());
    }
}
