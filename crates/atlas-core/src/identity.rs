//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout Atlas. Each
//! identifier is a distinct type; you cannot pass a [`Slug`] where a
//! [`PlaceId`] is expected, even though both are strings underneath.
//!
//! ## Validation
//!
//! String-based identifiers normalize and validate at construction time,
//! and deserialization routes through the same constructors, so an invalid
//! value never reaches the engine. [`RecordId`] is the store's internal
//! numeric key and is valid by construction.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::text::normalize_slug;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

macro_rules! impl_str_newtype {
    ($ty:ident) => {
        impl $ty {
            /// Access the normalized string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Internal record id
// ---------------------------------------------------------------------------

/// The content store's internal key for a record (place, profile, region
/// group). Never shown to editors; relations are stored by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Access the numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Country code
// ---------------------------------------------------------------------------

/// ISO 3166-1 alpha-2 style country code: exactly two ASCII letters,
/// stored uppercase.
///
/// Every syntactically valid code is accepted; codes without a built-in
/// table or stored profile simply resolve to the generic defaults.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CountryCode(String);

impl_validating_deserialize!(CountryCode);
impl_str_newtype!(CountryCode);

impl CountryCode {
    /// Create a country code, trimming and uppercasing the input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCountryCode`] unless the normalized
    /// value is exactly two ASCII letters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.len() != 2 || !normalized.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCountryCode(raw));
        }
        Ok(Self(normalized))
    }
}

// ---------------------------------------------------------------------------
// Place id
// ---------------------------------------------------------------------------

/// Globally unique, human-readable, write-once key of a place
/// (e.g. `city-tr-antalya`). Surrounding whitespace is trimmed; the
/// value is otherwise kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlaceId(String);

impl_validating_deserialize!(PlaceId);
impl_str_newtype!(PlaceId);

impl PlaceId {
    /// Create a place id from a non-blank string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPlaceId`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyPlaceId);
        }
        Ok(Self(trimmed.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Slug
// ---------------------------------------------------------------------------

/// Canonical URL-safe identifier of a place. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Slug(String);

impl_validating_deserialize!(Slug);
impl_str_newtype!(Slug);

impl Slug {
    /// Normalize and wrap a slug.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySlug`] when normalization leaves
    /// nothing.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        Self::normalize(&raw).ok_or(ValidationError::EmptySlug(raw))
    }

    /// Normalize a slug, treating blank results as absent.
    pub fn normalize(value: &str) -> Option<Self> {
        let normalized = normalize_slug(value);
        (!normalized.is_empty()).then_some(Self(normalized))
    }
}

// ---------------------------------------------------------------------------
// Region key
// ---------------------------------------------------------------------------

/// Key of a region group, unique per country (e.g. `tr-aegean-region`).
/// Normalized with the same rules as slugs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RegionKey(String);

impl_validating_deserialize!(RegionKey);
impl_str_newtype!(RegionKey);

impl RegionKey {
    /// Normalize and wrap a region key.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyRegionKey`] when normalization leaves
    /// nothing.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        Self::normalize(&raw).ok_or(ValidationError::EmptyRegionKey(raw))
    }

    /// Normalize a region key, treating blank results as absent.
    pub fn normalize(value: &str) -> Option<Self> {
        let normalized = normalize_slug(value);
        (!normalized.is_empty()).then_some(Self(normalized))
    }
}
