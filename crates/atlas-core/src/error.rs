//! # Error Types: Shared Error Vocabulary
//!
//! Defines the error types shared by every Atlas crate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Each crate owns a structured error enum for its own failures
//!   (`ProfileError`, `WriteError`), and every variant maps to exactly one
//!   [`ErrorKind`]. The kind is the machine-distinguishable part of a failure;
//!   the `Display` output is the human message surfaced to editors.
//! - Identifier validation failures carry the offending raw input.

use thiserror::Error;

/// Machine-distinguishable classification of every failure the engine raises.
///
/// Callers (HTTP handlers, CLIs, batch importers) branch on the kind rather
/// than on message text. The snake_case identifier from [`ErrorKind::as_str`]
/// is stable and suitable for wire payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// The place type is not enabled for the country.
    LevelDisabled,
    /// The place names itself as parent.
    SelfParent,
    /// A country-level place was given a parent.
    CountryCannotHaveParent,
    /// A non-root place has no resolvable parent.
    ParentRequired,
    /// The parent's type is not permitted for the child's type.
    ParentTypeNotAllowed,
    /// Parent and child belong to different countries.
    CountryMismatch,
    /// The ancestor chain loops back on itself or exceeds the depth bound.
    CycleDetected,
    /// A latitude/longitude value is not a finite number.
    InvalidCoordinate,
    /// The derived region key has no region group in the country.
    RegionGroupMissing,
    /// A write attempted to change a stored slug.
    SlugImmutable,
    /// A write attempted to change a stored place_id.
    PlaceIdImmutable,
    /// A country profile belongs to a different country than requested.
    ProfileCountryConflict,
    /// A parent reference does not match any stored place.
    ParentNotFound,
    /// A required field is absent from both the candidate and the stored record.
    MissingField,
    /// An identifier failed format validation.
    InvalidIdentifier,
    /// Another place already holds the place_id.
    DuplicatePlaceId,
    /// Another place in the same country already holds the slug.
    DuplicateSlug,
    /// Another region group in the same country already holds the key.
    DuplicateRegionKey,
    /// A client-supplied region group id does not match any stored group.
    RegionGroupNotFound,
    /// A country profile document violates its structural rules.
    InvalidProfile,
    /// The backing store failed to answer a lookup.
    Store,
}

impl ErrorKind {
    /// Returns the stable snake_case identifier for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LevelDisabled => "level_disabled",
            Self::SelfParent => "self_parent",
            Self::CountryCannotHaveParent => "country_cannot_have_parent",
            Self::ParentRequired => "parent_required",
            Self::ParentTypeNotAllowed => "parent_type_not_allowed",
            Self::CountryMismatch => "country_mismatch",
            Self::CycleDetected => "cycle_detected",
            Self::InvalidCoordinate => "invalid_coordinate",
            Self::RegionGroupMissing => "region_group_missing",
            Self::SlugImmutable => "slug_immutable",
            Self::PlaceIdImmutable => "place_id_immutable",
            Self::ProfileCountryConflict => "profile_country_conflict",
            Self::ParentNotFound => "parent_not_found",
            Self::MissingField => "missing_field",
            Self::InvalidIdentifier => "invalid_identifier",
            Self::DuplicatePlaceId => "duplicate_place_id",
            Self::DuplicateSlug => "duplicate_slug",
            Self::DuplicateRegionKey => "duplicate_region_key",
            Self::RegionGroupNotFound => "region_group_not_found",
            Self::InvalidProfile => "invalid_profile",
            Self::Store => "store",
        }
    }

    /// Whether a caller may reasonably retry after an editor fixes a
    /// missing dependency (creates the parent or the region group).
    pub fn is_dependency_gap(&self) -> bool {
        matches!(self, Self::RegionGroupMissing | Self::ParentNotFound)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by validating constructors of identifier newtypes and by
/// place-type parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Country codes must be exactly two ASCII letters.
    #[error("country_code must be a two-letter uppercase code, got {0:?}")]
    InvalidCountryCode(String),

    /// Place identifiers must be non-blank.
    #[error("place_id must not be blank")]
    EmptyPlaceId,

    /// Slugs must contain at least one `[a-z0-9]` character after normalization.
    #[error("slug {0:?} normalizes to an empty value")]
    EmptySlug(String),

    /// Region keys must contain at least one `[a-z0-9]` character after normalization.
    #[error("region_key {0:?} normalizes to an empty value")]
    EmptyRegionKey(String),

    /// The string is not one of the recognized place types.
    #[error("place_type must be one of: {expected}, got {got:?}")]
    UnknownPlaceType {
        /// The rejected input.
        got: String,
        /// Comma-separated list of accepted identifiers.
        expected: String,
    },
}

impl ValidationError {
    /// The error kind for this failure.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidIdentifier
    }
}

/// Error raised by a backing store while answering a lookup.
///
/// The engine never interprets these; they abort the write and surface
/// verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store is unreachable or refused the query.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded into its typed form.
    #[error("corrupt record {record}: {reason}")]
    Corrupt {
        /// Identifier of the offending record.
        record: String,
        /// Why decoding failed.
        reason: String,
    },
}

impl StoreError {
    /// The error kind for this failure.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Store
    }
}
