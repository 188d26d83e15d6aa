//! # Write Errors
//!
//! Every failure aborts the write. Nothing is downgraded to a warning.

use thiserror::Error;

use atlas_core::{
    CountryCode, ErrorKind, PlaceId, PlaceType, RecordId, RegionKey, Slug, StoreError,
    ValidationError,
};
use atlas_profile::ProfileError;

/// Errors raised by the place and region-group write pipelines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WriteError {
    /// The place type is not enabled for the country.
    #[error("place_type {place_type} is not enabled for country {country}")]
    LevelDisabled {
        /// The rejected type.
        place_type: PlaceType,
        /// The country whose profile disabled it.
        country: CountryCode,
    },

    /// The place references itself as parent.
    #[error("a place cannot be its own parent ({place_id})")]
    SelfParent {
        /// The offending place.
        place_id: PlaceId,
    },

    /// A country-level place has a parent.
    #[error("country place_type cannot have a parent ({place_id})")]
    CountryCannotHaveParent {
        /// The offending place.
        place_id: PlaceId,
    },

    /// A place type that must have a parent has none.
    #[error("{place_type} requires parent_place_id (or parent relation)")]
    ParentRequired {
        /// The type lacking a parent.
        place_type: PlaceType,
    },

    /// The parent's type is not permitted for the child's type.
    #[error("{child} cannot be placed under {parent}; allowed parents: {allowed}")]
    ParentTypeNotAllowed {
        /// The child's type.
        child: PlaceType,
        /// The rejected parent type.
        parent: PlaceType,
        /// Comma-separated allowed parent types.
        allowed: String,
    },

    /// Parent and child are in different countries.
    #[error("country_code mismatch: parent country_code is {parent_country}, received {received}")]
    CountryMismatch {
        /// Country of the parent.
        parent_country: CountryCode,
        /// Country of the candidate.
        received: CountryCode,
    },

    /// The ancestor chain loops back or exceeds the configured depth.
    #[error("parent chain of {place_id} forms a cycle or exceeds {limit} levels")]
    CycleDetected {
        /// The candidate place.
        place_id: PlaceId,
        /// The configured depth bound.
        limit: usize,
    },

    /// A coordinate is not a finite number.
    #[error("{field} must be numeric, got {value:?}")]
    InvalidCoordinate {
        /// `lat` or `lng`.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// The derived region key has no region group.
    #[error("region_group '{region_key}' does not exist for country {country}; create it before assigning places")]
    RegionGroupMissing {
        /// The derived key.
        region_key: RegionKey,
        /// The place's country.
        country: CountryCode,
    },

    /// A stored slug would change.
    #[error("slug is immutable once set ({stored}); attempted {attempted}")]
    SlugImmutable {
        /// The stored slug.
        stored: Slug,
        /// The rejected replacement.
        attempted: Slug,
    },

    /// A stored place_id would change.
    #[error("place_id is immutable ({stored}); attempted {attempted}")]
    PlaceIdImmutable {
        /// The stored place_id.
        stored: PlaceId,
        /// The rejected replacement.
        attempted: String,
    },

    /// A parent reference does not resolve.
    #[error("parent reference {reference} does not match any atlas place")]
    ParentNotFound {
        /// The unresolved reference, as written.
        reference: String,
    },

    /// A required field is absent from both candidate and stored record.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Another place already holds the place_id.
    #[error("place_id {place_id} is already used by place {holder}")]
    DuplicatePlaceId {
        /// The contested place_id.
        place_id: PlaceId,
        /// The record that holds it.
        holder: RecordId,
    },

    /// Another place in the country already holds the slug.
    #[error("slug {slug} is already used in {country} by place {holder}")]
    DuplicateSlug {
        /// The contested slug.
        slug: Slug,
        /// The country scope.
        country: CountryCode,
        /// The record that holds it.
        holder: RecordId,
    },

    /// Another region group in the country already holds the key.
    #[error("region_key {region_key} is already used in {country} by region group {holder}")]
    DuplicateRegionKey {
        /// The contested key.
        region_key: RegionKey,
        /// The country scope.
        country: CountryCode,
        /// The record that holds it.
        holder: RecordId,
    },

    /// A client-supplied region group id does not resolve.
    #[error("region group {0} does not exist")]
    RegionGroupNotFound(RecordId),

    /// Country-profile resolution failed.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// An identifier failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WriteError {
    /// The error kind for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LevelDisabled { .. } => ErrorKind::LevelDisabled,
            Self::SelfParent { .. } => ErrorKind::SelfParent,
            Self::CountryCannotHaveParent { .. } => ErrorKind::CountryCannotHaveParent,
            Self::ParentRequired { .. } => ErrorKind::ParentRequired,
            Self::ParentTypeNotAllowed { .. } => ErrorKind::ParentTypeNotAllowed,
            Self::CountryMismatch { .. } => ErrorKind::CountryMismatch,
            Self::CycleDetected { .. } => ErrorKind::CycleDetected,
            Self::InvalidCoordinate { .. } => ErrorKind::InvalidCoordinate,
            Self::RegionGroupMissing { .. } => ErrorKind::RegionGroupMissing,
            Self::SlugImmutable { .. } => ErrorKind::SlugImmutable,
            Self::PlaceIdImmutable { .. } => ErrorKind::PlaceIdImmutable,
            Self::ParentNotFound { .. } => ErrorKind::ParentNotFound,
            Self::MissingField(_) => ErrorKind::MissingField,
            Self::DuplicatePlaceId { .. } => ErrorKind::DuplicatePlaceId,
            Self::DuplicateSlug { .. } => ErrorKind::DuplicateSlug,
            Self::DuplicateRegionKey { .. } => ErrorKind::DuplicateRegionKey,
            Self::RegionGroupNotFound(_) => ErrorKind::RegionGroupNotFound,
            Self::Profile(e) => e.kind(),
            Self::Invalid(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}
