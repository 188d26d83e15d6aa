//! # Profile Errors

use thiserror::Error;

use atlas_core::{CountryCode, ErrorKind, PlaceType, RecordId, StoreError, ValidationError};

/// Errors raised while resolving or normalizing country profiles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// An explicitly referenced profile belongs to another country.
    #[error("country_profile ({profile_id}) belongs to {profile_country}, but the write targets {requested}")]
    CountryConflict {
        /// The referenced profile record.
        profile_id: RecordId,
        /// Country the profile is stored for.
        profile_country: CountryCode,
        /// Country the caller asked for.
        requested: CountryCode,
    },

    /// `enabled_levels` was supplied but contained no levels.
    #[error("enabled_levels must contain at least one valid place type")]
    EmptyEnabledLevels,

    /// A city-like level is not enabled.
    #[error("city_like_levels.{0} must also exist in enabled_levels")]
    CityLikeNotEnabled(PlaceType),

    /// A parent rule is keyed by a level that is not enabled.
    #[error("parent_rules.{0} is defined, but {0} is not enabled")]
    RuleChildNotEnabled(PlaceType),

    /// A parent rule names a parent level that is not enabled.
    #[error("parent_rules.{child} contains parent {parent}, but it is not enabled")]
    RuleParentNotEnabled {
        /// The rule's child level.
        child: PlaceType,
        /// The disabled parent level.
        parent: PlaceType,
    },

    /// An auto-assign table entry has a blank lookup key.
    #[error("region_auto_assign.{table} entries must include a non-empty key")]
    BlankAutoAssignKey {
        /// Name of the offending sub-table.
        table: &'static str,
    },

    /// An identifier in the document failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The profile store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProfileError {
    /// The error kind for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CountryConflict { .. } => ErrorKind::ProfileCountryConflict,
            Self::EmptyEnabledLevels
            | Self::CityLikeNotEnabled(_)
            | Self::RuleChildNotEnabled(_)
            | Self::RuleParentNotEnabled { .. }
            | Self::BlankAutoAssignKey { .. } => ErrorKind::InvalidProfile,
            Self::Invalid(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}
