//! # Place Type: Single Source of Truth
//!
//! Defines the `PlaceType` enum with all 11 levels of the gazetteer
//! hierarchy. This is the ONE definition used across the workspace. Every
//! `match` on `PlaceType` must be exhaustive; adding a level forces policy
//! defaults, validators and audits to handle it at compile time.
//!
//! ## Ordering
//!
//! Variants are declared in canonical order (country first, legacy aliases
//! last). The derived `Ord` follows that order, so `BTreeSet<PlaceType>`
//! iterates the way editors expect to see levels listed.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;

/// Every level a place can occupy in the hierarchy.
///
/// | # | Level | Notes |
/// |---|-------|-------|
/// |  1 | Country | Root of every tree; never has a parent |
/// |  2 | Admin1 | Top-level subdivision (state, province, il) |
/// |  3 | Admin2 | Second-level subdivision (county, ilce) |
/// |  4 | Admin3 | Third-level subdivision |
/// |  5 | Locality | Settlement |
/// |  6 | Neighborhood | Named area inside a settlement |
/// |  7 | Street | |
/// |  8 | Poi | Point of interest |
/// |  9 | AdminArea | Legacy alias kept for existing records |
/// | 10 | City | Legacy alias kept for existing records |
/// | 11 | District | Legacy alias kept for existing records |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceType {
    /// A sovereign country; the root of a tree.
    Country,
    /// First-level administrative subdivision.
    Admin1,
    /// Second-level administrative subdivision.
    Admin2,
    /// Third-level administrative subdivision.
    Admin3,
    /// A settlement.
    Locality,
    /// A named area inside a settlement.
    Neighborhood,
    /// A street.
    Street,
    /// A point of interest.
    Poi,
    /// Legacy generic administrative area.
    AdminArea,
    /// Legacy city level.
    City,
    /// Legacy district level.
    District,
}

/// Total number of place types.
pub const PLACE_TYPE_COUNT: usize = 11;

impl PlaceType {
    /// Returns all place types in canonical order.
    pub fn all() -> &'static [PlaceType] {
        &[
            Self::Country,
            Self::Admin1,
            Self::Admin2,
            Self::Admin3,
            Self::Locality,
            Self::Neighborhood,
            Self::Street,
            Self::Poi,
            Self::AdminArea,
            Self::City,
            Self::District,
        ]
    }

    /// Returns the snake_case identifier for this type.
    ///
    /// Matches the serde serialization format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Admin1 => "admin1",
            Self::Admin2 => "admin2",
            Self::Admin3 => "admin3",
            Self::Locality => "locality",
            Self::Neighborhood => "neighborhood",
            Self::Street => "street",
            Self::Poi => "poi",
            Self::AdminArea => "admin_area",
            Self::City => "city",
            Self::District => "district",
        }
    }

    /// Whether this type is the root of a tree.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Country)
    }

    /// Whether this is one of the legacy aliases retained to avoid a
    /// destructive migration of older records.
    pub fn is_legacy_alias(&self) -> bool {
        match self {
            Self::AdminArea | Self::City | Self::District => true,
            Self::Country
            | Self::Admin1
            | Self::Admin2
            | Self::Admin3
            | Self::Locality
            | Self::Neighborhood
            | Self::Street
            | Self::Poi => false,
        }
    }

    /// Every type except `Country`, in canonical order.
    pub fn non_root() -> impl Iterator<Item = PlaceType> {
        Self::all().iter().copied().filter(|t| !t.is_root())
    }

    fn expected_list() -> String {
        Self::all()
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for PlaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceType {
    type Err = ValidationError;

    /// Parse a place type, ignoring surrounding whitespace and case.
    ///
    /// Stored documents written by hand frequently carry `"Admin1"` or
    /// `" city "`; both resolve to the canonical variant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownPlaceType {
                got: s.to_string(),
                expected: Self::expected_list(),
            })
    }
}

impl<'de> Deserialize<'de> for PlaceType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
