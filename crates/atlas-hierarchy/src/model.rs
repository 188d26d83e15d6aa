//! # Place Model
//!
//! Stored records ([`Place`], [`RegionGroup`]), the write candidate as
//! submitted by an editor ([`PlaceWrite`]), and the pipeline's output
//! ([`NormalizedPlace`]).
//!
//! Candidate fields are raw and optional: an update carries only the fields
//! it changes, and identifiers are validated by the pipeline rather than at
//! decode time so the caller gets a typed [`crate::WriteError`]. Place types
//! are the exception. An unrecognized type cannot be represented and fails
//! decoding.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use atlas_core::{
    CountryCode, PlaceId, PlaceType, RecordId, RegionKey, Slug, TranslationRecord,
};

use crate::region::RegionSource;

/// A stored place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Store record id.
    pub id: RecordId,
    /// Globally unique, write-once key.
    pub place_id: PlaceId,
    /// Level of the place.
    pub place_type: PlaceType,
    /// Country the place belongs to.
    pub country_code: CountryCode,
    /// Parent record.
    #[serde(default)]
    pub parent: Option<RecordId>,
    /// Denormalized `place_id` of the parent.
    #[serde(default)]
    pub parent_place_id: Option<PlaceId>,
    /// Canonical slug, write-once.
    #[serde(default)]
    pub slug: Option<Slug>,
    /// Manual region assignment.
    #[serde(default)]
    pub region_override: Option<RegionKey>,
    /// Derived region.
    #[serde(default)]
    pub region: Option<RegionKey>,
    #[serde(default, alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(default, alias = "longitude")]
    pub lng: Option<f64>,
    /// Stored country profile the place was validated against.
    #[serde(default)]
    pub country_profile: Option<RecordId>,
    /// Region groups the place belongs to.
    #[serde(default)]
    pub region_groups: BTreeSet<RecordId>,
    #[serde(default)]
    pub canonical_language: Option<String>,
    #[serde(default)]
    pub translations: Vec<TranslationRecord>,
}

impl Place {
    /// The parent pointer to follow when walking up: the relation if set,
    /// else the denormalized `parent_place_id`.
    pub fn parent_pointer(&self) -> Option<ParentRef> {
        match (&self.parent, &self.parent_place_id) {
            (Some(id), _) => Some(ParentRef::ById(*id)),
            (None, Some(place_id)) => Some(ParentRef::ByPlaceId(place_id.clone())),
            (None, None) => None,
        }
    }
}

/// A named group of places (e.g. `tr-aegean-region`), unique per country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionGroup {
    pub id: RecordId,
    pub region_key: RegionKey,
    pub country_code: CountryCode,
    #[serde(default)]
    pub country_profile: Option<RecordId>,
}

/// A reference to a parent place.
///
/// ```yaml
/// parent: { by_id: 12 }
/// parent: { by_place_id: admin1-tr-antalya }
/// parent: { resolved: { id: 12, place_id: admin1-tr-antalya } }
/// ```
///
/// Exactly one key must be present. The map form is used for both YAML and
/// JSON documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ParentRefMap", into = "ParentRefMap")]
pub enum ParentRef {
    /// By store record id.
    ById(RecordId),
    /// By the parent's `place_id`.
    ByPlaceId(PlaceId),
    /// A previously resolved pair; both halves must still agree with the store.
    Resolved {
        /// Store record id.
        id: RecordId,
        /// The parent's `place_id`.
        place_id: PlaceId,
    },
}

impl ParentRef {
    /// The record id this reference names, if any.
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Self::ById(id) | Self::Resolved { id, .. } => Some(*id),
            Self::ByPlaceId(_) => None,
        }
    }

    /// The `place_id` this reference names, if any.
    pub fn place_id(&self) -> Option<&PlaceId> {
        match self {
            Self::ByPlaceId(place_id) | Self::Resolved { place_id, .. } => Some(place_id),
            Self::ById(_) => None,
        }
    }
}

impl std::fmt::Display for ParentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ById(id) => write!(f, "parent relation id ({id})"),
            Self::ByPlaceId(place_id) => write!(f, "parent_place_id ({place_id})"),
            Self::Resolved { id, place_id } => write!(f, "parent ({id}, {place_id})"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParentRefMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    by_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    by_place_id: Option<PlaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resolved: Option<ResolvedParent>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResolvedParent {
    id: RecordId,
    place_id: PlaceId,
}

impl TryFrom<ParentRefMap> for ParentRef {
    type Error = String;

    fn try_from(map: ParentRefMap) -> Result<Self, Self::Error> {
        match (map.by_id, map.by_place_id, map.resolved) {
            (Some(id), None, None) => Ok(Self::ById(id)),
            (None, Some(place_id), None) => Ok(Self::ByPlaceId(place_id)),
            (None, None, Some(ResolvedParent { id, place_id })) => Ok(Self::Resolved { id, place_id }),
            _ => Err("parent needs exactly one of `by_id`, `by_place_id` or `resolved`".to_string()),
        }
    }
}

impl From<ParentRef> for ParentRefMap {
    fn from(parent: ParentRef) -> Self {
        let mut map = Self {
            by_id: None,
            by_place_id: None,
            resolved: None,
        };
        match parent {
            ParentRef::ById(id) => map.by_id = Some(id),
            ParentRef::ByPlaceId(place_id) => map.by_place_id = Some(place_id),
            ParentRef::Resolved { id, place_id } => map.resolved = Some(ResolvedParent { id, place_id }),
        }
        map
    }
}

/// A coordinate as submitted: a number, or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCoordinate {
    Number(f64),
    Text(String),
}

/// A create or update request for a place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceWrite {
    pub place_id: Option<String>,
    pub place_type: Option<PlaceType>,
    pub country_code: Option<String>,
    pub parent: Option<ParentRef>,
    pub parent_place_id: Option<String>,
    pub slug: Option<String>,
    /// Manual region key. An empty string clears the stored override.
    pub region_override: Option<String>,
    pub lat: Option<RawCoordinate>,
    pub latitude: Option<RawCoordinate>,
    pub lng: Option<RawCoordinate>,
    pub longitude: Option<RawCoordinate>,
    /// Explicit country profile to validate against.
    pub country_profile: Option<RecordId>,
    /// Region groups to add. Existing memberships are never removed.
    pub region_groups: Option<Vec<RecordId>>,
    pub canonical_language: Option<String>,
    pub translations: Option<Vec<TranslationRecord>>,
}

/// The accepted result of a place write, ready to persist.
///
/// Coordinates appear under both the canonical (`lat`/`lng`) and legacy
/// (`latitude`/`longitude`) names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPlace {
    pub place_id: PlaceId,
    pub place_type: PlaceType,
    pub country_code: CountryCode,
    pub parent: Option<RecordId>,
    pub parent_place_id: Option<PlaceId>,
    pub slug: Option<Slug>,
    pub region_override: Option<RegionKey>,
    pub region: Option<RegionKey>,
    /// Which rule produced `region`.
    pub region_source: RegionSource,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country_profile: Option<RecordId>,
    pub region_groups: BTreeSet<RecordId>,
    pub canonical_language: Option<String>,
    pub translations: Vec<TranslationRecord>,
}

impl NormalizedPlace {
    /// Bind the write result to a store record id.
    pub fn into_place(self, id: RecordId) -> Place {
        Place {
            id,
            place_id: self.place_id,
            place_type: self.place_type,
            country_code: self.country_code,
            parent: self.parent,
            parent_place_id: self.parent_place_id,
            slug: self.slug,
            region_override: self.region_override,
            region: self.region,
            lat: self.lat,
            lng: self.lng,
            country_profile: self.country_profile,
            region_groups: self.region_groups,
            canonical_language: self.canonical_language,
            translations: self.translations,
        }
    }
}
