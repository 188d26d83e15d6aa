//! # Profile Documents
//!
//! Shapes of the policy layers before they are merged:
//!
//! - [`ProfileOverlay`]: one partial policy layer. The compiled-in
//!   defaults, every built-in country table, and the policy part of a
//!   stored record all share this shape.
//! - [`CountryProfile`]: a stored record: an overlay bound to a country
//!   and a record id.
//! - [`RegionAutoAssign`]: the four region lookup tables of an effective
//!   profile, each always present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use atlas_core::{CountryCode, PlaceType, RecordId, RegionKey};

/// Lookup table from a place key (place_id or slug) to a region key.
pub type RegionTable = BTreeMap<String, RegionKey>;

/// One partial policy layer.
///
/// Empty collections mean "this layer contributes nothing" for the set and
/// rule fields. For the auto-assign tables, absence (`None`) and presence
/// are distinguished, because those tables are taken whole from the most
/// specific layer that supplies them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverlay {
    /// Levels this layer enables.
    pub enabled_levels: Vec<PlaceType>,
    /// Child level → allowed parent levels.
    pub parent_rules: BTreeMap<PlaceType, Vec<PlaceType>>,
    /// Level → display label.
    #[serde(alias = "level_labels")]
    pub label_mapping: BTreeMap<PlaceType, String>,
    /// Levels treated as city-equivalent.
    pub city_like_levels: Vec<PlaceType>,
    /// Region auto-assign tables supplied by this layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_auto_assign: Option<RegionAutoAssignOverlay>,
}

/// Region auto-assign tables as supplied by a single layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionAutoAssignOverlay {
    /// Keyed by the place's own `place_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_place_id: Option<RegionTable>,
    /// Keyed by the place's own slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_slug: Option<RegionTable>,
    /// Keyed by the nearest admin1 ancestor's `place_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_admin1_place_id: Option<RegionTable>,
    /// Keyed by the nearest admin1 ancestor's slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_admin1_slug: Option<RegionTable>,
}

/// The resolved region auto-assign tables of an effective profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionAutoAssign {
    /// Keyed by the place's own `place_id`.
    pub by_place_id: RegionTable,
    /// Keyed by the place's own slug.
    pub by_slug: RegionTable,
    /// Keyed by the nearest admin1 ancestor's `place_id`.
    pub by_admin1_place_id: RegionTable,
    /// Keyed by the nearest admin1 ancestor's slug.
    pub by_admin1_slug: RegionTable,
}

impl RegionAutoAssign {
    /// Take each table whole from the first layer that supplies it.
    ///
    /// `layers` is ordered most specific first. Tables are never merged
    /// key-by-key across layers.
    pub fn from_layers<'a>(layers: impl IntoIterator<Item = &'a RegionAutoAssignOverlay> + Clone) -> Self {
        fn pick<'a>(
            layers: impl IntoIterator<Item = &'a RegionAutoAssignOverlay>,
            select: fn(&RegionAutoAssignOverlay) -> Option<&RegionTable>,
        ) -> RegionTable {
            layers
                .into_iter()
                .find_map(select)
                .cloned()
                .unwrap_or_default()
        }

        Self {
            by_place_id: pick(layers.clone(), |o| o.by_place_id.as_ref()),
            by_slug: pick(layers.clone(), |o| o.by_slug.as_ref()),
            by_admin1_place_id: pick(layers.clone(), |o| o.by_admin1_place_id.as_ref()),
            by_admin1_slug: pick(layers, |o| o.by_admin1_slug.as_ref()),
        }
    }

    /// Whether every table is empty.
    pub fn is_empty(&self) -> bool {
        self.by_place_id.is_empty()
            && self.by_slug.is_empty()
            && self.by_admin1_place_id.is_empty()
            && self.by_admin1_slug.is_empty()
    }

    /// Iterate `(table name, table)` pairs in lookup order.
    pub fn tables(&self) -> [(&'static str, &RegionTable); 4] {
        [
            ("by_place_id", &self.by_place_id),
            ("by_slug", &self.by_slug),
            ("by_admin1_place_id", &self.by_admin1_place_id),
            ("by_admin1_slug", &self.by_admin1_slug),
        ]
    }
}

impl From<RegionAutoAssign> for RegionAutoAssignOverlay {
    fn from(tables: RegionAutoAssign) -> Self {
        Self {
            by_place_id: Some(tables.by_place_id),
            by_slug: Some(tables.by_slug),
            by_admin1_place_id: Some(tables.by_admin1_place_id),
            by_admin1_slug: Some(tables.by_admin1_slug),
        }
    }
}

/// An administrator-maintained profile record for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryProfile {
    /// Store record id.
    pub id: RecordId,
    /// Country this profile governs.
    pub country_code: CountryCode,
    /// The policy layer carried by this record.
    #[serde(flatten)]
    pub policy: ProfileOverlay,
}
