//! # Effective Profile
//!
//! The fully merged policy for one country, and the queries the hierarchy
//! validator runs against it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use atlas_core::{CountryCode, PlaceType, RecordId};

use crate::document::RegionAutoAssign;

/// A layer that contributed to an effective profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "layer")]
pub enum ProfileLayer {
    /// The compiled-in defaults (always present).
    Defaults,
    /// The compiled-in table for the country.
    BuiltIn,
    /// A stored profile record.
    Stored {
        /// The record id.
        id: RecordId,
    },
}

/// How to treat a child level that has no (or an empty) parent rule.
///
/// Stored data historically treats "no rule" as "any parent allowed", which
/// cannot be told apart from a deliberately empty rule. The policy is
/// explicit configuration rather than an accident of representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnruledParentPolicy {
    /// Any parent level is allowed.
    #[default]
    AllowAny,
    /// No parent level is allowed.
    Deny,
}

/// The merged policy document for a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveProfile {
    /// Id of the stored record that contributed, if any.
    pub profile_id: Option<RecordId>,
    /// Country this profile governs.
    pub country_code: CountryCode,
    /// Active levels; always contains `country`.
    pub enabled_levels: BTreeSet<PlaceType>,
    /// Child level → allowed parent levels. Levels without an entry have no rule.
    pub parent_rules: BTreeMap<PlaceType, BTreeSet<PlaceType>>,
    /// Level → display label.
    pub label_mapping: BTreeMap<PlaceType, String>,
    /// Levels treated as city-equivalent.
    pub city_like_levels: BTreeSet<PlaceType>,
    /// Region lookup tables.
    pub region_auto_assign: RegionAutoAssign,
    /// Layers that contributed, least specific first.
    pub layers: Vec<ProfileLayer>,
}

impl EffectiveProfile {
    /// Whether the level is active for this country.
    pub fn is_level_enabled(&self, place_type: PlaceType) -> bool {
        self.enabled_levels.contains(&place_type)
    }

    /// The allowed parent levels for a child, or `None` when no rule is
    /// configured.
    pub fn allowed_parents(&self, child: PlaceType) -> Option<&BTreeSet<PlaceType>> {
        self.parent_rules.get(&child).filter(|parents| !parents.is_empty())
    }

    /// Whether `parent` may be the direct parent of `child`.
    ///
    /// A `country` child is only valid without a parent; every other child
    /// needs one. Children without a rule follow `unruled`.
    pub fn is_parent_allowed(
        &self,
        child: PlaceType,
        parent: Option<PlaceType>,
        unruled: UnruledParentPolicy,
    ) -> bool {
        if child.is_root() {
            return parent.is_none();
        }
        let Some(parent) = parent else {
            return false;
        };
        match self.allowed_parents(child) {
            Some(allowed) => allowed.contains(&parent),
            None => unruled == UnruledParentPolicy::AllowAny,
        }
    }

    /// Whether the level is treated as city-equivalent.
    pub fn is_city_like(&self, place_type: PlaceType) -> bool {
        self.city_like_levels.contains(&place_type)
    }

    /// Display label for a level, falling back to its identifier.
    pub fn label_for(&self, place_type: PlaceType) -> &str {
        self.label_mapping
            .get(&place_type)
            .map(String::as_str)
            .unwrap_or_else(|| place_type.as_str())
    }

    /// Whether a stored record contributed to this profile.
    pub fn has_stored_layer(&self) -> bool {
        self.profile_id.is_some()
    }
}
