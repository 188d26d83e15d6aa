//! # Region Assignment
//!
//! Derives a place's region key. Country-level places never carry a
//! region. For every other place the first matching rule wins:
//!
//! | Tier | Source |
//! |------|--------|
//! | 1 | `region_override` |
//! | 2 | `by_place_id[place_id]` |
//! | 3 | `by_slug[slug]` |
//! | 4 | `by_admin1_place_id[nearest admin1 place_id]` |
//! | 5 | `by_admin1_slug[nearest admin1 slug]` |
//!
//! The nearest admin1 is the place itself when it is admin1, else the first
//! admin1 found walking up from the parent. A derived key must name an
//! existing region group in the country; groups are never created here.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use atlas_core::{CountryCode, PlaceId, PlaceType, RecordId, RegionKey, Slug};
use atlas_profile::EffectiveProfile;

use crate::config::EngineConfig;
use crate::error::WriteError;
use crate::linker::RelationLinker;
use crate::model::Place;
use crate::store::PlaceStore;

/// Which rule produced a region assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionSource {
    /// No rule matched, or the place is a country.
    #[default]
    Unassigned,
    Override,
    ByPlaceId,
    BySlug,
    ByAdmin1PlaceId,
    ByAdmin1Slug,
}

/// The derived region of a place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionAssignment {
    pub key: Option<RegionKey>,
    /// The region group the key resolved to.
    pub group: Option<RecordId>,
    pub source: RegionSource,
}

/// The fields of a write the region rules read.
#[derive(Debug, Clone, Copy)]
pub struct RegionInput<'p> {
    pub place_id: &'p PlaceId,
    pub place_type: PlaceType,
    pub country_code: &'p CountryCode,
    pub slug: Option<&'p Slug>,
    pub region_override: Option<&'p RegionKey>,
    pub parent: Option<&'p Place>,
}

/// The override a write ends up with: an empty candidate value clears it,
/// an absent one keeps the stored override.
pub fn effective_override(candidate: Option<&str>, existing: Option<&Place>) -> Option<RegionKey> {
    match candidate {
        Some(raw) => RegionKey::normalize(raw),
        None => existing.and_then(|p| p.region_override.clone()),
    }
}

/// Resolves region assignments against a [`PlaceStore`].
pub struct RegionAssignmentResolver<'a, S: ?Sized> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: PlaceStore + ?Sized> RegionAssignmentResolver<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Derive the region for a write and check its region group exists.
    ///
    /// # Errors
    ///
    /// [`WriteError::RegionGroupMissing`] when the derived key has no group
    /// in the country.
    pub fn resolve(
        &self,
        input: RegionInput<'_>,
        profile: &EffectiveProfile,
    ) -> Result<RegionAssignment, WriteError> {
        if input.place_type.is_root() {
            return Ok(RegionAssignment::default());
        }

        let Some((key, source)) = self.derive(input, profile)? else {
            return Ok(RegionAssignment::default());
        };

        let group = self
            .store
            .region_group(&key, input.country_code)?
            .ok_or_else(|| WriteError::RegionGroupMissing {
                region_key: key.clone(),
                country: input.country_code.clone(),
            })?;

        tracing::debug!(
            place_id = %input.place_id,
            region = %key,
            source = ?source,
            "region assigned"
        );
        Ok(RegionAssignment {
            key: Some(key),
            group: Some(group.id),
            source,
        })
    }

    fn derive(
        &self,
        input: RegionInput<'_>,
        profile: &EffectiveProfile,
    ) -> Result<Option<(RegionKey, RegionSource)>, WriteError> {
        if let Some(key) = input.region_override {
            return Ok(Some((key.clone(), RegionSource::Override)));
        }

        let tables = &profile.region_auto_assign;
        if let Some(key) = tables.by_place_id.get(input.place_id.as_str()) {
            return Ok(Some((key.clone(), RegionSource::ByPlaceId)));
        }
        if let Some(key) = input.slug.and_then(|s| tables.by_slug.get(s.as_str())) {
            return Ok(Some((key.clone(), RegionSource::BySlug)));
        }

        if tables.by_admin1_place_id.is_empty() && tables.by_admin1_slug.is_empty() {
            return Ok(None);
        }
        let Some((admin1_place_id, admin1_slug)) = self.nearest_admin1(input)? else {
            return Ok(None);
        };
        if let Some(key) = tables.by_admin1_place_id.get(admin1_place_id.as_str()) {
            return Ok(Some((key.clone(), RegionSource::ByAdmin1PlaceId)));
        }
        if let Some(key) = admin1_slug.and_then(|s| tables.by_admin1_slug.get(s.as_str()).cloned()) {
            return Ok(Some((key, RegionSource::ByAdmin1Slug)));
        }
        Ok(None)
    }

    /// `place_id` and slug of the nearest admin1, walking up at most
    /// `max_ancestor_depth` levels.
    fn nearest_admin1(
        &self,
        input: RegionInput<'_>,
    ) -> Result<Option<(PlaceId, Option<Slug>)>, WriteError> {
        if input.place_type == PlaceType::Admin1 {
            return Ok(Some((input.place_id.clone(), input.slug.cloned())));
        }

        let linker = RelationLinker::new(self.store);
        let mut visited = BTreeSet::new();
        let mut current = input.parent.cloned();
        for _ in 0..self.config.max_ancestor_depth {
            let Some(place) = current else {
                return Ok(None);
            };
            if place.place_type == PlaceType::Admin1 {
                return Ok(Some((place.place_id, place.slug)));
            }
            if !visited.insert(place.id) {
                return Ok(None);
            }
            current = match place.parent_pointer() {
                Some(pointer) => linker.resolve(&pointer)?,
                None => None,
            };
        }
        Ok(None)
    }
}
