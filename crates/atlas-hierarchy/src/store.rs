//! # Store Port
//!
//! The engine reads the content store through [`PlaceStore`] and never
//! writes to it. [`MemoryStore`] is the in-process implementation, seeded
//! from a [`Snapshot`] of profiles, region groups and places.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use atlas_core::{CountryCode, PlaceId, RecordId, RegionKey, Slug, StoreError};
use atlas_profile::{CountryProfile, ProfileSource};

use crate::model::{NormalizedPlace, Place, RegionGroup};

/// Point lookups the write pipeline needs.
pub trait PlaceStore: ProfileSource {
    /// Place by store record id.
    fn place_by_id(&self, id: RecordId) -> Result<Option<Place>, StoreError>;

    /// Place by its globally unique `place_id`.
    fn place_by_place_id(&self, place_id: &PlaceId) -> Result<Option<Place>, StoreError>;

    /// Place by slug within a country.
    fn place_by_slug(&self, country: &CountryCode, slug: &Slug) -> Result<Option<Place>, StoreError>;

    /// Region group by key within a country.
    fn region_group(
        &self,
        region_key: &RegionKey,
        country: &CountryCode,
    ) -> Result<Option<RegionGroup>, StoreError>;

    /// Region group by store record id.
    fn region_group_by_id(&self, id: RecordId) -> Result<Option<RegionGroup>, StoreError>;
}

/// Serialized dump of a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub country_profiles: Vec<CountryProfile>,
    pub region_groups: Vec<RegionGroup>,
    pub places: Vec<Place>,
}

/// In-memory [`PlaceStore`].
///
/// Record ids share one sequence across profiles, region groups and places.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    profiles: BTreeMap<RecordId, CountryProfile>,
    region_groups: BTreeMap<RecordId, RegionGroup>,
    places: BTreeMap<RecordId, Place>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if a record id appears twice within
    /// a collection.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        fn load<T>(
            kind: &str,
            records: Vec<T>,
            id_of: fn(&T) -> RecordId,
        ) -> Result<BTreeMap<RecordId, T>, StoreError> {
            let mut out = BTreeMap::new();
            for record in records {
                let id = id_of(&record);
                if out.insert(id, record).is_some() {
                    return Err(StoreError::Corrupt {
                        record: format!("{kind} {id}"),
                        reason: "duplicate record id".to_string(),
                    });
                }
            }
            Ok(out)
        }

        let store = Self {
            profiles: load("country_profile", snapshot.country_profiles, |p| p.id)?,
            region_groups: load("region_group", snapshot.region_groups, |g| g.id)?,
            places: load("place", snapshot.places, |p| p.id)?,
        };
        tracing::debug!(
            country_profiles = store.profiles.len(),
            region_groups = store.region_groups.len(),
            places = store.places.len(),
            "loaded store snapshot"
        );
        Ok(store)
    }

    /// Dump the store.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            country_profiles: self.profiles.values().cloned().collect(),
            region_groups: self.region_groups.values().cloned().collect(),
            places: self.places.values().cloned().collect(),
        }
    }

    /// The next unused record id.
    pub fn next_id(&self) -> RecordId {
        let max = [
            self.profiles.keys().next_back(),
            self.region_groups.keys().next_back(),
            self.places.keys().next_back(),
        ]
        .into_iter()
        .flatten()
        .map(RecordId::get)
        .max()
        .unwrap_or(0);
        RecordId(max + 1)
    }

    pub fn insert_profile(&mut self, profile: CountryProfile) {
        self.profiles.insert(profile.id, profile);
    }

    pub fn insert_region_group(&mut self, group: RegionGroup) {
        self.region_groups.insert(group.id, group);
    }

    pub fn insert_place(&mut self, place: Place) {
        self.places.insert(place.id, place);
    }

    /// Persist an accepted create under a fresh id.
    pub fn apply_create(&mut self, place: NormalizedPlace) -> RecordId {
        let id = self.next_id();
        self.insert_place(place.into_place(id));
        id
    }

    /// Persist an accepted update of record `id`.
    pub fn apply_update(&mut self, id: RecordId, place: NormalizedPlace) {
        self.insert_place(place.into_place(id));
    }

    pub fn profiles(&self) -> impl Iterator<Item = &CountryProfile> {
        self.profiles.values()
    }

    pub fn region_groups(&self) -> impl Iterator<Item = &RegionGroup> {
        self.region_groups.values()
    }

    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.places.values()
    }
}

impl ProfileSource for MemoryStore {
    fn profile_by_id(&self, id: RecordId) -> Result<Option<CountryProfile>, StoreError> {
        Ok(self.profiles.get(&id).cloned())
    }

    fn profile_by_country(&self, country: &CountryCode) -> Result<Option<CountryProfile>, StoreError> {
        Ok(self
            .profiles
            .values()
            .find(|p| p.country_code == *country)
            .cloned())
    }
}

impl PlaceStore for MemoryStore {
    fn place_by_id(&self, id: RecordId) -> Result<Option<Place>, StoreError> {
        Ok(self.places.get(&id).cloned())
    }

    fn place_by_place_id(&self, place_id: &PlaceId) -> Result<Option<Place>, StoreError> {
        Ok(self.places.values().find(|p| p.place_id == *place_id).cloned())
    }

    fn place_by_slug(&self, country: &CountryCode, slug: &Slug) -> Result<Option<Place>, StoreError> {
        Ok(self
            .places
            .values()
            .find(|p| p.country_code == *country && p.slug.as_ref() == Some(slug))
            .cloned())
    }

    fn region_group(
        &self,
        region_key: &RegionKey,
        country: &CountryCode,
    ) -> Result<Option<RegionGroup>, StoreError> {
        Ok(self
            .region_groups
            .values()
            .find(|g| g.region_key == *region_key && g.country_code == *country)
            .cloned())
    }

    fn region_group_by_id(&self, id: RecordId) -> Result<Option<RegionGroup>, StoreError> {
        Ok(self.region_groups.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"
country_profiles:
  - id: 1
    country_code: TR
region_groups:
  - id: 2
    region_key: tr-aegean-region
    country_code: TR
places:
  - id: 3
    place_id: country-tr
    place_type: country
    country_code: TR
    slug: turkey
  - id: 7
    place_id: admin1-tr-mugla
    place_type: admin1
    country_code: TR
    parent: 3
    slug: mugla
"#;

    fn store() -> MemoryStore {
        MemoryStore::from_snapshot(serde_yaml::from_str(SNAPSHOT).unwrap()).unwrap()
    }

    #[test]
    fn lookups() {
        let store = store();
        let tr = CountryCode::new("TR").unwrap();
        assert!(store.profile_by_country(&tr).unwrap().is_some());
        assert!(store.profile_by_id(RecordId(2)).unwrap().is_none());

        let mugla = store
            .place_by_slug(&tr, &Slug::new("mugla").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(mugla.id, RecordId(7));
        let us = CountryCode::new("US").unwrap();
        assert!(store.place_by_slug(&us, &Slug::new("mugla").unwrap()).unwrap().is_none());

        let key = RegionKey::new("tr-aegean-region").unwrap();
        assert_eq!(store.region_group(&key, &tr).unwrap().map(|g| g.id), Some(RecordId(2)));
        assert!(store.region_group(&key, &us).unwrap().is_none());
    }

    #[test]
    fn ids_continue_after_highest_record() {
        let store = store();
        assert_eq!(store.next_id(), RecordId(8));
        assert_eq!(MemoryStore::new().next_id(), RecordId(1));
    }

    #[test]
    fn duplicate_ids_are_corrupt() {
        let mut snapshot: Snapshot = serde_yaml::from_str(SNAPSHOT).unwrap();
        let dup = snapshot.places[0].clone();
        snapshot.places.push(dup);
        let err = MemoryStore::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn snapshot_round_trips_through_store() {
        let snapshot: Snapshot = serde_yaml::from_str(SNAPSHOT).unwrap();
        let store = MemoryStore::from_snapshot(snapshot.clone()).unwrap();
        assert_eq!(store.snapshot(), snapshot);
    }
}
