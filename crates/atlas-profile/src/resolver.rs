//! # Country Profile Resolver
//!
//! Merges the policy layers for a country into an [`EffectiveProfile`]:
//!
//! ```text
//! defaults ──▶ built-in country table ──▶ stored CountryProfile
//!  (always)      (TR, US, DE, ...)         (explicit id, else by country)
//! ```
//!
//! | Field | Merge |
//! |-------|-------|
//! | `enabled_levels` | union, always including `country` |
//! | `parent_rules` | per-child union of allowed parents |
//! | `label_mapping` | later layer wins per key |
//! | `city_like_levels` | union |
//! | `region_auto_assign` | each table whole from the most specific layer |
//!
//! Profiles are resolved fresh on every write. An absent stored record is
//! never an error: every valid country code resolves, at worst to the
//! generic defaults.

use std::collections::{BTreeMap, BTreeSet};

use atlas_core::{CountryCode, PlaceType, RecordId, StoreError};

use crate::builtin;
use crate::defaults;
use crate::document::{CountryProfile, ProfileOverlay, RegionAutoAssign};
use crate::effective::{EffectiveProfile, ProfileLayer};
use crate::error::ProfileError;

/// Read access to stored country profiles.
pub trait ProfileSource {
    /// Look up a profile by record id.
    fn profile_by_id(&self, id: RecordId) -> Result<Option<CountryProfile>, StoreError>;

    /// Look up the profile stored for a country.
    fn profile_by_country(&self, country: &CountryCode) -> Result<Option<CountryProfile>, StoreError>;
}

/// Resolves effective profiles against a [`ProfileSource`].
pub struct CountryProfileResolver<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: ProfileSource + ?Sized> CountryProfileResolver<'a, S> {
    /// Create a resolver over a profile source.
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Resolve the effective profile for `country`.
    ///
    /// When `explicit_profile` is given and resolves, it must belong to
    /// `country`. When it does not resolve, the profile stored for the
    /// country is used instead.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::CountryConflict`] if the explicit profile belongs
    ///   to another country.
    /// - [`ProfileError::Store`] if the source fails.
    pub fn resolve(
        &self,
        country: &CountryCode,
        explicit_profile: Option<RecordId>,
    ) -> Result<EffectiveProfile, ProfileError> {
        let stored = self.find_stored(country, explicit_profile)?;
        let profile = merge_layers(country, stored.as_ref());
        tracing::debug!(
            country = %country,
            profile_id = ?profile.profile_id,
            layers = profile.layers.len(),
            "resolved effective country profile"
        );
        Ok(profile)
    }

    fn find_stored(
        &self,
        country: &CountryCode,
        explicit_profile: Option<RecordId>,
    ) -> Result<Option<CountryProfile>, ProfileError> {
        if let Some(id) = explicit_profile {
            match self.source.profile_by_id(id)? {
                Some(profile) if profile.country_code != *country => {
                    return Err(ProfileError::CountryConflict {
                        profile_id: id,
                        profile_country: profile.country_code,
                        requested: country.clone(),
                    });
                }
                Some(profile) => return Ok(Some(profile)),
                None => {
                    tracing::warn!(
                        country = %country,
                        profile_id = %id,
                        "explicit country profile not found; falling back to lookup by country"
                    );
                }
            }
        }
        Ok(self.source.profile_by_country(country)?)
    }
}

/// Merge defaults, the built-in table for `country`, and an optional stored
/// record into an effective profile.
///
/// The stored record's own `country_code` is not consulted; callers that
/// accept client-chosen records must check it (see
/// [`CountryProfileResolver::resolve`]).
pub fn merge_layers(country: &CountryCode, stored: Option<&CountryProfile>) -> EffectiveProfile {
    let defaults_layer = defaults::overlay();
    let builtin_layer = builtin::country_overlay(country);

    let mut layers = vec![ProfileLayer::Defaults];
    let mut overlays: Vec<&ProfileOverlay> = vec![&defaults_layer];
    if let Some(layer) = builtin_layer.as_ref() {
        layers.push(ProfileLayer::BuiltIn);
        overlays.push(layer);
    }
    if let Some(profile) = stored {
        layers.push(ProfileLayer::Stored { id: profile.id });
        overlays.push(&profile.policy);
    }

    let mut enabled_levels: BTreeSet<PlaceType> = BTreeSet::from([PlaceType::Country]);
    let mut parent_rules: BTreeMap<PlaceType, BTreeSet<PlaceType>> = BTreeMap::new();
    let mut label_mapping: BTreeMap<PlaceType, String> = BTreeMap::new();
    let mut city_like_levels: BTreeSet<PlaceType> = BTreeSet::new();

    for overlay in &overlays {
        enabled_levels.extend(overlay.enabled_levels.iter().copied());
        for (child, parents) in &overlay.parent_rules {
            if parents.is_empty() {
                continue;
            }
            parent_rules
                .entry(*child)
                .or_default()
                .extend(parents.iter().copied());
        }
        for (level, label) in &overlay.label_mapping {
            let label = label.trim();
            if !label.is_empty() {
                label_mapping.insert(*level, label.to_string());
            }
        }
        city_like_levels.extend(overlay.city_like_levels.iter().copied());
    }

    // Most specific first for the whole-table auto-assign rule.
    let region_auto_assign = RegionAutoAssign::from_layers(
        overlays
            .iter()
            .rev()
            .filter_map(|o| o.region_auto_assign.as_ref())
            .collect::<Vec<_>>(),
    );

    EffectiveProfile {
        profile_id: stored.map(|p| p.id),
        country_code: country.clone(),
        enabled_levels,
        parent_rules,
        label_mapping,
        city_like_levels,
        region_auto_assign,
        layers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::region_table;
    use crate::document::RegionAutoAssignOverlay;
    use crate::effective::UnruledParentPolicy;
    use PlaceType::*;

    #[derive(Default)]
    struct FakeProfiles {
        profiles: Vec<CountryProfile>,
    }

    impl ProfileSource for FakeProfiles {
        fn profile_by_id(&self, id: RecordId) -> Result<Option<CountryProfile>, StoreError> {
            Ok(self.profiles.iter().find(|p| p.id == id).cloned())
        }

        fn profile_by_country(
            &self,
            country: &CountryCode,
        ) -> Result<Option<CountryProfile>, StoreError> {
            Ok(self.profiles.iter().find(|p| p.country_code == *country).cloned())
        }
    }

    struct FailingProfiles;

    impl ProfileSource for FailingProfiles {
        fn profile_by_id(&self, _: RecordId) -> Result<Option<CountryProfile>, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        fn profile_by_country(&self, _: &CountryCode) -> Result<Option<CountryProfile>, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
    }

    fn cc(code: &str) -> CountryCode {
        CountryCode::new(code).unwrap()
    }

    fn stored(id: u64, country: &str, policy: ProfileOverlay) -> CountryProfile {
        CountryProfile {
            id: RecordId(id),
            country_code: cc(country),
            policy,
        }
    }

    #[test]
    fn unknown_country_resolves_to_pure_defaults() {
        let profile = merge_layers(&cc("FR"), None);
        assert_eq!(profile.layers, [ProfileLayer::Defaults]);
        assert_eq!(profile.enabled_levels.len(), PlaceType::all().len());
        assert_eq!(profile.label_for(Admin1), "Admin Level 1");
        assert!(profile.region_auto_assign.is_empty());
        assert!(profile.allowed_parents(Country).is_none());
    }

    #[test]
    fn turkey_admin2_rule_is_union_of_layers() {
        let profile = merge_layers(&cc("TR"), None);
        let expected: BTreeSet<_> = [Admin1, Country, City].into_iter().collect();
        assert_eq!(profile.parent_rules[&Admin2], expected);
    }

    #[test]
    fn turkey_labels_override_defaults() {
        let profile = merge_layers(&cc("TR"), None);
        assert_eq!(profile.label_for(Admin1), "Il");
        assert_eq!(profile.label_for(Country), "Country");
        assert_eq!(profile.label_for(AdminArea), "Administrative Area");
    }

    #[test]
    fn enabled_levels_never_narrow() {
        // TR's table omits admin_area, but the defaults enable it.
        let profile = merge_layers(&cc("TR"), None);
        assert!(profile.is_level_enabled(AdminArea));
    }

    #[test]
    fn city_like_levels_are_unioned() {
        let profile = merge_layers(&cc("TR"), None);
        assert!(profile.is_city_like(Admin2));
        assert!(profile.is_city_like(City));
        assert!(!profile.is_city_like(Poi));
    }

    #[test]
    fn stored_layer_broadens_rules_and_overrides_labels() {
        let mut policy = ProfileOverlay::default();
        policy.parent_rules.insert(Poi, vec![Street, Admin1]);
        policy.label_mapping.insert(Admin1, "Province".to_string());
        policy.label_mapping.insert(Admin2, "   ".to_string());
        let record = stored(3, "TR", policy);

        let profile = merge_layers(&cc("TR"), Some(&record));
        assert_eq!(profile.profile_id, Some(RecordId(3)));
        assert!(profile.parent_rules[&Poi].contains(&Street));
        assert!(profile.parent_rules[&Poi].contains(&Admin1));
        assert!(profile.parent_rules[&Poi].contains(&District));
        assert_eq!(profile.label_for(Admin1), "Province");
        assert_eq!(profile.label_for(Admin2), "Ilce");
        assert_eq!(
            profile.layers,
            [
                ProfileLayer::Defaults,
                ProfileLayer::BuiltIn,
                ProfileLayer::Stored { id: RecordId(3) }
            ]
        );
    }

    #[test]
    fn stored_auto_assign_table_replaces_builtin_table() {
        let policy = ProfileOverlay {
            region_auto_assign: Some(RegionAutoAssignOverlay {
                by_place_id: Some(region_table(&[("city-tr-izmir", "tr-aegean-region")])),
                ..Default::default()
            }),
            ..Default::default()
        };
        let record = stored(4, "TR", policy);
        let profile = merge_layers(&cc("TR"), Some(&record));

        let tables = &profile.region_auto_assign;
        assert_eq!(tables.by_place_id.len(), 1);
        assert!(tables.by_place_id.contains_key("city-tr-izmir"));
        // by_admin1_slug omitted by the stored record: built-in table applies.
        assert_eq!(tables.by_admin1_slug["mugla"].as_str(), "tr-aegean-region");
    }

    #[test]
    fn parent_allowed_queries() {
        let profile = merge_layers(&cc("US"), None);
        let allow = UnruledParentPolicy::AllowAny;
        assert!(profile.is_parent_allowed(Admin1, Some(Country), allow));
        assert!(!profile.is_parent_allowed(Admin1, Some(City), allow));
        assert!(!profile.is_parent_allowed(Admin1, None, allow));
        assert!(profile.is_parent_allowed(Country, None, allow));
        assert!(!profile.is_parent_allowed(Country, Some(Country), allow));
    }

    #[test]
    fn unruled_policy_decides_missing_rules() {
        let mut profile = merge_layers(&cc("FR"), None);
        profile.parent_rules.remove(&Street);
        assert!(profile.is_parent_allowed(Street, Some(Poi), UnruledParentPolicy::AllowAny));
        assert!(!profile.is_parent_allowed(Street, Some(Poi), UnruledParentPolicy::Deny));
    }

    #[test]
    fn resolver_uses_profile_stored_for_country() {
        let source = FakeProfiles {
            profiles: vec![stored(9, "DE", ProfileOverlay::default())],
        };
        let resolver = CountryProfileResolver::new(&source);
        let profile = resolver.resolve(&cc("DE"), None).unwrap();
        assert_eq!(profile.profile_id, Some(RecordId(9)));
        assert_eq!(profile.label_for(Admin1), "Bundesland");
    }

    #[test]
    fn resolver_rejects_profile_from_other_country() {
        let source = FakeProfiles {
            profiles: vec![stored(5, "US", ProfileOverlay::default())],
        };
        let resolver = CountryProfileResolver::new(&source);
        let err = resolver.resolve(&cc("TR"), Some(RecordId(5))).unwrap_err();
        assert!(matches!(err, ProfileError::CountryConflict { .. }));
        assert_eq!(err.kind(), atlas_core::ErrorKind::ProfileCountryConflict);
    }

    #[test]
    fn resolver_falls_back_when_explicit_profile_missing() {
        let source = FakeProfiles {
            profiles: vec![stored(2, "TR", ProfileOverlay::default())],
        };
        let resolver = CountryProfileResolver::new(&source);
        let profile = resolver.resolve(&cc("TR"), Some(RecordId(99))).unwrap();
        assert_eq!(profile.profile_id, Some(RecordId(2)));
    }

    #[test]
    fn resolver_without_any_record_is_not_an_error() {
        let source = FakeProfiles::default();
        let resolver = CountryProfileResolver::new(&source);
        let profile = resolver.resolve(&cc("ZZ"), None).unwrap();
        assert!(!profile.has_stored_layer());
    }

    #[test]
    fn resolver_surfaces_store_failures() {
        let resolver = CountryProfileResolver::new(&FailingProfiles);
        let err = resolver.resolve(&cc("TR"), None).unwrap_err();
        assert_eq!(err.kind(), atlas_core::ErrorKind::Store);
    }
}
