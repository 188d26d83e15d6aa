//! # Profile Record Normalization
//!
//! Validates a country-profile document when an administrator creates or
//! updates it. Every field is taken from the draft, else from the stored
//! record being updated, else from the profile the country would resolve
//! to without any stored record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use atlas_core::{CountryCode, PlaceType, RecordId, RegionKey};

use crate::document::{CountryProfile, ProfileOverlay, RegionAutoAssignOverlay, RegionTable};
use crate::error::ProfileError;
use crate::resolver::merge_layers;

/// Raw auto-assign table: lookup key → region key, both unnormalized.
pub type RawRegionTable = BTreeMap<String, String>;

/// Auto-assign tables as written by an administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAutoAssign {
    pub by_place_id: Option<RawRegionTable>,
    pub by_slug: Option<RawRegionTable>,
    pub by_admin1_place_id: Option<RawRegionTable>,
    pub by_admin1_slug: Option<RawRegionTable>,
}

/// A profile document as submitted for create or update. Absent fields
/// fall back to the stored record, then to the country's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDraft {
    pub country_code: Option<String>,
    pub enabled_levels: Option<Vec<PlaceType>>,
    pub parent_rules: Option<BTreeMap<PlaceType, Vec<PlaceType>>>,
    #[serde(alias = "level_labels")]
    pub label_mapping: Option<BTreeMap<PlaceType, String>>,
    pub city_like_levels: Option<Vec<PlaceType>>,
    pub region_auto_assign: Option<RawAutoAssign>,
}

/// Normalize a profile document into the record to store under `id`.
///
/// # Errors
///
/// Returns [`ProfileError::Invalid`] for a bad country code or a blank
/// region target, and the structural [`ProfileError`] variants when the
/// level sets or rules are inconsistent.
pub fn normalize_profile(
    id: RecordId,
    draft: &ProfileDraft,
    existing: Option<&CountryProfile>,
) -> Result<CountryProfile, ProfileError> {
    let raw_country = draft
        .country_code
        .clone()
        .or_else(|| existing.map(|p| p.country_code.to_string()))
        .unwrap_or_default();
    let country_code = CountryCode::new(raw_country)?;
    let stored = existing.map(|p| &p.policy);
    let fallback = fallback_overlay(&country_code);

    let enabled_levels = normalize_levels(pick::<Vec<PlaceType>>(
        draft.enabled_levels.as_ref(),
        stored.map(|p| &p.enabled_levels),
        &fallback.enabled_levels,
    ))?;

    let parent_rules = normalize_rules(
        pick(
            draft.parent_rules.as_ref(),
            stored.map(|p| &p.parent_rules),
            &fallback.parent_rules,
        ),
        &enabled_levels,
    )?;

    let label_mapping = pick(
        draft.label_mapping.as_ref(),
        stored.map(|p| &p.label_mapping),
        &fallback.label_mapping,
    )
    .iter()
    .filter_map(|(level, label)| {
        let label = label.trim();
        (!label.is_empty()).then(|| (*level, label.to_string()))
    })
    .collect();

    let city_like_levels = normalize_city_like(
        pick::<Vec<PlaceType>>(
            draft.city_like_levels.as_ref(),
            stored.map(|p| &p.city_like_levels),
            &fallback.city_like_levels,
        ),
        &enabled_levels,
    )?;

    let region_auto_assign = match (&draft.region_auto_assign, stored.and_then(|p| p.region_auto_assign.as_ref())) {
        (Some(raw), _) => normalize_auto_assign(raw)?,
        (None, Some(tables)) => normalize_auto_assign(&raw_tables(tables))?,
        (None, None) => normalize_auto_assign(
            &fallback.region_auto_assign.as_ref().map(raw_tables).unwrap_or_default(),
        )?,
    };

    tracing::debug!(
        profile_id = %id,
        country = %country_code,
        levels = enabled_levels.len(),
        rules = parent_rules.len(),
        "normalized country profile"
    );

    Ok(CountryProfile {
        id,
        country_code,
        policy: ProfileOverlay {
            enabled_levels,
            parent_rules,
            label_mapping,
            city_like_levels,
            region_auto_assign: Some(region_auto_assign),
        },
    })
}

/// Draft value, else a non-empty stored value, else the fallback.
///
/// Stored records decode absent collections as empty, so an empty stored
/// value counts as unset. A draft value is taken as given, empty or not.
fn pick<'a, T: IsEmpty>(draft: Option<&'a T>, stored: Option<&'a T>, fallback: &'a T) -> &'a T {
    draft
        .or_else(|| stored.filter(|v| !v.is_empty_value()))
        .unwrap_or(fallback)
}

trait IsEmpty {
    fn is_empty_value(&self) -> bool;
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> IsEmpty for BTreeMap<K, V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

/// The effective profile the country resolves to without a stored record,
/// flattened back into a single layer.
fn fallback_overlay(country: &CountryCode) -> ProfileOverlay {
    let effective = merge_layers(country, None);
    ProfileOverlay {
        enabled_levels: effective.enabled_levels.into_iter().collect(),
        parent_rules: effective
            .parent_rules
            .into_iter()
            .map(|(child, parents)| (child, parents.into_iter().collect()))
            .collect(),
        label_mapping: effective.label_mapping,
        city_like_levels: effective.city_like_levels.into_iter().collect(),
        region_auto_assign: Some(effective.region_auto_assign.into()),
    }
}

fn dedup(levels: &[PlaceType]) -> Vec<PlaceType> {
    let mut out = Vec::with_capacity(levels.len());
    for level in levels {
        if !out.contains(level) {
            out.push(*level);
        }
    }
    out
}

fn normalize_levels(levels: &[PlaceType]) -> Result<Vec<PlaceType>, ProfileError> {
    let mut levels = dedup(levels);
    if levels.is_empty() {
        return Err(ProfileError::EmptyEnabledLevels);
    }
    if !levels.contains(&PlaceType::Country) {
        levels.insert(0, PlaceType::Country);
    }
    Ok(levels)
}

fn normalize_city_like(
    levels: &[PlaceType],
    enabled: &[PlaceType],
) -> Result<Vec<PlaceType>, ProfileError> {
    let levels = dedup(levels);
    if let Some(level) = levels.iter().find(|l| !enabled.contains(l)) {
        return Err(ProfileError::CityLikeNotEnabled(*level));
    }
    Ok(levels)
}

fn normalize_rules(
    rules: &BTreeMap<PlaceType, Vec<PlaceType>>,
    enabled: &[PlaceType],
) -> Result<BTreeMap<PlaceType, Vec<PlaceType>>, ProfileError> {
    let mut out = BTreeMap::new();
    for (child, parents) in rules {
        if !enabled.contains(child) {
            return Err(ProfileError::RuleChildNotEnabled(*child));
        }
        let parents = dedup(parents);
        if let Some(parent) = parents.iter().find(|p| !enabled.contains(p)) {
            return Err(ProfileError::RuleParentNotEnabled {
                child: *child,
                parent: *parent,
            });
        }
        out.insert(*child, parents);
    }
    Ok(out)
}

fn raw_tables(tables: &RegionAutoAssignOverlay) -> RawAutoAssign {
    fn raw(table: &Option<RegionTable>) -> Option<RawRegionTable> {
        table.as_ref().map(|t| {
            t.iter()
                .map(|(key, region)| (key.clone(), region.to_string()))
                .collect()
        })
    }
    RawAutoAssign {
        by_place_id: raw(&tables.by_place_id),
        by_slug: raw(&tables.by_slug),
        by_admin1_place_id: raw(&tables.by_admin1_place_id),
        by_admin1_slug: raw(&tables.by_admin1_slug),
    }
}

fn normalize_auto_assign(raw: &RawAutoAssign) -> Result<RegionAutoAssignOverlay, ProfileError> {
    fn sanitize(table: &'static str, source: &Option<RawRegionTable>) -> Result<RegionTable, ProfileError> {
        let mut out = RegionTable::new();
        for (key, target) in source.iter().flatten() {
            let key = key.trim();
            if key.is_empty() {
                return Err(ProfileError::BlankAutoAssignKey { table });
            }
            out.insert(key.to_string(), RegionKey::new(target.as_str())?);
        }
        Ok(out)
    }

    Ok(RegionAutoAssignOverlay {
        by_place_id: Some(sanitize("by_place_id", &raw.by_place_id)?),
        by_slug: Some(sanitize("by_slug", &raw.by_slug)?),
        by_admin1_place_id: Some(sanitize("by_admin1_place_id", &raw.by_admin1_place_id)?),
        by_admin1_slug: Some(sanitize("by_admin1_slug", &raw.by_admin1_slug)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{ErrorKind, ValidationError};
    use PlaceType::*;

    fn draft(yaml: &str) -> ProfileDraft {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn empty_draft_for_builtin_country_takes_builtin_values() {
        let profile = normalize_profile(RecordId(1), &draft("country_code: tr"), None).unwrap();
        assert_eq!(profile.country_code.as_str(), "TR");
        assert!(profile.policy.parent_rules[&Admin2].contains(&City));
        assert_eq!(profile.policy.label_mapping[&Admin1], "Il");

        let tables = profile.policy.region_auto_assign.unwrap();
        assert_eq!(tables.by_admin1_slug.unwrap().len(), 3);
        assert_eq!(tables.by_slug, Some(RegionTable::new()));
    }

    #[test]
    fn country_prepended_and_levels_deduped() {
        let d = draft("country_code: FR\nenabled_levels: [city, admin1, city]\ncity_like_levels: [city]\nparent_rules: {}\n");
        let profile = normalize_profile(RecordId(2), &d, None).unwrap();
        assert_eq!(profile.policy.enabled_levels, [Country, City, Admin1]);
        assert!(profile.policy.parent_rules.is_empty());
    }

    #[test]
    fn empty_enabled_levels_rejected() {
        let d = draft("country_code: FR\nenabled_levels: []\n");
        let err = normalize_profile(RecordId(3), &d, None).unwrap_err();
        assert_eq!(err, ProfileError::EmptyEnabledLevels);
        assert_eq!(err.kind(), ErrorKind::InvalidProfile);
    }

    #[test]
    fn city_like_must_be_enabled() {
        let d = draft("country_code: FR\nenabled_levels: [admin1]\ncity_like_levels: [city]\nparent_rules: {}\n");
        let err = normalize_profile(RecordId(4), &d, None).unwrap_err();
        assert_eq!(err, ProfileError::CityLikeNotEnabled(City));
    }

    #[test]
    fn rule_levels_must_be_enabled() {
        let d = draft("country_code: FR\nenabled_levels: [admin1]\ncity_like_levels: []\nparent_rules: {admin2: [admin1]}\n");
        assert_eq!(
            normalize_profile(RecordId(5), &d, None).unwrap_err(),
            ProfileError::RuleChildNotEnabled(Admin2)
        );

        let d = draft("country_code: FR\nenabled_levels: [admin1]\ncity_like_levels: []\nparent_rules: {admin1: [country, admin_area]}\n");
        assert_eq!(
            normalize_profile(RecordId(5), &d, None).unwrap_err(),
            ProfileError::RuleParentNotEnabled { child: Admin1, parent: AdminArea }
        );
    }

    #[test]
    fn blank_labels_dropped() {
        let d = draft("country_code: US\nlevel_labels: {admin1: ' State ', admin2: '  '}\n");
        let profile = normalize_profile(RecordId(6), &d, None).unwrap();
        assert_eq!(profile.policy.label_mapping.len(), 1);
        assert_eq!(profile.policy.label_mapping[&Admin1], "State");
    }

    #[test]
    fn auto_assign_keys_must_be_non_blank() {
        let d = draft("country_code: TR\nregion_auto_assign:\n  by_slug:\n    '  ': tr-aegean-region\n");
        let err = normalize_profile(RecordId(7), &d, None).unwrap_err();
        assert_eq!(err, ProfileError::BlankAutoAssignKey { table: "by_slug" });

        let d = draft("country_code: TR\nregion_auto_assign:\n  by_slug:\n    bodrum: ' '\n");
        let err = normalize_profile(RecordId(7), &d, None).unwrap_err();
        assert!(matches!(err, ProfileError::Invalid(ValidationError::EmptyRegionKey(_))));
    }

    #[test]
    fn auto_assign_targets_normalized_and_all_tables_written() {
        let d = draft("country_code: TR\nregion_auto_assign:\n  by_slug:\n    ' bodrum ': TR Aegean Region\n");
        let profile = normalize_profile(RecordId(8), &d, None).unwrap();
        let tables = profile.policy.region_auto_assign.unwrap();
        assert_eq!(tables.by_slug.unwrap()["bodrum"].as_str(), "tr-aegean-region");
        assert_eq!(tables.by_place_id, Some(RegionTable::new()));
        assert_eq!(tables.by_admin1_place_id, Some(RegionTable::new()));
        assert_eq!(tables.by_admin1_slug, Some(RegionTable::new()));
    }

    #[test]
    fn update_keeps_existing_fields_not_in_draft() {
        let first = normalize_profile(
            RecordId(9),
            &draft("country_code: DE\nlabel_mapping: {admin1: Land}\n"),
            None,
        )
        .unwrap();
        let updated = normalize_profile(RecordId(9), &draft("city_like_levels: [city]"), Some(&first)).unwrap();
        assert_eq!(updated.country_code.as_str(), "DE");
        assert_eq!(updated.policy.label_mapping[&Admin1], "Land");
        assert_eq!(updated.policy.city_like_levels, [City]);
        assert_eq!(updated.policy.enabled_levels, first.policy.enabled_levels);
    }

    #[test]
    fn empty_stored_collections_fall_back_to_country_defaults() {
        let stored: CountryProfile = serde_yaml::from_str("id: 11\ncountry_code: TR\ncity_like_levels: [city]\n").unwrap();
        assert!(stored.policy.enabled_levels.is_empty());
        assert!(stored.policy.parent_rules.is_empty());

        let updated = normalize_profile(RecordId(11), &draft("label_mapping: {admin1: Il}"), Some(&stored)).unwrap();
        let fallback = fallback_overlay(&stored.country_code);
        assert_eq!(updated.policy.enabled_levels, fallback.enabled_levels);
        assert_eq!(updated.policy.parent_rules, fallback.parent_rules);
        assert_eq!(updated.policy.city_like_levels, [City]);

        // An explicit empty list in the draft is still rejected.
        let err = normalize_profile(RecordId(11), &draft("enabled_levels: []"), Some(&stored)).unwrap_err();
        assert_eq!(err, ProfileError::EmptyEnabledLevels);
    }

    #[test]
    fn missing_or_bad_country_code_rejected() {
        let err = normalize_profile(RecordId(10), &ProfileDraft::default(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
        let err = normalize_profile(RecordId(10), &draft("country_code: TUR"), None).unwrap_err();
        assert!(matches!(err, ProfileError::Invalid(ValidationError::InvalidCountryCode(_))));
    }
}
