//! Normalizing a stored profile and resolving it through the layers.

use atlas_core::{CountryCode, PlaceType, RecordId, StoreError};
use atlas_profile::{
    normalize_profile, CountryProfile, CountryProfileResolver, ProfileDraft, ProfileLayer,
    ProfileSource,
};

#[derive(Default)]
struct Profiles(Vec<CountryProfile>);

impl ProfileSource for Profiles {
    fn profile_by_id(&self, id: RecordId) -> Result<Option<CountryProfile>, StoreError> {
        Ok(self.0.iter().find(|p| p.id == id).cloned())
    }

    fn profile_by_country(&self, country: &CountryCode) -> Result<Option<CountryProfile>, StoreError> {
        Ok(self.0.iter().find(|p| p.country_code == *country).cloned())
    }
}

fn tr() -> CountryCode {
    CountryCode::new("TR").unwrap()
}

#[test]
fn normalized_record_layers_over_builtins() {
    let draft: ProfileDraft = serde_yaml::from_str(
        r#"
country_code: tr
parent_rules:
  poi: [admin1]
level_labels:
  admin2: "  Ilçe  "
region_auto_assign:
  by_slug:
    " Kemer ": TR Mediterranean Region
"#,
    )
    .unwrap();
    let stored = normalize_profile(RecordId(7), &draft, None).unwrap();
    assert_eq!(stored.policy.label_mapping[&PlaceType::Admin2], "Ilçe");

    let source = Profiles(vec![stored]);
    let effective = CountryProfileResolver::new(&source).resolve(&tr(), None).unwrap();

    assert_eq!(effective.profile_id, Some(RecordId(7)));
    assert_eq!(
        effective.layers,
        [ProfileLayer::Defaults, ProfileLayer::BuiltIn, ProfileLayer::Stored { id: RecordId(7) }]
    );
    // Stored rule widens the built-in poi parents.
    let poi = &effective.parent_rules[&PlaceType::Poi];
    assert!(poi.contains(&PlaceType::Admin1));
    assert!(poi.contains(&PlaceType::District));
    assert_eq!(effective.label_for(PlaceType::Admin2), "Ilçe");
    assert_eq!(effective.region_auto_assign.by_slug["Kemer"].as_str(), "tr-mediterranean-region");
    // The stored record supplies every table, so the built-in ones are hidden.
    assert!(effective.region_auto_assign.by_admin1_slug.is_empty());
}

#[test]
fn country_without_record_or_table_gets_defaults_only() {
    let effective = CountryProfileResolver::new(&Profiles::default())
        .resolve(&CountryCode::new("FR").unwrap(), None)
        .unwrap();
    assert_eq!(effective.layers, [ProfileLayer::Defaults]);
    assert!(effective.region_auto_assign.is_empty());
    assert!(effective.is_level_enabled(PlaceType::Country));
}

#[test]
fn updating_a_record_keeps_untouched_fields() {
    let first: ProfileDraft =
        serde_yaml::from_str("country_code: TR\ncity_like_levels: [city, admin2]\n").unwrap();
    let stored = normalize_profile(RecordId(3), &first, None).unwrap();

    let edit: ProfileDraft = serde_json::from_str(r#"{"label_mapping": {"admin1": "İl"}}"#).unwrap();
    let updated = normalize_profile(RecordId(3), &edit, Some(&stored)).unwrap();

    assert_eq!(updated.country_code, tr());
    assert_eq!(updated.policy.city_like_levels, [PlaceType::City, PlaceType::Admin2]);
    assert_eq!(updated.policy.label_mapping[&PlaceType::Admin1], "İl");
    assert_eq!(updated.policy.enabled_levels, stored.policy.enabled_levels);
}
