//! # Policy Defaults
//!
//! The compiled-in baseline layer. Every country starts here; built-in
//! tables and stored records can only broaden levels and rules, or rename
//! labels.

use std::collections::BTreeMap;

use atlas_core::{PlaceType, RegionKey};

use crate::document::{ProfileOverlay, RegionTable};

use PlaceType::*;

/// Levels enabled for every country.
pub const DEFAULT_ENABLED_LEVELS: &[PlaceType] = &[
    Country,
    Admin1,
    Admin2,
    Admin3,
    Locality,
    Neighborhood,
    Street,
    Poi,
    AdminArea,
    City,
    District,
];

/// Default child → allowed-parent table.
pub const DEFAULT_PARENT_RULES: &[(PlaceType, &[PlaceType])] = &[
    (Country, &[]),
    (Admin1, &[Country]),
    (Admin2, &[Admin1, Country]),
    (Admin3, &[Admin2, Admin1]),
    (Locality, &[Country, Admin1, Admin2, Admin3, AdminArea]),
    (Neighborhood, &[Locality, City, Admin2, Admin3, District]),
    (Street, &[Neighborhood, Locality, City, District]),
    (Poi, &[Street, Neighborhood, District, City, Locality, Admin3, Admin2, AdminArea]),
    (AdminArea, &[Country]),
    (City, &[Country, AdminArea, Admin1, Admin2]),
    (District, &[City, Locality, Admin2, Admin3, AdminArea]),
];

/// Levels treated as city-equivalent for every country.
pub const DEFAULT_CITY_LIKE_LEVELS: &[PlaceType] = &[City, Locality];

/// Default English label for a level.
pub fn default_label(place_type: PlaceType) -> &'static str {
    match place_type {
        Country => "Country",
        Admin1 => "Admin Level 1",
        Admin2 => "Admin Level 2",
        Admin3 => "Admin Level 3",
        Locality => "Locality",
        Neighborhood => "Neighborhood",
        Street => "Street",
        Poi => "Point of Interest",
        AdminArea => "Administrative Area",
        City => "City",
        District => "District",
    }
}

/// The defaults as a policy layer.
///
/// The defaults never supply region auto-assign tables.
pub fn overlay() -> ProfileOverlay {
    ProfileOverlay {
        enabled_levels: DEFAULT_ENABLED_LEVELS.to_vec(),
        parent_rules: rule_table(DEFAULT_PARENT_RULES),
        label_mapping: PlaceType::all()
            .iter()
            .map(|t| (*t, default_label(*t).to_string()))
            .collect(),
        city_like_levels: DEFAULT_CITY_LIKE_LEVELS.to_vec(),
        region_auto_assign: None,
    }
}

/// Build a parent-rule map from a static table.
pub fn rule_table(entries: &[(PlaceType, &[PlaceType])]) -> BTreeMap<PlaceType, Vec<PlaceType>> {
    entries
        .iter()
        .map(|(child, parents)| (*child, parents.to_vec()))
        .collect()
}

/// Build a label map from a static table.
pub fn label_table(entries: &[(PlaceType, &str)]) -> BTreeMap<PlaceType, String> {
    entries
        .iter()
        .map(|(level, label)| (*level, label.to_string()))
        .collect()
}

/// Build a region lookup table from a static table. Entries whose region
/// key normalizes to nothing are skipped.
pub fn region_table(entries: &[(&str, &str)]) -> RegionTable {
    entries
        .iter()
        .filter_map(|(key, region)| {
            RegionKey::normalize(region).map(|region| (key.to_string(), region))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_enabled_by_default() {
        assert_eq!(DEFAULT_ENABLED_LEVELS, PlaceType::all());
    }

    #[test]
    fn every_level_has_a_rule_entry() {
        let rules = rule_table(DEFAULT_PARENT_RULES);
        for t in PlaceType::all() {
            assert!(rules.contains_key(t), "missing default rule for {t}");
        }
        assert!(rules[&Country].is_empty());
        assert_eq!(rules[&Admin2], [Admin1, Country]);
    }

    #[test]
    fn every_level_has_a_label() {
        let layer = overlay();
        assert_eq!(layer.label_mapping.len(), PlaceType::all().len());
        assert_eq!(layer.label_mapping[&Poi], "Point of Interest");
        assert!(layer.region_auto_assign.is_none());
    }

    #[test]
    fn region_table_skips_blank_targets() {
        let table = region_table(&[("a", "Region A"), ("b", "  ")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table["a"].as_str(), "region-a");
    }
}
