//! Turkey: il / ilce / mahalle hierarchy with regional auto-assignment.
//!
//! Provinces (il) are admin1, districts (ilce) are admin2 or the legacy
//! `district` level, and neighbourhoods (mahalle) appear both as admin3 and
//! as `neighborhood`. Provinces map onto the seven geographic regions used
//! for region groups.

use atlas_core::PlaceType::*;

use crate::defaults::{label_table, region_table, rule_table};
use crate::document::{ProfileOverlay, RegionAutoAssignOverlay};

/// The built-in layer for TR.
pub fn overlay() -> ProfileOverlay {
    ProfileOverlay {
        enabled_levels: vec![
            Country,
            Admin1,
            Admin2,
            Admin3,
            Locality,
            Neighborhood,
            Street,
            Poi,
            City,
            District,
        ],
        parent_rules: rule_table(&[
            (Admin1, &[Country]),
            (Admin2, &[Admin1, City, Country]),
            (Admin3, &[Admin2, District]),
            (Locality, &[Country, Admin1, Admin2]),
            (Neighborhood, &[Locality, City, District, Admin2]),
            (City, &[Country, Admin1]),
            (District, &[City, Admin1, Admin2]),
            (Poi, &[District, City, Neighborhood, Locality, Admin2, Admin3]),
        ]),
        label_mapping: label_table(&[
            (Admin1, "Il"),
            (Admin2, "Ilce"),
            (Admin3, "Mahalle"),
            (Locality, "Yerlesim"),
            (Neighborhood, "Mahalle"),
            (City, "Sehir"),
            (District, "Ilce"),
            (Poi, "Nokta"),
        ]),
        city_like_levels: vec![City, Locality, Admin2],
        region_auto_assign: Some(RegionAutoAssignOverlay {
            by_place_id: Some(region_table(&[
                ("city-tr-antalya", "tr-mediterranean-region"),
                ("city-tr-mugla", "tr-aegean-region"),
                ("city-tr-istanbul", "tr-marmara-region"),
            ])),
            by_slug: None,
            by_admin1_place_id: None,
            by_admin1_slug: Some(region_table(&[
                ("antalya", "tr-mediterranean-region"),
                ("mugla", "tr-aegean-region"),
                ("istanbul", "tr-marmara-region"),
            ])),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin2_may_nest_under_city() {
        let layer = overlay();
        assert_eq!(layer.parent_rules[&Admin2], [Admin1, City, Country]);
    }

    #[test]
    fn admin_area_not_enabled() {
        assert!(!overlay().enabled_levels.contains(&AdminArea));
    }

    #[test]
    fn provinces_map_to_regions() {
        let tables = overlay().region_auto_assign.unwrap();
        let by_slug = tables.by_admin1_slug.unwrap();
        assert_eq!(by_slug["antalya"].as_str(), "tr-mediterranean-region");
        assert_eq!(by_slug.len(), 3);
        assert!(tables.by_slug.is_none());
    }
}
