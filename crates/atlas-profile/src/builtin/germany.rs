//! Germany: Bundesland / Regierungsbezirk hierarchy.

use atlas_core::PlaceType::*;

use crate::defaults::{label_table, rule_table};
use crate::document::ProfileOverlay;

/// The built-in layer for DE.
pub fn overlay() -> ProfileOverlay {
    ProfileOverlay {
        enabled_levels: vec![
            Country,
            Admin1,
            Admin2,
            Locality,
            Neighborhood,
            Street,
            Poi,
            City,
            District,
        ],
        parent_rules: rule_table(&[
            (Admin1, &[Country]),
            (Admin2, &[Admin1, Country]),
            (Locality, &[Admin1, Admin2, Country]),
            (Neighborhood, &[Locality, City, District]),
            (City, &[Admin1, Admin2, Country]),
            (District, &[City, Locality, Admin2]),
            (Poi, &[District, Neighborhood, City, Locality]),
        ]),
        label_mapping: label_table(&[
            (Admin1, "Bundesland"),
            (Admin2, "Regierungsbezirk"),
            (Locality, "Stadt"),
            (Neighborhood, "Bezirk"),
            (City, "Stadt"),
            (District, "Bezirk"),
            (Poi, "POI"),
        ]),
        city_like_levels: vec![City, Locality],
        region_auto_assign: None,
    }
}
