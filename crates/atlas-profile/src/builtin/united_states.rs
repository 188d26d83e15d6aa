//! United States: state / county hierarchy.

use atlas_core::PlaceType::*;

use crate::defaults::{label_table, rule_table};
use crate::document::ProfileOverlay;

/// The built-in layer for US.
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
            (Neighborhood, &[Locality, City, Admin2, District]),
            (City, &[Admin1, Admin2, Country]),
            (District, &[City, Locality, Admin2]),
            (Poi, &[Neighborhood, District, City, Locality]),
        ]),
        label_mapping: label_table(&[
            (Admin1, "State"),
            (Admin2, "County"),
            (Locality, "City"),
            (Neighborhood, "Neighborhood"),
            (City, "City"),
            (District, "District"),
            (Poi, "Point of Interest"),
        ]),
        city_like_levels: vec![City, Locality],
        region_auto_assign: None,
    }
}
