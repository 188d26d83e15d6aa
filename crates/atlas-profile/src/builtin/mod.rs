//! # Built-in Country Tables
//!
//! Compiled-in policy overrides for countries whose administrative
//! structure is known ahead of any stored record. Each country lives in its
//! own module and exposes a single `overlay()` constructor.
//!
//! Countries without an entry here are still valid; they resolve to the
//! generic defaults plus whatever their stored record adds.

pub mod germany;
pub mod turkey;
pub mod united_states;

use atlas_core::CountryCode;

use crate::document::ProfileOverlay;

/// Summary of a country with a built-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltInCountry {
    /// Two-letter country code.
    pub country_code: &'static str,
    /// English country name.
    pub name: &'static str,
}

/// Countries with a compiled-in table, in code order.
pub fn available_countries() -> &'static [BuiltInCountry] {
    &[
        BuiltInCountry {
            country_code: "DE",
            name: "Germany",
        },
        BuiltInCountry {
            country_code: "TR",
            name: "Turkey",
        },
        BuiltInCountry {
            country_code: "US",
            name: "United States",
        },
    ]
}

/// The built-in layer for a country, if one exists.
pub fn country_overlay(country: &CountryCode) -> Option<ProfileOverlay> {
    match country.as_str() {
        "DE" => Some(germany::overlay()),
        "TR" => Some(turkey::overlay()),
        "US" => Some(united_states::overlay()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_country_has_a_table() {
        for entry in available_countries() {
            let code = CountryCode::new(entry.country_code).unwrap();
            assert!(country_overlay(&code).is_some(), "no table for {}", entry.name);
        }
    }

    #[test]
    fn unknown_country_has_no_table() {
        let code = CountryCode::new("FR").unwrap();
        assert!(country_overlay(&code).is_none());
    }

    #[test]
    fn tables_always_enable_country() {
        for entry in available_countries() {
            let code = CountryCode::new(entry.country_code).unwrap();
            let layer = country_overlay(&code).unwrap();
            assert!(layer.enabled_levels.contains(&atlas_core::PlaceType::Country));
        }
    }
}
