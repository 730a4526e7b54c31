//! Compile-time registry of city label catalogs.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a country requires creating a TOML file in `cities/` and adding
//! a corresponding entry here.

use globe_map_map_models::CityMarker;
use serde::Deserialize;

/// Number of registered catalogs. Enforced by a test.
#[cfg(test)]
const EXPECTED_CATALOG_COUNT: usize = 1;

/// Embedded TOML catalogs.
const CATALOG_TOMLS: &[(&str, &str)] = &[("india", include_str!("../cities/india.toml"))];

/// Hand-curated reference cities of one country.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityCatalog {
    /// Country name, matching the boundary source's name attribute.
    pub country: String,
    /// Cities in label drawing order.
    #[serde(rename = "city")]
    pub cities: Vec<CityMarker>,
}

/// Returns all registered catalogs.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. These are compile-time
/// constants, so a parse failure is a development error caught by tests.
#[must_use]
pub fn all_catalogs() -> Vec<CityCatalog> {
    CATALOG_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse city catalog '{name}': {e}"))
        })
        .collect()
}

/// Returns the cities registered for `country` (case-insensitive), if any.
#[must_use]
pub fn catalog_for(country: &str) -> Option<Vec<CityMarker>> {
    let country = country.trim();
    all_catalogs()
        .into_iter()
        .find(|catalog| catalog.country.eq_ignore_ascii_case(country))
        .map(|catalog| catalog.cities)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use globe_map_map_models::TextAnchor;

    use super::*;

    #[test]
    fn loads_all_catalogs() {
        let catalogs = all_catalogs();
        assert_eq!(
            catalogs.len(),
            EXPECTED_CATALOG_COUNT,
            "Expected {EXPECTED_CATALOG_COUNT} city catalogs, found {}. \
             Update EXPECTED_CATALOG_COUNT after adding/removing catalogs.",
            catalogs.len()
        );
    }

    #[test]
    fn country_names_are_unique() {
        let mut seen = BTreeSet::new();
        for catalog in &all_catalogs() {
            assert!(
                seen.insert(catalog.country.to_ascii_lowercase()),
                "Duplicate city catalog country: {}",
                catalog.country
            );
        }
    }

    #[test]
    fn cities_are_named_and_geographic() {
        for catalog in &all_catalogs() {
            let mut names = BTreeSet::new();
            for city in &catalog.cities {
                assert!(!city.name.is_empty(), "{} has an unnamed city", catalog.country);
                assert!(
                    names.insert(&city.name),
                    "{} lists {} twice",
                    catalog.country,
                    city.name
                );
                assert!(
                    (-180.0..=180.0).contains(&city.longitude())
                        && (-90.0..=90.0).contains(&city.latitude()),
                    "{} in {} is out of range",
                    city.name,
                    catalog.country
                );
            }
        }
    }

    #[test]
    fn india_catalog_matches_curated_list() {
        let cities = catalog_for("India").unwrap();
        assert_eq!(cities.len(), 17);
        assert_eq!(cities[0].name, "Mumbai");
        assert_eq!(cities[0].label_anchor, TextAnchor::MiddleLeft);
        assert_eq!(cities[16].name, "Kochi");
        assert_eq!(cities[16].label_anchor, TextAnchor::BottomLeft);
        let delhi = cities.iter().find(|c| c.name == "Delhi").unwrap();
        assert_eq!(delhi.label_anchor, TextAnchor::TopCenter);
        assert!((delhi.latitude() - 28.7041).abs() < f64::EPSILON);
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert!(catalog_for(" india ").is_some());
        assert!(catalog_for("Atlantis").is_none());
    }
}
