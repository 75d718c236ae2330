//! Data-driven corrections for individual, known-bad elements.
//!
//! A handful of elements in the source extract carry defects no general rule
//! should try to repair. They are listed in a JSON table instead of code: the
//! built-in table lives in `config/overrides.json` and a replacement can be
//! supplied through [`UserConfig::overrides_path`](crate::config::UserConfig).

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::data::OsmId;
use crate::errors::Result;

const BUILTIN_OVERRIDES: &str = include_str!("../../config/overrides.json");

#[derive(Deserialize, Debug, Default)]
struct OverrideFile {
    #[serde(default)]
    excluded_nodes: Vec<OsmId>,
    #[serde(default)]
    street_overrides: Vec<StreetOverrideEntry>,
}

#[derive(Deserialize, Debug)]
struct StreetOverrideEntry {
    element_id: Option<OsmId>,
    value_contains: Option<String>,
    pattern: String,
    #[serde(default)]
    fixed: BTreeMap<String, String>,
}

#[derive(Debug)]
enum StreetMatcher {
    Element(OsmId),
    Contains(String),
}

#[derive(Debug)]
struct StreetOverride {
    matcher: StreetMatcher,
    pattern: Regex,
    fixed: BTreeMap<String, String>,
}

/// A street value broken into its parts by an override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetDecomposition {
    pub street: String,
    /// `(key, value)` pairs for synthetic `addr` tags.
    pub address_tags: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct Overrides {
    excluded: HashSet<OsmId>,
    streets: Vec<StreetOverride>,
}

impl Overrides {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_OVERRIDES)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|err| format!("Could not open overrides file {}: {err}", path.display()))?;
        let parsed: OverrideFile = serde_json::from_reader(BufReader::new(file))?;
        Self::compile(parsed)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::compile(serde_json::from_str(json)?)
    }

    fn compile(file: OverrideFile) -> Result<Self> {
        let mut streets = Vec::with_capacity(file.street_overrides.len());
        for entry in file.street_overrides {
            let matcher = match (entry.element_id, entry.value_contains) {
                (Some(id), None) => StreetMatcher::Element(id),
                (None, Some(needle)) => StreetMatcher::Contains(needle),
                _ => return Err("Street override needs exactly one of element_id or value_contains".into()),
            };
            let pattern = Regex::new(&entry.pattern)?;
            if !pattern.capture_names().flatten().any(|name| name == "street") {
                return Err(format!("Street override pattern {:?} has no `street` group", entry.pattern).into());
            }
            streets.push(StreetOverride {
                matcher,
                pattern,
                fixed: entry.fixed,
            });
        }
        Ok(Overrides {
            excluded: file.excluded_nodes.into_iter().collect(),
            streets,
        })
    }

    pub fn is_excluded_node(&self, id: OsmId) -> bool {
        self.excluded.contains(&id)
    }

    /// First override whose matcher and pattern both accept the value.
    pub fn decompose_street(&self, id: OsmId, value: &str) -> Option<StreetDecomposition> {
        self.streets.iter()
            .filter(|entry| match &entry.matcher {
                StreetMatcher::Element(element_id) => *element_id == id,
                StreetMatcher::Contains(needle) => value.contains(needle.as_str()),
            })
            .find_map(|entry| entry.decompose(value))
    }
}

impl StreetOverride {
    fn decompose(&self, value: &str) -> Option<StreetDecomposition> {
        let captures = self.pattern.captures(value)?;
        let street = captures.name("street")?.as_str().trim().to_string();

        let mut address_tags: Vec<(String, String)> = self.pattern.capture_names()
            .flatten()
            .filter(|name| *name != "street")
            .filter_map(|name| {
                let part = captures.name(name)?.as_str().trim();
                (!part.is_empty()).then(|| (name.to_string(), part.to_string()))
            })
            .collect();
        address_tags.extend(self.fixed.iter().map(|(key, value)| (key.clone(), value.clone())));

        Some(StreetDecomposition {
            street,
            address_tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
    }

    #[test]
    fn builtin_table_excludes_the_defunct_bowling_alley() {
        let overrides = Overrides::builtin().expect("builtin overrides parse");
        assert!(overrides.is_excluded_node(2061928287));
        assert!(!overrides.is_excluded_node(1));
    }

    #[test]
    fn decomposes_street_with_embedded_city_and_postcode() {
        let overrides = Overrides::builtin().expect("builtin overrides parse");
        let decomposition = overrides
            .decompose_street(1029614792, "2909 W Bay to Bay Blvd, Tampa 33629")
            .expect("override applies");
        assert_eq!(decomposition.street, "2909 W Bay to Bay Blvd");
        assert_eq!(
            decomposition.address_tags,
            tags(&[("city", "Tampa"), ("postcode", "33629"), ("country", "US"), ("state", "FL")])
        );
    }

    #[test]
    fn decomposes_street_with_glued_city() {
        let overrides = Overrides::builtin().expect("builtin overrides parse");
        let decomposition = overrides
            .decompose_street(2266845486, "6401 Central Ave St Petersburg, 33710")
            .expect("override applies");
        assert_eq!(decomposition.street, "6401 Central Ave");
        assert_eq!(
            decomposition.address_tags,
            tags(&[("city", "St Petersburg"), ("country", "US"), ("state", "FL")])
        );
    }

    #[test]
    fn decomposes_german_locale_addresses_for_any_element() {
        let overrides = Overrides::builtin().expect("builtin overrides parse");
        let decomposition = overrides
            .decompose_street(42, "1500 N Westshore Blvd, Tampa, FL 33607, Vereinigte Staaten")
            .expect("override applies");
        assert_eq!(decomposition.street, "1500 N Westshore Blvd");
        assert_eq!(
            decomposition.address_tags,
            tags(&[("city", "Tampa"), ("state", "FL"), ("postcode", "33607"), ("country", "US")])
        );
    }

    #[test]
    fn other_elements_are_untouched() {
        let overrides = Overrides::builtin().expect("builtin overrides parse");
        assert_eq!(overrides.decompose_street(7, "2909 W Bay to Bay Blvd, Tampa 33629"), None);
    }

    #[test]
    fn rejects_patterns_without_a_street_group() {
        let json = r#"{"street_overrides": [{"element_id": 1, "pattern": "^(?P<city>.*)$"}]}"#;
        assert!(Overrides::from_json(json).is_err());
    }

    #[test]
    fn rejects_entries_with_two_matchers() {
        let json = r#"{"street_overrides": [
            {"element_id": 1, "value_contains": "x", "pattern": "^(?P<street>.*)$"}
        ]}"#;
        assert!(Overrides::from_json(json).is_err());
    }
}
