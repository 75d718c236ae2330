use log::debug;

use crate::classify::{classify_key, KeyClass};
use crate::data::{ElementKind, NodeRecord, RawElement, ShapedElement, TagRecord, WayNodeRecord, WayRecord};
use crate::errors::Result;
use crate::normalize::overrides::Overrides;
use crate::normalize::tables::FIXME;
use crate::normalize::Normalizer;
use crate::patterns::Patterns;

/// Running counters for one shaping pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShapeStats {
    pub nodes: u64,
    pub ways: u64,
    pub excluded: u64,
    pub tags: u64,
    pub dropped_tags: u64,
    pub fixme_values: u64,
    pub invalid: u64,
}

/// Turns raw elements into records: classifies each tag key, runs the value
/// rules and copies the declared attributes.
pub struct Shaper {
    patterns: Patterns,
    overrides: Overrides,
    normalizer: Normalizer,
}

impl Shaper {
    pub fn new(patterns: Patterns, overrides: Overrides, normalizer: Normalizer) -> Self {
        Shaper {
            patterns,
            overrides,
            normalizer,
        }
    }

    pub fn standard(overrides: Overrides) -> Result<Self> {
        Ok(Shaper::new(Patterns::new()?, overrides, Normalizer::standard()))
    }

    /// `None` for nodes listed as excluded in the overrides. Way ids live in
    /// their own namespace and are never excluded.
    pub fn shape(&self, element: &RawElement, stats: &mut ShapeStats) -> Option<ShapedElement> {
        if element.kind == ElementKind::Node && self.overrides.is_excluded_node(element.id) {
            debug!(element_id = element.id; "Skipping excluded element");
            stats.excluded += 1;
            return None;
        }

        let tags = self.shape_tags(element, stats);
        stats.tags += tags.len() as u64;
        stats.fixme_values += tags.iter().filter(|tag| tag.value == FIXME).count() as u64;

        let attribute = |name: &str| element.attribute(name).map(str::to_string);
        let shaped = match element.kind {
            ElementKind::Node => {
                stats.nodes += 1;
                ShapedElement::Node {
                    node: NodeRecord {
                        id: element.id,
                        lat: attribute("lat"),
                        lon: attribute("lon"),
                        user: attribute("user"),
                        uid: attribute("uid"),
                        version: attribute("version"),
                        changeset: attribute("changeset"),
                        timestamp: attribute("timestamp"),
                    },
                    tags,
                }
            }
            ElementKind::Way => {
                stats.ways += 1;
                let nodes = element.node_refs.iter()
                    .zip(0u64..)
                    .map(|(node_id, position)| WayNodeRecord {
                        id: element.id,
                        node_id: *node_id,
                        position,
                    })
                    .collect();
                ShapedElement::Way {
                    way: WayRecord {
                        id: element.id,
                        user: attribute("user"),
                        uid: attribute("uid"),
                        version: attribute("version"),
                        changeset: attribute("changeset"),
                        timestamp: attribute("timestamp"),
                    },
                    tags,
                    nodes,
                }
            }
        };
        Some(shaped)
    }

    fn shape_tags(&self, element: &RawElement, stats: &mut ShapeStats) -> Vec<TagRecord> {
        let mut tags = Vec::with_capacity(element.tags.len());
        for entry in &element.tags {
            let classified = classify_key(&entry.key, &self.patterns);
            let Some((tag_type, key)) = classified.stored else {
                debug!(element_id = element.id, key = entry.key.as_str(), class = class_name(&classified.class); "Dropping tag");
                stats.dropped_tags += 1;
                continue;
            };
            let tag = TagRecord::new(element.id, key, entry.value.as_str(), tag_type);
            tags.extend(self.normalizer.normalize(tag, &self.patterns, &self.overrides));
        }
        tags
    }
}

fn class_name(class: &KeyClass) -> &'static str {
    match class {
        KeyClass::Plain => "plain",
        KeyClass::Namespaced => "namespaced",
        KeyClass::Salvaged => "salvaged",
        KeyClass::Problematic => "problematic",
        KeyClass::Other => "other",
    }
}
