//! Tag key classification.
//!
//! Keys are lower-cased, then tested in a fixed order: plain, namespaced,
//! the two salvageable shapes (`word word`, `word-word`), problematic.
//! Everything left over is `Other` and dropped like problematic keys.

use crate::data::records::REGULAR_TAG_TYPE;
use crate::patterns::Patterns;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyClass {
    Plain,
    Namespaced,
    /// A key that only needed its spaces or dash replaced.
    Salvaged,
    Problematic,
    Other,
}

/// Outcome of classifying a key: its class, and the `(type, key)` pair to
/// store when the class is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedKey {
    pub class: KeyClass,
    pub stored: Option<(String, String)>,
}

impl ClassifiedKey {
    fn kept(class: KeyClass, tag_type: &str, key: &str) -> Self {
        ClassifiedKey {
            class,
            stored: Some((tag_type.to_string(), key.to_string())),
        }
    }

    fn dropped(class: KeyClass) -> Self {
        ClassifiedKey {
            class,
            stored: None,
        }
    }
}

pub fn classify_key(raw_key: &str, patterns: &Patterns) -> ClassifiedKey {
    let key = raw_key.to_lowercase();

    if patterns.plain_key.is_match(&key) {
        return ClassifiedKey::kept(KeyClass::Plain, REGULAR_TAG_TYPE, &key);
    }
    if patterns.namespaced_key.is_match(&key) {
        // The pattern guarantees a colon.
        if let Some((prefix, rest)) = key.split_once(':') {
            return ClassifiedKey::kept(KeyClass::Namespaced, prefix, rest);
        }
    }
    if patterns.spaced_key.is_match(&key) {
        let salvaged = key.split_whitespace().collect::<Vec<_>>().join("_");
        return ClassifiedKey::kept(KeyClass::Salvaged, REGULAR_TAG_TYPE, &salvaged);
    }
    if patterns.dashed_key.is_match(&key) {
        return ClassifiedKey::kept(KeyClass::Salvaged, REGULAR_TAG_TYPE, &key.replace('-', "_"));
    }
    if patterns.problem_chars.is_match(&key) {
        return ClassifiedKey::dropped(KeyClass::Problematic);
    }
    ClassifiedKey::dropped(KeyClass::Other)
}
