//! Street name cleaning.
//!
//! Every function here works on a single street value and is independent of
//! the others; [`StreetRule`](super::rules::StreetRule) chains them.

use crate::patterns::Patterns;

use super::tables::{expand_cardinal, is_canonical_street_type, is_cardinal, street_type_for};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteSplit {
    pub name: String,
    /// `None` when the marker dangles at the end of the value.
    pub suite: Option<String>,
}

/// Splits `"100 Main St, Suite #4"` into `"100 Main St"` and `"4"`.
///
/// The leftmost usable `suite`/`#` marker wins; `Suitecrest` is not a marker.
/// Nothing is split when the marker starts the value.
pub fn split_suite(value: &str, patterns: &Patterns) -> Option<SuiteSplit> {
    let marker = patterns.suite_marker.find_iter(value).find(|marker| {
        marker.as_str() == "#"
            || !value[marker.end()..].starts_with(|c: char| c.is_alphabetic())
    })?;

    let name = &value[..marker.start()];
    let name = name.split_once(',').map_or(name, |(head, _)| head).trim();
    if name.is_empty() {
        return None;
    }
    let suite = value[marker.end()..].trim().trim_start_matches('#').trim();
    Some(SuiteSplit {
        name: name.to_string(),
        suite: (!suite.is_empty()).then(|| suite.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeNumberSplit {
    pub number: String,
    pub street: String,
}

/// Home numbers of four digits sometimes lead the street value.
pub fn split_home_number(value: &str, patterns: &Patterns) -> Option<HomeNumberSplit> {
    let captures = patterns.home_number.captures(value.trim())?;
    Some(HomeNumberSplit {
        number: captures.name("number")?.as_str().to_string(),
        street: captures.name("rest")?.as_str().trim().to_string(),
    })
}

/// Expands the street type and leading/trailing cardinal abbreviations, then
/// unifies state road and US highway designations.
pub fn expand_street_name(value: &str, patterns: &Patterns) -> String {
    let mut tokens: Vec<String> = value.split_whitespace().map(str::to_string).collect();
    let Some(last_index) = tokens.len().checked_sub(1) else {
        return String::new();
    };

    if let Some(first) = tokens.first_mut() {
        strip_cardinal_period(first);
    }
    if let Some(last) = tokens.last_mut() {
        strip_cardinal_period(last);
    }

    // A trailing cardinal pushes the street type one token to the left.
    let trailing_cardinal = last_index > 0 && tokens.get(last_index).is_some_and(|last| is_cardinal(last));
    let type_index = if trailing_cardinal { last_index - 1 } else { last_index };
    if let Some(street_type) = tokens.get_mut(type_index) {
        if !is_canonical_street_type(street_type) {
            if let Some(canonical) = street_type_for(street_type) {
                *street_type = canonical.to_string();
            }
        }
    }

    for index in [0, last_index] {
        if let Some(token) = tokens.get_mut(index) {
            if let Some(full) = expand_cardinal(token) {
                *token = full.to_string();
            }
        }
    }

    let name = unify_state_road(&tokens.join(" "), patterns);
    unify_us_highway(&name, patterns)
}

/// `"N."` becomes `"N"`; other tokens keep their period.
fn strip_cardinal_period(token: &mut String) {
    let bare = token.strip_suffix('.')
        .filter(|bare| expand_cardinal(bare).is_some())
        .map(str::to_string);
    if let Some(bare) = bare {
        *token = bare;
    }
}

/// `SR 60`, `FL-580` and the like become `State Road <number>`.
pub fn unify_state_road(name: &str, patterns: &Patterns) -> String {
    match patterns.state_road.captures(name).and_then(|captures| captures.name("rest")) {
        Some(rest) => format!("State Road {}", rest.as_str().trim()),
        None => name.trim().to_string(),
    }
}

/// `US 19`, `U.S. Hwy 41`, `US-301 (FL)` become `US Highway <number>`.
pub fn unify_us_highway(name: &str, patterns: &Patterns) -> String {
    let unified = patterns.us_highway.replace_all(name, "US Highway $number");
    unified.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops a leading and a trailing cardinal so that `North Main Street` and
/// `Main Street South` group together. At least one token is kept.
pub fn strip_cardinals(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    if tokens.len() > 1 && tokens.first().is_some_and(|first| is_cardinal(first)) {
        tokens.remove(0);
    }
    if tokens.len() > 1 && tokens.last().is_some_and(|last| is_cardinal(last)) {
        tokens.pop();
    }
    tokens.join(" ")
}
