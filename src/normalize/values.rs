use crate::patterns::Patterns;

use super::tables::{
    CITY_ALIASES, FIXME, LAND_O_LAKES_VARIANTS, POSTCODE_TYPOS, SAINT_PETERSBURG_VARIANTS,
};

/// `"1,234"` becomes `"1234"`; anything else is only trimmed.
pub fn strip_thousands_separator(value: &str, patterns: &Patterns) -> String {
    let value = value.trim();
    if patterns.thousands_separated.is_match(value) {
        value.replace(',', "")
    } else {
        value.to_string()
    }
}

/// Census figures come as `year;population`; only the population is kept.
pub fn census_figure(value: &str, patterns: &Patterns) -> String {
    let figure = value.split(';').nth(1).unwrap_or(value);
    strip_thousands_separator(figure, patterns)
}

/// Repairs a postcode into a five digit Tampa area code, or returns
/// [`FIXME`] when no repair applies. Valid codes come back unchanged.
pub fn fix_postcode(value: &str, patterns: &Patterns) -> String {
    let value = value.trim();
    if patterns.regional_postcode.is_match(value) {
        return value.to_string();
    }
    if patterns.postcode_prefix.is_match(value) {
        // `3####-####`, `3####:####`
        return value.chars().take(5).collect();
    }
    if let Some(code) = patterns.state_prefixed_postcode.captures(value).and_then(|captures| captures.name("code")) {
        return code.as_str().to_string();
    }
    POSTCODE_TYPOS.iter()
        .find(|(typo, _)| *typo == value)
        .map_or(FIXME, |(_, fixed)| *fixed)
        .to_string()
}

pub fn fix_city_name(value: &str) -> String {
    let words: Vec<String> = value.split_whitespace().map(capitalize).collect();
    if words.is_empty() {
        return FIXME.to_string();
    }
    let name = words.join(" ");

    if SAINT_PETERSBURG_VARIANTS.contains(&name.as_str()) {
        return "Saint Petersburg".to_string();
    }
    if LAND_O_LAKES_VARIANTS.contains(&name.as_str()) {
        return "Land O' Lakes".to_string();
    }
    CITY_ALIASES.iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, city)| city.to_string())
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Splits a county list such as `"Hillsborough; Pinellas, FL"` into distinct
/// names, keeping first-seen order.
pub fn split_counties(value: &str) -> Vec<String> {
    let cleaned = value.replace(", FL", " ").replace([';', ':'], " ");
    let mut counties: Vec<String> = Vec::new();
    for county in cleaned.split_whitespace() {
        if !counties.iter().any(|seen| seen == county) {
            counties.push(county.to_string());
        }
    }
    counties
}
