//! Compiled regular expressions shared by the classifier and the value rules.
//!
//! Built once per run by [`Patterns::new`] and handed down by reference.

use regex::Regex;

use crate::errors::Result;

#[derive(Debug)]
pub struct Patterns {
    /// Lowercase key, optionally ending in a single digit (`building`, `name_1`).
    pub plain_key: Regex,
    /// `prefix:rest`, the rest may hold further colons.
    pub namespaced_key: Regex,
    pub problem_chars: Regex,
    /// `word word`, salvaged by replacing the spaces.
    pub spaced_key: Regex,
    /// `word-word`, salvaged by replacing the dash.
    pub dashed_key: Regex,

    pub thousands_separated: Regex,

    /// A `suite` word or a `#`. A `suite` glued to letters is rejected by the caller.
    pub suite_marker: Regex,
    pub home_number: Regex,
    pub state_road: Regex,
    pub us_highway: Regex,

    pub regional_postcode: Regex,
    pub postcode_prefix: Regex,
    pub state_prefixed_postcode: Regex,
}

impl Patterns {
    pub fn new() -> Result<Self> {
        Ok(Patterns {
            plain_key: Regex::new(r"^[a-z_]*[0-9]?$")?,
            namespaced_key: Regex::new(r"^[a-z_]+:[a-z0-9_]+")?,
            problem_chars: Regex::new(r#"[=+/&<>;'"?%#$@,. \t\r\n]"#)?,
            spaced_key: Regex::new(r"^[a-z]+(\s[a-z]+)+$")?,
            dashed_key: Regex::new(r"^[a-z]+-[a-z]+$")?,

            thousands_separated: Regex::new(r"^\d+(,\d+)+$")?,

            suite_marker: Regex::new(r"(?i)\bsuite|#")?,
            home_number: Regex::new(r"^(?P<number>[1-9]\d{3})\s+(?P<rest>\S.*)$")?,
            state_road: Regex::new(r"(?i)^(SR|FL)[\s-]+(?P<rest>\S.*)$")?,
            us_highway: Regex::new(
                r"\b(US|U\.S\.)[\s-]+((?i:hwy|highway)\.?[\s-]*)?(?P<number>\d+[A-Za-z]?)\b(\s*\(FL\))?"
            )?,

            regional_postcode: Regex::new(r"^3[3-4]\d{3}$")?,
            postcode_prefix: Regex::new(r"^3[3-4]\d{3}")?,
            state_prefixed_postcode: Regex::new(r"(?i)^FL\s+(?P<code>3[3-4]\d{3})$")?,
        })
    }
}
