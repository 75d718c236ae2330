/// Street suffixes that are already in canonical form.
pub const CANONICAL_STREET_TYPES: [&str; 19] = [
    "Street", "Avenue", "Boulevard", "Drive", "Court", "Place", "Square", "Lane", "Road",
    "Trail", "Parkway", "Commons", "Way", "Terrace", "Circle", "Highway", "Bayway",
    "Causeway", "Loop",
];

/// Abbreviations and misspellings seen in the Tampa extract.
pub const STREET_TYPE_MAPPING: [(&str, &str); 27] = [
    ("St", "Street"),
    ("St.", "Street"),
    ("st", "Street"),
    ("Ave", "Avenue"),
    ("Ave.", "Avenue"),
    ("AVE", "Avenue"),
    ("Av", "Avenue"),
    ("Rd", "Road"),
    ("Rd.", "Road"),
    ("road", "Road"),
    ("Blvd", "Boulevard"),
    ("Blvd.", "Boulevard"),
    ("Bolevard", "Boulevard"),
    ("Dr", "Drive"),
    ("Dr.", "Drive"),
    ("dr", "Drive"),
    ("drive", "Drive"),
    ("Ct", "Court"),
    ("Cswy", "Causeway"),
    ("Pkwy", "Parkway"),
    ("Pky", "Parkway"),
    ("Cir", "Circle"),
    ("Ln", "Lane"),
    ("lane", "Lane"),
    ("Hwy", "Highway"),
    ("HWY", "Highway"),
    ("Notth", "North"),
];

/// Full cardinal words first, then their abbreviations: the abbreviation at
/// index `i` expands to the word at `i - 8`.
pub const CARDINALS: [&str; 16] = [
    "North", "South", "East", "West", "Northeast", "Northwest", "Southeast", "Southwest",
    "N", "S", "E", "W", "NE", "NW", "SE", "SW",
];

pub const SAINT_PETERSBURG_VARIANTS: [&str; 4] = [
    "St. Petersburg",
    "St Petersbug",
    "St Petersburg",
    "St. Petersburg, Fl",
];

pub const LAND_O_LAKES_VARIANTS: [&str; 2] = ["Land O Lakes", "Land O Lakes, Fl"];

pub const CITY_ALIASES: [(&str, &str); 3] = [
    ("Tampa Bay", "Tampa"),
    ("Palm Harbor, Fl.", "Palm Harbor"),
    ("Clearwarer Beach", "Clearwater Beach"),
];

/// Relabel target for a phone number that was entered as a postal code.
pub const MISFILED_PHONE: &str = "(813) 643-1700";

/// Trinity, FL typed with a 5 instead of a 4.
pub const POSTCODE_TYPOS: [(&str, &str); 1] = [("35655", "34655")];

pub const FIXME: &str = "FIXME";

pub fn street_type_for(abbreviation: &str) -> Option<&'static str> {
    STREET_TYPE_MAPPING.iter()
        .find(|(from, _)| *from == abbreviation)
        .map(|(_, to)| *to)
}

pub fn is_canonical_street_type(token: &str) -> bool {
    CANONICAL_STREET_TYPES.contains(&token)
}

pub fn is_cardinal(token: &str) -> bool {
    CARDINALS.contains(&token)
}

/// `Some("North")` for `"N"`; `None` for full words and non-cardinals.
pub fn expand_cardinal(token: &str) -> Option<&'static str> {
    let index = CARDINALS.iter().position(|cardinal| *cardinal == token)?;
    index.checked_sub(8).and_then(|full| CARDINALS.get(full)).copied()
}
