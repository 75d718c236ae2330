use crate::data::records::REGULAR_TAG_TYPE;
use crate::data::TagRecord;

use super::street::{expand_street_name, split_home_number, split_suite, strip_cardinals};
use super::tables::MISFILED_PHONE;
use super::values::{census_figure, fix_city_name, fix_postcode, split_counties, strip_thousands_separator};
use super::{Flow, RuleContext, TagRule};

/// A phone number somebody entered as `postal_code`. Keeps it away from the
/// postcode repair.
pub struct PhoneRelabelRule;

impl TagRule for PhoneRelabelRule {
    fn name(&self) -> &'static str {
        "phone_relabel"
    }

    fn matches(&self, tag: &TagRecord) -> bool {
        tag.is(REGULAR_TAG_TYPE, "postal_code") && tag.value == MISFILED_PHONE
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Flow {
        ctx.tag.key = "phone".to_string();
        ctx.tag.tag_type = REGULAR_TAG_TYPE.to_string();
        Flow::Stop
    }
}

pub struct PopulationRule;

impl TagRule for PopulationRule {
    fn name(&self) -> &'static str {
        "population"
    }

    fn matches(&self, tag: &TagRecord) -> bool {
        tag.is(REGULAR_TAG_TYPE, "population")
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Flow {
        ctx.tag.value = strip_thousands_separator(&ctx.tag.value, ctx.patterns);
        Flow::Continue
    }
}

/// `census:population` would collide with `population` once the prefix
/// becomes the type, so it is stored as `year/census`.
pub struct CensusPopulationRule;

impl TagRule for CensusPopulationRule {
    fn name(&self) -> &'static str {
        "census_population"
    }

    fn matches(&self, tag: &TagRecord) -> bool {
        tag.is("census", "population")
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Flow {
        ctx.tag.key = "census".to_string();
        ctx.tag.tag_type = "year".to_string();
        ctx.tag.value = census_figure(&ctx.tag.value, ctx.patterns);
        Flow::Continue
    }
}

pub struct PopulationSourceRule;

impl TagRule for PopulationSourceRule {
    fn name(&self) -> &'static str {
        "population_source"
    }

    fn matches(&self, tag: &TagRecord) -> bool {
        tag.is("source", "population")
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Flow {
        ctx.tag.key = "refpopulation".to_string();
        Flow::Continue
    }
}

pub struct StreetRule;

impl TagRule for StreetRule {
    fn name(&self) -> &'static str {
        "street"
    }

    fn matches(&self, tag: &TagRecord) -> bool {
        tag.is("addr", "street")
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Flow {
        let mut street = ctx.tag.value.clone();

        if let Some(split) = split_suite(&street, ctx.patterns) {
            if let Some(suite) = split.suite {
                ctx.push_extra("addr", "suite", suite);
            }
            street = split.name;
        } else if let Some(decomposition) = ctx.overrides.decompose_street(ctx.tag.id, &street) {
            for (key, value) in decomposition.address_tags {
                ctx.push_extra("addr", &key, value);
            }
            street = decomposition.street;
        }

        if let Some(split) = split_home_number(&street, ctx.patterns) {
            ctx.push_extra("addr", "homenumber", split.number);
            street = split.street;
        }

        let expanded = expand_street_name(&street, ctx.patterns);
        if expanded.is_empty() {
            ctx.tag.value = street;
            return Flow::Continue;
        }
        ctx.push_extra("addr", "u_street", strip_cardinals(&expanded));
        ctx.tag.value = expanded;
        Flow::Continue
    }
}

pub struct HouseNumberRule;

impl TagRule for HouseNumberRule {
    fn name(&self) -> &'static str {
        "house_number"
    }

    fn matches(&self, tag: &TagRecord) -> bool {
        tag.is("addr", "housenumber")
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Flow {
        if let Some(split) = split_suite(&ctx.tag.value, ctx.patterns) {
            if let Some(suite) = split.suite {
                ctx.push_extra("addr", "suite", suite);
            }
            ctx.tag.value = split.name;
        }
        Flow::Continue
    }
}

pub struct PostcodeRule;

impl TagRule for PostcodeRule {
    fn name(&self) -> &'static str {
        "postcode"
    }

    fn matches(&self, tag: &TagRecord) -> bool {
        tag.is("addr", "postcode")
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Flow {
        ctx.tag.value = fix_postcode(&ctx.tag.value, ctx.patterns);
        Flow::Continue
    }
}

pub struct CityRule;

impl TagRule for CityRule {
    fn name(&self) -> &'static str {
        "city"
    }

    fn matches(&self, tag: &TagRecord) -> bool {
        tag.is("addr", "city")
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Flow {
        ctx.tag.value = fix_city_name(&ctx.tag.value);
        Flow::Continue
    }
}

/// One `tiger:county` value may list several counties. The first stays on the
/// tag, the rest become `tiger:county1`, `tiger:county2`, ...
pub struct CountyRule;

impl TagRule for CountyRule {
    fn name(&self) -> &'static str {
        "county"
    }

    fn matches(&self, tag: &TagRecord) -> bool {
        tag.is("tiger", "county")
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Flow {
        let mut counties = split_counties(&ctx.tag.value).into_iter();
        let Some(primary) = counties.next() else {
            return Flow::Continue;
        };
        for (index, county) in counties.enumerate() {
            ctx.push_extra("tiger", &format!("county{}", index + 1), county);
        }
        ctx.tag.value = primary;
        Flow::Continue
    }
}
