//! Value normalization.
//!
//! A [`Normalizer`] is an ordered list of [`TagRule`]s. Every rule whose
//! predicate accepts a tag gets to rewrite it and to add synthetic tags owned
//! by the same element, until one of them returns [`Flow::Stop`].

pub mod overrides;
pub mod rules;
pub mod street;
pub mod tables;
pub mod values;

use crate::data::TagRecord;
use crate::patterns::Patterns;

use self::overrides::Overrides;
use self::rules::{
    CensusPopulationRule, CityRule, CountyRule, HouseNumberRule, PhoneRelabelRule,
    PopulationRule, PopulationSourceRule, PostcodeRule, StreetRule,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// What a rule sees and may change.
pub struct RuleContext<'a> {
    pub patterns: &'a Patterns,
    pub overrides: &'a Overrides,
    pub tag: &'a mut TagRecord,
    /// Synthetic tags derived from `tag`.
    pub extra: &'a mut Vec<TagRecord>,
}

impl RuleContext<'_> {
    pub fn push_extra(&mut self, tag_type: &str, key: &str, value: impl Into<String>) {
        let id = self.tag.id;
        self.extra.push(TagRecord::new(id, key, value, tag_type));
    }
}

pub trait TagRule {
    fn name(&self) -> &'static str;

    fn matches(&self, tag: &TagRecord) -> bool;

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Flow;
}

pub struct Normalizer {
    rules: Vec<Box<dyn TagRule>>,
}

impl Normalizer {
    pub fn new(rules: Vec<Box<dyn TagRule>>) -> Self {
        Normalizer { rules }
    }

    /// The rule set used for the Tampa extract, in consultation order.
    pub fn standard() -> Self {
        Normalizer::new(vec![
            Box::new(PhoneRelabelRule),
            Box::new(PopulationRule),
            Box::new(CensusPopulationRule),
            Box::new(PopulationSourceRule),
            Box::new(StreetRule),
            Box::new(HouseNumberRule),
            Box::new(PostcodeRule),
            Box::new(CityRule),
            Box::new(CountyRule),
        ])
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Normalizes one tag. Returns the synthetic tags it produced followed by
    /// the tag itself.
    pub fn normalize(&self, mut tag: TagRecord, patterns: &Patterns, overrides: &Overrides) -> Vec<TagRecord> {
        let mut extra = Vec::new();
        for rule in &self.rules {
            if !rule.matches(&tag) {
                continue;
            }
            let mut ctx = RuleContext {
                patterns,
                overrides,
                tag: &mut tag,
                extra: &mut extra,
            };
            if rule.apply(&mut ctx) == Flow::Stop {
                break;
            }
        }
        extra.push(tag);
        extra
    }
}
