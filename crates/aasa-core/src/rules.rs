//! Effective matching rules
//!
//! Flags inherit component > rule set > link set > `true`, resolved once per
//! component evaluation.

use crate::types::{Component, Defaults, SubstitutionMap};

static NO_SUBSTITUTIONS: SubstitutionMap = SubstitutionMap::new();

/// Fully resolved flags for one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveRules<'a> {
    pub case_sensitive: bool,
    /// Carried through inheritance; comparison always uses decoded URL parts.
    pub percent_encoded: bool,
    pub substitutions: &'a SubstitutionMap,
}

impl<'a> EffectiveRules<'a> {
    /// Walk the inheritance chain for `component`.
    pub fn resolve(
        component: &Component,
        rule_set_defaults: Option<&Defaults>,
        link_set_defaults: Option<&Defaults>,
        substitutions: Option<&'a SubstitutionMap>,
    ) -> Self {
        let case_sensitive = component
            .case_sensitive
            .or_else(|| rule_set_defaults.and_then(|d| d.case_sensitive))
            .or_else(|| link_set_defaults.and_then(|d| d.case_sensitive))
            .unwrap_or(true);

        let percent_encoded = component
            .percent_encoded
            .or_else(|| rule_set_defaults.and_then(|d| d.percent_encoded))
            .or_else(|| link_set_defaults.and_then(|d| d.percent_encoded))
            .unwrap_or(true);

        Self {
            case_sensitive,
            percent_encoded,
            substitutions: substitutions.unwrap_or(&NO_SUBSTITUTIONS),
        }
    }
}

impl Default for EffectiveRules<'_> {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            percent_encoded: true,
            substitutions: &NO_SUBSTITUTIONS,
        }
    }
}
