//! Core Matching Engine
//!
//! Components yield a tri-state [`ComponentMatch`]; a rule set is decided by
//! its first component that is not `Undetermined`; a link set collects the
//! identifiers of every matching rule set, in rule-set order.

use url::Url;

use crate::cache::PatternCache;
use crate::pattern::{compile, PatternError};
use crate::rules::EffectiveRules;
use crate::types::{
    AssociationDocument, Component, Defaults, LinkSet, QueryConstraint, RuleSet, SubstitutionMap,
};
use crate::url::{strip_leading_slash, UrlParts};

// =============================================================================
// Pattern Source
// =============================================================================

/// Where matchers get compiled wildcards from.
///
/// Implementations must treat a wildcard that fails to compile as never
/// matching.
pub trait PatternSource {
    fn is_match(&self, wildcard: &str, rules: &EffectiveRules<'_>, literal: &str) -> bool;
}

/// Compiles every wildcard on demand, no caching.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compile;

impl PatternSource for Compile {
    fn is_match(&self, wildcard: &str, rules: &EffectiveRules<'_>, literal: &str) -> bool {
        match compile(wildcard, rules) {
            Ok(pattern) => pattern.is_match(literal),
            Err(e) => {
                log::warn!("wildcard {wildcard:?} never matches: {e}");
                false
            }
        }
    }
}

// =============================================================================
// Component Matching
// =============================================================================

/// Outcome of evaluating one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentMatch {
    /// Constraints hold and the component is inclusive.
    Matched,
    /// Constraints hold and the component is an exclusion.
    Excluded,
    /// Constraints do not hold; move on to the next component.
    Undetermined,
}

/// Evaluate a component's path, query and fragment constraints, in that order.
pub fn match_component<P: PatternSource + ?Sized>(
    component: &Component,
    url: &UrlParts<'_>,
    rules: &EffectiveRules<'_>,
    patterns: &P,
) -> ComponentMatch {
    if let Some(path) = component.path.as_deref() {
        if !patterns.is_match(strip_leading_slash(path), rules, url.relative_path()) {
            return ComponentMatch::Undetermined;
        }
    }

    if let Some(query) = &component.query {
        if !query_matches(query, url, rules, patterns) {
            return ComponentMatch::Undetermined;
        }
    }

    if let Some(fragment) = component.fragment.as_deref() {
        if !patterns.is_match(fragment, rules, &url.fragment) {
            return ComponentMatch::Undetermined;
        }
    }

    if component.is_exclude() {
        ComponentMatch::Excluded
    } else {
        ComponentMatch::Matched
    }
}

fn query_matches<P: PatternSource + ?Sized>(
    query: &QueryConstraint,
    url: &UrlParts<'_>,
    rules: &EffectiveRules<'_>,
    patterns: &P,
) -> bool {
    match query {
        QueryConstraint::Name(name) => url.query_item(name).is_some(),
        QueryConstraint::Values(required) => required.iter().all(|(name, wildcard)| {
            match url.query_item(name).and_then(|item| item.value.as_deref()) {
                Some(value) => patterns.is_match(wildcard, rules, value),
                None => false,
            }
        }),
    }
}

// =============================================================================
// Rule Set Matching
// =============================================================================

/// Evaluate a rule set's components in declared order.
///
/// The first decisive component wins; a rule set with no decisive component
/// does not match.
pub fn match_rule_set<P: PatternSource + ?Sized>(
    rule_set: &RuleSet,
    url: &UrlParts<'_>,
    link_set_defaults: Option<&Defaults>,
    substitutions: Option<&SubstitutionMap>,
    patterns: &P,
) -> bool {
    for (index, component) in rule_set.components.iter().enumerate() {
        let rules = EffectiveRules::resolve(
            component,
            rule_set.defaults.as_ref(),
            link_set_defaults,
            substitutions,
        );

        match match_component(component, url, &rules, patterns) {
            ComponentMatch::Undetermined => continue,
            ComponentMatch::Matched => {
                log::debug!("component {index} of {:?} matched", rule_set.app_ids);
                return true;
            }
            ComponentMatch::Excluded => {
                log::debug!("component {index} of {:?} excluded", rule_set.app_ids);
                return false;
            }
        }
    }
    false
}

// =============================================================================
// Link Set Matching
// =============================================================================

fn collect_app_ids<P: PatternSource + ?Sized>(
    link_set: &LinkSet,
    url: &Url,
    patterns: &P,
) -> Vec<String> {
    let parts = UrlParts::new(url);
    let substitutions = link_set.substitution_variables.as_ref();

    link_set
        .details
        .iter()
        .filter(|rule_set| {
            match_rule_set(rule_set, &parts, link_set.defaults.as_ref(), substitutions, patterns)
        })
        .flat_map(|rule_set| rule_set.app_ids.iter().cloned())
        .collect()
}

/// Identifiers of every rule set matching `url`, in rule-set order.
///
/// Duplicates are kept when several matching rule sets share an identifier.
pub fn matched_app_ids(link_set: &LinkSet, url: &Url) -> Vec<String> {
    collect_app_ids(link_set, url, &Compile)
}

impl LinkSet {
    pub fn matched_app_ids(&self, url: &Url) -> Vec<String> {
        matched_app_ids(self, url)
    }
}

impl AssociationDocument {
    /// Identifiers from the `applinks` section; empty when it is absent.
    pub fn matched_app_ids(&self, url: &Url) -> Vec<String> {
        self.applinks
            .as_ref()
            .map(|applinks| applinks.matched_app_ids(url))
            .unwrap_or_default()
    }
}

// =============================================================================
// LinkSetMatcher
// =============================================================================

/// A link set with a compiled-pattern cache, for matching many URLs.
#[derive(Debug)]
pub struct LinkSetMatcher {
    link_set: LinkSet,
    cache: PatternCache,
}

impl LinkSetMatcher {
    pub fn new(link_set: LinkSet) -> Self {
        Self {
            link_set,
            cache: PatternCache::new(),
        }
    }

    /// Matcher over a document's `applinks`, or an empty link set.
    pub fn from_document(document: &AssociationDocument) -> Self {
        Self::new(document.applinks.clone().unwrap_or_default())
    }

    pub fn link_set(&self) -> &LinkSet {
        &self.link_set
    }

    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    /// Same result as [`matched_app_ids`], reusing compiled patterns.
    pub fn matched_app_ids(&self, url: &Url) -> Vec<String> {
        collect_app_ids(&self.link_set, url, &self.cache)
    }

    /// Compile every wildcard up front, returning those that never match.
    pub fn precompile(&self) -> Vec<PatternFailure> {
        let substitutions = self.link_set.substitution_variables.as_ref();
        let mut failures = Vec::new();

        for (rule_set_index, rule_set) in self.link_set.details.iter().enumerate() {
            for (component_index, component) in rule_set.components.iter().enumerate() {
                let rules = EffectiveRules::resolve(
                    component,
                    rule_set.defaults.as_ref(),
                    self.link_set.defaults.as_ref(),
                    substitutions,
                );
                for wildcard in component.wildcards() {
                    if let Err(e) = self.cache.get_or_compile(wildcard, &rules) {
                        failures.push(PatternFailure {
                            rule_set: rule_set_index,
                            component: component_index,
                            wildcard: wildcard.to_string(),
                            error: e,
                        });
                    }
                }
            }
        }

        failures
    }
}

/// A wildcard that failed to compile.
#[derive(Debug, Clone)]
pub struct PatternFailure {
    pub rule_set: usize,
    pub component: usize,
    pub wildcard: String,
    pub error: PatternError,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate(component: &Component, url: &str) -> ComponentMatch {
        let url = Url::parse(url).expect("valid url");
        let parts = UrlParts::new(&url);
        match_component(component, &parts, &EffectiveRules::default(), &Compile)
    }

    fn rule_set_matches(rule_set: &RuleSet, url: &str) -> bool {
        let url = Url::parse(url).expect("valid url");
        match_rule_set(rule_set, &UrlParts::new(&url), None, None, &Compile)
    }

    #[test]
    fn test_fragment_component() {
        let url = "https://www.example.com#test0";
        assert_eq!(evaluate(&Component::fragment("test0"), url), ComponentMatch::Matched);
        assert_eq!(evaluate(&Component::fragment("test1"), url), ComponentMatch::Undetermined);
        assert_eq!(
            evaluate(&Component::fragment("test0").excluding(), url),
            ComponentMatch::Excluded
        );
        assert_eq!(
            evaluate(&Component::fragment("test1").excluding(), url),
            ComponentMatch::Undetermined
        );
    }

    #[test]
    fn test_empty_component_is_vacuous() {
        let url = "https://www.example.com/anything?x=1#y";
        assert_eq!(evaluate(&Component::default(), url), ComponentMatch::Matched);
        assert_eq!(evaluate(&Component::default().excluding(), url), ComponentMatch::Excluded);
    }

    #[test]
    fn test_all_constraints_must_hold() {
        let component = Component::path("abc")
            .with_query(QueryConstraint::name("def"))
            .with_fragment("*");

        assert_eq!(evaluate(&component, "https://www.example.com/abc?def"), ComponentMatch::Matched);
        assert_eq!(evaluate(&component, "https://www.example.com?def"), ComponentMatch::Undetermined);
        assert_eq!(evaluate(&component, "https://www.example.com/abc"), ComponentMatch::Undetermined);
    }

    #[test]
    fn test_path_directory_keeps_trailing_slash() {
        let component = Component::path("/buy/*");
        assert_eq!(evaluate(&component, "https://example.com/buy/"), ComponentMatch::Matched);
        assert_eq!(evaluate(&component, "https://example.com/buy/sample"), ComponentMatch::Matched);
        assert_eq!(evaluate(&component, "https://example.com/buy"), ComponentMatch::Undetermined);
    }

    #[test]
    fn test_query_values() {
        let component = Component::path("/help/*")
            .with_query(QueryConstraint::values([("articleNumber", "????")]));
        let base = "https://www.example.com/help/how_to_convert.html";

        assert_eq!(evaluate(&component, &format!("{base}?articleNumber=0A5e")), ComponentMatch::Matched);
        assert_eq!(evaluate(&component, &format!("{base}?articleNumber=15")), ComponentMatch::Undetermined);
        assert_eq!(evaluate(&component, &format!("{base}?articleNumber=15678")), ComponentMatch::Undetermined);
        assert_eq!(evaluate(&component, base), ComponentMatch::Undetermined);
        assert_eq!(evaluate(&component, &format!("{base}?articleNumber")), ComponentMatch::Undetermined);
    }

    #[test]
    fn test_query_values_require_every_parameter() {
        let component = Component::default().with_query(QueryConstraint::values([("a", "*"), ("b", "1")]));
        assert_eq!(evaluate(&component, "https://e.com/?a=x&b=1"), ComponentMatch::Matched);
        assert_eq!(evaluate(&component, "https://e.com/?b=1&a="), ComponentMatch::Matched);
        assert_eq!(evaluate(&component, "https://e.com/?a=x"), ComponentMatch::Undetermined);
        assert_eq!(evaluate(&component, "https://e.com/?a=x&b=2"), ComponentMatch::Undetermined);
    }

    #[test]
    fn test_empty_query_mapping_is_vacuous() {
        let component = Component::default().with_query(QueryConstraint::Values(Default::default()));
        assert_eq!(evaluate(&component, "https://e.com/"), ComponentMatch::Matched);
    }

    #[test]
    fn test_query_name_presence() {
        let component = Component::default().with_query(QueryConstraint::name("productID"));
        assert_eq!(evaluate(&component, "https://e.com/?productID=12345"), ComponentMatch::Matched);
        assert_eq!(evaluate(&component, "https://e.com/?productID"), ComponentMatch::Matched);
        assert_eq!(evaluate(&component, "https://e.com/?other=1"), ComponentMatch::Undetermined);
        assert_eq!(evaluate(&component, "https://e.com/"), ComponentMatch::Undetermined);
    }

    #[test]
    fn test_case_sensitivity_toggle() {
        let url = Url::parse("https://e.com/BUY/x?Id=AB#Top").unwrap();
        let parts = UrlParts::new(&url);
        let component = Component::path("/buy/*")
            .with_query(QueryConstraint::values([("Id", "ab")]))
            .with_fragment("top");

        let sensitive = EffectiveRules::default();
        let insensitive = EffectiveRules {
            case_sensitive: false,
            ..sensitive
        };
        assert_eq!(match_component(&component, &parts, &sensitive, &Compile), ComponentMatch::Undetermined);
        assert_eq!(match_component(&component, &parts, &insensitive, &Compile), ComponentMatch::Matched);
    }

    #[test]
    fn test_bad_pattern_never_matches() {
        assert_eq!(evaluate(&Component::path("/$(nope)/*"), "https://e.com/x/y"), ComponentMatch::Undetermined);
        assert_eq!(
            evaluate(&Component::path("/$(nope)/*").excluding(), "https://e.com/x/y"),
            ComponentMatch::Undetermined
        );
    }

    #[test]
    fn test_exclusion_order_matters() {
        let exclude = Component::fragment("no_universal_links").excluding();
        let include = Component::path("/buy/*");
        let url = "https://example.com/buy/sample#no_universal_links";

        let excluded_first = RuleSet::new(["A"], vec![exclude.clone(), include.clone()]);
        assert!(!rule_set_matches(&excluded_first, url));
        assert!(rule_set_matches(&excluded_first, "https://example.com/buy/sample"));

        let included_first = RuleSet::new(["A"], vec![include, exclude]);
        assert!(rule_set_matches(&included_first, url));
    }

    #[test]
    fn test_no_decisive_component() {
        let rule_set = RuleSet::new(["A"], vec![Component::path("/a"), Component::path("/b")]);
        assert!(!rule_set_matches(&rule_set, "https://e.com/c"));
        assert!(!rule_set_matches(&RuleSet::new(["A"], Vec::new()), "https://e.com/"));
    }

    #[test]
    fn test_component_override_beats_rule_set_defaults() {
        let rule_set = RuleSet::new(["A"], vec![Component::path("/buy").case_sensitive(true)])
            .with_defaults(Defaults::case_insensitive());
        assert!(!rule_set_matches(&rule_set, "https://e.com/BUY"));

        let rule_set = RuleSet::new(["A"], vec![Component::path("/buy")])
            .with_defaults(Defaults::case_insensitive());
        assert!(rule_set_matches(&rule_set, "https://e.com/BUY"));
    }

    #[test]
    fn test_link_set_aggregates_in_order_with_duplicates() {
        let link_set = LinkSet::new(vec![
            RuleSet::new(["A", "B"], vec![Component::path("/x/*")]),
            RuleSet::new(["C"], vec![Component::path("/y/*")]),
            RuleSet::new(["B"], vec![Component::default()]),
        ]);
        let url = Url::parse("https://e.com/x/1").unwrap();
        assert_eq!(link_set.matched_app_ids(&url), vec!["A", "B", "B"]);

        let matcher = LinkSetMatcher::new(link_set);
        assert_eq!(matcher.matched_app_ids(&url), vec!["A", "B", "B"]);
    }

    #[test]
    fn test_link_set_defaults_and_substitutions() {
        let link_set = LinkSet::new(vec![RuleSet::new(["A"], vec![Component::path("/$(food)/")])])
            .with_defaults(Defaults::case_insensitive())
            .with_substitution("food", &["pizza", "sushi"]);

        let url = Url::parse("https://e.com/PIZZA/").unwrap();
        assert_eq!(matched_app_ids(&link_set, &url), vec!["A"]);
        let url = Url::parse("https://e.com/sorbet/").unwrap();
        assert!(matched_app_ids(&link_set, &url).is_empty());
    }

    #[test]
    fn test_precompile_reports_failures() {
        let mut subs = SubstitutionMap::new();
        subs.insert("ok".into(), vec!["1".into()]);
        let mut link_set = LinkSet::new(vec![RuleSet::new(
            ["A"],
            vec![
                Component::path("/$(ok)/*"),
                Component::fragment("$(missing)"),
            ],
        )]);
        link_set.substitution_variables = Some(subs);

        let matcher = LinkSetMatcher::new(link_set);
        let failures = matcher.precompile();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule_set, 0);
        assert_eq!(failures[0].component, 1);
        assert_eq!(failures[0].wildcard, "$(missing)");
        assert_eq!(matcher.cache().len(), 2);
    }

    #[test]
    fn test_shared_cache_honours_each_substitution_map() {
        let rule_set = RuleSet::new(["A"], vec![Component::path("/$(food)/")]);
        let url = Url::parse("https://e.com/pizza/").unwrap();
        let parts = UrlParts::new(&url);

        let pizza = SubstitutionMap::from([("food".to_string(), vec!["pizza".to_string()])]);
        let sushi = SubstitutionMap::from([("food".to_string(), vec!["sushi".to_string()])]);

        let cache = PatternCache::default();
        assert!(match_rule_set(&rule_set, &parts, None, Some(&pizza), &cache));

        let cached = match_rule_set(&rule_set, &parts, None, Some(&sushi), &cache);
        let uncached = match_rule_set(&rule_set, &parts, None, Some(&sushi), &Compile);
        assert!(!uncached);
        assert_eq!(cached, uncached);
    }

    #[test]
    fn test_percent_encoded_flag_does_not_change_matching() {
        let url = Url::parse("https://e.com/gift%20cards/?q=a%26b#top%20deal").unwrap();
        let parts = UrlParts::new(&url);

        let mut component = Component::path("/gift cards/")
            .with_query(QueryConstraint::values([("q", "a&b")]))
            .with_fragment("top deal");
        for flag in [Some(false), Some(true), None] {
            component.percent_encoded = flag;
            let rules = EffectiveRules::resolve(&component, None, None, None);
            assert_eq!(rules.percent_encoded, flag.unwrap_or(true));
            assert_eq!(match_component(&component, &parts, &rules, &Compile), ComponentMatch::Matched);
        }

        component.path = Some("/gift%20cards/".to_string());
        component.percent_encoded = Some(false);
        let rules = EffectiveRules::resolve(&component, None, None, None);
        assert_eq!(match_component(&component, &parts, &rules, &Compile), ComponentMatch::Undetermined);
    }

    #[test]
    fn test_document_without_applinks() {
        let url = Url::parse("https://e.com/").unwrap();
        assert!(AssociationDocument::default().matched_app_ids(&url).is_empty());
    }
}
