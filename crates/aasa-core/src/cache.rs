//! Compiled pattern cache
//!
//! The key is the wildcard text, case sensitivity and the custom lists its
//! `$(name)` tokens expand to, so one cache can serve several substitution
//! maps. Failed compilations are cached too, so each one is reported once.

use std::sync::Arc;

use dashmap::DashMap;

use crate::matcher::PatternSource;
use crate::pattern::{compile, PatternError, WildcardPattern};
use crate::rules::EffectiveRules;
use crate::substitution;
use crate::types::SubstitutionMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    wildcard: String,
    case_sensitive: bool,
    /// Custom list behind each non-builtin token, in token order.
    custom_lists: Vec<Option<Vec<String>>>,
}

impl CacheKey {
    fn new(wildcard: &str, rules: &EffectiveRules<'_>) -> Self {
        Self {
            wildcard: wildcard.to_string(),
            case_sensitive: rules.case_sensitive,
            custom_lists: custom_lists(wildcard, rules.substitutions),
        }
    }
}

/// Lists looked up for the custom tokens of `wildcard`, scanning tokens the
/// same way the compiler does. Stops at an unterminated token.
fn custom_lists(wildcard: &str, substitutions: &SubstitutionMap) -> Vec<Option<Vec<String>>> {
    let mut lists = Vec::new();
    let mut rest = wildcard;

    while let Some(start) = rest.find("$(") {
        let after = &rest[start + 2..];
        let Some(close) = after.find(')') else {
            break;
        };
        let name = &after[..close];
        if !substitution::is_builtin(name) {
            lists.push(substitutions.get(name).cloned());
        }
        rest = &after[close + 1..];
    }

    lists
}

/// Thread-safe map of compiled wildcards.
#[derive(Debug, Default)]
pub struct PatternCache {
    entries: DashMap<CacheKey, Result<Arc<WildcardPattern>, PatternError>>,
}

impl PatternCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Compiled pattern for `wildcard`, compiling on first use.
    pub fn get_or_compile(
        &self,
        wildcard: &str,
        rules: &EffectiveRules<'_>,
    ) -> Result<Arc<WildcardPattern>, PatternError> {
        let key = CacheKey::new(wildcard, rules);

        if let Some(entry) = self.entries.get(&key) {
            return entry.value().clone();
        }

        let compiled = compile(wildcard, rules).map(Arc::new);
        if let Err(e) = &compiled {
            log::warn!("wildcard {wildcard:?} never matches: {e}");
        }

        self.entries.entry(key).or_insert(compiled).value().clone()
    }

    /// Number of cached wildcards, failures included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl PatternSource for PatternCache {
    fn is_match(&self, wildcard: &str, rules: &EffectiveRules<'_>, literal: &str) -> bool {
        self.get_or_compile(wildcard, rules)
            .is_ok_and(|pattern| pattern.is_match(literal))
    }
}
