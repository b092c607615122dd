//! Substitution token resolution
//!
//! Turns the `name` of a `$(name)` token into a regex fragment. Standard
//! classes and locale lists are built in; any other name comes from the
//! link set's `substitutionVariables`.

use std::borrow::Cow;
use std::sync::OnceLock;

use crate::locale::{LANGUAGE_CODES, REGION_CODES};
use crate::types::SubstitutionMap;

/// Matches nothing; used for an empty custom list.
const NEVER: &str = "[^\\s\\S]";

/// Resolve a token name to a regex fragment.
///
/// Returns `None` when the name is neither built in nor present in
/// `substitutions`. An empty custom list matches nothing, not the empty
/// string: there is no literal alternative to match.
pub fn resolve<'a>(name: &str, substitutions: &'a SubstitutionMap) -> Option<Cow<'a, str>> {
    if let Some(class) = standard_class(name) {
        return Some(Cow::Borrowed(class));
    }

    match name {
        "region" => return Some(Cow::Borrowed(region_alternation())),
        "lang" => return Some(Cow::Borrowed(language_alternation())),
        _ => {}
    }

    let values = substitutions.get(name)?;
    if values.is_empty() {
        return Some(Cow::Borrowed(NEVER));
    }
    Some(Cow::Owned(alternation(values.iter().map(String::as_str))))
}

/// Names resolved without consulting the caller's map.
#[inline]
pub fn is_builtin(name: &str) -> bool {
    standard_class(name).is_some() || name == "region" || name == "lang"
}

/// Single-character classes.
#[inline]
pub fn standard_class(name: &str) -> Option<&'static str> {
    match name {
        "alpha" => Some("[a-zA-Z]"),
        "upper" => Some("[A-Z]"),
        "lower" => Some("[a-z]"),
        "alnum" => Some("[a-zA-Z0-9]"),
        "digit" => Some("[0-9]"),
        "xdigit" => Some("[0-9a-fA-F]"),
        _ => None,
    }
}

fn region_alternation() -> &'static str {
    static REGION: OnceLock<String> = OnceLock::new();
    REGION.get_or_init(|| alternation(REGION_CODES.iter().copied()))
}

fn language_alternation() -> &'static str {
    static LANGUAGE: OnceLock<String> = OnceLock::new();
    LANGUAGE.get_or_init(|| alternation(LANGUAGE_CODES.iter().copied()))
}

/// `(?:a|b|c)` with every alternative escaped as a literal.
fn alternation<'s>(values: impl Iterator<Item = &'s str>) -> String {
    let escaped: Vec<String> = values.map(regex::escape).collect();
    format!("(?:{})", escaped.join("|"))
}
