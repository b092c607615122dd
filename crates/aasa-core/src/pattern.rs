//! Wildcard Pattern Compiler
//!
//! Grammar:
//!
//! - `?` matches exactly one character
//! - `*` matches zero or more characters (so `?*` is one or more)
//! - `$(name)` expands to the fragment from [`crate::substitution::resolve`]
//! - anything else matches itself
//!
//! The compiled pattern must match the whole candidate string.

use regex::{Regex, RegexBuilder};

use crate::rules::EffectiveRules;
use crate::substitution;

/// Error type for wildcard compilation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("Unresolved substitution token: $({0})")]
    UnresolvedToken(String),
    #[error("Unterminated substitution token at offset {0}")]
    UnterminatedToken(usize),
    #[error("Invalid generated pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// A compiled, anchored wildcard.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    regex: Regex,
}

impl WildcardPattern {
    /// Test `literal` against the whole pattern.
    #[inline]
    pub fn is_match(&self, literal: &str) -> bool {
        self.regex.is_match(literal)
    }

    /// The generated regular expression.
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }
}

/// Compile `wildcard` under `rules`.
pub fn compile(wildcard: &str, rules: &EffectiveRules<'_>) -> Result<WildcardPattern, PatternError> {
    let body = translate(wildcard, rules)?;
    let regex = RegexBuilder::new(&format!("\\A(?:{body})\\z"))
        .case_insensitive(!rules.case_sensitive)
        .dot_matches_new_line(true)
        .build()?;

    log::debug!("compiled wildcard {wildcard:?} -> {}", regex.as_str());
    Ok(WildcardPattern { regex })
}

/// Translate the wildcard body into regex syntax, without anchors.
fn translate(wildcard: &str, rules: &EffectiveRules<'_>) -> Result<String, PatternError> {
    let mut out = String::with_capacity(wildcard.len() * 2);
    let mut buf = [0u8; 4];
    let mut rest = wildcard;

    while let Some(ch) = rest.chars().next() {
        let offset = wildcard.len() - rest.len();

        if let Some(after) = rest.strip_prefix("$(") {
            let close = after.find(')').ok_or(PatternError::UnterminatedToken(offset))?;
            let name = &after[..close];
            let fragment = substitution::resolve(name, rules.substitutions)
                .ok_or_else(|| PatternError::UnresolvedToken(name.to_string()))?;
            out.push_str(&fragment);
            rest = &after[close + 1..];
            continue;
        }

        match ch {
            '?' => out.push('.'),
            '*' => out.push_str(".*"),
            _ => out.push_str(&regex::escape(ch.encode_utf8(&mut buf))),
        }
        rest = &rest[ch.len_utf8()..];
    }

    Ok(out)
}
