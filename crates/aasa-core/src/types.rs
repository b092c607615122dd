//! Association document data model
//!
//! These records map directly onto the JSON served at
//! `/.well-known/apple-app-site-association` and are read-only once decoded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named custom substitution lists, used for `$(name)` tokens.
pub type SubstitutionMap = BTreeMap<String, Vec<String>>;

// =============================================================================
// Document
// =============================================================================

/// A decoded association document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applinks: Option<LinkSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webcredentials: Option<WebCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appclips: Option<AppClips>,
}

/// The `webcredentials` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebCredentials {
    pub apps: Vec<String>,
}

/// The `appclips` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppClips {
    pub apps: Vec<String>,
}

// =============================================================================
// Link Set
// =============================================================================

/// The `applinks` section: ordered rule sets plus shared defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSet {
    #[serde(default)]
    pub details: Vec<RuleSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Defaults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitution_variables: Option<SubstitutionMap>,
}

impl LinkSet {
    pub fn new(details: Vec<RuleSet>) -> Self {
        Self {
            details,
            defaults: None,
            substitution_variables: None,
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn with_substitution(mut self, name: &str, values: &[&str]) -> Self {
        self.substitution_variables
            .get_or_insert_with(SubstitutionMap::new)
            .insert(name.to_string(), values.iter().map(|v| v.to_string()).collect());
        self
    }
}

// =============================================================================
// Rule Set
// =============================================================================

/// One `details` entry: identifiers and their ordered match components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(rename = "appIDs")]
    pub app_ids: Vec<String>,
    /// Evaluated in declared order; the first decisive component wins.
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Defaults>,
}

impl RuleSet {
    pub fn new<I, S>(app_ids: I, components: Vec<Component>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            app_ids: app_ids.into_iter().map(Into::into).collect(),
            components,
            defaults: None,
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = Some(defaults);
        self
    }
}

// =============================================================================
// Component
// =============================================================================

/// A single path / query / fragment constraint.
///
/// A component with no constraints at all matches every URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(rename = "/", default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "#", default, skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
    #[serde(rename = "?", default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_encoded: Option<bool>,
}

impl Component {
    /// Component constrained on the URL path.
    pub fn path(pattern: &str) -> Self {
        Self {
            path: Some(pattern.to_string()),
            ..Self::default()
        }
    }

    /// Component constrained on the URL fragment.
    pub fn fragment(pattern: &str) -> Self {
        Self {
            fragment: Some(pattern.to_string()),
            ..Self::default()
        }
    }

    pub fn with_fragment(mut self, pattern: &str) -> Self {
        self.fragment = Some(pattern.to_string());
        self
    }

    pub fn with_query(mut self, query: QueryConstraint) -> Self {
        self.query = Some(query);
        self
    }

    /// Mark the component as exclusionary.
    pub fn excluding(mut self) -> Self {
        self.exclude = Some(true);
        self
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = Some(value);
        self
    }

    #[inline]
    pub fn is_exclude(&self) -> bool {
        self.exclude == Some(true)
    }

    /// Every wildcard this component declares, as it is compiled (the path
    /// loses one leading `/`).
    pub fn wildcards(&self) -> impl Iterator<Item = &str> {
        let query_values: Vec<&str> = match &self.query {
            Some(QueryConstraint::Values(values)) => values.values().map(String::as_str).collect(),
            _ => Vec::new(),
        };
        self.path
            .as_deref()
            .map(|path| path.strip_prefix('/').unwrap_or(path))
            .into_iter()
            .chain(query_values)
            .chain(self.fragment.as_deref())
    }
}

// =============================================================================
// Query Constraint
// =============================================================================

/// The `?` key of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    untagged,
    expecting = "unrecognized query constraint: expected a parameter name or a map of parameter wildcards"
)]
pub enum QueryConstraint {
    /// Parameter must be present, any value.
    Name(String),
    /// Every parameter must be present and its value must match the wildcard.
    Values(BTreeMap<String, String>),
}

impl QueryConstraint {
    pub fn name(name: &str) -> Self {
        Self::Name(name.to_string())
    }

    pub fn values<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self::Values(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

// =============================================================================
// Defaults
// =============================================================================

/// Tri-state flags shared by link sets and rule sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_encoded: Option<bool>,
}

impl Defaults {
    pub fn case_insensitive() -> Self {
        Self {
            case_sensitive: Some(false),
            percent_encoded: None,
        }
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive.unwrap_or(true)
    }

    pub fn is_percent_encoded(&self) -> bool {
        self.percent_encoded.unwrap_or(true)
    }
}
