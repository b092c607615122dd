use std::fmt;

use serde::Serialize;

use aasa_core::AssociationDocument;

/// Match output for one URL.
#[derive(Debug, Clone, Serialize)]
pub struct UrlMatches {
    pub url: String,
    #[serde(rename = "appIDs")]
    pub app_ids: Vec<String>,
}

impl fmt::Display for UrlMatches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.app_ids.is_empty() {
            write!(f, "{}: (no match)", self.url)
        } else {
            write!(f, "{}: {}", self.url, self.app_ids.join(", "))
        }
    }
}

/// Counts printed by `check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub rule_sets: usize,
    pub components: usize,
    pub substitution_variables: usize,
    pub wildcards: usize,
    pub webcredentials: usize,
    pub appclips: usize,
}

impl DocumentSummary {
    pub fn new(document: &AssociationDocument, wildcards: usize) -> Self {
        let applinks = document.applinks.as_ref();
        Self {
            rule_sets: applinks.map_or(0, |a| a.details.len()),
            components: applinks.map_or(0, |a| a.details.iter().map(|d| d.components.len()).sum()),
            substitution_variables: applinks
                .and_then(|a| a.substitution_variables.as_ref())
                .map_or(0, |s| s.len()),
            wildcards,
            webcredentials: document.webcredentials.as_ref().map_or(0, |w| w.apps.len()),
            appclips: document.appclips.as_ref().map_or(0, |a| a.apps.len()),
        }
    }
}

impl fmt::Display for DocumentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Rule sets:       {}", self.rule_sets)?;
        writeln!(f, "  Components:      {}", self.components)?;
        writeln!(f, "  Substitutions:   {}", self.substitution_variables)?;
        writeln!(f, "  Wildcards:       {}", self.wildcards)?;
        writeln!(f, "  Webcredentials:  {}", self.webcredentials)?;
        writeln!(f, "  App clips:       {}", self.appclips)
    }
}
