//! Association document decoding
//!
//! Malformed documents are always reported; nothing is silently defaulted.

use std::str::FromStr;

use crate::types::{AssociationDocument, RuleSet};

/// Error type for document decoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid association document at line {line}, column {column}: {source}")]
    Json {
        line: usize,
        column: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            line: source.line(),
            column: source.column(),
            source,
        }
    }
}

impl AssociationDocument {
    /// Decode a document from raw bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DecodeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FromStr for AssociationDocument {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl RuleSet {
    /// Decode a single `details` entry.
    pub fn from_json(s: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(s)?)
    }
}
