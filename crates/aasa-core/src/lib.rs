//! App-site-association core library
//!
//! Decides which application identifiers an association document's
//! `applinks` section associates with a URL.
//!
//! # Architecture
//!
//! Wildcards from each component are compiled into anchored regular
//! expressions under the component's effective rules. Components produce a
//! tri-state result, rule sets take the first decisive component, and the
//! link set collects identifiers of every matching rule set. Evaluation is
//! pure; `LinkSetMatcher` adds a thread-safe compiled-pattern cache.
//!
//! # Modules
//!
//! - `types`: document data model
//! - `decode`: JSON decoding
//! - `discovery`: association file locations for an origin
//! - `substitution`: `$(name)` token resolution
//! - `locale`: region and language code tables
//! - `rules`: effective case / encoding rules
//! - `pattern`: wildcard compiler
//! - `url`: decoded URL views
//! - `matcher`: component, rule set and link set matching
//! - `cache`: compiled pattern cache
//!
//! # Examples
//!
//! ```
//! use aasa_core::AssociationDocument;
//! use url::Url;
//!
//! let document: AssociationDocument = r#"{
//!     "applinks": { "details": [
//!         { "appIDs": ["ABCDE12345.com.example.app"], "components": [ { "/": "/buy/*" } ] }
//!     ] }
//! }"#.parse().unwrap();
//!
//! let url = Url::parse("https://www.example.com/buy/sample").unwrap();
//! assert_eq!(document.matched_app_ids(&url), ["ABCDE12345.com.example.app"]);
//! ```

pub mod cache;
pub mod decode;
pub mod discovery;
pub mod locale;
pub mod matcher;
pub mod pattern;
pub mod rules;
pub mod substitution;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use cache::PatternCache;
pub use decode::DecodeError;
pub use discovery::{association_locations, DiscoveryError};
pub use matcher::{
    match_component, match_rule_set, matched_app_ids, Compile, ComponentMatch, LinkSetMatcher,
    PatternFailure, PatternSource,
};
pub use pattern::{compile, PatternError, WildcardPattern};
pub use rules::EffectiveRules;
pub use types::{
    AppClips, AssociationDocument, Component, Defaults, LinkSet, QueryConstraint, RuleSet,
    SubstitutionMap, WebCredentials,
};
