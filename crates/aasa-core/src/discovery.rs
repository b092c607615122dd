//! Association file locations
//!
//! Builds the URLs an association document is served from for a given
//! origin. No fetching happens here.

use url::Url;

pub const WELL_KNOWN_DIR: &str = ".well-known";
pub const FILE_NAME: &str = "apple-app-site-association";

/// Error type for origin validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Scheme is not https")]
    SchemeIsNotHttps,
    #[error("Host is not a fully qualified domain")]
    HostIsNotFullyQualifiedDomain,
    #[error("Origin path is not empty")]
    PathIsNotEmpty,
}

fn validate_origin(origin: &Url) -> Result<Url, DiscoveryError> {
    if origin.scheme() != "https" {
        return Err(DiscoveryError::SchemeIsNotHttps);
    }
    if origin.host_str().map_or(true, str::is_empty) {
        return Err(DiscoveryError::HostIsNotFullyQualifiedDomain);
    }
    if !(origin.path().is_empty() || origin.path() == "/") {
        return Err(DiscoveryError::PathIsNotEmpty);
    }

    let mut base = origin.clone();
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}

/// Preferred location: `/.well-known/apple-app-site-association`.
pub fn well_known_location(origin: &Url) -> Result<Url, DiscoveryError> {
    let mut url = validate_origin(origin)?;
    url.set_path(&format!("/{WELL_KNOWN_DIR}/{FILE_NAME}"));
    Ok(url)
}

/// Fallback location: `/apple-app-site-association`.
pub fn root_location(origin: &Url) -> Result<Url, DiscoveryError> {
    let mut url = validate_origin(origin)?;
    url.set_path(&format!("/{FILE_NAME}"));
    Ok(url)
}

/// Both locations, preferred first.
pub fn association_locations(origin: &Url) -> Result<[Url; 2], DiscoveryError> {
    Ok([well_known_location(origin)?, root_location(origin)?])
}
