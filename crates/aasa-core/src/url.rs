//! URL views for matching
//!
//! Matchers compare against decoded path, query and fragment text. The
//! parsed [`url::Url`] keeps them percent-encoded, so decoding happens here.

use std::borrow::Cow;

use url::Url;

// =============================================================================
// Query Items
// =============================================================================

/// One `name[=value]` pair from a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryItem<'a> {
    pub name: Cow<'a, str>,
    /// `None` for a bare `name` with no `=`.
    pub value: Option<Cow<'a, str>>,
}

/// Split a raw query string into decoded items. Empty segments are skipped.
pub fn parse_query(query: &str) -> Vec<QueryItem<'_>> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.find('=') {
            Some(eq_pos) => QueryItem {
                name: percent_decode(&pair[..eq_pos]),
                value: Some(percent_decode(&pair[eq_pos + 1..])),
            },
            None => QueryItem {
                name: percent_decode(pair),
                value: None,
            },
        })
        .collect()
}

// =============================================================================
// URL Parts
// =============================================================================

/// Decoded parts of a URL, computed once per evaluation.
#[derive(Debug, Clone)]
pub struct UrlParts<'a> {
    /// Decoded path, trailing `/` kept.
    pub path: Cow<'a, str>,
    /// `None` when the URL has no query at all.
    pub query: Option<Vec<QueryItem<'a>>>,
    /// Decoded fragment, empty when absent.
    pub fragment: Cow<'a, str>,
}

impl<'a> UrlParts<'a> {
    pub fn new(url: &'a Url) -> Self {
        Self {
            path: percent_decode(url.path()),
            query: url.query().map(parse_query),
            fragment: url.fragment().map(percent_decode).unwrap_or(Cow::Borrowed("")),
        }
    }

    /// Path with at most one leading `/` removed.
    #[inline]
    pub fn relative_path(&self) -> &str {
        strip_leading_slash(&self.path)
    }

    /// First query item called `name`.
    pub fn query_item(&self, name: &str) -> Option<&QueryItem<'a>> {
        self.query.as_ref()?.iter().find(|item| item.name == name)
    }
}

#[inline]
pub fn strip_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

// =============================================================================
// Percent Decoding
// =============================================================================

#[inline]
fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode `%XX` escapes. Malformed escapes are kept verbatim, `+` is not
/// translated, and invalid UTF-8 is replaced lossily.
pub fn percent_decode(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    if !bytes.contains(&b'%') {
        return Cow::Borrowed(input);
    }

    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                decoded.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    match String::from_utf8(decoded) {
        Ok(s) => Cow::Owned(s),
        Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(url: &str) -> Url {
        Url::parse(url).expect("valid url")
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("plain"), "plain");
        assert_eq!(percent_decode("a%20b"), "a b");
        assert_eq!(percent_decode("caf%C3%A9"), "café");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz%4"), "%zz%4");
        assert_eq!(percent_decode("a+b"), "a+b");
        assert_eq!(percent_decode("%FF"), "\u{FFFD}");
    }

    #[test]
    fn test_parse_query() {
        let items = parse_query("a=1&b&c=x%3Dy&&d=");
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].name, "a");
        assert_eq!(items[0].value.as_deref(), Some("1"));
        assert_eq!(items[1].name, "b");
        assert_eq!(items[1].value, None);
        assert_eq!(items[2].value.as_deref(), Some("x=y"));
        assert_eq!(items[3].value.as_deref(), Some(""));
    }

    #[test]
    fn test_url_parts() {
        let url = parse("https://www.example.com/buy/caf%C3%A9/?productID=12345#top%20level");
        let parts = UrlParts::new(&url);
        assert_eq!(parts.path, "/buy/café/");
        assert_eq!(parts.relative_path(), "buy/café/");
        assert_eq!(parts.fragment, "top level");
        assert_eq!(
            parts.query_item("productID").and_then(|i| i.value.as_deref()),
            Some("12345")
        );
        assert!(parts.query_item("missing").is_none());
    }

    #[test]
    fn test_url_parts_without_query_or_fragment() {
        let url = parse("https://www.example.com");
        let parts = UrlParts::new(&url);
        assert_eq!(parts.path, "/");
        assert_eq!(parts.relative_path(), "");
        assert!(parts.query.is_none());
        assert_eq!(parts.fragment, "");
    }

    #[test]
    fn test_strip_leading_slash_once() {
        assert_eq!(strip_leading_slash("//a"), "/a");
        assert_eq!(strip_leading_slash("a"), "a");
    }
}
