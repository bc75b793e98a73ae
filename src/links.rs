//! Relation-tagged hyperlinks carried by every platform document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Relation naming the following page of a paged collection.
pub const NEXT_PAGE_REL: &str = "nextPage";

/// A link object. Either half may be absent on the wire, such links are
/// kept but never followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub rel: String,
    #[serde(default)]
    pub uri: String,
}

impl Link {
    pub fn new(rel: impl Into<String>, uri: impl Into<String>) -> Self {
        Link {
            rel: rel.into(),
            uri: uri.into(),
        }
    }
}

/// Ordered link collection of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(Vec<Link>);

impl Links {
    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First uri tagged with `rel`, wherever it sits in the collection.
    pub fn find(&self, rel: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|link| link.rel == rel && !link.uri.is_empty())
            .map(|link| link.uri.as_str())
    }

    pub fn next_page(&self) -> Option<&str> {
        self.find(NEXT_PAGE_REL)
    }
}

impl From<Vec<Link>> for Links {
    fn from(links: Vec<Link>) -> Self {
        Links(links)
    }
}

impl<'a> IntoIterator for &'a Links {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A parsed response body: its links plus every other field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub links: Links,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Rewrites an absolute platform uri into a path relative to `platform_root`.
///
/// `https://sandboxapi.deere.com/platform/assets/1` becomes `/assets/1` for
/// the root `https://sandboxapi.deere.com/platform`. Already-relative paths
/// pass through.
pub fn platform_path(platform_root: &str, uri: &str) -> Result<String> {
    if uri.starts_with('/') {
        return Ok(uri.to_string());
    }
    let root = platform_root.trim_end_matches('/');
    match uri.strip_prefix(root) {
        Some(rest) if rest.is_empty() => Ok("/".to_string()),
        Some(rest) if rest.starts_with('/') => Ok(rest.to_string()),
        Some(rest) if rest.starts_with('?') => Ok(format!("/{}", rest)),
        _ => Err(Error::ForeignLink(uri.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "https://sandboxapi.deere.com/platform";

    #[test]
    fn parse_document_with_typed_links() {
        let body = br#"{
            "links": [
                {"@type": "Link", "rel": "self", "uri": "https://sandboxapi.deere.com/platform/assetCatalog"},
                {"@type": "Link", "rel": "nextPage", "uri": "https://sandboxapi.deere.com/platform/assetCatalog;start=10;count=10"}
            ],
            "total": 42,
            "values": []
        }"#;
        let doc = Document::from_slice(body).unwrap();
        assert_eq!(doc.links.iter().count(), 2);
        assert_eq!(
            doc.links.next_page(),
            Some("https://sandboxapi.deere.com/platform/assetCatalog;start=10;count=10")
        );
        assert_eq!(doc.fields.get("total"), Some(&Value::from(42)));
        assert!(!doc.fields.contains_key("links"));
    }

    #[test]
    fn next_page_is_found_by_relation_not_position() {
        let links = Links::from(vec![
            Link::new("self", "a"),
            Link::new("previousPage", "b"),
            Link::new("organizations", "c"),
            Link::new("nextPage", "d"),
        ]);
        assert_eq!(links.next_page(), Some("d"));

        let links = Links::from(vec![Link::new("self", "a"), Link::new("previousPage", "b")]);
        assert_eq!(links.next_page(), None);
    }

    #[test]
    fn next_page_without_uri_is_not_followed() {
        let doc = Document::from_slice(
            br#"{"links": [{"rel": "nextPage"}, {"uri": "https://sandboxapi.deere.com/platform/x"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.links.iter().count(), 2);
        assert_eq!(doc.links.next_page(), None);
    }

    #[test]
    fn document_without_links() {
        let doc = Document::from_slice(br#"{"id": "x"}"#).unwrap();
        assert!(doc.links.is_empty());
    }

    #[test]
    fn platform_path_strips_root() {
        assert_eq!(
            platform_path(ROOT, "https://sandboxapi.deere.com/platform/assets/7e7a").unwrap(),
            "/assets/7e7a"
        );
        assert_eq!(
            platform_path(
                &format!("{}/", ROOT),
                "https://sandboxapi.deere.com/platform/assetCatalog?pageOffset=10"
            )
            .unwrap(),
            "/assetCatalog?pageOffset=10"
        );
        assert_eq!(platform_path(ROOT, "/users/herddogg").unwrap(), "/users/herddogg");
    }

    #[test]
    fn platform_path_rejects_foreign_links() {
        for uri in &[
            "https://example.com/platform/assets",
            "https://sandboxapi.deere.com/platformX/assets",
        ] {
            match platform_path(ROOT, uri) {
                Err(Error::ForeignLink(link)) => assert_eq!(&link, uri),
                other => panic!("unexpected {:?}", other),
            }
        }
    }
}
