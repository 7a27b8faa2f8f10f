use roxmltree::Node;
use serde::Serialize;

use crate::espi::ATOM;

/// Usage point identifier as it appears in the resource links.
#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct MeterId(String);

impl MeterId {
    const UNKNOWN: &str = "unknown";

    /// Extract the identifier from the entry's `self` link, falling back to the `up` link.
    pub fn from_entry(entry: Node) -> Self {
        ["self", "up"]
            .into_iter()
            .filter_map(|rel| link_href(entry, rel))
            .find_map(Self::from_href)
            .unwrap_or_else(|| Self(Self::UNKNOWN.to_owned()))
    }

    fn from_href(href: &str) -> Option<Self> {
        let (_, tail) = href.split_once("/UsagePoint/")?;
        let id = tail.split('/').next()?.trim();
        (!id.is_empty()).then(|| Self(id.to_owned()))
    }
}

impl From<&str> for MeterId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

fn link_href<'a>(entry: Node<'a, '_>, rel: &str) -> Option<&'a str> {
    entry
        .children()
        .filter(|node| node.has_tag_name((ATOM, "link")))
        .find(|node| node.attribute("rel") == Some(rel))
        .and_then(|node| node.attribute("href"))
}
