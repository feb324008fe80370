pub mod node;
pub mod scheme;

pub use node::{NewNode, NodeId, NodeKind, TextNode};
pub use scheme::{CITATION_SCHEME, CitationScheme};

use serde_json::Value;

/// Opaque key-value blob attached to version nodes.
pub type Metadata = serde_json::Map<String, Value>;

/// The metadata written onto every imported version node.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionMetadata {
    pub citation_scheme: CitationScheme,
    pub work_title: Option<String>,
    pub first_passage_urn: Option<String>,
    pub default_toc_urn: Option<String>,
}

impl VersionMetadata {
    pub fn new(citation_scheme: CitationScheme) -> Self {
        Self {
            citation_scheme,
            work_title: None,
            first_passage_urn: None,
            default_toc_urn: None,
        }
    }

    pub fn into_map(self) -> Metadata {
        let mut map = Metadata::new();
        map.insert(CITATION_SCHEME.to_string(), self.citation_scheme.to_value());
        map.insert("work_title".to_string(), Value::from(self.work_title));
        map.insert(
            "first_passage_urn".to_string(),
            Value::from(self.first_passage_urn),
        );
        map.insert("default_toc_urn".to_string(), Value::from(self.default_toc_urn));
        map
    }
}
