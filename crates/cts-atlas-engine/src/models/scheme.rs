use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Metadata, NodeKind};

/// Metadata key holding a version's citation scheme.
pub const CITATION_SCHEME: &str = "citation_scheme";

/// Ordered rank names for a version's passage addressing, e.g.
/// `["book", "line"]`. Rank `n` is the `n`th entry, counting from 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationScheme(Vec<String>);

impl CitationScheme {
    pub fn new<I, S>(ranks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ranks.into_iter().map(Into::into).collect())
    }

    /// Read the scheme out of a version metadata blob.
    ///
    /// Returns `None` when the key is missing, is not a list of strings, or
    /// names no ranks at all.
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        let ranks = metadata.get(CITATION_SCHEME)?.as_array()?;
        let ranks: Option<Vec<String>> = ranks
            .iter()
            .map(|rank| rank.as_str().map(str::to_string))
            .collect();
        ranks.filter(|r| !r.is_empty()).map(Self)
    }

    pub fn to_value(&self) -> Value {
        Value::from(self.0.clone())
    }

    pub fn ranks(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Node kind at a 1-based rank.
    pub fn kind(&self, rank: usize) -> Option<NodeKind> {
        rank.checked_sub(1)
            .and_then(|i| self.0.get(i))
            .map(|name| NodeKind::Rank(name.clone()))
    }

    /// The first rank name that appears more than once. Each rank must be a
    /// distinct node kind, since idx sequences are kept per kind.
    pub fn duplicate_rank(&self) -> Option<&str> {
        self.0
            .iter()
            .enumerate()
            .find(|&(i, rank)| self.0[..i].contains(rank))
            .map(|(_, rank)| rank.as_str())
    }

    /// Kind of the citable (deepest) nodes.
    pub fn leaf_kind(&self) -> Option<NodeKind> {
        self.kind(self.depth())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn metadata(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn ranks_are_one_based() {
        let scheme = CitationScheme::new(["book", "line"]);
        assert_eq!(scheme.depth(), 2);
        assert_eq!(scheme.kind(0), None);
        assert_eq!(scheme.kind(1), Some(NodeKind::Rank("book".to_string())));
        assert_eq!(scheme.leaf_kind(), Some(NodeKind::Rank("line".to_string())));
        assert_eq!(scheme.kind(3), None);
    }

    #[test]
    fn reads_from_metadata() {
        let meta = metadata(json!({ "citation_scheme": ["book", "line"], "work_title": "Iliad" }));
        assert_eq!(
            CitationScheme::from_metadata(&meta),
            Some(CitationScheme::new(["book", "line"]))
        );
    }

    #[test]
    fn rejects_unusable_metadata() {
        assert_eq!(CitationScheme::from_metadata(&Metadata::new()), None);
        let empty = metadata(json!({ "citation_scheme": [] }));
        assert_eq!(CitationScheme::from_metadata(&empty), None);
        let mixed = metadata(json!({ "citation_scheme": ["book", 2] }));
        assert_eq!(CitationScheme::from_metadata(&mixed), None);
    }

    #[test]
    fn finds_repeated_rank_names() {
        assert_eq!(CitationScheme::new(["book", "line"]).duplicate_rank(), None);
        assert_eq!(
            CitationScheme::new(["section", "section"]).duplicate_rank(),
            Some("section")
        );
        assert_eq!(
            CitationScheme::new(["book", "poem", "line", "poem"]).duplicate_rank(),
            Some("poem")
        );
    }

    #[test]
    fn to_value_roundtrips() {
        let scheme = CitationScheme::new(["book", "line"]);
        let mut meta = Metadata::new();
        meta.insert(CITATION_SCHEME.to_string(), scheme.to_value());
        assert_eq!(CitationScheme::from_metadata(&meta), Some(scheme));
    }
}
