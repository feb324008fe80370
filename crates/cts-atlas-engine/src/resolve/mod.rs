//! # Passage resolution
//!
//! Turns a version URN plus a reference string into the ordered slice of
//! citable (leaf) nodes it names:
//!
//! | Reference   | Leaves                                          |
//! |-------------|-------------------------------------------------|
//! | *(empty)*   | every leaf of the version                       |
//! | `1`         | every leaf under book 1                         |
//! | `1.1`       | the single leaf 1.1                             |
//! | `1.1-1.7`   | 1.1 through 1.7                                 |
//! | `1-2`       | first leaf of book 1 through last leaf of book 2 |
//! | `1.5-7`     | 1.5 through the last leaf of book 7             |
//!
//! Each end of a range is an absolute reference. An end is resolved to its
//! node, which stands for the leaves from its first to its last descendant
//! leaf, and the result is every leaf with an `idx` between the smallest and
//! largest of those, inclusive. A range written backwards therefore yields
//! the same leaves as the forward one.
//!
//! Resolution only reads from the store.

pub mod passage;

pub use passage::{
    Ancestor, Passage, PassageLeaf, ResolvedPassage, Window, next_window, previous_window,
    title_case,
};

use std::ops::Range;

use cts_atlas_syntax::{RefPart, Reference, ReferenceError, Urn, UrnComponent, UrnError};
use serde::Serialize;
use thiserror::Error;

use crate::models::{CitationScheme, NodeKind, TextNode};
use crate::store::NodeStore;

/// The three ways a resolve request can fail, for mapping onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidReference,
    NotFound,
    DataInconsistency,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("invalid passage URN: {0}")]
    InvalidUrn(#[from] UrnError),

    #[error(transparent)]
    InvalidReference(#[from] ReferenceError),

    #[error(
        "reference \"{reference}\" cites {depth} ranks but the citation scheme has {scheme_depth}"
    )]
    TooDeep {
        reference: String,
        depth: usize,
        scheme_depth: usize,
    },

    #[error("{0} was not found")]
    NotFound(String),

    #[error("{0} has no citation scheme")]
    MissingCitationScheme(String),

    #[error("{0} has no citable nodes below it")]
    NoCitableNodes(String),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::InvalidUrn(_)
            | ResolveError::InvalidReference(_)
            | ResolveError::TooDeep { .. } => ErrorKind::InvalidReference,
            ResolveError::NotFound(_) => ErrorKind::NotFound,
            ResolveError::MissingCitationScheme(_) | ResolveError::NoCitableNodes(_) => {
                ErrorKind::DataInconsistency
            }
        }
    }
}

/// Read-only passage lookups against a built tree.
pub struct Resolver<'s, S: NodeStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: NodeStore + ?Sized> Resolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Resolve a full passage URN such as
    /// `urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1.1-1.7`.
    ///
    /// An empty passage (`...perseus-grc2:`) names the whole version. A URN
    /// with no passage component at all is rejected.
    pub fn resolve_urn(&self, passage_urn: &str) -> Result<ResolvedPassage, ResolveError> {
        let urn = Urn::parse(passage_urn)?;
        let Some(passage) = urn.passage() else {
            return Err(UrnError::MissingComponent {
                urn: passage_urn.to_string(),
                component: "passage",
            }
            .into());
        };
        let level = if urn.has_exemplar() {
            UrnComponent::Exemplar
        } else {
            UrnComponent::Version
        };
        let root_urn = urn.up_to(level)?;
        self.resolve(&root_urn, passage)
    }

    /// Resolve `reference` within the version (or exemplar) `version_urn`.
    pub fn resolve(
        &self,
        version_urn: &str,
        reference: &str,
    ) -> Result<ResolvedPassage, ResolveError> {
        let root = self.text_root(version_urn)?;
        let scheme = self.citation_scheme(root)?;
        let parsed = Reference::parse(reference)?;
        if parsed.depth() > scheme.depth() {
            return Err(ResolveError::TooDeep {
                reference: reference.to_string(),
                depth: parsed.depth(),
                scheme_depth: scheme.depth(),
            });
        }

        let leaf_kind = scheme
            .leaf_kind()
            .ok_or_else(|| ResolveError::MissingCitationScheme(root.urn().to_string()))?;
        let total = self.store.kind_count(root.id(), &leaf_kind);

        let range = match (parsed.start(), parsed.end()) {
            (Some(start), Some(end)) => {
                let start = self.leaf_span(root, start, &leaf_kind)?;
                let end = self.leaf_span(root, end, &leaf_kind)?;
                start.start.min(end.start)..start.end.max(end.end)
            }
            _ => 0..total,
        };

        let leaves = self
            .store
            .siblings_in_idx_range(root.id(), &leaf_kind, range.clone());
        let ancestors: Vec<Ancestor> = leaves
            .first()
            .map(|first| {
                self.store
                    .ancestors(first.id())
                    .into_iter()
                    .filter(|node| node.rank().is_some())
                    .map(Ancestor::from)
                    .collect()
            })
            .unwrap_or_default();

        let passage = Passage::from_leaves(&leaves);
        let previous = previous_window(&range);
        let next = next_window(&range, total);

        log::debug!(
            "resolved {}{} to {} leaves ({:?})",
            root.urn(),
            reference,
            leaves.len(),
            range
        );

        Ok(ResolvedPassage {
            version_urn: root.urn().to_string(),
            reference: reference.to_string(),
            urn: passage.map_or_else(
                || root.urn().to_string(),
                |passage| passage.urn(root.urn()),
            ),
            human_readable: passage
                .map(|passage| passage.human_readable_reference(self.store))
                .unwrap_or_default(),
            leaves: leaves.iter().copied().map(PassageLeaf::from).collect(),
            ancestors,
            previous: self.window(root, &leaf_kind, previous),
            next: self.window(root, &leaf_kind, next),
            range,
        })
    }

    /// The version or exemplar node for `version_urn`; the trailing `:` is
    /// optional.
    fn text_root(&self, version_urn: &str) -> Result<&'s TextNode, ResolveError> {
        let node = self
            .store
            .get_by_urn(version_urn)
            .or_else(|| self.store.get_by_urn(&format!("{version_urn}:")))
            .filter(|node| node.kind().is_text_root());
        node.ok_or_else(|| ResolveError::NotFound(version_urn.to_string()))
    }

    /// The scheme stored on the root, or on its version for an exemplar.
    fn citation_scheme(&self, root: &TextNode) -> Result<CitationScheme, ResolveError> {
        std::iter::once(root)
            .chain(self.store.ancestors(root.id()).into_iter().rev())
            .find_map(|node| node.metadata().and_then(CitationScheme::from_metadata))
            .ok_or_else(|| ResolveError::MissingCitationScheme(root.urn().to_string()))
    }

    /// Half-open idx range of the leaves under the node `part` names.
    fn leaf_span(
        &self,
        root: &TextNode,
        part: &RefPart,
        leaf_kind: &NodeKind,
    ) -> Result<Range<usize>, ResolveError> {
        let urn = format!("{}{part}", root.urn());
        let anchor = self
            .store
            .get_by_urn(&urn)
            .ok_or_else(|| ResolveError::NotFound(urn.clone()))?;
        let first = self.store.first_of_kind(anchor.id(), leaf_kind);
        let last = self.store.last_of_kind(anchor.id(), leaf_kind);
        match (first, last) {
            (Some(first), Some(last)) => Ok(first.idx()..last.idx() + 1),
            _ => Err(ResolveError::NoCitableNodes(urn)),
        }
    }

    fn window(&self, root: &TextNode, leaf_kind: &NodeKind, range: Range<usize>) -> Window {
        let leaves = self
            .store
            .siblings_in_idx_range(root.id(), leaf_kind, range.clone());
        let urn = Passage::from_leaves(&leaves).map(|passage| passage.urn(root.urn()));
        Window { range, urn }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{ImportMemo, import};
    use crate::models::{Metadata, NewNode};
    use crate::store::ArenaStore;
    use crate::tests::{ILIAD_VERSION, imported_iliad};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn refs(store: &ArenaStore, reference: &str) -> Vec<String> {
        Resolver::new(store)
            .resolve(ILIAD_VERSION, reference)
            .unwrap()
            .refs()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[rstest]
    #[case("1.1", &["1.1"])]
    #[case("1.1-1.3", &["1.1", "1.2", "1.3"])]
    #[case("1", &["1.1", "1.2", "1.3", "1.4", "1.5", "1.6", "1.7"])]
    #[case("2", &["2.1", "2.2", "2.3"])]
    #[case("1.6-2.1", &["1.6", "1.7", "2.1"])]
    #[case("1.7-2", &["1.7", "2.1", "2.2", "2.3"])]
    #[case("1-2.1", &["1.1", "1.2", "1.3", "1.4", "1.5", "1.6", "1.7", "2.1"])]
    #[case("1.3-1.1", &["1.1", "1.2", "1.3"])]
    fn reference_forms(#[case] reference: &str, #[case] expected: &[&str]) {
        let (store, _) = imported_iliad();
        assert_eq!(refs(&store, reference), expected);
    }

    #[test]
    fn empty_reference_is_the_whole_version() {
        let (store, _) = imported_iliad();
        assert_eq!(refs(&store, "").len(), 10);
        assert_eq!(refs(&store, "1-2").len(), 10);
    }

    #[test]
    fn first_book_scenario() {
        let (store, _) = imported_iliad();
        let passage = Resolver::new(&store).resolve(ILIAD_VERSION, "1.1-1.7").unwrap();

        assert_eq!(
            passage.leaves.iter().map(|l| l.idx).collect::<Vec<_>>(),
            (0..7).collect::<Vec<_>>()
        );
        assert_eq!(
            passage.ancestors,
            vec![Ancestor {
                kind: "book".to_string(),
                reference: "1".to_string(),
                urn: format!("{ILIAD_VERSION}1"),
            }]
        );
        assert_eq!(passage.urn, format!("{ILIAD_VERSION}1.1-1.7"));
        assert_eq!(passage.human_readable, "Book 1 Line 1 to Line 7");
        assert_eq!(passage.range, 0..7);
    }

    #[test]
    fn navigation_windows() {
        let (store, _) = imported_iliad();
        let resolver = Resolver::new(&store);

        let first = resolver.resolve(ILIAD_VERSION, "1.1-1.3").unwrap();
        assert!(first.previous.is_empty());
        assert_eq!(first.previous.urn, None);
        assert_eq!(first.next.range, 3..6);
        assert_eq!(first.next.urn, Some(format!("{ILIAD_VERSION}1.4-1.6")));

        let middle = resolver.resolve(ILIAD_VERSION, "1.5-1.7").unwrap();
        assert_eq!(middle.previous.urn, Some(format!("{ILIAD_VERSION}1.2-1.4")));
        assert_eq!(middle.next.urn, Some(format!("{ILIAD_VERSION}2.1-2.3")));

        let last = resolver.resolve(ILIAD_VERSION, "2.2-2.3").unwrap();
        assert_eq!(last.previous.urn, Some(format!("{ILIAD_VERSION}1.7-2.1")));
        assert!(last.next.is_empty());
        assert_eq!(last.next.urn, None);
    }

    #[test]
    fn previous_window_is_clamped_at_the_start() {
        let (store, _) = imported_iliad();
        let passage = Resolver::new(&store).resolve(ILIAD_VERSION, "1.2-1.4").unwrap();
        assert_eq!(passage.previous.range, 0..1);
        assert_eq!(passage.previous.urn, Some(format!("{ILIAD_VERSION}1.1")));
    }

    #[test]
    fn resolve_full_urn() {
        let (store, _) = imported_iliad();
        let resolver = Resolver::new(&store);

        let err = resolver
            .resolve_urn("urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:2.480-2.493")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let passage = resolver
            .resolve_urn("urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:2")
            .unwrap();
        assert_eq!(passage.refs(), vec!["2.1", "2.2", "2.3"]);
        assert_eq!(passage.version_urn, ILIAD_VERSION);

        let whole = resolver
            .resolve_urn("urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:")
            .unwrap();
        assert_eq!(whole.len(), 10);
    }

    #[test]
    fn full_urn_without_passage_is_rejected() {
        let (store, _) = imported_iliad();

        let err = Resolver::new(&store)
            .resolve_urn("urn:cts:greekLit:tlg0012.tlg001.perseus-grc2")
            .unwrap_err();

        assert_eq!(
            err,
            ResolveError::InvalidUrn(UrnError::MissingComponent {
                urn: "urn:cts:greekLit:tlg0012.tlg001.perseus-grc2".to_string(),
                component: "passage",
            })
        );
        assert_eq!(err.kind(), ErrorKind::InvalidReference);
    }

    #[test]
    fn version_urn_colon_is_optional() {
        let (store, _) = imported_iliad();
        let passage = Resolver::new(&store)
            .resolve("urn:cts:greekLit:tlg0012.tlg001.perseus-grc2", "1.1")
            .unwrap();
        assert_eq!(passage.refs(), vec!["1.1"]);
    }

    #[rstest]
    #[case(ILIAD_VERSION, "1.1.1", ErrorKind::InvalidReference)]
    #[case(ILIAD_VERSION, "1..1", ErrorKind::InvalidReference)]
    #[case(ILIAD_VERSION, "1.1 - 1.2", ErrorKind::InvalidReference)]
    #[case(ILIAD_VERSION, "3", ErrorKind::NotFound)]
    #[case(ILIAD_VERSION, "1.8", ErrorKind::NotFound)]
    #[case(ILIAD_VERSION, "1.5-3", ErrorKind::NotFound)]
    #[case("urn:cts:greekLit:tlg0012.tlg001.perseus-eng3:", "1.1", ErrorKind::NotFound)]
    #[case("urn:cts:greekLit:tlg0012.tlg001:", "1.1", ErrorKind::NotFound)]
    fn error_kinds(#[case] version: &str, #[case] reference: &str, #[case] kind: ErrorKind) {
        let (store, _) = imported_iliad();
        let err = Resolver::new(&store).resolve(version, reference).unwrap_err();
        assert_eq!(err.kind(), kind, "{err}");
    }

    #[test]
    fn malformed_passage_urn_is_an_invalid_reference() {
        let (store, _) = imported_iliad();
        let err = Resolver::new(&store).resolve_urn("urn:cts").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReference);
    }

    #[test]
    fn version_without_scheme_is_inconsistent() {
        let mut store = ArenaStore::new();
        store
            .create_root(NewNode::new(NodeKind::Version, ILIAD_VERSION))
            .unwrap();
        let err = Resolver::new(&store).resolve(ILIAD_VERSION, "1").unwrap_err();
        assert_eq!(err, ResolveError::MissingCitationScheme(ILIAD_VERSION.to_string()));
        assert_eq!(err.kind(), ErrorKind::DataInconsistency);
    }

    #[test]
    fn empty_version_resolves_to_an_empty_range() {
        let mut store = ArenaStore::new();
        let mut metadata = Metadata::new();
        metadata.insert(
            crate::models::CITATION_SCHEME.to_string(),
            CitationScheme::new(["book", "line"]).to_value(),
        );
        let mut fields = NewNode::new(NodeKind::Version, ILIAD_VERSION);
        fields.metadata = Some(metadata);
        store.create_root(fields).unwrap();

        let passage = Resolver::new(&store).resolve(ILIAD_VERSION, "").unwrap();
        assert!(passage.is_empty());
        assert_eq!(passage.range, 0..0);
        assert!(passage.previous.is_empty());
        assert!(passage.next.is_empty());
        assert_eq!(passage.human_readable, "");
    }

    #[test]
    fn exemplar_reads_scheme_from_its_version() {
        let mut store = ArenaStore::new();
        let mut memo = ImportMemo::new();
        let exemplar = "urn:cts:greekLit:tlg0013.tlg001.perseus-grc2.card:";
        import(
            &mut store,
            &mut memo,
            exemplar,
            CitationScheme::new(["a", "b", "c", "d"]),
            Metadata::new(),
            ["h.1.2.a.3 x", "h.1.2.a.4 y", "h.1.2.b.1 z"],
        )
        .unwrap();

        let resolver = Resolver::new(&store);
        let passage = resolver.resolve_urn(&format!("{exemplar}1.2.a")).unwrap();
        assert_eq!(passage.refs(), vec!["1.2.a.3", "1.2.a.4"]);
        assert_eq!(
            passage.ancestors.iter().map(|a| a.reference.as_str()).collect::<Vec<_>>(),
            vec!["1", "1.2", "1.2.a"]
        );
        assert_eq!(passage.human_readable, "A 1 B 2 C a D 3 to D 4");
    }

    #[test]
    fn serializes_for_transport() {
        let (store, _) = imported_iliad();
        let passage = Resolver::new(&store).resolve(ILIAD_VERSION, "1.1-1.2").unwrap();
        let json = serde_json::to_value(&passage).unwrap();

        assert_eq!(json["leaves"][1]["ref"], "1.2");
        assert_eq!(json["ancestors"][0]["kind"], "book");
        assert_eq!(json["previous"]["urn"], serde_json::Value::Null);
        assert_eq!(json["next"]["range"]["start"], 2);
    }
}
