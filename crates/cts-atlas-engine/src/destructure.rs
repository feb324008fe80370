//! # Destructuring a passage URN into tree nodes
//!
//! One line of a version's text is addressed by a full passage URN such as
//! `urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1.7`. Placing it in the tree
//! takes one node per level:
//!
//! ```text
//! namespace  urn:cts:greekLit:
//! textgroup  urn:cts:greekLit:tlg0012:
//! work       urn:cts:greekLit:tlg0012.tlg001:
//! version    urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:
//! book       urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1       ref 1    rank 1
//! line       urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1.7     ref 1.7  rank 2  + text
//! ```
//!
//! The fixed levels come from truncating the URN; the citation levels come
//! from zipping the passage segments with the citation scheme, which must
//! have exactly as many ranks as the passage has segments.

use cts_atlas_syntax::{Reference, ReferenceError, Urn, UrnComponent, UrnError};
use thiserror::Error;

use crate::models::{CitationScheme, Metadata, NewNode, NodeKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DestructureError {
    #[error("citation scheme has {scheme_depth} ranks but \"{urn}\" cites {passage_depth}")]
    SchemeMismatch {
        urn: String,
        scheme_depth: usize,
        passage_depth: usize,
    },

    #[error("\"{0}\" has no passage to destructure")]
    MissingPassage(String),

    #[error("\"{0}\" cites a range, not a single passage")]
    PassageRange(String),

    #[error("\"{urn}\" has an invalid passage: {source}")]
    InvalidPassage {
        urn: String,
        #[source]
        source: ReferenceError,
    },

    #[error(transparent)]
    Urn(#[from] UrnError),
}

/// Everything needed to create one node, minus its `idx`, which the
/// importer assigns.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    pub kind: NodeKind,
    pub urn: String,
    pub reference: Option<String>,
    pub rank: Option<usize>,
    pub text_content: Option<String>,
    pub metadata: Option<Metadata>,
}

impl NodeDescriptor {
    fn fixed(kind: NodeKind, urn: String) -> Self {
        Self {
            kind,
            urn,
            reference: None,
            rank: None,
            text_content: None,
            metadata: None,
        }
    }

    pub fn into_new_node(self, idx: usize) -> NewNode {
        NewNode {
            kind: self.kind,
            urn: self.urn,
            reference: self.reference,
            rank: self.rank,
            text_content: self.text_content,
            idx,
            metadata: self.metadata,
        }
    }
}

/// Destructures passage URNs of one version against its citation scheme.
#[derive(Debug, Clone)]
pub struct Destructurer {
    scheme: CitationScheme,
    metadata: Option<Metadata>,
}

impl Destructurer {
    pub fn new(scheme: CitationScheme) -> Self {
        Self {
            scheme,
            metadata: None,
        }
    }

    /// Metadata to attach to the version descriptor.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn scheme(&self) -> &CitationScheme {
        &self.scheme
    }

    pub fn destructure(
        &self,
        node_urn: &Urn,
        text: &str,
    ) -> Result<Vec<NodeDescriptor>, DestructureError> {
        let part = match Reference::parse(node_urn.passage().unwrap_or_default()) {
            Ok(Reference::Single(part)) => part,
            Ok(Reference::Whole) => {
                return Err(DestructureError::MissingPassage(node_urn.to_string()));
            }
            Ok(Reference::Range { .. }) => {
                return Err(DestructureError::PassageRange(node_urn.to_string()));
            }
            Err(source) => {
                return Err(DestructureError::InvalidPassage {
                    urn: node_urn.to_string(),
                    source,
                });
            }
        };

        if part.depth() != self.scheme.depth() {
            return Err(DestructureError::SchemeMismatch {
                urn: node_urn.to_string(),
                scheme_depth: self.scheme.depth(),
                passage_depth: part.depth(),
            });
        }

        let mut fixed = vec![
            NodeKind::Namespace,
            NodeKind::Textgroup,
            NodeKind::Work,
            NodeKind::Version,
        ];
        if node_urn.has_exemplar() {
            fixed.push(NodeKind::Exemplar);
        }

        let mut descriptors = Vec::with_capacity(fixed.len() + part.depth());
        for kind in fixed {
            let component = kind.component().unwrap_or(UrnComponent::NoPassage);
            let mut descriptor = NodeDescriptor::fixed(kind, node_urn.up_to(component)?);
            if descriptor.kind == NodeKind::Version {
                descriptor.metadata = self.metadata.clone();
            }
            descriptors.push(descriptor);
        }

        let base = node_urn.up_to(UrnComponent::NoPassage)?;
        for (i, rank_name) in self.scheme.ranks().iter().enumerate() {
            let rank = i + 1;
            let reference = part.truncate(rank).map(|p| p.to_string()).unwrap_or_default();
            descriptors.push(NodeDescriptor {
                kind: NodeKind::Rank(rank_name.clone()),
                urn: format!("{base}:{reference}"),
                reference: Some(reference),
                rank: Some(rank),
                text_content: (rank == part.depth()).then(|| text.to_string()),
                metadata: None,
            });
        }

        Ok(descriptors)
    }
}

/// Destructure a single passage URN without keeping a [`Destructurer`].
pub fn destructure(
    scheme: &CitationScheme,
    node_urn: &Urn,
    text: &str,
) -> Result<Vec<NodeDescriptor>, DestructureError> {
    Destructurer::new(scheme.clone()).destructure(node_urn, text)
}
