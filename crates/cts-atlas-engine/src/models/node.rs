use std::fmt;

use cts_atlas_syntax::UrnComponent;
use serde::Serialize;

use super::Metadata;

/// Handle to a node inside a [`NodeStore`](crate::store::NodeStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node stands for: one of the fixed URN levels, or a named rank of
/// the version's citation scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum NodeKind {
    Namespace,
    Textgroup,
    Work,
    Version,
    Exemplar,
    Rank(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Namespace => "namespace",
            NodeKind::Textgroup => "textgroup",
            NodeKind::Work => "work",
            NodeKind::Version => "version",
            NodeKind::Exemplar => "exemplar",
            NodeKind::Rank(name) => name,
        }
    }

    /// The fixed level a URN is truncated to for this kind.
    pub fn component(&self) -> Option<UrnComponent> {
        match self {
            NodeKind::Namespace => Some(UrnComponent::Namespace),
            NodeKind::Textgroup => Some(UrnComponent::Textgroup),
            NodeKind::Work => Some(UrnComponent::Work),
            NodeKind::Version => Some(UrnComponent::Version),
            NodeKind::Exemplar => Some(UrnComponent::Exemplar),
            NodeKind::Rank(_) => None,
        }
    }

    /// Version and exemplar nodes root the citable text beneath them.
    pub fn is_text_root(&self) -> bool {
        matches!(self, NodeKind::Version | NodeKind::Exemplar)
    }

    pub fn is_rank(&self) -> bool {
        matches!(self, NodeKind::Rank(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Fields for a node that has not been placed in a store yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub kind: NodeKind,
    pub urn: String,
    pub reference: Option<String>,
    pub rank: Option<usize>,
    pub text_content: Option<String>,
    pub idx: usize,
    pub metadata: Option<Metadata>,
}

impl NewNode {
    pub fn new(kind: NodeKind, urn: impl Into<String>) -> Self {
        Self {
            kind,
            urn: urn.into(),
            reference: None,
            rank: None,
            text_content: None,
            idx: 0,
            metadata: None,
        }
    }

    pub fn with_idx(mut self, idx: usize) -> Self {
        self.idx = idx;
        self
    }
}

/// A node in the text forest.
///
/// Nodes are only created through a store, which owns the tree links and
/// keeps `descendants` current as children are added below.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) urn: String,
    pub(crate) reference: Option<String>,
    pub(crate) rank: Option<usize>,
    pub(crate) text_content: Option<String>,
    pub(crate) idx: usize,
    pub(crate) metadata: Option<Metadata>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) depth: usize,
    pub(crate) descendants: usize,
    pub(crate) text_root: Option<NodeId>,
}

impl TextNode {
    pub(crate) fn from_new(
        id: NodeId,
        fields: NewNode,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Self {
        Self {
            id,
            kind: fields.kind,
            urn: fields.urn,
            reference: fields.reference,
            rank: fields.rank,
            text_content: fields.text_content,
            idx: fields.idx,
            metadata: fields.metadata,
            parent,
            children: Vec::new(),
            depth,
            descendants: 0,
            text_root: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn urn(&self) -> &str {
        &self.urn
    }

    /// Dot-path reference, only set on citation-rank nodes.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// 1-based citation rank, only set on citation-rank nodes.
    pub fn rank(&self) -> Option<usize> {
        self.rank
    }

    pub fn text_content(&self) -> Option<&str> {
        self.text_content.as_deref()
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Distance from the forest root; namespaces are at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The nearest version or exemplar at or above this node.
    pub fn text_root(&self) -> Option<NodeId> {
        self.text_root
    }

    /// Last segment of the reference, e.g. `7` for line `1.7`.
    pub fn lowest_citable_part(&self) -> Option<&str> {
        self.reference()
            .and_then(|reference| reference.rsplit('.').next())
    }
}
