//! # Node Store
//!
//! The importer and resolver never touch tree storage directly; they go
//! through [`NodeStore`], a small handle-based contract:
//!
//! - create a root or a child and get a [`NodeId`] back
//! - look nodes up by handle or by URN
//! - count descendants, and count or slice the nodes of one kind under a
//!   text root by their 0-based `idx`
//!
//! [`ArenaStore`] is the in-memory implementation.

pub mod arena;

pub use arena::ArenaStore;

use std::ops::Range;

use thiserror::Error;

use crate::models::{NewNode, NodeId, NodeKind, TextNode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("a node with URN \"{0}\" already exists")]
    DuplicateUrn(String),

    #[error("parent node {0:?} does not exist")]
    UnknownParent(NodeId),
}

pub trait NodeStore {
    fn create_root(&mut self, fields: NewNode) -> Result<NodeId, StoreError>;

    fn add_child(&mut self, parent: NodeId, fields: NewNode) -> Result<NodeId, StoreError>;

    fn get(&self, id: NodeId) -> Option<&TextNode>;

    fn get_by_urn(&self, urn: &str) -> Option<&TextNode>;

    /// Forest roots in creation order.
    fn roots(&self) -> &[NodeId];

    fn descendant_count(&self, id: NodeId) -> usize;

    /// Number of `kind` nodes under a version or exemplar.
    fn kind_count(&self, text_root: NodeId, kind: &NodeKind) -> usize;

    /// The `kind` nodes under `text_root` whose `idx` falls in `range`,
    /// ordered by `idx`.
    fn siblings_in_idx_range(
        &self,
        text_root: NodeId,
        kind: &NodeKind,
        range: Range<usize>,
    ) -> Vec<&TextNode>;

    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn children(&self, id: NodeId) -> Vec<&TextNode> {
        self.get(id)
            .map(|node| {
                node.children()
                    .iter()
                    .filter_map(|child| self.get(*child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ancestors of `id`, outermost first, excluding the node itself.
    fn ancestors(&self, id: NodeId) -> Vec<&TextNode> {
        let mut chain = Vec::new();
        let mut cursor = self.get(id).and_then(TextNode::parent);
        while let Some(parent) = cursor.and_then(|p| self.get(p)) {
            chain.push(parent);
            cursor = parent.parent();
        }
        chain.reverse();
        chain
    }

    /// Follow first children down until a `kind` node is reached.
    fn first_of_kind(&self, id: NodeId, kind: &NodeKind) -> Option<&TextNode> {
        descend(self, id, kind, |children| children.first())
    }

    /// Follow last children down until a `kind` node is reached.
    fn last_of_kind(&self, id: NodeId, kind: &NodeKind) -> Option<&TextNode> {
        descend(self, id, kind, |children| children.last())
    }
}

fn descend<'s, S, F>(store: &'s S, id: NodeId, kind: &NodeKind, pick: F) -> Option<&'s TextNode>
where
    S: NodeStore + ?Sized,
    F: Fn(&[NodeId]) -> Option<&NodeId>,
{
    let mut node = store.get(id)?;
    while node.kind() != kind {
        node = store.get(*pick(node.children())?)?;
    }
    Some(node)
}

/// Render the subtree under `id` as an indented outline, one node per line:
/// kind, reference (or URN above the citation ranks), `#idx`, then any text.
pub fn format_tree<S: NodeStore + ?Sized>(
    store: &S,
    id: NodeId,
    max_depth: Option<usize>,
) -> String {
    let mut out = String::new();
    if let Some(node) = store.get(id) {
        write_node(store, node, node.depth(), max_depth, &mut out);
    }
    out
}

fn write_node<S: NodeStore + ?Sized>(
    store: &S,
    node: &TextNode,
    base_depth: usize,
    max_depth: Option<usize>,
    out: &mut String,
) {
    let level = node.depth() - base_depth;
    let label = node.reference().unwrap_or(node.urn());
    out.push_str(&format!(
        "{}{} {} #{}",
        "  ".repeat(level),
        node.kind(),
        label,
        node.idx()
    ));
    if let Some(text) = node.text_content() {
        out.push_str(&format!(" {text}"));
    }
    out.push('\n');

    if max_depth.is_some_and(|max| level >= max) {
        return;
    }
    for child in store.children(node.id()) {
        write_node(store, child, base_depth, max_depth, out);
    }
}
