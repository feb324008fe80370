use std::collections::HashMap;
use std::ops::Range;

use super::{NodeStore, StoreError};
use crate::models::{NewNode, NodeId, NodeKind, TextNode};

/// In-memory [`NodeStore`] backed by a vector of nodes.
///
/// Besides the arena itself it keeps a URN index and, for every text root,
/// one idx-ordered list per node kind. Descendant counts are bumped along
/// the parent chain on each insert.
#[derive(Debug, Default)]
pub struct ArenaStore {
    nodes: Vec<TextNode>,
    roots: Vec<NodeId>,
    by_urn: HashMap<String, NodeId>,
    by_kind: HashMap<NodeId, HashMap<NodeKind, Vec<NodeId>>>,
}

impl ArenaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &TextNode> {
        self.nodes.iter()
    }

    fn insert(&mut self, parent: Option<NodeId>, fields: NewNode) -> Result<NodeId, StoreError> {
        if self.by_urn.contains_key(&fields.urn) {
            return Err(StoreError::DuplicateUrn(fields.urn));
        }

        let id = NodeId(self.nodes.len());
        let (depth, inherited_root) = match parent {
            Some(p) => {
                let parent_node = self.nodes.get(p.0).ok_or(StoreError::UnknownParent(p))?;
                (parent_node.depth + 1, parent_node.text_root)
            }
            None => (0, None),
        };

        let mut node = TextNode::from_new(id, fields, parent, depth);
        node.text_root = if node.kind.is_text_root() {
            Some(id)
        } else {
            inherited_root
        };

        if let Some(root) = node.text_root {
            let nodes = &self.nodes;
            let idx = node.idx;
            let ordered = self
                .by_kind
                .entry(root)
                .or_default()
                .entry(node.kind.clone())
                .or_default();
            let at = ordered
                .partition_point(|other| nodes.get(other.0).is_some_and(|n| n.idx <= idx));
            ordered.insert(at, id);
        }

        self.by_urn.insert(node.urn.clone(), id);
        self.nodes.push(node);

        match parent {
            Some(p) => {
                self.nodes[p.0].children.push(id);
                let mut cursor = Some(p);
                while let Some(ancestor) = cursor {
                    let ancestor = &mut self.nodes[ancestor.0];
                    ancestor.descendants += 1;
                    cursor = ancestor.parent;
                }
            }
            None => self.roots.push(id),
        }

        Ok(id)
    }

    fn ordered(&self, text_root: NodeId, kind: &NodeKind) -> &[NodeId] {
        self.by_kind
            .get(&text_root)
            .and_then(|kinds| kinds.get(kind))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl NodeStore for ArenaStore {
    fn create_root(&mut self, fields: NewNode) -> Result<NodeId, StoreError> {
        self.insert(None, fields)
    }

    fn add_child(&mut self, parent: NodeId, fields: NewNode) -> Result<NodeId, StoreError> {
        self.insert(Some(parent), fields)
    }

    fn get(&self, id: NodeId) -> Option<&TextNode> {
        self.nodes.get(id.0)
    }

    fn get_by_urn(&self, urn: &str) -> Option<&TextNode> {
        self.by_urn.get(urn).and_then(|id| self.get(*id))
    }

    fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    fn descendant_count(&self, id: NodeId) -> usize {
        self.get(id).map_or(0, |node| node.descendants)
    }

    fn kind_count(&self, text_root: NodeId, kind: &NodeKind) -> usize {
        self.ordered(text_root, kind).len()
    }

    fn siblings_in_idx_range(
        &self,
        text_root: NodeId,
        kind: &NodeKind,
        range: Range<usize>,
    ) -> Vec<&TextNode> {
        if range.is_empty() {
            return Vec::new();
        }
        let ordered = self.ordered(text_root, kind);
        let idx_of = |id: &NodeId| self.nodes[id.0].idx;
        let lo = ordered.partition_point(|id| idx_of(id) < range.start);
        let hi = ordered.partition_point(|id| idx_of(id) < range.end);
        ordered[lo..hi].iter().map(|id| &self.nodes[id.0]).collect()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
