use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{
    direction::HorizontalDirection,
    node::{Node, NodeKind},
    node_id::NodeId,
    text,
};

/// An ordered sequence of nodes. Document lines and structure slots are both rows.
///
/// Invariants:
/// - A row is never empty. An empty row is a single empty text run.
/// - The parent-child order is always Row -> Node -> Row -> Node -> ....
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub struct Row {
    nodes: Vec<Node>,
}

/// A text run that disappeared into its left neighbour while merging.
/// A caret inside `from` at offset `o` now lives inside `into` at `o + shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMerge {
    pub from: NodeId,
    pub into: NodeId,
    pub shift: usize,
}

impl Row {
    pub fn new(nodes: Vec<Node>) -> Self {
        let mut row = Row { nodes };
        row.ensure_not_empty();
        row
    }

    pub fn empty() -> Self {
        Row {
            nodes: vec![Node::empty_text()],
        }
    }

    pub fn from_text<T: Into<String>>(value: T) -> Self {
        Row {
            nodes: vec![Node::text_run(value)],
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Rows are never empty, this checks for a row with a single empty text run instead.
    pub fn is_empty(&self) -> bool {
        self.is_blank()
    }

    /// A single empty text run
    pub fn is_blank(&self) -> bool {
        match self.nodes.as_slice() {
            [node] => matches!(&node.kind, NodeKind::TextRun { text, .. } if text.is_empty()),
            _ => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Node> {
        self.nodes.iter_mut()
    }

    pub fn edge_node(&self, side: HorizontalDirection) -> Option<&Node> {
        match side {
            HorizontalDirection::Left => self.nodes.first(),
            HorizontalDirection::Right => self.nodes.last(),
        }
    }

    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    pub fn push(&mut self, node: Node) {
        if self.is_blank() {
            self.nodes.clear();
        }
        self.nodes.push(node);
    }

    pub fn insert(&mut self, index: usize, node: Node) {
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
    }

    /// Removes a node. If it was the last node, an empty text run takes its place.
    pub fn remove(&mut self, index: usize) -> Option<Node> {
        if index >= self.nodes.len() {
            return None;
        }
        let node = self.nodes.remove(index);
        self.ensure_not_empty();
        Some(node)
    }

    /// Replaces a range of nodes, and returns the removed ones.
    pub fn splice(&mut self, range: Range<usize>, nodes: Vec<Node>) -> Vec<Node> {
        let end = range.end.min(self.nodes.len());
        let start = range.start.min(end);
        let removed = self.nodes.splice(start..end, nodes).collect();
        self.ensure_not_empty();
        removed
    }

    /// Splits the row. This row keeps the nodes before `index`.
    pub fn split_off(&mut self, index: usize) -> Row {
        let index = index.min(self.nodes.len());
        let tail = self.nodes.split_off(index);
        self.ensure_not_empty();
        Row::new(tail)
    }

    /// Appends the nodes of another row. A blank row on either side is dropped.
    pub fn append(&mut self, other: Row) {
        if other.is_blank() {
            return;
        }
        if self.is_blank() {
            self.nodes.clear();
        }
        self.nodes.extend(other.nodes);
    }

    /// Merges neighbouring text runs, and reports which runs disappeared.
    pub fn merge_text_runs(&mut self) -> Vec<TextMerge> {
        let mut merges = Vec::new();
        let mut merged: Vec<Node> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.drain(..) {
            if let Some(previous) = merged.last_mut() {
                if let (
                    NodeKind::TextRun {
                        text: left,
                        is_vector_marker: left_marker,
                    },
                    NodeKind::TextRun {
                        text: right,
                        is_vector_marker: right_marker,
                    },
                ) = (&mut previous.kind, &node.kind)
                {
                    let shift = text::len(left);
                    left.push_str(right);
                    *left_marker |= *right_marker;
                    merges.push(TextMerge {
                        from: node.id,
                        into: previous.id,
                        shift,
                    });
                    continue;
                }
            }
            merged.push(node);
        }
        self.nodes = merged;
        self.ensure_not_empty();
        merges
    }

    fn ensure_not_empty(&mut self) {
        if self.nodes.is_empty() {
            self.nodes.push(Node::empty_text());
        }
    }
}

impl From<Vec<Node>> for Row {
    fn from(nodes: Vec<Node>) -> Self {
        Row::new(nodes)
    }
}

impl Default for Row {
    fn default() -> Self {
        Row::empty()
    }
}

/// We have a repeating row > node > row > ... hierarchy.
/// So to get from one row to the next, we need two indices.
/// One to tell us how to get to the node, and another to tell us which of its slots to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RowIndex(pub usize, pub usize);

/// Points at a row. Starts at a document line and descends through slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowPath {
    pub line: usize,
    pub indices: Vec<RowIndex>,
}

/// Points at a node inside a row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath {
    pub row: RowPath,
    pub index: usize,
}

impl RowPath {
    pub fn line(line: usize) -> Self {
        RowPath {
            line,
            indices: Vec::new(),
        }
    }

    /// A document line, as opposed to a slot inside of a structure
    pub fn is_line(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    pub fn node(&self, index: usize) -> NodePath {
        NodePath {
            row: self.clone(),
            index,
        }
    }

    /// The structure that owns this row, if the row is a slot
    pub fn owner(&self) -> Option<NodePath> {
        let (last, rest) = self.indices.split_last()?;
        Some(NodePath {
            row: RowPath {
                line: self.line,
                indices: rest.to_vec(),
            },
            index: last.0,
        })
    }

    /// Which slot of its owner this row is
    pub fn slot_in_owner(&self) -> Option<usize> {
        self.indices.last().map(|index| index.1)
    }

    /// All structures that contain this row, innermost first, together with the slot they were entered through.
    pub fn ancestors(&self) -> Vec<(NodePath, usize)> {
        let mut result = Vec::with_capacity(self.indices.len());
        let mut current = self.clone();
        while let (Some(owner), Some(slot)) = (current.owner(), current.slot_in_owner()) {
            current = owner.row.clone();
            result.push((owner, slot));
        }
        result
    }
}

impl NodePath {
    pub fn slot(&self, slot: usize) -> RowPath {
        let mut indices = self.row.indices.clone();
        indices.push(RowIndex(self.index, slot));
        RowPath {
            line: self.row.line,
            indices,
        }
    }

    pub fn sibling(&self, index: usize) -> NodePath {
        self.row.node(index)
    }

    /// The structure that owns the row this node lives in
    pub fn parent(&self) -> Option<NodePath> {
        self.row.owner()
    }
}
