use serde::{Deserialize, Serialize};

use crate::{
    grid::Grid,
    layout::LayoutBox,
    node::{Node, NodeKind},
    node_id::NodeId,
    row::{NodePath, Row, RowIndex, RowPath},
};

/// An ordered list of lines. Owns every node transitively.
///
/// Invariants:
/// - There is always at least one line.
/// - Every line has at least one node (see [`Row`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub struct Document {
    lines: Vec<Row>,
    /// Layout of every line, valid after [`Document::layout`]
    #[serde(skip)]
    pub(crate) line_boxes: Vec<LayoutBox>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Document {
            lines: vec![Row::empty()],
            line_boxes: Vec::new(),
        }
    }

    pub fn from_lines(lines: Vec<Row>) -> Self {
        let mut document = Document {
            lines,
            line_boxes: Vec::new(),
        };
        document.normalize();
        document
    }

    pub fn lines(&self) -> &[Row] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Row> {
        self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&Row> {
        self.lines.get(index)
    }

    pub fn line_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.invalidate_layout();
        self.lines.get_mut(index)
    }

    pub fn insert_line(&mut self, index: usize, row: Row) {
        self.invalidate_layout();
        let index = index.min(self.lines.len());
        self.lines.insert(index, row);
    }

    /// Removes a line. Removing the only line leaves an empty line behind.
    pub fn remove_line(&mut self, index: usize) -> Option<Row> {
        if index >= self.lines.len() {
            return None;
        }
        self.invalidate_layout();
        let row = self.lines.remove(index);
        if self.lines.is_empty() {
            self.lines.push(Row::empty());
        }
        Some(row)
    }

    pub fn row(&self, path: &RowPath) -> Option<&Row> {
        let mut row = self.lines.get(path.line)?;
        for RowIndex(node_index, slot) in &path.indices {
            row = row.get(*node_index)?.kind.slot(*slot)?;
        }
        Some(row)
    }

    pub fn row_mut(&mut self, path: &RowPath) -> Option<&mut Row> {
        self.invalidate_layout();
        let mut row = self.lines.get_mut(path.line)?;
        for RowIndex(node_index, slot) in &path.indices {
            row = row.get_mut(*node_index)?.kind.slot_mut(*slot)?;
        }
        Some(row)
    }

    pub fn node(&self, path: &NodePath) -> Option<&Node> {
        self.row(&path.row)?.get(path.index)
    }

    pub fn node_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        self.row_mut(&path.row)?.get_mut(path.index)
    }

    /// Finds a node by walking down from the lines.
    /// Returns `None` for ids that were detached from this document.
    pub fn path_to(&self, id: NodeId) -> Option<NodePath> {
        for (line_index, line) in self.lines.iter().enumerate() {
            let mut path = RowPath::line(line_index);
            if let Some(index) = find_in_row(line, id, &mut path) {
                return Some(path.node(index));
            }
        }
        None
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        let path = self.path_to(id)?;
        self.node(&path)
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let path = self.path_to(id)?;
        self.node_mut(&path)
    }

    /// The structure that owns the row a node lives in.
    pub fn parent(&self, path: &NodePath) -> Option<&Node> {
        self.node(&path.parent()?)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.path_to(id).is_some()
    }

    /// Calls the function for every node, in reading order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        for line in &self.lines {
            for node in line.iter() {
                node.walk(f);
            }
        }
    }

    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        for line in self.lines.iter_mut() {
            for node in line.iter_mut() {
                node.walk_mut(f);
            }
        }
    }

    /// Every node the caret can live in, in reading order
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        self.walk(&mut |node| {
            if node.kind.is_leaf() {
                leaves.push(node.id);
            }
        });
        leaves
    }

    pub fn first_leaf(&self) -> NodeId {
        self.lines
            .first()
            .and_then(|line| line.get(0))
            .map(|node| node.first_leaf().id)
            .unwrap_or_else(|| {
                log::warn!("Document without lines");
                NodeId(0)
            })
    }

    pub fn clear_selected(&mut self) {
        self.walk_mut(&mut |node| node.selected = false);
    }

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        let mut selected = Vec::new();
        self.walk(&mut |node| {
            if node.selected {
                selected.push(node.id);
            }
        });
        selected
    }

    /// Mutable lines that keep the layout cache, only for the layout pass itself
    pub(crate) fn lines_for_layout(&mut self) -> std::slice::IterMut<'_, Row> {
        self.lines.iter_mut()
    }

    pub fn invalidate_layout(&mut self) {
        self.line_boxes.clear();
    }

    pub fn is_layout_valid(&self) -> bool {
        !self.line_boxes.is_empty() && self.line_boxes.len() == self.lines.len()
    }

    /// Restores the invariants after bulk changes, like deserializing.
    pub fn normalize(&mut self) {
        self.invalidate_layout();
        if self.lines.is_empty() {
            self.lines.push(Row::empty());
        }
        for line in self.lines.iter_mut() {
            // `Row::new` refills empty rows
            *line = Row::new(std::mem::take(line).into_nodes());
            for node in line.iter_mut() {
                node.walk_mut(&mut normalize_node);
            }
        }
    }

    /// Checks the structural invariants.
    pub fn is_well_formed(&self) -> bool {
        let mut well_formed = !self.lines.is_empty();
        let mut seen = std::collections::HashSet::new();
        for line in &self.lines {
            well_formed &= line.len() >= 1;
        }
        self.walk(&mut |node| {
            well_formed &= seen.insert(node.id);
            well_formed &= node.kind.slots().iter().all(|row| row.len() >= 1);
            // Code blocks may sit in column lines, column groups only in document lines
            let is_group = matches!(node.kind, NodeKind::ColumnGroup { .. });
            well_formed &= !node
                .kind
                .slots()
                .iter()
                .flat_map(|row| row.iter())
                .any(|child| match child.kind {
                    NodeKind::ColumnGroup { .. } => true,
                    NodeKind::CodeBlock { .. } => !is_group,
                    _ => false,
                });
            match &node.kind {
                NodeKind::Matrix { cells } => {
                    well_formed &= cells.width() >= 1 && cells.height() >= 1;
                }
                NodeKind::Vector { cells, .. } => well_formed &= !cells.is_empty(),
                NodeKind::CodeBlock { lines, .. } => well_formed &= !lines.is_empty(),
                NodeKind::ColumnGroup { columns } => {
                    well_formed &= (crate::node::MIN_COLUMNS..=crate::node::MAX_COLUMNS)
                        .contains(&columns.len())
                        && columns.iter().all(|column| !column.is_empty());
                }
                _ => {}
            }
        });
        well_formed
    }
}

fn find_in_row(row: &Row, id: NodeId, path: &mut RowPath) -> Option<usize> {
    for (index, node) in row.iter().enumerate() {
        if node.id == id {
            return Some(index);
        }
        for (slot, child_row) in node.kind.slots().into_iter().enumerate() {
            path.indices.push(RowIndex(index, slot));
            if let Some(found) = find_in_row(child_row, id, path) {
                return Some(found);
            }
            path.indices.pop();
        }
    }
    None
}

fn normalize_node(node: &mut Node) {
    for row in node.kind.slots_mut() {
        *row = Row::new(std::mem::take(row).into_nodes());
    }
    match &mut node.kind {
        NodeKind::Vector { cells, .. } if cells.is_empty() => cells.push(Row::empty()),
        NodeKind::Matrix { cells }
            if cells.width() == 0
                || cells.values().is_empty()
                || cells.values().len() % cells.width() != 0 =>
        {
            *cells = Grid::from_one_dimensional(vec![Row::empty()], 1);
        }
        NodeKind::CodeBlock { lines, .. } if lines.is_empty() => lines.push(String::new()),
        NodeKind::Derivative { order, .. } if *order == 0 => *order = 1,
        NodeKind::ColumnGroup { columns } => {
            columns.truncate(crate::node::MAX_COLUMNS);
            while columns.len() < crate::node::MIN_COLUMNS {
                columns.push(Vec::new());
            }
            for column in columns.iter_mut().filter(|column| column.is_empty()) {
                column.push(Row::empty());
            }
        }
        _ => {}
    }
}
