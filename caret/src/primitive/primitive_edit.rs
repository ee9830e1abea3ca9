//! Small tree edits that the editing commands are built from.
//! Every function here leaves the document well formed, and returns where the caret ends up.

use calc_tree::{
    direction::HorizontalDirection,
    document::Document,
    node::{Node, NodeKind},
    node_id::NodeId,
    row::{NodePath, Row, RowPath, TextMerge},
    text,
};
use serde::{Deserialize, Serialize};

use crate::caret::Caret;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum CaretRemoveMode {
    /// Backspace
    Left,
    /// Delete
    Right,
}

impl From<CaretRemoveMode> for HorizontalDirection {
    fn from(mode: CaretRemoveMode) -> Self {
        match mode {
            CaretRemoveMode::Left => HorizontalDirection::Left,
            CaretRemoveMode::Right => HorizontalDirection::Right,
        }
    }
}

/// Caret at one edge of a node. Structures are entered through their first or last leaf.
pub fn edge_caret(node: &Node, side: HorizontalDirection) -> Caret {
    let leaf = node.edge_leaf(side);
    match (&leaf.kind, side) {
        (NodeKind::CodeBlock { .. }, HorizontalDirection::Left) => Caret::Code {
            node: leaf.id,
            line: 0,
            offset: 0,
        },
        (
            NodeKind::CodeBlock {
                lines, collapsed, ..
            },
            HorizontalDirection::Right,
        ) => {
            if *collapsed {
                Caret::Code {
                    node: leaf.id,
                    line: 0,
                    offset: 0,
                }
            } else {
                let line = lines.len().saturating_sub(1);
                Caret::Code {
                    node: leaf.id,
                    line,
                    offset: lines.get(line).map_or(0, |value| text::len(value)),
                }
            }
        }
        (_, HorizontalDirection::Left) => Caret::text(leaf.id, 0),
        (kind, HorizontalDirection::Right) => Caret::text(leaf.id, kind.text_len()),
    }
}

pub fn row_edge_caret(row: &Row, side: HorizontalDirection) -> Option<Caret> {
    row.edge_node(side).map(|node| edge_caret(node, side))
}

/// Caret at an edge of one slot of a structure
pub fn slot_edge_caret(
    document: &Document,
    owner: &NodePath,
    slot: usize,
    side: HorizontalDirection,
) -> Option<Caret> {
    row_edge_caret(document.row(&owner.slot(slot))?, side)
}

pub fn line_edge_caret(document: &Document, line: usize, side: HorizontalDirection) -> Option<Caret> {
    row_edge_caret(document.line(line)?, side)
}

/// Start of the document
pub fn start_caret(document: &Document) -> Caret {
    line_edge_caret(document, 0, HorizontalDirection::Left)
        .unwrap_or_else(|| Caret::text(document.first_leaf(), 0))
}

/// A caret that pointed into a merged text run now points into the run that absorbed it.
pub fn remap_caret(caret: Caret, merges: &[TextMerge]) -> Caret {
    match caret {
        Caret::Text { node, offset } => merges
            .iter()
            .find(|merge| merge.from == node)
            .map(|merge| Caret::text(merge.into, offset + merge.shift))
            .unwrap_or(caret),
        caret => caret,
    }
}

/// Merges neighbouring text runs of a row and keeps the caret where it was.
pub fn merge_row(document: &mut Document, row: &RowPath, caret: Caret) -> Caret {
    match document.row_mut(row) {
        Some(row) => {
            let merges = row.merge_text_runs();
            remap_caret(caret, &merges)
        }
        None => caret,
    }
}

/// Puts the caret between the nodes `index - 1` and `index` of a row.
/// Uses a neighbouring text run when there is one, otherwise an empty text run is inserted.
pub fn caret_at_boundary(document: &mut Document, row_path: &RowPath, index: usize) -> Option<Caret> {
    let row = document.row_mut(row_path)?;
    let index = index.min(row.len());
    let previous = index
        .checked_sub(1)
        .and_then(|previous| row.get(previous))
        .filter(|node| node.kind.is_text_run());
    let caret = if let Some(previous) = previous {
        Caret::text(previous.id, previous.kind.text_len())
    } else if let Some(next) = row.get(index).filter(|node| node.kind.is_text_run()) {
        Caret::text(next.id, 0)
    } else {
        let node = Node::empty_text();
        let id = node.id;
        row.insert(index, node);
        Caret::text(id, 0)
    };
    Some(merge_row(document, row_path, caret))
}

/// Moves the slot contents of a structure into its row, in place of the structure.
/// The caret ends up where the contents of `boundary_slot` begin.
pub fn flatten_structure(
    document: &mut Document,
    path: &NodePath,
    boundary_slot: usize,
) -> Option<Caret> {
    let row = document.row_mut(&path.row)?;
    let node = std::mem::replace(row.get_mut(path.index)?, Node::empty_text());
    let name = node.kind.name();
    let mut nodes = Vec::new();
    let mut boundary = None;
    for (slot, slot_row) in into_slots(node.kind).into_iter().enumerate() {
        if slot == boundary_slot {
            boundary = Some(path.index + nodes.len());
        }
        nodes.extend(slot_row.into_nodes());
    }
    let boundary = boundary.unwrap_or(path.index + nodes.len());
    row.splice(path.index..path.index + 1, nodes);
    log::debug!("Collapsed a {} into its row", name);
    caret_at_boundary(document, &path.row, boundary)
}

pub fn into_slots(kind: NodeKind) -> Vec<Row> {
    match kind {
        NodeKind::TextRun { .. }
        | NodeKind::Comment { .. }
        | NodeKind::Title { .. }
        | NodeKind::CodeBlock { .. } => vec![],
        NodeKind::Fraction {
            numerator,
            denominator,
        } => vec![numerator, denominator],
        NodeKind::Power { base, exponent } => vec![base, exponent],
        NodeKind::Subscript { base, sub } => vec![base, sub],
        NodeKind::Root { radicand, index } => std::iter::once(radicand).chain(index).collect(),
        NodeKind::Integral {
            integrand,
            variable,
            limits,
        } => {
            let mut slots = vec![integrand, variable];
            if let Some((lower, upper)) = limits {
                slots.push(lower);
                slots.push(upper);
            }
            slots
        }
        NodeKind::Derivative {
            function, variable, ..
        } => vec![function, variable],
        NodeKind::Vector { cells, .. } => cells,
        NodeKind::Matrix { cells } => cells.into_values(),
        NodeKind::ColumnGroup { columns } => columns.into_iter().flatten().collect(),
    }
}

/// Removes a node, and puts the caret where it was
pub fn remove_node(document: &mut Document, path: &NodePath) -> Option<Caret> {
    let row = document.row_mut(&path.row)?;
    let removed = row.splice(path.index..path.index + 1, Vec::new());
    if let Some(node) = removed.first() {
        log::debug!("Removed a {}", node.kind.name());
    }
    caret_at_boundary(document, &path.row, path.index)
}

/// Splits a text run at the offset. The run keeps the left part, the right part is returned.
pub fn split_text_run(document: &mut Document, path: &NodePath, offset: usize) -> Option<String> {
    let value = document.node_mut(path)?.text_mut()?;
    let offset = offset.min(text::len(value));
    let byte = text::byte_index(value, offset);
    Some(value.split_off(byte))
}

/// Replaces the part of a text run right of the offset with new nodes.
/// The right part is kept as a text run after them, when it is not empty.
/// A run that ends up empty is dropped when `keep_empty_left` is not set.
pub fn insert_after_split(
    document: &mut Document,
    path: &NodePath,
    offset: usize,
    nodes: Vec<Node>,
    keep_empty_left: bool,
) -> Option<()> {
    let right = split_text_run(document, path, offset)?;
    let left_is_empty = document.node(path)?.text()?.is_empty();
    let mut nodes = nodes;
    if !right.is_empty() {
        nodes.push(Node::text_run(right));
    }
    let row = document.row_mut(&path.row)?;
    if left_is_empty && !keep_empty_left {
        row.splice(path.index..path.index + 1, nodes);
    } else {
        row.splice(path.index + 1..path.index + 1, nodes);
    }
    Some(())
}

/// Inserts text into a text bearing node, and returns the caret after it
pub fn insert_text(document: &mut Document, node: NodeId, offset: usize, value: &str) -> Option<Caret> {
    let target = document.find_mut(node)?.text_mut()?;
    let offset = offset.min(text::len(target));
    text::insert(target, offset, value);
    Some(Caret::text(node, offset + text::len(value)))
}

/// The text run right after a structure, created when the next sibling is something else
pub fn run_after(document: &mut Document, path: &NodePath) -> Option<Caret> {
    let row = document.row_mut(&path.row)?;
    match row.get(path.index + 1) {
        Some(next) if next.kind.is_text_run() => Some(Caret::text(next.id, 0)),
        _ => {
            let node = Node::empty_text();
            let id = node.id;
            row.insert(path.index + 1, node);
            Some(Caret::text(id, 0))
        }
    }
}

/// Code blocks and column groups must occupy their line alone in the notation
pub fn has_block(row: &Row) -> bool {
    row.iter().any(|node| node.kind.is_block())
}

/// Merges the row after `upper` into `upper`, inside of a list of rows.
/// Returns the node index where the two rows meet.
pub fn merge_rows(rows: &mut Vec<Row>, upper: usize) -> Option<usize> {
    if upper + 1 >= rows.len() {
        return None;
    }
    let lower = rows.remove(upper + 1);
    let row = rows.get_mut(upper)?;
    let boundary = if row.is_blank() { 0 } else { row.len() };
    row.append(lower);
    Some(boundary)
}

/// Merges the document line after `upper` into it.
/// Lines with blocks are never merged, but a blank neighbour is removed.
pub fn merge_lines(document: &mut Document, upper: usize) -> Option<Caret> {
    let upper_row = document.line(upper)?;
    let lower_row = document.line(upper + 1)?;
    if has_block(upper_row) || has_block(lower_row) {
        if lower_row.is_blank() {
            document.remove_line(upper + 1);
            return line_edge_caret(document, upper, HorizontalDirection::Right);
        }
        if upper_row.is_blank() {
            document.remove_line(upper);
            return line_edge_caret(document, upper, HorizontalDirection::Left);
        }
        return None;
    }
    let lower = document.remove_line(upper + 1)?;
    let row = document.line_mut(upper)?;
    let boundary = if row.is_blank() { 0 } else { row.len() };
    row.append(lower);
    log::debug!("Merged line {} into line {}", upper + 1, upper);
    caret_at_boundary(document, &RowPath::line(upper), boundary)
}

/// The innermost column group around a row, with the slot of the column line that contains the row
pub fn column_line_of(document: &Document, row: &RowPath) -> Option<(NodePath, usize)> {
    row.ancestors().into_iter().find(|(owner, _)| {
        matches!(
            document.node(owner).map(|node| &node.kind),
            Some(NodeKind::ColumnGroup { .. })
        )
    })
}

/// The innermost vector or matrix around a row, with the slot of the cell that contains the row
pub fn cell_of(document: &Document, row: &RowPath) -> Option<(NodePath, usize)> {
    row.ancestors().into_iter().find(|(owner, _)| {
        document
            .node(owner)
            .is_some_and(|node| node.kind.is_cell_container())
    })
}
