use calc_tree::{
    direction::HorizontalDirection,
    document::Document,
    node::{Node, NodeKind},
    node_id::NodeId,
    row::{NodePath, Row},
    text,
};

use crate::{
    caret::Caret,
    primitive::primitive_edit::{column_line_of, row_edge_caret, split_text_run},
};

/// Enter. Splits the line at the caret when the caret is directly in a line, otherwise starts an empty line below.
pub fn new_line(document: &mut Document, caret: &Caret) -> Option<Caret> {
    let path = document.path_to(caret.node())?;
    match (*caret, &document.node(&path)?.kind) {
        (
            Caret::Code { node, line, offset },
            NodeKind::CodeBlock {
                collapsed: false, ..
            },
        ) => split_code_line(document, &path, node, line, offset),
        (Caret::Text { offset, .. }, NodeKind::TextRun { .. }) => {
            split_line(document, &path, offset).or_else(|| insert_line_after(document, &path))
        }
        _ => insert_line_after(document, &path),
    }
}

fn split_code_line(
    document: &mut Document,
    path: &NodePath,
    node: NodeId,
    line: usize,
    offset: usize,
) -> Option<Caret> {
    let NodeKind::CodeBlock { lines, .. } = &mut document.node_mut(path)?.kind else {
        return None;
    };
    let value = lines.get_mut(line)?;
    let rest = value.split_off(text::byte_index(value, offset));
    lines.insert(line + 1, rest);
    Some(Caret::Code {
        node,
        line: line + 1,
        offset: 0,
    })
}

/// Splits the row the text run lives in, when that row is a document line or a column line.
fn split_line(document: &mut Document, path: &NodePath, offset: usize) -> Option<Caret> {
    let column_line = column_line_of(document, &path.row);
    let is_column_line = column_line
        .as_ref()
        .is_some_and(|(group, slot)| group.slot(*slot) == path.row);
    if !(path.row.is_line() || is_column_line) {
        return None;
    }

    let right = split_text_run(document, path, offset)?;
    let tail = document.row_mut(&path.row)?.split_off(path.index + 1);
    let mut nodes = vec![Node::text_run(right)];
    nodes.extend(tail.into_nodes());
    let mut lower = Row::new(nodes);
    lower.merge_text_runs();
    let caret = row_edge_caret(&lower, HorizontalDirection::Left)?;

    match column_line {
        Some((group, slot)) if is_column_line => insert_column_line(document, &group, slot, lower)?,
        _ => document.insert_line(path.row.line + 1, lower),
    }
    log::debug!("Split a line");
    Some(caret)
}

/// Adds an empty line below the one that contains the node.
/// Inside of a column group that is a new line of the same column.
pub fn insert_line_after(document: &mut Document, path: &NodePath) -> Option<Caret> {
    let row = Row::empty();
    let caret = row_edge_caret(&row, HorizontalDirection::Left)?;
    match column_line_of(document, &path.row) {
        Some((group, slot)) => insert_column_line(document, &group, slot, row)?,
        None => document.insert_line(path.row.line + 1, row),
    }
    Some(caret)
}

/// Inserts a row after the column line `slot` of a column group
fn insert_column_line(
    document: &mut Document,
    group: &NodePath,
    slot: usize,
    row: Row,
) -> Option<()> {
    let node = document.node_mut(group)?;
    let (column, line) = node.kind.column_position(slot)?;
    let NodeKind::ColumnGroup { columns } = &mut node.kind else {
        return None;
    };
    columns.get_mut(column)?.insert(line + 1, row);
    Some(())
}
