//! Toolbar and shortcut commands that insert whole structures at the caret.

use calc_tree::{
    direction::HorizontalDirection,
    document::Document,
    node::{Node, NodeKind, MAX_COLUMNS, MIN_COLUMNS},
    row::{NodePath, Row, RowPath},
    text,
};

use crate::{
    caret::Caret,
    primitive::primitive_edit::{column_line_of, edge_caret, insert_after_split, insert_text},
};

use super::insert::insert_marker;

fn empty_rows(count: usize) -> Vec<Row> {
    (0..count).map(|_| Row::empty()).collect()
}

pub fn insert_root(document: &mut Document, caret: &Caret, with_index: bool) -> Option<Caret> {
    let index = with_index.then(Row::empty);
    insert_structure(document, caret, Node::root(Row::empty(), index))
}

pub fn insert_integral(document: &mut Document, caret: &Caret, with_limits: bool) -> Option<Caret> {
    let limits = with_limits.then(|| (Row::empty(), Row::empty()));
    insert_structure(document, caret, Node::integral(Row::empty(), Row::empty(), limits))
}

pub fn insert_derivative(document: &mut Document, caret: &Caret, order: u8) -> Option<Caret> {
    insert_structure(
        document,
        caret,
        Node::derivative(Row::empty(), Row::empty(), order.max(1)),
    )
}

/// A single row or column is created as a vector
pub fn insert_matrix(
    document: &mut Document,
    caret: &Caret,
    rows: usize,
    columns: usize,
) -> Option<Caret> {
    let node = match (rows.max(1), columns.max(1)) {
        (1, columns) => Node::vector(empty_rows(columns), false),
        (rows, 1) => Node::vector(empty_rows(rows), true),
        (rows, columns) => Node::empty_matrix(rows, columns),
    };
    insert_structure(document, caret, node)
}

pub fn insert_vector(
    document: &mut Document,
    caret: &Caret,
    len: usize,
    is_column: bool,
) -> Option<Caret> {
    insert_structure(document, caret, Node::vector(empty_rows(len.max(1)), is_column))
}

/// Puts an inline structure at the caret, and the caret into its first slot
fn insert_structure(document: &mut Document, caret: &Caret, node: Node) -> Option<Caret> {
    let target = edge_caret(&node, HorizontalDirection::Left);
    let name = node.kind.name();
    let path = document.path_to(caret.node())?;
    match (caret, &document.node(&path)?.kind) {
        (Caret::Text { offset, .. }, NodeKind::TextRun { .. }) => {
            insert_after_split(document, &path, *offset, vec![node], false)?;
        }
        (Caret::Text { .. }, _) => {
            document.row_mut(&path.row)?.insert(path.index + 1, node);
        }
        // Code blocks keep their line to themselves
        (Caret::Code { .. }, _) => place_block(document, &path, node)?,
    }
    log::debug!("Inserted a {}", name);
    Some(target)
}

/// The line that holds a node: its column line inside of a column group, otherwise its document line
fn line_of(document: &Document, path: &NodePath) -> RowPath {
    column_line_of(document, &path.row)
        .map(|(group, slot)| group.slot(slot))
        .unwrap_or_else(|| RowPath::line(path.row.line))
}

/// Blocks go onto a blank line, or onto a new line below the current one
fn place_block(document: &mut Document, path: &NodePath, node: Node) -> Option<()> {
    place_lines(document, path, vec![Row::new(vec![node])])
}

/// Puts whole rows below the line that holds `path`. A blank line is replaced by the first row.
/// Column groups never nest, so rows holding one always go into document lines.
pub fn place_lines(document: &mut Document, path: &NodePath, rows: Vec<Row>) -> Option<()> {
    let has_group = rows
        .iter()
        .flat_map(Row::iter)
        .any(|node| matches!(node.kind, NodeKind::ColumnGroup { .. }));
    let line = if has_group {
        RowPath::line(path.row.line)
    } else {
        line_of(document, path)
    };
    let mut rows = rows.into_iter();
    let mut at = line.line + 1;
    if document.row(&line)?.is_blank() {
        let first = rows.next()?;
        document.row_mut(&line)?.splice(0..1, first.into_nodes());
    }
    match (line.owner(), line.slot_in_owner()) {
        (Some(group), Some(slot)) => {
            let group_node = document.node_mut(&group)?;
            let (column, index) = group_node.kind.column_position(slot)?;
            let NodeKind::ColumnGroup { columns } = &mut group_node.kind else {
                return None;
            };
            let column = columns.get_mut(column)?;
            for (offset, row) in rows.enumerate() {
                column.insert(index + 1 + offset, row);
            }
        }
        _ => {
            for row in rows {
                document.insert_line(at, row);
                at += 1;
            }
        }
    }
    Some(())
}

/// Embedded code in another language. The block starts expanded, with the caret in it.
pub fn insert_code_block(document: &mut Document, caret: &Caret, language: &str) -> Option<Caret> {
    let block = Node::code_block(language, vec![String::new()], false);
    let id = block.id;
    let path = document.path_to(caret.node())?;
    place_block(document, &path, block)?;
    log::debug!("Inserted a {} code block", language);
    Some(Caret::Code {
        node: id,
        line: 0,
        offset: 0,
    })
}

/// Side by side columns always live directly in a document line
pub fn insert_column_group(document: &mut Document, caret: &Caret, count: usize) -> Option<Caret> {
    let count = count.clamp(MIN_COLUMNS, MAX_COLUMNS);
    let group = Node::column_group((0..count).map(|_| vec![Row::empty()]).collect());
    let target = edge_caret(&group, HorizontalDirection::Left);
    let path = document.path_to(caret.node())?;
    let line = RowPath::line(path.row.line);
    if document.row(&line)?.is_blank() {
        document.row_mut(&line)?.splice(0..1, vec![group]);
    } else {
        document.insert_line(line.line + 1, Row::new(vec![group]));
    }
    log::debug!("Inserted a group of {} columns", count);
    Some(target)
}

/// A space that never leaves the current structure
pub fn insert_nbsp(document: &mut Document, caret: &Caret, marker: &str) -> Option<Caret> {
    let Caret::Text { node, offset } = *caret else {
        return None;
    };
    let path = document.path_to(node)?;
    if document.node(&path)?.kind.is_text_run() {
        insert_marker(document, &path, offset, marker)
    } else {
        insert_text(document, node, offset, marker)
    }
}

/// Collapses or expands the code block with the caret. A collapsed block is a single caret position.
pub fn toggle_code_block(document: &mut Document, caret: &Caret) -> Option<Caret> {
    let Caret::Code { node, line, offset } = *caret else {
        return None;
    };
    let NodeKind::CodeBlock {
        lines, collapsed, ..
    } = &mut document.find_mut(node)?.kind
    else {
        return None;
    };
    *collapsed = !*collapsed;
    if *collapsed {
        return Some(Caret::Code {
            node,
            line: 0,
            offset: 0,
        });
    }
    let line = line.min(lines.len().saturating_sub(1));
    let offset = offset.min(lines.get(line).map_or(0, |value| text::len(value)));
    Some(Caret::Code { node, line, offset })
}
