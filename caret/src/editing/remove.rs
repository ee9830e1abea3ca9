use calc_tree::{
    direction::HorizontalDirection,
    document::Document,
    grid::{Grid, Index2D},
    node::NodeKind,
    node_id::NodeId,
    row::{NodePath, Row, RowPath},
    text,
};

use crate::{
    caret::Caret,
    primitive::{
        primitive_edit::{
            caret_at_boundary, flatten_structure, has_block, merge_lines, merge_row, merge_rows,
            remove_node, slot_edge_caret,
        },
        CaretRemoveMode, NavigationSettings,
    },
};

/// Backspace and Delete without a selection.
/// Inside of text this removes one grapheme. At the edge of a node it unwraps, collapses or merges things.
pub fn remove_at_caret(
    document: &mut Document,
    caret: &Caret,
    mode: CaretRemoveMode,
    navigation: &NavigationSettings,
) -> Option<Caret> {
    match *caret {
        Caret::Code { node, line, offset } => {
            remove_in_code(document, node, line, offset, mode, navigation)
        }
        Caret::Text { node, offset } => {
            let path = document.path_to(node)?;
            let value = document.node_mut(&path)?.text_mut()?;
            let len = text::len(value);
            let offset = offset.min(len);
            match mode {
                CaretRemoveMode::Left if offset > 0 => {
                    text::remove(value, offset - 1..offset);
                    Some(Caret::text(node, offset - 1))
                }
                CaretRemoveMode::Right if offset < len => {
                    text::remove(value, offset..offset + 1);
                    Some(Caret::text(node, offset))
                }
                CaretRemoveMode::Left => backspace_at_start(document, path, navigation),
                CaretRemoveMode::Right => delete_at_end(document, path, offset, navigation),
            }
        }
    }
}

fn backspace_at_start(
    document: &mut Document,
    path: NodePath,
    navigation: &NavigationSettings,
) -> Option<Caret> {
    let node = document.node(&path)?;
    let id = node.id;
    let previous = path
        .index
        .checked_sub(1)
        .and_then(|index| document.row(&path.row)?.get(index));
    match (&node.kind, previous.map(|previous| &previous.kind)) {
        (NodeKind::Comment { .. } | NodeKind::Title { .. }, _) => unwrap_text_node(document, &path),
        (NodeKind::TextRun { .. }, Some(NodeKind::Comment { .. } | NodeKind::Title { .. })) => {
            reopen(document, &path.sibling(path.index - 1), &path)
        }
        (_, Some(_)) => navigation.move_beyond_edge(document, id, HorizontalDirection::Left),
        (_, None) => remove_at_row_edge(
            document,
            &path.row,
            id,
            HorizontalDirection::Left,
            navigation,
        ),
    }
}

fn delete_at_end(
    document: &mut Document,
    path: NodePath,
    offset: usize,
    navigation: &NavigationSettings,
) -> Option<Caret> {
    let node = document.node(&path)?;
    let id = node.id;
    let next_path = path.sibling(path.index + 1);
    let next = document.node(&next_path);
    match (&node.kind, next.map(|next| &next.kind)) {
        (NodeKind::TextRun { .. }, Some(NodeKind::Comment { .. } | NodeKind::Title { .. })) => {
            unwrap_text_node(document, &next_path)?;
            Some(merge_row(document, &path.row, Caret::text(id, offset)))
        }
        (NodeKind::Comment { .. } | NodeKind::Title { .. }, Some(NodeKind::TextRun { .. })) => {
            reopen(document, &path, &next_path)
        }
        (NodeKind::Comment { closed: true, .. }, None) => {
            if let NodeKind::Comment { closed, .. } = &mut document.node_mut(&path)?.kind {
                *closed = false;
            }
            log::debug!("Reopened a comment");
            Some(Caret::text(id, offset))
        }
        (_, Some(_)) => navigation.move_beyond_edge(document, id, HorizontalDirection::Right),
        (_, None) => remove_at_row_edge(
            document,
            &path.row,
            id,
            HorizontalDirection::Right,
            navigation,
        ),
    }
}

/// A comment or title goes back to being expression text
fn unwrap_text_node(document: &mut Document, path: &NodePath) -> Option<Caret> {
    let node = document.node_mut(path)?;
    let id = node.id;
    let value = node.text_mut().map(std::mem::take)?;
    log::debug!("Unwrapped a {}", node.kind.name());
    node.kind = NodeKind::TextRun {
        text: value,
        is_vector_marker: false,
    };
    Some(merge_row(document, &path.row, Caret::text(id, 0)))
}

/// Moves the text run after a comment or title back into it, and opens the comment again
fn reopen(document: &mut Document, text_node: &NodePath, run: &NodePath) -> Option<Caret> {
    let run_text = document.node(run)?.text()?.to_string();
    let node = document.node_mut(text_node)?;
    let id = node.id;
    let value = node.text_mut()?;
    let len = text::len(value);
    value.push_str(&run_text);
    if let NodeKind::Comment { closed, .. } = &mut node.kind {
        *closed = false;
    }
    log::debug!("Reopened a {}", node.kind.name());
    document.row_mut(&run.row)?.remove(run.index);
    Some(Caret::text(id, len))
}

/// The caret is at the very start or end of a row
fn remove_at_row_edge(
    document: &mut Document,
    row: &RowPath,
    node: NodeId,
    side: HorizontalDirection,
    navigation: &NavigationSettings,
) -> Option<Caret> {
    let (Some(owner), Some(slot)) = (row.owner(), row.slot_in_owner()) else {
        let merged = match side {
            HorizontalDirection::Left => row
                .line
                .checked_sub(1)
                .and_then(|upper| merge_lines(document, upper)),
            HorizontalDirection::Right => merge_lines(document, row.line),
        };
        return merged.or_else(|| navigation.move_beyond_edge(document, node, side));
    };

    let kind = &document.node(&owner)?.kind;
    let slot_count = kind.slot_count();
    let all_blank = kind.slots().iter().all(|slot| slot.is_blank());
    let removed = match kind {
        NodeKind::Vector { .. } => remove_vector_cell(document, &owner, slot, side),
        NodeKind::Matrix { .. } => remove_matrix_cell(document, &owner, slot, side),
        NodeKind::ColumnGroup { .. } => remove_column_line(document, &owner, slot, side),
        _ if all_blank => remove_node(document, &owner),
        _ => match side {
            HorizontalDirection::Left if slot > 0 => flatten_structure(document, &owner, slot),
            HorizontalDirection::Right if slot + 1 < slot_count => {
                flatten_structure(document, &owner, slot + 1)
            }
            _ => None,
        },
    };
    removed.or_else(|| navigation.move_beyond_edge(document, node, side))
}

/// Where the caret goes after the cell at `index` was removed from a line of `len` cells
fn neighbour_after_removal(
    index: usize,
    len: usize,
    side: HorizontalDirection,
) -> (usize, HorizontalDirection) {
    match side {
        HorizontalDirection::Left if index > 0 => (index - 1, HorizontalDirection::Right),
        HorizontalDirection::Right if index >= len && index > 0 => {
            (index - 1, HorizontalDirection::Right)
        }
        _ => (index.min(len.saturating_sub(1)), HorizontalDirection::Left),
    }
}

fn remove_vector_cell(
    document: &mut Document,
    owner: &NodePath,
    slot: usize,
    side: HorizontalDirection,
) -> Option<Caret> {
    let NodeKind::Vector { cells, .. } = &mut document.node_mut(owner)?.kind else {
        return None;
    };
    if !cells.get(slot)?.is_blank() {
        return None;
    }
    if cells.len() == 1 {
        return remove_node(document, owner);
    }
    cells.remove(slot);
    let (target, edge) = neighbour_after_removal(slot, cells.len(), side);
    log::debug!("Removed vector cell {}", slot);
    slot_edge_caret(document, owner, target, edge)
}

enum MatrixRemoval {
    Whole,
    Column,
    Row,
}

fn remove_matrix_cell(
    document: &mut Document,
    owner: &NodePath,
    slot: usize,
    side: HorizontalDirection,
) -> Option<Caret> {
    let NodeKind::Matrix { cells } = &document.node(owner)?.kind else {
        return None;
    };
    let xy = cells.index_to_xy(slot);
    if !cells.get(xy)?.is_blank() {
        return None;
    }
    let removal = if cells.width() == 1 && cells.height() == 1 {
        MatrixRemoval::Whole
    } else if cells.width() > 1 && cells.column(xy.x).all(Row::is_blank) {
        MatrixRemoval::Column
    } else if cells.height() > 1 && cells.row(xy.y)?.iter().all(Row::is_blank) {
        MatrixRemoval::Row
    } else {
        return None;
    };

    let node = document.node_mut(owner)?;
    let NodeKind::Matrix { cells } = &mut node.kind else {
        return None;
    };
    let (target, edge) = match removal {
        MatrixRemoval::Whole => return remove_node(document, owner),
        MatrixRemoval::Column => {
            cells.remove_column(xy.x)?;
            let (x, edge) = neighbour_after_removal(xy.x, cells.width(), side);
            log::debug!("Removed matrix column {}", xy.x);
            (Index2D::new(x, xy.y), edge)
        }
        MatrixRemoval::Row => {
            cells.remove_row(xy.y)?;
            let (y, edge) = neighbour_after_removal(xy.y, cells.height(), side);
            log::debug!("Removed matrix row {}", xy.y);
            (Index2D::new(xy.x, y), edge)
        }
    };
    let target = cells.xy_to_index(target);
    if let Some(kind) = demote_matrix(cells) {
        node.kind = kind;
    }
    slot_edge_caret(document, owner, target, edge)
}

/// A matrix with a single row or column becomes a vector again. Slot indices stay the same.
fn demote_matrix(cells: &mut Grid<Row>) -> Option<NodeKind> {
    let is_column = match (cells.width(), cells.height()) {
        (_, 1) => false,
        (1, _) => true,
        _ => return None,
    };
    let cells = std::mem::replace(cells, Grid::from_one_dimensional(Vec::new(), 1)).into_values();
    log::debug!("Turned a matrix into a vector");
    Some(NodeKind::Vector { cells, is_column })
}

fn remove_column_line(
    document: &mut Document,
    owner: &NodePath,
    slot: usize,
    side: HorizontalDirection,
) -> Option<Caret> {
    let node = document.node_mut(owner)?;
    let (column, line) = node.kind.column_position(slot)?;
    let NodeKind::ColumnGroup { columns } = &mut node.kind else {
        return None;
    };
    if columns.iter().flatten().all(Row::is_blank) {
        return remove_node(document, owner);
    }
    let lines = columns.get_mut(column)?;
    let current = lines.get(line)?;
    if current.is_blank() && lines.len() > 1 {
        lines.remove(line);
        let (target, edge) = neighbour_after_removal(line, lines.len(), side);
        log::debug!("Removed line {} of column {}", line, column);
        let target = node.kind.column_slot(column, target)?;
        return slot_edge_caret(document, owner, target, edge);
    }

    let upper = match side {
        HorizontalDirection::Left => line.checked_sub(1)?,
        HorizontalDirection::Right => Some(line).filter(|line| line + 1 < lines.len())?,
    };
    if has_block(lines.get(upper)?) || has_block(lines.get(upper + 1)?) {
        return None;
    }
    let boundary = merge_rows(lines, upper)?;
    log::debug!("Merged line {} of column {} into the line above", upper + 1, column);
    let target = node.kind.column_slot(column, upper)?;
    caret_at_boundary(document, &owner.slot(target), boundary)
}

fn remove_in_code(
    document: &mut Document,
    node: NodeId,
    line: usize,
    offset: usize,
    mode: CaretRemoveMode,
    navigation: &NavigationSettings,
) -> Option<Caret> {
    let NodeKind::CodeBlock {
        lines, collapsed, ..
    } = &mut document.find_mut(node)?.kind
    else {
        return None;
    };
    let is_empty = lines.len() == 1 && lines[0].is_empty();
    if !*collapsed {
        let len = text::len(lines.get(line)?);
        let offset = offset.min(len);
        match mode {
            CaretRemoveMode::Left if offset > 0 => {
                text::remove(&mut lines[line], offset - 1..offset);
                return Some(Caret::Code {
                    node,
                    line,
                    offset: offset - 1,
                });
            }
            CaretRemoveMode::Right if offset < len => {
                text::remove(&mut lines[line], offset..offset + 1);
                return Some(Caret::Code { node, line, offset });
            }
            CaretRemoveMode::Left if line > 0 => {
                let rest = lines.remove(line);
                let upper = &mut lines[line - 1];
                let offset = text::len(upper);
                upper.push_str(&rest);
                return Some(Caret::Code {
                    node,
                    line: line - 1,
                    offset,
                });
            }
            CaretRemoveMode::Right if line + 1 < lines.len() => {
                let rest = lines.remove(line + 1);
                lines[line].push_str(&rest);
                return Some(Caret::Code { node, line, offset });
            }
            _ => {}
        }
    }
    if is_empty {
        let path = document.path_to(node)?;
        return remove_node(document, &path);
    }
    navigation.move_beyond_edge(document, node, mode.into())
}
