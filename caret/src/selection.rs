use calc_tree::{
    direction::{Direction, HorizontalDirection, VerticalDirection},
    document::Document,
    node::{Node, NodeKind},
    node_id::NodeId,
    row::{NodePath, Row, RowPath},
    text,
};
use serialization::ToDsl;

use crate::{
    caret::{Caret, Selection},
    editing::commands::place_lines,
    primitive::{
        movement::step_in_text,
        primitive_edit::{caret_at_boundary, edge_caret, has_block, remove_node, split_text_run},
        MoveMode,
    },
};

/// Grows or shrinks the selection from the caret.
/// Text is selected by characters first. At the edge of a node the selection switches to whole nodes,
/// and from there it climbs to the enclosing structure. Up and down select whole lines.
pub fn extend_selection(
    document: &Document,
    caret: &Caret,
    selection: &Selection,
    direction: Direction,
    mode: MoveMode,
) -> Option<(Selection, Caret)> {
    if let Some(direction) = direction.vertical() {
        let line = document.path_to(caret.node())?.row.line;
        let (anchor, focus) = match *selection {
            Selection::Lines { anchor, focus } => (anchor, focus),
            _ => (line, line),
        };
        let focus = direction.step(focus, document.line_count()).unwrap_or(match direction {
            VerticalDirection::Up => 0,
            VerticalDirection::Down => document.line_count() - 1,
        });
        return Some((Selection::Lines { anchor, focus }, *caret));
    }
    let side = direction.horizontal()?;

    match *selection {
        Selection::None | Selection::Text { .. } => {
            let Caret::Text { node, offset } = *caret else {
                return Some((Selection::Siblings { anchor: caret.node(), focus: caret.node() }, *caret));
            };
            let anchor = match *selection {
                Selection::Text {
                    node: selected,
                    anchor,
                    ..
                } if selected == node => anchor,
                _ => offset,
            };
            let value = document.find(node)?.text()?;
            match step_in_text(value, offset, side, mode) {
                Some(focus) => Some((
                    Selection::Text {
                        node,
                        anchor,
                        focus,
                    },
                    Caret::text(node, focus),
                )),
                None => Some((grow_to_siblings(document, node, node, side)?, *caret)),
            }
        }
        Selection::Siblings { anchor, focus } => {
            Some((grow_to_siblings(document, anchor, focus, side)?, *caret))
        }
        Selection::Structure(node) => Some((grow_to_siblings(document, node, node, side)?, *caret)),
        Selection::Lines { .. } => None,
    }
}

/// Adds the next sibling in the direction, or selects the enclosing structure when there is none
fn grow_to_siblings(
    document: &Document,
    anchor: NodeId,
    focus: NodeId,
    side: HorizontalDirection,
) -> Option<Selection> {
    let path = document.path_to(focus)?;
    let row = document.row(&path.row)?;
    if let Some(next) = side.step(path.index, row.len()).and_then(|index| row.get(index)) {
        return Some(Selection::Siblings {
            anchor,
            focus: next.id,
        });
    }
    let owner = path.row.owner()?;
    let node = document.node(&owner)?;
    if node.kind.is_cell_container() {
        Some(Selection::Structure(node.id))
    } else {
        Some(Selection::Siblings {
            anchor: node.id,
            focus: node.id,
        })
    }
}

pub fn select_all(document: &Document) -> Selection {
    Selection::Lines {
        anchor: 0,
        focus: document.line_count() - 1,
    }
}

/// Row and index range of a sibling selection. Both ends must share a row.
fn sibling_range(document: &Document, anchor: NodeId, focus: NodeId) -> Option<(RowPath, usize, usize)> {
    let anchor = document.path_to(anchor)?;
    let focus = document.path_to(focus)?;
    if anchor.row != focus.row {
        log::warn!("Sibling selection across rows");
        return None;
    }
    let (start, end) = min_max(anchor.index, focus.index);
    Some((anchor.row, start, end))
}

fn min_max(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Sets the `selected` flag of exactly the selected nodes
pub fn sync_selected_flags(document: &mut Document, selection: &Selection) {
    document.clear_selected();
    let mut paths: Vec<NodePath> = Vec::new();
    match *selection {
        Selection::None => {}
        Selection::Text { node, anchor, focus } => {
            if anchor != focus {
                paths.extend(document.path_to(node));
            }
        }
        Selection::Structure(node) => paths.extend(document.path_to(node)),
        Selection::Siblings { anchor, focus } => {
            if let Some((row, start, end)) = sibling_range(document, anchor, focus) {
                paths.extend((start..=end).map(|index| row.node(index)));
            }
        }
        Selection::Lines { anchor, focus } => {
            let (start, end) = min_max(anchor, focus);
            for line in start..=end.min(document.line_count() - 1) {
                let row = RowPath::line(line);
                let len = document.row(&row).map_or(0, Row::len);
                paths.extend((0..len).map(|index| row.node(index)));
            }
        }
    }
    for path in paths {
        if let Some(node) = document.node_mut(&path) {
            node.selected = true;
        }
    }
}

/// Removes the selected content, and returns where the caret goes
pub fn delete_selection(document: &mut Document, selection: &Selection) -> Option<Caret> {
    match *selection {
        Selection::None => None,
        Selection::Text { node, anchor, focus } => {
            let (start, end) = min_max(anchor, focus);
            let value = document.find_mut(node)?.text_mut()?;
            text::remove(value, start..end);
            Some(Caret::text(node, start))
        }
        Selection::Siblings { anchor, focus } => {
            let (row, start, end) = sibling_range(document, anchor, focus)?;
            document.row_mut(&row)?.splice(start..end + 1, Vec::new());
            log::debug!("Deleted {} nodes", end + 1 - start);
            caret_at_boundary(document, &row, start)
        }
        Selection::Structure(node) => {
            let path = document.path_to(node)?;
            remove_node(document, &path)
        }
        Selection::Lines { anchor, focus } => {
            let (start, end) = min_max(anchor, focus);
            let end = end.min(document.line_count() - 1);
            for line in (start + 1..=end).rev() {
                document.remove_line(line);
            }
            let row = document.line_mut(start)?;
            *row = Row::empty();
            log::debug!("Deleted lines {} to {}", start, end);
            let first = row.get(0)?.id;
            Some(Caret::text(first, 0))
        }
    }
}

/// The selected content as rows, ready for the clipboard
pub fn copied_rows(document: &Document, selection: &Selection) -> Vec<Row> {
    match *selection {
        Selection::None => Vec::new(),
        Selection::Text { node, anchor, focus } => {
            let (start, end) = min_max(anchor, focus);
            document
                .find(node)
                .and_then(Node::text)
                .map(|value| vec![Row::from_text(text::slice(value, start..end))])
                .unwrap_or_default()
        }
        Selection::Siblings { anchor, focus } => sibling_range(document, anchor, focus)
            .and_then(|(row, start, end)| {
                let nodes = document.row(&row)?.nodes().get(start..=end)?.to_vec();
                Some(vec![Row::new(nodes)])
            })
            .unwrap_or_default(),
        Selection::Structure(node) => document
            .find(node)
            .map(|node| vec![Row::new(vec![node.clone()])])
            .unwrap_or_default(),
        Selection::Lines { anchor, focus } => {
            let (start, end) = min_max(anchor, focus);
            document
                .lines()
                .get(start..=end.min(document.line_count() - 1))
                .map(<[Row]>::to_vec)
                .unwrap_or_default()
        }
    }
}

/// Inserts clipboard rows at the caret.
/// A single row goes into the current row. More rows split the line like typing Enter would.
pub fn paste_rows(document: &mut Document, caret: &Caret, rows: Vec<Row>) -> Option<Caret> {
    if rows.is_empty() {
        return None;
    }
    match *caret {
        Caret::Code { node, line, offset } => {
            let pasted: Vec<String> = rows.iter().map(ToDsl::to_dsl).collect();
            paste_code(document, node, line, offset, pasted)
        }
        Caret::Text { node, offset } => {
            let path = document.path_to(node)?;
            if rows.iter().any(has_block) {
                return paste_blocks(document, &path, rows);
            }
            if !document.node(&path)?.kind.is_text_run() {
                let pasted: Vec<String> = rows.iter().map(ToDsl::to_dsl).collect();
                let value = document.find_mut(node)?.text_mut()?;
                let offset = offset.min(text::len(value));
                let pasted = pasted.join(" ");
                text::insert(value, offset, &pasted);
                return Some(Caret::text(node, offset + text::len(&pasted)));
            }
            paste_into_run(document, &path, offset, rows)
        }
    }
}

fn paste_code(
    document: &mut Document,
    node: NodeId,
    line: usize,
    offset: usize,
    pasted: Vec<String>,
) -> Option<Caret> {
    let NodeKind::CodeBlock {
        lines, collapsed, ..
    } = &mut document.find_mut(node)?.kind
    else {
        return None;
    };
    *collapsed = false;
    let mut pasted = pasted.iter().flat_map(|value| value.split('\n'));
    let current = lines.get_mut(line)?;
    let right = current.split_off(text::byte_index(current, offset));
    current.push_str(pasted.next().unwrap_or_default());
    let mut new_lines: Vec<String> = pasted.map(str::to_string).collect();
    let caret_offset = match new_lines.last_mut() {
        Some(last) => {
            let caret_offset = text::len(last);
            last.push_str(&right);
            caret_offset
        }
        None => {
            let caret_offset = text::len(current);
            current.push_str(&right);
            caret_offset
        }
    };
    let caret_line = line + new_lines.len();
    lines.splice(line + 1..line + 1, new_lines);
    Some(Caret::Code {
        node,
        line: caret_line,
        offset: caret_offset,
    })
}

/// Code blocks and column groups keep lines to themselves, so they never land inside of a row
fn paste_blocks(document: &mut Document, path: &NodePath, rows: Vec<Row>) -> Option<Caret> {
    let rows: Vec<Row> = rows
        .into_iter()
        .map(|row| Row::new(row.into_nodes().into_iter().map(Node::renumbered).collect()))
        .collect();
    let caret = edge_caret(rows.last()?.nodes().last()?, HorizontalDirection::Right);
    let count = rows.len();
    place_lines(document, path, rows)?;
    log::debug!("Pasted {} lines with blocks", count);
    Some(caret)
}

fn paste_into_run(
    document: &mut Document,
    path: &NodePath,
    offset: usize,
    rows: Vec<Row>,
) -> Option<Caret> {
    let right = split_text_run(document, path, offset)?;
    let mut rows = rows.into_iter().map(|row| row.into_nodes());
    let first: Vec<Node> = rows.next()?.into_iter().map(Node::renumbered).collect();
    let rest: Vec<Row> = rows
        .map(|nodes| Row::new(nodes.into_iter().map(Node::renumbered).collect()))
        .collect();

    if rest.is_empty() || !path.row.is_line() {
        let boundary = path.index + 1 + first.len();
        let row = document.row_mut(&path.row)?;
        let mut nodes = first;
        nodes.push(Node::text_run(right));
        row.splice(path.index + 1..path.index + 1, nodes);
        let caret = caret_at_boundary(document, &path.row, boundary);
        // Extra lines of a paste inside of a structure go below the current line
        for (index, row) in rest.into_iter().enumerate() {
            document.insert_line(path.row.line + 1 + index, row);
        }
        return caret;
    }

    let line = path.row.line;
    let tail = document.line_mut(line)?.split_off(path.index + 1);
    let current = document.line_mut(line)?;
    current.append(Row::new(first));
    current.merge_text_runs();

    let mut rest = rest;
    let mut last = rest.pop()?;
    let boundary = if last.is_blank() { 0 } else { last.len() };
    last.append(Row::new(vec![Node::text_run(right)]));
    last.append(tail);
    let middle = rest.len();
    for (index, row) in rest.into_iter().enumerate() {
        document.insert_line(line + 1 + index, row);
    }
    let last_line = line + 1 + middle;
    document.insert_line(last_line, last);
    log::debug!("Pasted {} lines", middle + 2);
    caret_at_boundary(document, &RowPath::line(last_line), boundary)
}
