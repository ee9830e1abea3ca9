use calc_tree::{
    direction::HorizontalDirection,
    document::Document,
    grid::Grid,
    node::{Node, NodeKind},
    node_id::NodeId,
    row::{NodePath, Row},
    text,
};
use serialization::calcpad::parse_row;

use crate::{
    caret::Caret,
    primitive::primitive_edit::{
        cell_of, insert_after_split, insert_text, merge_row, row_edge_caret, run_after,
        slot_edge_caret, split_text_run,
    },
    settings::EditorSettings,
};

/// Characters that leave a fraction, power or subscript before they are typed.
/// A space does the same, see [`insert_space`].
pub const OPERATORS: [char; 20] = [
    '+', '-', '*', '=', '<', '>', '(', ')', '[', ']', '{', '}', ',', ';', ':', '|', '&', '%', '!',
    '?',
];

pub fn is_operator(c: char) -> bool {
    OPERATORS.contains(&c)
}

/// Types one character at the caret, and returns where the caret ends up.
pub fn insert_char(
    document: &mut Document,
    caret: &Caret,
    c: char,
    settings: &EditorSettings,
) -> Option<Caret> {
    match *caret {
        Caret::Code { node, line, offset } => insert_code_char(document, node, line, offset, c),
        Caret::Text { node, offset } => {
            let path = document.path_to(node)?;
            match &document.node(&path)?.kind {
                NodeKind::Comment { .. } if c == '\'' => close_text_node(document, &path, offset),
                NodeKind::Title { .. } if c == '"' => close_text_node(document, &path, offset),
                NodeKind::Comment { .. } | NodeKind::Title { .. } => {
                    insert_text(document, node, offset, &c.to_string())
                }
                NodeKind::TextRun { .. } => insert_into_run(document, path, offset, c, settings),
                _ => None,
            }
        }
    }
}

fn insert_code_char(
    document: &mut Document,
    node: NodeId,
    line: usize,
    offset: usize,
    c: char,
) -> Option<Caret> {
    let NodeKind::CodeBlock {
        lines, collapsed, ..
    } = &mut document.find_mut(node)?.kind
    else {
        return None;
    };
    *collapsed = false;
    let value = lines.get_mut(line)?;
    let offset = offset.min(text::len(value));
    text::insert(value, offset, &c.to_string());
    Some(Caret::Code {
        node,
        line,
        offset: offset + 1,
    })
}

fn insert_into_run(
    document: &mut Document,
    path: NodePath,
    offset: usize,
    c: char,
    settings: &EditorSettings,
) -> Option<Caret> {
    match c {
        '\'' => open_text_node(document, &path, offset, |value| Node::comment(value, false)),
        '"' => open_text_node(document, &path, offset, Node::title),
        '/' | '^' | '_' => promote(document, &path, offset, c),
        ';' | '|' | ']' if cell_of(document, &path.row).is_some() => {
            let (container, slot) = cell_of(document, &path.row)?;
            cell_command(document, &container, slot, c)
        }
        '[' => {
            let (path, offset) = exit_script(document, path, offset)?;
            open_vector(document, &path, offset)
        }
        ' ' => insert_space(document, path, offset, &settings.nbsp_marker),
        c if is_operator(c) => {
            let (path, offset) = exit_script(document, path, offset)?;
            let id = document.node(&path)?.id;
            insert_text(document, id, offset, &c.to_string())
        }
        c => {
            let id = document.node(&path)?.id;
            insert_text(document, id, offset, &c.to_string())
        }
    }
}

/// Leaves the innermost structure when it is a fraction, power or subscript.
/// Returns the text run and offset where typing continues.
fn exit_script(
    document: &mut Document,
    path: NodePath,
    offset: usize,
) -> Option<(NodePath, usize)> {
    let Some(owner) = path
        .parent()
        .filter(|owner| document.node(owner).is_some_and(|node| node.kind.is_script()))
    else {
        return Some((path, offset));
    };
    let caret = run_after(document, &owner)?;
    log::debug!("Left a {} to type an operator", document.node(&owner)?.kind.name());
    Some((document.path_to(caret.node())?, caret.offset()))
}

/// `'` and `"`. The run keeps the left part, the right part goes into the new comment or title.
fn open_text_node(
    document: &mut Document,
    path: &NodePath,
    offset: usize,
    make: impl FnOnce(String) -> Node,
) -> Option<Caret> {
    let right = split_text_run(document, path, offset)?;
    let node = make(right);
    let id = node.id;
    document.row_mut(&path.row)?.insert(path.index + 1, node);
    Some(Caret::text(id, 0))
}

/// The closing `'` or `"`. Text right of the caret goes back to being an expression.
fn close_text_node(document: &mut Document, path: &NodePath, offset: usize) -> Option<Caret> {
    let right = split_text_run(document, path, offset)?;
    let node = document.node_mut(path)?;
    if let NodeKind::Comment { closed, .. } = &mut node.kind {
        *closed = true;
    }
    log::debug!("Closed a {}", node.kind.name());
    let run = Node::text_run(right);
    let id = run.id;
    document.row_mut(&path.row)?.insert(path.index + 1, run);
    Some(merge_row(document, &path.row, Caret::text(id, 0)))
}

/// Turns the token before the caret into a fraction, power or subscript.
fn promote(document: &mut Document, path: &NodePath, offset: usize, operator: char) -> Option<Caret> {
    let value = document.node(path)?.text()?.to_string();
    let offset = offset.min(text::len(&value));
    let (before, after) = text::split_at(&value, offset);
    let start = if operator == '_' {
        subscript_base_start(before)
    } else {
        text::token_start(&value, offset)
    };

    let (kept, leading) = if start < offset {
        (
            text::slice(&value, 0..start).to_string(),
            Row::from_text(text::slice(&value, start..offset)),
        )
    } else if let Some(open) = group_start(before) {
        // `(a+b)/` takes the whole group
        (
            before[..open].to_string(),
            parse_row(&before[open + 1..before.len() - 1]),
        )
    } else {
        (before.to_string(), Row::empty())
    };

    let target_slot = if leading.is_blank() { 0 } else { 1 };
    let structure = match operator {
        '/' => Node::fraction(leading, Row::empty()),
        '^' => Node::power(leading, Row::empty()),
        _ => Node::subscript(leading, Row::empty()),
    };
    let caret = row_edge_caret(structure.kind.slot(target_slot)?, HorizontalDirection::Left)?;
    log::debug!("Promoted text to a {}", structure.kind.name());

    let mut nodes = vec![structure];
    if !after.is_empty() {
        nodes.push(Node::text_run(after));
    }
    let kept_is_empty = kept.is_empty();
    *document.node_mut(path)?.text_mut()? = kept;
    let row = document.row_mut(&path.row)?;
    if kept_is_empty {
        row.splice(path.index..path.index + 1, nodes);
    } else {
        row.splice(path.index + 1..path.index + 1, nodes);
    }
    Some(caret)
}

/// Subscript bases are alphanumeric only, so `x.5_1` subscripts the `5`
fn subscript_base_start(before: &str) -> usize {
    let base_len = before
        .chars()
        .rev()
        .take_while(|c| c.is_alphanumeric())
        .count();
    text::len(before).saturating_sub(base_len)
}

/// Byte index of the `(` that matches a `)` at the very end
fn group_start(before: &str) -> Option<usize> {
    if !before.ends_with(')') {
        return None;
    }
    let mut depth = 0usize;
    for (index, c) in before.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn open_vector(document: &mut Document, path: &NodePath, offset: usize) -> Option<Caret> {
    let vector = Node::vector(vec![Row::empty()], false);
    let caret = row_edge_caret(vector.kind.slot(0)?, HorizontalDirection::Left)?;
    let left = document.node(path)?.text()?;
    if text::is_vector_assignment(text::split_at(left, offset).0) {
        if let NodeKind::TextRun {
            is_vector_marker, ..
        } = &mut document.node_mut(path)?.kind
        {
            *is_vector_marker = true;
        }
    }
    insert_after_split(document, path, offset, vec![vector], false)?;
    log::debug!("Opened a vector");
    Some(caret)
}

/// `;`, `|` and `]` inside of a vector or matrix
fn cell_command(
    document: &mut Document,
    container: &NodePath,
    slot: usize,
    command: char,
) -> Option<Caret> {
    if command == ']' {
        return run_after(document, container);
    }
    let node = document.node_mut(container)?;
    let (replacement, target) = match (&mut node.kind, command) {
        (
            NodeKind::Vector {
                cells,
                is_column: false,
            },
            ';',
        )
        | (
            NodeKind::Vector {
                cells,
                is_column: true,
            },
            '|',
        ) => {
            cells.insert(slot + 1, Row::empty());
            (None, slot + 1)
        }
        (
            NodeKind::Vector {
                cells,
                is_column: true,
            },
            _,
        ) => {
            // Every cell gets a new neighbour in a second column
            let values: Vec<Row> = std::mem::take(cells)
                .into_iter()
                .flat_map(|cell| [cell, Row::empty()])
                .collect();
            let cells = Grid::from_one_dimensional(values, 2);
            (Some(NodeKind::Matrix { cells }), slot * 2 + 1)
        }
        (NodeKind::Vector { cells, .. }, _) => {
            let width = cells.len();
            let mut values = std::mem::take(cells);
            values.extend((0..width).map(|_| Row::empty()));
            let cells = Grid::from_one_dimensional(values, width);
            (Some(NodeKind::Matrix { cells }), width)
        }
        (NodeKind::Matrix { cells }, ';') => {
            let xy = cells.index_to_xy(slot);
            let column = (0..cells.height()).map(|_| Row::empty()).collect();
            cells.insert_column(xy.x + 1, column);
            (None, xy.y * cells.width() + xy.x + 1)
        }
        (NodeKind::Matrix { cells }, _) => {
            let xy = cells.index_to_xy(slot);
            let row = (0..cells.width()).map(|_| Row::empty()).collect();
            cells.insert_row(xy.y + 1, row);
            (None, (xy.y + 1) * cells.width())
        }
        _ => return None,
    };
    if let Some(kind) = replacement {
        node.kind = kind;
    }
    log::debug!("Added a cell to a {}", node.kind.name());
    slot_edge_caret(document, container, target, HorizontalDirection::Left)
}

/// A space. Literal in directives, otherwise it becomes a closed comment that holds the marker.
fn insert_space(
    document: &mut Document,
    path: NodePath,
    offset: usize,
    marker: &str,
) -> Option<Caret> {
    let is_directive = document
        .line(path.row.line)
        .and_then(|line| line.get(0))
        .and_then(|node| node.text())
        .is_some_and(|value| value.starts_with('#'));
    if is_directive {
        let id = document.node(&path)?.id;
        return insert_text(document, id, offset, " ");
    }
    let (path, offset) = exit_script(document, path, offset)?;
    insert_marker(document, &path, offset, marker)
}

/// Puts the marker into a closed comment before the caret
pub fn insert_marker(
    document: &mut Document,
    path: &NodePath,
    offset: usize,
    marker: &str,
) -> Option<Caret> {
    let run_id = document.node(path)?.id;
    if offset == 0 && path.index > 0 {
        let row = document.row_mut(&path.row)?;
        if let Some(NodeKind::Comment { text, .. }) =
            row.get_mut(path.index - 1).map(|node| &mut node.kind)
        {
            text.push_str(marker);
            return Some(Caret::text(run_id, 0));
        }
    }
    let right = split_text_run(document, path, offset)?;
    let left_is_empty = document.node(path)?.text()?.is_empty();
    let run = Node::text_run(right);
    let id = run.id;
    let nodes = vec![Node::comment(marker, true), run];
    let row = document.row_mut(&path.row)?;
    if left_is_empty {
        row.splice(path.index..path.index + 1, nodes);
    } else {
        row.splice(path.index + 1..path.index + 1, nodes);
    }
    Some(Caret::text(id, 0))
}
