use calc_tree::{
    direction::{Direction, HorizontalDirection, VerticalDirection},
    document::Document,
    grid::Index2D,
    node::{Node, NodeKind},
    node_id::NodeId,
    row::{NodePath, RowPath},
    text,
};
use serde::{Deserialize, Serialize};

use crate::caret::Caret;

use super::primitive_edit::{
    column_line_of, edge_caret, line_edge_caret, row_edge_caret, slot_edge_caret,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum MoveMode {
    Char,
    Word,
    /// Home and End
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationSettings {
    /// Left and right at the edge of a matrix row continue in the neighbouring row,
    /// instead of leaving the matrix.
    pub wrap_matrix_rows: bool,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationSettings {
    pub fn new() -> Self {
        NavigationSettings {
            wrap_matrix_rows: true,
        }
    }

    /// Returns the new caret, or None if the caret cannot move in that direction.
    ///
    /// Leaving a structure sideways can create an empty text run next to it, so that the caret has a place to go.
    pub fn move_caret(
        &self,
        document: &mut Document,
        caret: &Caret,
        direction: Direction,
        mode: MoveMode,
    ) -> Option<Caret> {
        match (direction.horizontal(), direction.vertical()) {
            (Some(side), _) if mode == MoveMode::Line => self.move_to_line_edge(document, caret, side),
            (Some(side), _) => self
                .move_inside(document, caret, side, mode)
                .or_else(|| self.move_beyond_edge(document, caret.node(), side)),
            (_, Some(direction)) => self.move_vertical(document, caret, direction),
            (None, None) => None,
        }
    }

    /// Moves inside of the current node, and fails at its edge
    fn move_inside(
        &self,
        document: &Document,
        caret: &Caret,
        side: HorizontalDirection,
        mode: MoveMode,
    ) -> Option<Caret> {
        match *caret {
            Caret::Text { node, offset } => {
                let value = document.find(node)?.text()?;
                step_in_text(value, offset, side, mode).map(|offset| Caret::text(node, offset))
            }
            Caret::Code { node, line, offset } => {
                let NodeKind::CodeBlock {
                    lines, collapsed, ..
                } = &document.find(node)?.kind
                else {
                    return None;
                };
                if *collapsed {
                    return None;
                }
                let value = lines.get(line)?;
                if let Some(offset) = step_in_text(value, offset, side, mode) {
                    return Some(Caret::Code { node, line, offset });
                }
                let line = match side {
                    HorizontalDirection::Left => line.checked_sub(1)?,
                    HorizontalDirection::Right => Some(line + 1).filter(|next| *next < lines.len())?,
                };
                let offset = match side {
                    HorizontalDirection::Left => text::len(&lines[line]),
                    HorizontalDirection::Right => 0,
                };
                Some(Caret::Code { node, line, offset })
            }
        }
    }

    /// Move to the left or right, out of the current node, because we're at its edge.
    pub fn move_beyond_edge(
        &self,
        document: &mut Document,
        node: NodeId,
        side: HorizontalDirection,
    ) -> Option<Caret> {
        let path = document.path_to(node)?;
        let row = document.row(&path.row)?;
        if let Some(index) = side.step(path.index, row.len()) {
            // Enter the neighbour from its near side
            return Some(edge_caret(row.get(index)?, side.reverse()));
        }
        match (path.row.owner(), path.row.slot_in_owner()) {
            (Some(owner), Some(slot)) => self.leave_slot(document, &owner, slot, side),
            _ => self.move_to_adjacent_line(document, path.row.line, side),
        }
    }

    /// At the edge of a slot. Cells and column lines lead to their neighbours, other slots leave the structure.
    fn leave_slot(
        &self,
        document: &mut Document,
        owner: &NodePath,
        slot: usize,
        side: HorizontalDirection,
    ) -> Option<Caret> {
        let kind = &document.node(owner)?.kind;
        let adjacent = match kind {
            NodeKind::Vector { .. } | NodeKind::ColumnGroup { .. } => {
                side.step(slot, kind.slot_count())
            }
            NodeKind::Matrix { cells } => {
                let xy = cells.index_to_xy(slot);
                let inside_row = match side {
                    HorizontalDirection::Left => xy.x > 0,
                    HorizontalDirection::Right => xy.x + 1 < cells.width(),
                };
                if inside_row || self.wrap_matrix_rows {
                    side.step(slot, kind.slot_count())
                } else {
                    None
                }
            }
            _ => None,
        };
        match adjacent {
            Some(adjacent) => slot_edge_caret(document, owner, adjacent, side.reverse()),
            None => self.exit_structure(document, owner, side),
        }
    }

    /// Leaves a structure sideways. The caret goes into the neighbouring text,
    /// and an empty text run is created when there is none.
    /// Code blocks and column groups never get text runs next to them, they move on like a line would.
    pub fn exit_structure(
        &self,
        document: &mut Document,
        owner: &NodePath,
        side: HorizontalDirection,
    ) -> Option<Caret> {
        let node = document.node(owner)?;
        if node.kind.is_block() {
            let id = node.id;
            return self.move_beyond_edge(document, id, side);
        }
        let row = document.row(&owner.row)?;
        if let Some(neighbour) = side
            .step(owner.index, row.len())
            .and_then(|index| row.get(index))
            .filter(|neighbour| neighbour.kind.is_text_bearing())
        {
            return Some(edge_caret(neighbour, side.reverse()));
        }
        let index = match side {
            HorizontalDirection::Left => owner.index,
            HorizontalDirection::Right => owner.index + 1,
        };
        let run = Node::empty_text();
        let id = run.id;
        document.row_mut(&owner.row)?.insert(index, run);
        Some(Caret::text(id, 0))
    }

    fn move_to_adjacent_line(
        &self,
        document: &Document,
        line: usize,
        side: HorizontalDirection,
    ) -> Option<Caret> {
        let line = side.step(line, document.line_count())?;
        line_edge_caret(document, line, side.reverse())
    }

    fn move_vertical(
        &self,
        document: &Document,
        caret: &Caret,
        direction: VerticalDirection,
    ) -> Option<Caret> {
        if let Caret::Code { node, line, offset } = *caret {
            if let Some(NodeKind::CodeBlock {
                lines,
                collapsed: false,
                ..
            }) = document.find(node).map(|node| &node.kind)
            {
                if let Some(line) = direction.step(line, lines.len()) {
                    let offset = offset.min(text::len(&lines[line]));
                    return Some(Caret::Code { node, line, offset });
                }
            }
        }

        let path = document.path_to(caret.node())?;
        for (owner, slot) in path.row.ancestors() {
            let Some(target) = document
                .node(&owner)
                .and_then(|node| vertical_neighbour(&node.kind, slot, direction))
            else {
                continue;
            };
            // Going up lands at the end, going down at the start
            let side = match direction {
                VerticalDirection::Up => HorizontalDirection::Right,
                VerticalDirection::Down => HorizontalDirection::Left,
            };
            return slot_edge_caret(document, &owner, target, side);
        }

        let line = direction.step(path.row.line, document.line_count())?;
        line_edge_caret(document, line, HorizontalDirection::Left)
    }

    /// Home and End. Goes to the edge of the document line, or of the column line inside of a column group.
    fn move_to_line_edge(
        &self,
        document: &Document,
        caret: &Caret,
        side: HorizontalDirection,
    ) -> Option<Caret> {
        if let Caret::Code { node, line, .. } = *caret {
            if let Some(NodeKind::CodeBlock {
                lines,
                collapsed: false,
                ..
            }) = document.find(node).map(|node| &node.kind)
            {
                let offset = match side {
                    HorizontalDirection::Left => 0,
                    HorizontalDirection::Right => lines.get(line).map_or(0, |value| text::len(value)),
                };
                return Some(Caret::Code { node, line, offset });
            }
        }
        let path = document.path_to(caret.node())?;
        let line = column_line_of(document, &path.row)
            .map(|(group, slot)| group.slot(slot))
            .unwrap_or_else(|| RowPath::line(path.row.line));
        let target = row_edge_caret(document.row(&line)?, side)?;
        (target != *caret).then_some(target)
    }

    /// Tab. Goes to the start of the next slot of the innermost structure, and leaves it after the last slot.
    pub fn move_to_next_slot(&self, document: &mut Document, caret: &Caret) -> Option<Caret> {
        let path = document.path_to(caret.node())?;
        let (owner, slot) = (path.row.owner()?, path.row.slot_in_owner()?);
        let count = document.node(&owner)?.kind.slot_count();
        if slot + 1 < count {
            slot_edge_caret(document, &owner, slot + 1, HorizontalDirection::Left)
        } else {
            self.exit_structure(document, &owner, HorizontalDirection::Right)
        }
    }
}

pub(crate) fn step_in_text(
    value: &str,
    offset: usize,
    side: HorizontalDirection,
    mode: MoveMode,
) -> Option<usize> {
    let len = text::len(value);
    let offset = offset.min(len);
    match side {
        HorizontalDirection::Left if offset > 0 => Some(match mode {
            MoveMode::Word => text::previous_word_boundary(value, offset),
            MoveMode::Line => 0,
            MoveMode::Char => offset - 1,
        }),
        HorizontalDirection::Right if offset < len => Some(match mode {
            MoveMode::Word => text::next_word_boundary(value, offset),
            MoveMode::Line => len,
            MoveMode::Char => offset + 1,
        }),
        _ => None,
    }
}

/// The slot above or below another slot, for vertically stacked structures.
/// Up always goes towards the base of a power or subscript, down towards the script.
fn vertical_neighbour(kind: &NodeKind, slot: usize, direction: VerticalDirection) -> Option<usize> {
    match (kind, slot, direction) {
        (
            NodeKind::Fraction { .. } | NodeKind::Power { .. } | NodeKind::Subscript { .. },
            0,
            VerticalDirection::Down,
        ) => Some(1),
        (
            NodeKind::Fraction { .. } | NodeKind::Power { .. } | NodeKind::Subscript { .. },
            1,
            VerticalDirection::Up,
        ) => Some(0),
        (NodeKind::Matrix { cells }, slot, direction) => {
            let xy = cells.index_to_xy(slot);
            let y = direction.step(xy.y, cells.height())?;
            Some(cells.xy_to_index(Index2D::new(xy.x, y)))
        }
        (
            NodeKind::Vector {
                cells,
                is_column: true,
            },
            slot,
            direction,
        ) => direction.step(slot, cells.len()),
        (NodeKind::ColumnGroup { columns }, slot, direction) => {
            let (column, line) = kind.column_position(slot)?;
            let line = direction.step(line, columns.get(column)?.len())?;
            kind.column_slot(column, line)
        }
        _ => None,
    }
}
