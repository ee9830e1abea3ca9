use calc_tree::node_id::NodeId;
use serde::{Deserialize, Serialize};

/// Where text goes when the user types.
/// There is exactly one caret, so at most one node ever holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum Caret {
    /// Inside a text run, comment or title, at a grapheme offset
    Text { node: NodeId, offset: usize },
    /// Inside a code block, which has its own lines
    Code {
        node: NodeId,
        line: usize,
        offset: usize,
    },
}

impl Caret {
    pub fn text(node: NodeId, offset: usize) -> Self {
        Caret::Text { node, offset }
    }

    pub fn node(&self) -> NodeId {
        match self {
            Caret::Text { node, .. } | Caret::Code { node, .. } => *node,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            Caret::Text { offset, .. } | Caret::Code { offset, .. } => *offset,
        }
    }
}

/// The selection kinds are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum Selection {
    #[default]
    None,
    /// A character range inside of one text bearing node
    Text {
        node: NodeId,
        anchor: usize,
        focus: usize,
    },
    /// Neighbouring nodes of one row, from anchor to focus inclusive
    Siblings { anchor: NodeId, focus: NodeId },
    /// A vector or matrix as a whole
    Structure(NodeId),
    /// Whole document lines, inclusive
    Lines { anchor: usize, focus: usize },
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn is_collapsed(&self) -> bool {
        match self {
            Selection::None => true,
            Selection::Text { anchor, focus, .. } => anchor == focus,
            _ => false,
        }
    }
}
