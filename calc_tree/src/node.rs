use serde::{Deserialize, Serialize};

use crate::{
    direction::HorizontalDirection,
    grid::{Grid, Index2D},
    layout::LayoutBox,
    node_id::NodeId,
    row::Row,
    text,
};

/// Fewest and most columns a column group can have.
pub const MIN_COLUMNS: usize = 2;
pub const MAX_COLUMNS: usize = 4;

/// One element of the expression tree.
///
/// Cloning keeps the ids. Use [`Node::renumbered`] before inserting a copy next to its original.
/// Equality is structural, ids, layout caches and selection flags are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub struct Node {
    #[serde(skip, default = "NodeId::fresh")]
    pub id: NodeId,
    pub kind: NodeKind,
    /// Whether the node is part of the current selection
    #[serde(skip)]
    pub selected: bool,
    /// Cached layout, only valid after the last measure and place
    #[serde(skip)]
    pub layout: Option<LayoutBox>,
}

/// Every slot of a structure is a [`Row`], so structures can nest inside each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum NodeKind {
    /// Plain expression text. The only variant the expression grammar reads character by character.
    TextRun {
        text: String,
        /// Rendered with a vector arrow, set when the variable is assigned a vector
        is_vector_marker: bool,
    },
    Fraction {
        numerator: Row,
        denominator: Row,
    },
    Power {
        base: Row,
        exponent: Row,
    },
    Subscript {
        base: Row,
        sub: Row,
    },
    Root {
        radicand: Row,
        index: Option<Row>,
    },
    Integral {
        integrand: Row,
        variable: Row,
        /// Lower and upper limit
        limits: Option<(Row, Row)>,
    },
    Derivative {
        function: Row,
        variable: Row,
        order: u8,
    },
    Vector {
        cells: Vec<Row>,
        is_column: bool,
    },
    Matrix {
        cells: Grid<Row>,
    },
    /// A `'comment`. An open comment runs to the end of the line.
    Comment {
        text: String,
        closed: bool,
    },
    /// A `"title`, runs to the end of the expression or the next `"`
    Title {
        text: String,
    },
    /// Embedded foreign code, `@{lang}` up to `@{end lang}`
    CodeBlock {
        language: String,
        /// Never empty
        lines: Vec<String>,
        collapsed: bool,
    },
    /// Side by side columns, each one a list of lines
    ColumnGroup {
        columns: Vec<Vec<Row>>,
    },
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            id: NodeId::fresh(),
            kind,
            selected: false,
            layout: None,
        }
    }

    pub fn text_run<T: Into<String>>(text: T) -> Self {
        Self::new(NodeKind::TextRun {
            text: text.into(),
            is_vector_marker: false,
        })
    }

    pub fn empty_text() -> Self {
        Self::text_run("")
    }

    pub fn fraction(numerator: Row, denominator: Row) -> Self {
        Self::new(NodeKind::Fraction {
            numerator,
            denominator,
        })
    }

    pub fn power(base: Row, exponent: Row) -> Self {
        Self::new(NodeKind::Power { base, exponent })
    }

    pub fn subscript(base: Row, sub: Row) -> Self {
        Self::new(NodeKind::Subscript { base, sub })
    }

    pub fn root(radicand: Row, index: Option<Row>) -> Self {
        Self::new(NodeKind::Root { radicand, index })
    }

    pub fn integral(integrand: Row, variable: Row, limits: Option<(Row, Row)>) -> Self {
        Self::new(NodeKind::Integral {
            integrand,
            variable,
            limits,
        })
    }

    pub fn derivative(function: Row, variable: Row, order: u8) -> Self {
        Self::new(NodeKind::Derivative {
            function,
            variable,
            order: order.max(1),
        })
    }

    pub fn vector(cells: Vec<Row>, is_column: bool) -> Self {
        let cells = if cells.is_empty() {
            vec![Row::empty()]
        } else {
            cells
        };
        Self::new(NodeKind::Vector { cells, is_column })
    }

    pub fn matrix(cells: Grid<Row>) -> Self {
        Self::new(NodeKind::Matrix { cells })
    }

    /// A matrix with empty cells
    pub fn empty_matrix(rows: usize, cols: usize) -> Self {
        let (rows, cols) = (rows.max(1), cols.max(1));
        let cells = (0..rows * cols).map(|_| Row::empty()).collect();
        Self::matrix(Grid::from_one_dimensional(cells, cols))
    }

    pub fn comment<T: Into<String>>(text: T, closed: bool) -> Self {
        Self::new(NodeKind::Comment {
            text: text.into(),
            closed,
        })
    }

    pub fn title<T: Into<String>>(text: T) -> Self {
        Self::new(NodeKind::Title { text: text.into() })
    }

    pub fn code_block<T: Into<String>>(language: T, lines: Vec<String>, collapsed: bool) -> Self {
        let lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        Self::new(NodeKind::CodeBlock {
            language: language.into(),
            lines,
            collapsed,
        })
    }

    /// Column groups always have between [`MIN_COLUMNS`] and [`MAX_COLUMNS`] columns, and every column has a line.
    pub fn column_group(mut columns: Vec<Vec<Row>>) -> Self {
        columns.truncate(MAX_COLUMNS);
        while columns.len() < MIN_COLUMNS {
            columns.push(Vec::new());
        }
        for column in columns.iter_mut() {
            if column.is_empty() {
                column.push(Row::empty());
            }
        }
        Self::new(NodeKind::ColumnGroup { columns })
    }

    /// Same tree, but every node gets a fresh id.
    pub fn renumbered(mut self) -> Self {
        self.renumber();
        self
    }

    pub fn renumber(&mut self) {
        self.id = NodeId::fresh();
        for row in self.kind.slots_mut() {
            for node in row.iter_mut() {
                node.renumber();
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.kind.text()
    }

    pub fn text_mut(&mut self) -> Option<&mut String> {
        self.kind.text_mut()
    }

    /// The leaf that the caret reaches first when entering the node from the given side.
    /// Entering from the left means reaching its first leaf.
    pub fn edge_leaf(&self, side: HorizontalDirection) -> &Node {
        let slots = self.kind.slots();
        let row = match side {
            HorizontalDirection::Left => slots.first(),
            HorizontalDirection::Right => slots.last(),
        };
        match row.and_then(|row| row.edge_node(side)) {
            Some(node) => node.edge_leaf(side),
            None => self,
        }
    }

    pub fn first_leaf(&self) -> &Node {
        self.edge_leaf(HorizontalDirection::Left)
    }

    pub fn last_leaf(&self) -> &Node {
        self.edge_leaf(HorizontalDirection::Right)
    }

    /// Calls the function for this node and every node below it, in reading order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for row in self.kind.slots() {
            for node in row.iter() {
                node.walk(f);
            }
        }
    }

    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for row in self.kind.slots_mut() {
            for node in row.iter_mut() {
                node.walk_mut(f);
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl NodeKind {
    pub fn text(&self) -> Option<&str> {
        match self {
            NodeKind::TextRun { text, .. }
            | NodeKind::Comment { text, .. }
            | NodeKind::Title { text } => Some(text),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            NodeKind::TextRun { text, .. }
            | NodeKind::Comment { text, .. }
            | NodeKind::Title { text } => Some(text),
            _ => None,
        }
    }

    /// Text runs, comments and titles
    pub fn is_text_bearing(&self) -> bool {
        self.text().is_some()
    }

    /// A node the caret can live in
    pub fn is_leaf(&self) -> bool {
        self.is_text_bearing() || matches!(self, NodeKind::CodeBlock { .. })
    }

    pub fn is_text_run(&self) -> bool {
        matches!(self, NodeKind::TextRun { .. })
    }

    /// Structures that get created from a single token while typing.
    /// Operators typed inside of them leave the structure.
    pub fn is_script(&self) -> bool {
        matches!(
            self,
            NodeKind::Fraction { .. } | NodeKind::Power { .. } | NodeKind::Subscript { .. }
        )
    }

    pub fn is_cell_container(&self) -> bool {
        matches!(self, NodeKind::Vector { .. } | NodeKind::Matrix { .. })
    }

    /// Nodes that occupy whole lines in the DSL
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::CodeBlock { .. } | NodeKind::ColumnGroup { .. }
        )
    }

    /// Length of the text in graphemes. Code blocks report their line count.
    pub fn text_len(&self) -> usize {
        match self {
            NodeKind::CodeBlock { lines, .. } => lines.len(),
            _ => self.text().map(text::len).unwrap_or(0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::TextRun { .. } => "text",
            NodeKind::Fraction { .. } => "frac",
            NodeKind::Power { .. } => "pow",
            NodeKind::Subscript { .. } => "sub",
            NodeKind::Root { .. } => "root",
            NodeKind::Integral { .. } => "integral",
            NodeKind::Derivative { .. } => "derivative",
            NodeKind::Vector { .. } => "vector",
            NodeKind::Matrix { .. } => "matrix",
            NodeKind::Comment { .. } => "comment",
            NodeKind::Title { .. } => "title",
            NodeKind::CodeBlock { .. } => "code",
            NodeKind::ColumnGroup { .. } => "columns",
        }
    }

    /// The slots in reading order.
    /// Roots list the radicand before the index, integrals list the integrand, variable, lower and upper limit.
    /// Matrices are read row by row, column groups column by column.
    pub fn slots(&self) -> Vec<&Row> {
        match self {
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
            NodeKind::Root { radicand, index } => {
                let mut slots = vec![radicand];
                slots.extend(index.iter());
                slots
            }
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
            NodeKind::Vector { cells, .. } => cells.iter().collect(),
            NodeKind::Matrix { cells } => cells.values().iter().collect(),
            NodeKind::ColumnGroup { columns } => columns.iter().flatten().collect(),
        }
    }

    pub fn slots_mut(&mut self) -> Vec<&mut Row> {
        match self {
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
            NodeKind::Root { radicand, index } => {
                let mut slots = vec![radicand];
                slots.extend(index.iter_mut());
                slots
            }
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
            NodeKind::Vector { cells, .. } => cells.iter_mut().collect(),
            NodeKind::Matrix { cells } => cells.values_mut().iter_mut().collect(),
            NodeKind::ColumnGroup { columns } => columns.iter_mut().flatten().collect(),
        }
    }

    pub fn slot_count(&self) -> usize {
        match self {
            NodeKind::TextRun { .. }
            | NodeKind::Comment { .. }
            | NodeKind::Title { .. }
            | NodeKind::CodeBlock { .. } => 0,
            NodeKind::Fraction { .. }
            | NodeKind::Power { .. }
            | NodeKind::Subscript { .. }
            | NodeKind::Derivative { .. } => 2,
            NodeKind::Root { index, .. } => 1 + usize::from(index.is_some()),
            NodeKind::Integral { limits, .. } => 2 + 2 * usize::from(limits.is_some()),
            NodeKind::Vector { cells, .. } => cells.len(),
            NodeKind::Matrix { cells } => cells.values().len(),
            NodeKind::ColumnGroup { columns } => columns.iter().map(Vec::len).sum(),
        }
    }

    pub fn slot(&self, index: usize) -> Option<&Row> {
        self.slots().into_iter().nth(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.slots_mut().into_iter().nth(index)
    }

    /// Cell position of a matrix slot
    pub fn matrix_index(&self, slot: usize) -> Option<Index2D> {
        match self {
            NodeKind::Matrix { cells } if slot < cells.values().len() => {
                Some(cells.index_to_xy(slot))
            }
            _ => None,
        }
    }

    /// (column, line) of a column group slot
    pub fn column_position(&self, slot: usize) -> Option<(usize, usize)> {
        let NodeKind::ColumnGroup { columns } = self else {
            return None;
        };
        let mut remaining = slot;
        for (column_index, column) in columns.iter().enumerate() {
            if remaining < column.len() {
                return Some((column_index, remaining));
            }
            remaining -= column.len();
        }
        None
    }

    /// Slot index of a (column, line) position in a column group
    pub fn column_slot(&self, column: usize, line: usize) -> Option<usize> {
        let NodeKind::ColumnGroup { columns } = self else {
            return None;
        };
        let column_lines = columns.get(column)?;
        if line >= column_lines.len() {
            return None;
        }
        Some(columns.iter().take(column).map(Vec::len).sum::<usize>() + line)
    }
}
