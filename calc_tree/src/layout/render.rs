use unicode_segmentation::UnicodeSegmentation;

use crate::{
    document::Document,
    node::{Node, NodeKind},
    node_id::NodeId,
    row::Row,
};

use super::{
    measure::{
        bracket_width, code_block_display_lines, padding, rule_thickness, text_style,
        DerivativeGeometry, INTEGRAL_SIGN_SCALE, SLOT_SCALE, SMALL_SCALE,
    },
    BracketKind, LayoutBox, RenderSink, TextMeasurer, TextStyle,
};

/// Where a click landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentHit {
    pub line: usize,
    /// The deepest node under the point. A structure is reported when the point is on its decoration.
    pub node: Option<NodeId>,
    /// The point is to the right of everything on the line
    pub past_end: bool,
}

impl Row {
    pub fn render(&self, sink: &mut dyn RenderSink, measurer: &dyn TextMeasurer) {
        for node in self.iter() {
            node.render(sink, measurer);
        }
    }

    /// The node under the point. Points inside the row's band snap to the closest node horizontally.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        let bounds = self.bounds()?;
        if y < bounds.y || y > bounds.bottom() {
            return None;
        }
        let node = self
            .iter()
            .filter(|node| node.layout.is_some())
            .take_while(|node| node.layout.map_or(false, |layout| layout.x <= x))
            .last()
            .or_else(|| self.get(0))?;
        node.hit_test(x, y).or(Some(node.id))
    }
}

impl Node {
    /// Measures the node, puts its top left corner at the point and emits it
    pub fn render_at(
        &mut self,
        sink: &mut dyn RenderSink,
        measurer: &dyn TextMeasurer,
        x: f64,
        y: f64,
        font_size: f64,
    ) {
        self.measure(measurer, font_size);
        self.place(measurer, x, y);
        self.render(sink, measurer);
    }

    /// Emits the drawing primitives of an already placed node.
    /// Nodes without a layout are skipped, see [`Node::render_at`].
    pub fn render(&self, sink: &mut dyn RenderSink, measurer: &dyn TextMeasurer) {
        let Some(layout) = self.layout else {
            return;
        };
        let font_size = layout.font_size;
        let pad = padding(font_size);
        match &self.kind {
            NodeKind::TextRun { text, .. }
            | NodeKind::Comment { text, .. }
            | NodeKind::Title { text } => {
                if !text.is_empty() {
                    sink.draw_text(
                        text,
                        layout.x,
                        layout.y + layout.baseline,
                        font_size,
                        text_style(&self.kind),
                    );
                }
            }
            NodeKind::Fraction {
                numerator,
                denominator,
            } => {
                numerator.render(sink, measurer);
                denominator.render(sink, measurer);
                let line_y = layout.y + numerator.metrics().height + pad;
                sink.draw_line(
                    (layout.x + pad * 0.5, line_y),
                    (layout.right() - pad * 0.5, line_y),
                    rule_thickness(font_size),
                );
            }
            NodeKind::Power { base, exponent } => {
                base.render(sink, measurer);
                exponent.render(sink, measurer);
            }
            NodeKind::Subscript { base, sub } => {
                base.render(sink, measurer);
                sub.render(sink, measurer);
            }
            NodeKind::Root { radicand, index } => {
                let index_width = index.as_ref().map_or(0.0, |index| index.metrics().width);
                if let Some(index) = index {
                    index.render(sink, measurer);
                }
                let symbol_x = layout.x + index_width * 0.5;
                sink.draw_bracket(
                    BracketKind::Radical,
                    symbol_x,
                    layout.y + pad,
                    layout.right() - symbol_x,
                    layout.height - pad,
                );
                radicand.render(sink, measurer);
            }
            NodeKind::Integral {
                integrand,
                variable,
                limits,
            } => {
                let baseline = layout.y + layout.baseline;
                sink.draw_text(
                    "\u{222B}",
                    layout.x,
                    baseline,
                    font_size * INTEGRAL_SIGN_SCALE,
                    TextStyle::Symbol,
                );
                if let Some((lower, upper)) = limits {
                    lower.render(sink, measurer);
                    upper.render(sink, measurer);
                }
                integrand.render(sink, measurer);
                if let Some(integrand_box) = integrand.bounds() {
                    sink.draw_text(
                        "d",
                        integrand_box.right() + pad,
                        baseline,
                        font_size * SLOT_SCALE,
                        TextStyle::Expression,
                    );
                }
                variable.render(sink, measurer);
            }
            NodeKind::Derivative {
                function,
                variable,
                order,
            } => {
                let inner = font_size * SLOT_SCALE;
                let geometry = DerivativeGeometry::new(
                    measurer,
                    font_size,
                    *order,
                    variable.metrics(),
                    function.metrics(),
                );
                let top = layout.y + geometry.fraction_shift;
                let numerator_x =
                    layout.x + (geometry.fraction_width - geometry.numerator_width) / 2.0;
                let denominator_x =
                    layout.x + (geometry.fraction_width - geometry.denominator_width) / 2.0;
                let numerator_baseline = top + geometry.d.baseline;
                let denominator_baseline = top + geometry.denominator_top + geometry.d.baseline;

                sink.draw_text("d", numerator_x, numerator_baseline, inner, TextStyle::Expression);
                sink.draw_text(
                    "d",
                    denominator_x,
                    denominator_baseline,
                    inner,
                    TextStyle::Expression,
                );
                if let Some(order_text) = &geometry.order_text {
                    let raise = geometry.d.height * 0.4;
                    sink.draw_text(
                        order_text,
                        numerator_x + geometry.d.width,
                        numerator_baseline - raise,
                        inner * SMALL_SCALE,
                        TextStyle::Expression,
                    );
                    sink.draw_text(
                        order_text,
                        denominator_x + geometry.denominator_width - geometry.order.width,
                        denominator_baseline - raise,
                        inner * SMALL_SCALE,
                        TextStyle::Expression,
                    );
                }
                let line_y = top + geometry.line_y;
                sink.draw_line(
                    (layout.x + pad * 0.5, line_y),
                    (layout.x + geometry.fraction_width - pad * 0.5, line_y),
                    rule_thickness(font_size),
                );
                variable.render(sink, measurer);
                function.render(sink, measurer);
            }
            NodeKind::Vector { cells, .. } => {
                render_brackets(sink, layout);
                for cell in cells {
                    cell.render(sink, measurer);
                }
            }
            NodeKind::Matrix { cells } => {
                render_brackets(sink, layout);
                for cell in cells.values() {
                    cell.render(sink, measurer);
                }
            }
            NodeKind::CodeBlock { .. } => {
                let lines = code_block_display_lines(&self.kind);
                let line_height = code_line_height(layout, lines.len());
                for (index, line) in lines.iter().enumerate() {
                    sink.draw_text(
                        line,
                        layout.x,
                        layout.y + line_height * index as f64 + layout.baseline,
                        font_size,
                        TextStyle::Code,
                    );
                }
            }
            NodeKind::ColumnGroup { columns } => {
                for (index, column) in columns.iter().enumerate() {
                    for line in column {
                        line.render(sink, measurer);
                    }
                    if index == 0 {
                        continue;
                    }
                    // Separator halfway into the gap before the column
                    let column_left = column
                        .iter()
                        .filter_map(Row::bounds)
                        .map(|bounds| bounds.x)
                        .fold(f64::INFINITY, f64::min);
                    if column_left.is_finite() {
                        let x = column_left - font_size * 0.5;
                        sink.draw_line((x, layout.y), (x, layout.bottom()), 1.0);
                    }
                }
            }
        }
    }

    pub fn bounds(&self) -> Option<LayoutBox> {
        self.layout
    }

    /// The deepest node under the point, or `None` when the point is outside of this node.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        let layout = self.layout?;
        if !layout.contains(x, y) {
            return None;
        }
        self.kind
            .slots()
            .into_iter()
            .find_map(|row| {
                let bounds = row.bounds()?;
                if bounds.contains(x, y) {
                    row.hit_test(x, y)
                } else {
                    None
                }
            })
            .or(Some(self.id))
    }

    /// Nearest character boundary to a horizontal position, for text bearing nodes
    pub fn offset_at(&self, x: f64, measurer: &dyn TextMeasurer) -> usize {
        let (Some(text), Some(layout)) = (self.text(), self.layout) else {
            return 0;
        };
        nearest_boundary(text, x - layout.x, layout.font_size, text_style(&self.kind), measurer)
    }

    /// Horizontal position of a caret at the offset
    pub fn caret_x(&self, offset: usize, measurer: &dyn TextMeasurer) -> f64 {
        let Some(layout) = self.layout else {
            return 0.0;
        };
        let Some(text) = self.text() else {
            return layout.x;
        };
        let prefix = crate::text::slice(text, 0..offset);
        layout.x
            + measurer
                .measure_text(prefix, layout.font_size, text_style(&self.kind))
                .width
    }

    /// (line, offset) inside an expanded code block
    pub fn code_position_at(&self, x: f64, y: f64, measurer: &dyn TextMeasurer) -> (usize, usize) {
        let (
            NodeKind::CodeBlock {
                lines, collapsed, ..
            },
            Some(layout),
        ) = (&self.kind, self.layout)
        else {
            return (0, 0);
        };
        if *collapsed {
            return (0, 0);
        }
        let line_height = code_line_height(layout, lines.len() + 2);
        // The first display line is the header
        let display_line = ((y - layout.y) / line_height).floor().max(1.0) as usize;
        let line = (display_line - 1).min(lines.len().saturating_sub(1));
        let offset = lines.get(line).map_or(0, |text| {
            nearest_boundary(text, x - layout.x, layout.font_size, TextStyle::Code, measurer)
        });
        (line, offset)
    }

    /// Caret rectangle top left and height for a code position
    pub fn code_caret(&self, line: usize, offset: usize, measurer: &dyn TextMeasurer) -> (f64, f64, f64) {
        let (NodeKind::CodeBlock { lines, .. }, Some(layout)) = (&self.kind, self.layout) else {
            return (0.0, 0.0, 0.0);
        };
        let line_height = code_line_height(layout, lines.len() + 2);
        let prefix = lines
            .get(line)
            .map_or("", |text| crate::text::slice(text, 0..offset));
        let x = layout.x
            + measurer
                .measure_text(prefix, layout.font_size, TextStyle::Code)
                .width;
        (x, layout.y + line_height * (line + 1) as f64, line_height)
    }
}

fn code_line_height(layout: LayoutBox, display_lines: usize) -> f64 {
    layout.height / display_lines.max(1) as f64
}

fn nearest_boundary(
    text: &str,
    x: f64,
    font_size: f64,
    style: TextStyle,
    measurer: &dyn TextMeasurer,
) -> usize {
    let mut best = (0, x.abs());
    let mut end = 0;
    for (offset, grapheme) in text.graphemes(true).enumerate() {
        end += grapheme.len();
        let width = measurer.measure_text(&text[..end], font_size, style).width;
        let distance = (width - x).abs();
        if distance < best.1 {
            best = (offset + 1, distance);
        }
    }
    best.0
}

fn render_brackets(sink: &mut dyn RenderSink, layout: LayoutBox) {
    let width = bracket_width(layout.font_size);
    sink.draw_bracket(
        BracketKind::SquareLeft,
        layout.x,
        layout.y,
        width,
        layout.height,
    );
    sink.draw_bracket(
        BracketKind::SquareRight,
        layout.right() - width,
        layout.y,
        width,
        layout.height,
    );
}

impl Document {
    /// Measures and places every line. Lines are stacked from the top with `line_spacing` between them.
    pub fn layout(&mut self, measurer: &dyn TextMeasurer, font_size: f64, line_spacing: f64) {
        let mut boxes = Vec::with_capacity(self.line_count());
        let mut y = 0.0;
        for line in self.lines_for_layout() {
            let metrics = line.measure(measurer, font_size);
            line.place(measurer, 0.0, y);
            boxes.push(LayoutBox {
                x: 0.0,
                y,
                width: metrics.width,
                height: metrics.height,
                baseline: metrics.baseline,
                font_size,
            });
            y += metrics.height + line_spacing;
        }
        self.line_boxes = boxes;
    }

    pub fn line_box(&self, line: usize) -> Option<LayoutBox> {
        self.line_boxes.get(line).copied()
    }

    /// Lays the document out and emits every drawing primitive
    pub fn render(
        &mut self,
        sink: &mut dyn RenderSink,
        measurer: &dyn TextMeasurer,
        font_size: f64,
        line_spacing: f64,
    ) {
        self.layout(measurer, font_size, line_spacing);
        for line in self.lines() {
            line.render(sink, measurer);
        }
    }

    /// Finds the line and node under a point. Needs a valid layout.
    /// Points above or below the document snap to the first or last line.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<DocumentHit> {
        if !self.is_layout_valid() {
            log::debug!("Hit test without a valid layout");
            return None;
        }
        let line = self
            .line_boxes
            .iter()
            .position(|layout| y < layout.bottom())
            .unwrap_or(self.line_boxes.len() - 1);
        let layout = self.line_boxes[line];
        let row = self.line(line)?;
        let past_end = x > layout.right();
        // Clamp into the line band, so that clicks in the line spacing still find a node
        let y = y.clamp(layout.y, layout.bottom());
        Some(DocumentHit {
            line,
            node: if past_end { None } else { row.hit_test(x, y) },
            past_end,
        })
    }
}
