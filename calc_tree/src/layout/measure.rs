//! Measuring and placing nodes.
//! Measuring caches the size on every node, placing then assigns absolute positions.

use crate::{
    node::{Node, NodeKind},
    row::Row,
};

use super::{LayoutBox, LayoutMetrics, TextMeasurer, TextStyle};

pub(crate) const SLOT_SCALE: f64 = 0.85;
pub(crate) const EXPONENT_SCALE: f64 = 0.75;
pub(crate) const SUBSCRIPT_SCALE: f64 = 0.8;
pub(crate) const SMALL_SCALE: f64 = 0.6;
pub(crate) const INTEGRAL_SIGN_SCALE: f64 = 1.4;

/// Padding around decorations, relative to the font size
pub(crate) fn padding(font_size: f64) -> f64 {
    font_size * 0.1
}

pub(crate) fn rule_thickness(font_size: f64) -> f64 {
    (font_size * 0.06).max(1.0)
}

/// Distance from the baseline to the fraction line
fn math_axis(font_size: f64) -> f64 {
    font_size * 0.25
}

pub(crate) fn bracket_width(font_size: f64) -> f64 {
    font_size * 0.3
}

fn cell_gap(font_size: f64) -> f64 {
    font_size * 0.5
}

fn line_gap(font_size: f64) -> f64 {
    font_size * 0.2
}

pub(crate) fn text_style(kind: &NodeKind) -> TextStyle {
    match kind {
        NodeKind::TextRun {
            is_vector_marker: true,
            ..
        } => TextStyle::VectorName,
        NodeKind::Comment { .. } => TextStyle::Comment,
        NodeKind::Title { .. } => TextStyle::Title,
        NodeKind::CodeBlock { .. } => TextStyle::Code,
        _ => TextStyle::Expression,
    }
}

/// The lines a code block shows, including its delimiters
pub(crate) fn code_block_display_lines(kind: &NodeKind) -> Vec<String> {
    let NodeKind::CodeBlock {
        language,
        lines,
        collapsed,
    } = kind
    else {
        return Vec::new();
    };
    if *collapsed {
        return vec![format!("@{{{}}} \u{2026}", language)];
    }
    let mut display = Vec::with_capacity(lines.len() + 2);
    display.push(format!("@{{{}}}", language));
    display.extend(lines.iter().cloned());
    display.push(format!("@{{end {}}}", language));
    display
}

/// Lays out a derivative, shared by measuring, placing and rendering.
pub(crate) struct DerivativeGeometry {
    pub d: LayoutMetrics,
    pub order: LayoutMetrics,
    pub order_text: Option<String>,
    pub fraction_width: f64,
    pub numerator_width: f64,
    pub denominator_width: f64,
    pub line_y: f64,
    pub denominator_top: f64,
    /// Vertical offset of the fraction inside the node
    pub fraction_shift: f64,
    pub baseline: f64,
    pub height: f64,
}

impl DerivativeGeometry {
    pub fn new(
        measurer: &dyn TextMeasurer,
        font_size: f64,
        order: u8,
        variable: LayoutMetrics,
        function: LayoutMetrics,
    ) -> Self {
        let inner = font_size * SLOT_SCALE;
        let d = measurer.measure_text("d", inner, TextStyle::Expression);
        let order_text = (order > 1).then(|| order.to_string());
        let order_metrics = order_text
            .as_deref()
            .map(|value| measurer.measure_text(value, inner * SMALL_SCALE, TextStyle::Expression))
            .unwrap_or_default();
        let pad = padding(font_size);
        let thickness = rule_thickness(font_size);

        let numerator_width = d.width + order_metrics.width;
        let denominator_width = d.width + variable.width + order_metrics.width;
        let fraction_width = numerator_width.max(denominator_width) + pad * 2.0;
        let line_y = d.height + pad;
        let denominator_top = line_y + thickness + pad;
        let fraction_height = denominator_top + d.height.max(variable.height);
        let fraction_baseline = line_y + math_axis(font_size);

        let baseline = fraction_baseline.max(function.baseline);
        let descent = (fraction_height - fraction_baseline).max(function.descent());
        DerivativeGeometry {
            d,
            order: order_metrics,
            order_text,
            fraction_width,
            numerator_width,
            denominator_width,
            line_y,
            denominator_top,
            fraction_shift: baseline - fraction_baseline,
            baseline,
            height: baseline + descent,
        }
    }

    pub fn width(&self, function: LayoutMetrics, font_size: f64) -> f64 {
        self.fraction_width + padding(font_size) + function.width
    }
}

impl Row {
    pub fn measure(&mut self, measurer: &dyn TextMeasurer, font_size: f64) -> LayoutMetrics {
        for node in self.iter_mut() {
            node.measure(measurer, font_size);
        }
        self.metrics()
    }

    /// Combined size of the already measured nodes, aligned on their baselines
    pub fn metrics(&self) -> LayoutMetrics {
        let mut width = 0.0;
        let mut ascent: f64 = 0.0;
        let mut descent: f64 = 0.0;
        for layout in self.iter().filter_map(|node| node.layout) {
            width += layout.width;
            ascent = ascent.max(layout.baseline);
            descent = descent.max(layout.height - layout.baseline);
        }
        LayoutMetrics {
            width,
            height: ascent + descent,
            baseline: ascent,
        }
    }

    /// Places the row with its top left corner at (x, y)
    pub fn place(&mut self, measurer: &dyn TextMeasurer, x: f64, y: f64) {
        let baseline = self.metrics().baseline;
        let mut cursor = x;
        for node in self.iter_mut() {
            let Some(layout) = node.layout else {
                continue;
            };
            node.place(measurer, cursor, y + baseline - layout.baseline);
            cursor += layout.width;
        }
    }

    /// Box around all nodes of the row
    pub fn bounds(&self) -> Option<LayoutBox> {
        let mut boxes = self.iter().filter_map(|node| node.layout);
        let first = boxes.next()?;
        let (mut left, mut top, mut right, mut bottom) =
            (first.x, first.y, first.right(), first.bottom());
        for layout in boxes {
            left = left.min(layout.x);
            top = top.min(layout.y);
            right = right.max(layout.right());
            bottom = bottom.max(layout.bottom());
        }
        let metrics = self.metrics();
        Some(LayoutBox {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
            baseline: metrics.baseline,
            font_size: first.font_size,
        })
    }
}

fn stack_metrics(rows: &[&Row], gap: f64) -> (f64, f64) {
    let width = rows
        .iter()
        .map(|row| row.metrics().width)
        .fold(0.0, f64::max);
    let height = rows.iter().map(|row| row.metrics().height).sum::<f64>()
        + gap * rows.len().saturating_sub(1) as f64;
    (width, height)
}

impl Node {
    /// Measures the node and everything inside of it, and caches the result.
    pub fn measure(&mut self, measurer: &dyn TextMeasurer, font_size: f64) -> LayoutMetrics {
        let metrics = self.measure_kind(measurer, font_size);
        self.layout = Some(LayoutBox::from_metrics(metrics, font_size));
        metrics
    }

    fn measure_kind(&mut self, measurer: &dyn TextMeasurer, font_size: f64) -> LayoutMetrics {
        let pad = padding(font_size);
        let style = text_style(&self.kind);
        let code_lines = code_block_display_lines(&self.kind);
        match &mut self.kind {
            NodeKind::TextRun { text, .. }
            | NodeKind::Comment { text, .. }
            | NodeKind::Title { text } => {
                let mut metrics = measurer.measure_text(text, font_size, style);
                if text.is_empty() {
                    // Keeps empty slots clickable
                    metrics.width = font_size * 0.5;
                }
                metrics
            }
            NodeKind::Fraction {
                numerator,
                denominator,
            } => {
                let inner = font_size * SLOT_SCALE;
                let top = numerator.measure(measurer, inner);
                let bottom = denominator.measure(measurer, inner);
                let line_y = top.height + pad;
                let thickness = rule_thickness(font_size);
                let baseline = line_y + math_axis(font_size);
                LayoutMetrics {
                    width: top.width.max(bottom.width) + pad * 2.0,
                    height: (line_y + thickness + pad + bottom.height).max(baseline),
                    baseline,
                }
            }
            NodeKind::Power { base, exponent } => {
                let base = base.measure(measurer, font_size);
                let exponent = exponent.measure(measurer, font_size * EXPONENT_SCALE);
                let lift = (exponent.height - base.height * 0.5).max(0.0);
                LayoutMetrics {
                    width: base.width + pad * 0.5 + exponent.width,
                    height: base.height + lift,
                    baseline: base.baseline + lift,
                }
            }
            NodeKind::Subscript { base, sub } => {
                let base = base.measure(measurer, font_size);
                let sub = sub.measure(measurer, font_size * SUBSCRIPT_SCALE);
                LayoutMetrics {
                    width: base.width + sub.width,
                    height: base.height.max(base.height * 0.6 + sub.height),
                    baseline: base.baseline,
                }
            }
            NodeKind::Root { radicand, index } => {
                let radicand = radicand.measure(measurer, font_size);
                let index = index
                    .as_mut()
                    .map(|index| index.measure(measurer, font_size * SMALL_SCALE))
                    .unwrap_or_default();
                let radicand_top = (pad * 2.0).max(index.height * 0.6);
                LayoutMetrics {
                    width: index.width * 0.5 + font_size * SMALL_SCALE + radicand.width + pad,
                    height: radicand_top + radicand.height + pad,
                    baseline: radicand_top + radicand.baseline,
                }
            }
            NodeKind::Integral {
                integrand,
                variable,
                limits,
            } => {
                let inner = font_size * SLOT_SCALE;
                let sign = measurer.measure_text(
                    "\u{222B}",
                    font_size * INTEGRAL_SIGN_SCALE,
                    TextStyle::Symbol,
                );
                let d = measurer.measure_text("d", inner, TextStyle::Expression);
                let integrand = integrand.measure(measurer, inner);
                let variable = variable.measure(measurer, inner);
                let (lower, upper) = match limits {
                    Some((lower, upper)) => (
                        lower.measure(measurer, font_size * SMALL_SCALE),
                        upper.measure(measurer, font_size * SMALL_SCALE),
                    ),
                    None => Default::default(),
                };
                let parts = [sign, d, integrand, variable];
                let ascent = parts.iter().map(|part| part.baseline).fold(0.0, f64::max);
                let descent = parts.iter().map(|part| part.descent()).fold(0.0, f64::max);
                let top = upper.height * 0.5;
                LayoutMetrics {
                    width: sign.width
                        + lower.width.max(upper.width)
                        + pad * 2.0
                        + integrand.width
                        + d.width
                        + variable.width,
                    height: top + ascent + descent + lower.height * 0.5,
                    baseline: top + ascent,
                }
            }
            NodeKind::Derivative {
                function,
                variable,
                order,
            } => {
                let inner = font_size * SLOT_SCALE;
                let variable = variable.measure(measurer, inner);
                let function = function.measure(measurer, inner);
                let geometry =
                    DerivativeGeometry::new(measurer, font_size, *order, variable, function);
                LayoutMetrics {
                    width: geometry.width(function, font_size),
                    height: geometry.height,
                    baseline: geometry.baseline,
                }
            }
            NodeKind::Vector { cells, is_column } => {
                let inner = font_size * SLOT_SCALE;
                let measured: Vec<_> = cells
                    .iter_mut()
                    .map(|cell| cell.measure(measurer, inner))
                    .collect();
                let brackets = bracket_width(font_size) * 2.0;
                if *is_column {
                    let rows: Vec<&Row> = cells.iter().collect();
                    let (width, height) = stack_metrics(&rows, line_gap(font_size));
                    let height = height + pad * 2.0;
                    LayoutMetrics {
                        width: width + brackets + pad * 2.0,
                        height,
                        baseline: centered_baseline(height, font_size),
                    }
                } else {
                    let ascent = measured.iter().map(|m| m.baseline).fold(0.0, f64::max);
                    let descent = measured.iter().map(|m| m.descent()).fold(0.0, f64::max);
                    let width = measured.iter().map(|m| m.width).sum::<f64>()
                        + cell_gap(font_size) * measured.len().saturating_sub(1) as f64;
                    LayoutMetrics {
                        width: width + brackets + pad * 2.0,
                        height: ascent + descent + pad * 2.0,
                        baseline: pad + ascent,
                    }
                }
            }
            NodeKind::Matrix { cells } => {
                let inner = font_size * SLOT_SCALE;
                for cell in cells.values_mut() {
                    cell.measure(measurer, inner);
                }
                let table = MatrixGeometry::new(cells, font_size);
                LayoutMetrics {
                    width: table.width + bracket_width(font_size) * 2.0 + pad * 2.0,
                    height: table.height + pad * 2.0,
                    baseline: centered_baseline(table.height + pad * 2.0, font_size),
                }
            }
            NodeKind::CodeBlock { .. } => {
                let lines = code_lines;
                let line_height = measurer
                    .measure_text("", font_size, TextStyle::Code)
                    .height;
                let width = lines
                    .iter()
                    .map(|line| measurer.measure_text(line, font_size, TextStyle::Code).width)
                    .fold(font_size * 0.5, f64::max);
                LayoutMetrics {
                    width,
                    height: line_height * lines.len() as f64,
                    baseline: measurer.measure_text("", font_size, TextStyle::Code).baseline,
                }
            }
            NodeKind::ColumnGroup { columns } => {
                let mut width = 0.0;
                let mut height: f64 = 0.0;
                let mut baseline: f64 = 0.0;
                for column in columns.iter_mut() {
                    for line in column.iter_mut() {
                        line.measure(measurer, font_size);
                    }
                    let rows: Vec<&Row> = column.iter().collect();
                    let (column_width, column_height) = stack_metrics(&rows, line_gap(font_size));
                    width += column_width;
                    height = height.max(column_height);
                    if let Some(first) = column.first() {
                        baseline = baseline.max(first.metrics().baseline);
                    }
                }
                width += font_size * (columns.len().saturating_sub(1)) as f64;
                LayoutMetrics {
                    width,
                    height: height.max(baseline),
                    baseline,
                }
            }
        }
    }

    /// Moves the measured node so that its top left corner is at (x, y), and places its children.
    pub fn place(&mut self, measurer: &dyn TextMeasurer, x: f64, y: f64) {
        let Some(layout) = self.layout.as_mut() else {
            log::warn!("Placing a node that was never measured");
            return;
        };
        layout.x = x;
        layout.y = y;
        let layout = *layout;
        let font_size = layout.font_size;
        let pad = padding(font_size);
        match &mut self.kind {
            NodeKind::TextRun { .. }
            | NodeKind::Comment { .. }
            | NodeKind::Title { .. }
            | NodeKind::CodeBlock { .. } => {}
            NodeKind::Fraction {
                numerator,
                denominator,
            } => {
                let top = numerator.metrics();
                let bottom = denominator.metrics();
                let denominator_y = y + top.height + pad + rule_thickness(font_size) + pad;
                numerator.place(measurer, x + (layout.width - top.width) / 2.0, y);
                denominator.place(
                    measurer,
                    x + (layout.width - bottom.width) / 2.0,
                    denominator_y,
                );
            }
            NodeKind::Power { base, exponent } => {
                let base_metrics = base.metrics();
                let exponent_metrics = exponent.metrics();
                let lift = layout.height - base_metrics.height;
                base.place(measurer, x, y + lift);
                exponent.place(
                    measurer,
                    x + base_metrics.width + pad * 0.5,
                    y + lift + base_metrics.height * 0.5 - exponent_metrics.height,
                );
            }
            NodeKind::Subscript { base, sub } => {
                let base_metrics = base.metrics();
                base.place(measurer, x, y);
                sub.place(
                    measurer,
                    x + base_metrics.width,
                    y + base_metrics.height * 0.6,
                );
            }
            NodeKind::Root { radicand, index } => {
                let radicand_metrics = radicand.metrics();
                let index_width = index.as_ref().map(|i| i.metrics().width).unwrap_or(0.0);
                let radicand_top = layout.baseline - radicand_metrics.baseline;
                if let Some(index) = index {
                    index.place(measurer, x, y);
                }
                radicand.place(
                    measurer,
                    x + index_width * 0.5 + font_size * SMALL_SCALE,
                    y + radicand_top,
                );
            }
            NodeKind::Integral {
                integrand,
                variable,
                limits,
            } => {
                let inner = font_size * SLOT_SCALE;
                let sign = measurer.measure_text(
                    "\u{222B}",
                    font_size * INTEGRAL_SIGN_SCALE,
                    TextStyle::Symbol,
                );
                let d = measurer.measure_text("d", inner, TextStyle::Expression);
                let baseline = y + layout.baseline;
                let mut cursor = x + sign.width;
                if let Some((lower, upper)) = limits {
                    let lower_metrics = lower.metrics();
                    let upper_metrics = upper.metrics();
                    upper.place(measurer, cursor, y);
                    lower.place(measurer, cursor, layout.bottom() - lower_metrics.height);
                    cursor += lower_metrics.width.max(upper_metrics.width);
                }
                cursor += pad;
                let integrand_metrics = integrand.metrics();
                integrand.place(measurer, cursor, baseline - integrand_metrics.baseline);
                cursor += integrand_metrics.width + pad + d.width;
                let variable_metrics = variable.metrics();
                variable.place(measurer, cursor, baseline - variable_metrics.baseline);
            }
            NodeKind::Derivative {
                function,
                variable,
                order,
            } => {
                let variable_metrics = variable.metrics();
                let function_metrics = function.metrics();
                let geometry = DerivativeGeometry::new(
                    measurer,
                    font_size,
                    *order,
                    variable_metrics,
                    function_metrics,
                );
                let denominator_x = x + (geometry.fraction_width - geometry.denominator_width) / 2.0;
                variable.place(
                    measurer,
                    denominator_x + geometry.d.width,
                    y + geometry.fraction_shift + geometry.denominator_top,
                );
                function.place(
                    measurer,
                    x + geometry.fraction_width + pad,
                    y + geometry.baseline - function_metrics.baseline,
                );
            }
            NodeKind::Vector { cells, is_column } => {
                let left = x + bracket_width(font_size) + pad;
                if *is_column {
                    let (width, _) = stack_metrics(&cells.iter().collect::<Vec<_>>(), 0.0);
                    let mut cursor = y + pad;
                    for cell in cells.iter_mut() {
                        let metrics = cell.metrics();
                        cell.place(measurer, left + (width - metrics.width) / 2.0, cursor);
                        cursor += metrics.height + line_gap(font_size);
                    }
                } else {
                    let baseline = y + layout.baseline;
                    let mut cursor = left;
                    for cell in cells.iter_mut() {
                        let metrics = cell.metrics();
                        cell.place(measurer, cursor, baseline - metrics.baseline);
                        cursor += metrics.width + cell_gap(font_size);
                    }
                }
            }
            NodeKind::Matrix { cells } => {
                let table = MatrixGeometry::new(cells, font_size);
                let left = x + bracket_width(font_size) + pad;
                let top = y + pad;
                let width = cells.width();
                for (index, cell) in cells.values_mut().iter_mut().enumerate() {
                    let (column, row) = (index % width, index / width);
                    let metrics = cell.metrics();
                    let cell_x = left
                        + table.column_x[column]
                        + (table.column_widths[column] - metrics.width) / 2.0;
                    let cell_y = top + table.row_y[row] + table.row_ascents[row] - metrics.baseline;
                    cell.place(measurer, cell_x, cell_y);
                }
            }
            NodeKind::ColumnGroup { columns } => {
                let mut cursor = x;
                for column in columns.iter_mut() {
                    let rows: Vec<&Row> = column.iter().collect();
                    let (column_width, _) = stack_metrics(&rows, 0.0);
                    let first_baseline = column
                        .first()
                        .map(|line| line.metrics().baseline)
                        .unwrap_or(0.0);
                    let mut line_y = y + layout.baseline - first_baseline;
                    for line in column.iter_mut() {
                        let metrics = line.metrics();
                        line.place(measurer, cursor, line_y);
                        line_y += metrics.height + line_gap(font_size);
                    }
                    cursor += column_width + font_size;
                }
            }
        }
    }
}

/// Baseline that vertically centers a tall structure on the math axis
fn centered_baseline(height: f64, font_size: f64) -> f64 {
    (height / 2.0 + math_axis(font_size)).min(height)
}

/// Column and row offsets of a measured matrix, relative to its content area
pub(crate) struct MatrixGeometry {
    pub column_widths: Vec<f64>,
    pub column_x: Vec<f64>,
    pub row_ascents: Vec<f64>,
    pub row_y: Vec<f64>,
    pub width: f64,
    pub height: f64,
}

impl MatrixGeometry {
    pub fn new(cells: &crate::grid::Grid<Row>, font_size: f64) -> Self {
        let (columns, rows) = (cells.width(), cells.height());
        let mut column_widths = vec![0.0_f64; columns];
        let mut row_ascents = vec![0.0_f64; rows];
        let mut row_descents = vec![0.0_f64; rows];
        for (index, cell) in cells.values().iter().enumerate() {
            let (column, row) = (index % columns, index / columns);
            let metrics = cell.metrics();
            column_widths[column] = column_widths[column].max(metrics.width);
            row_ascents[row] = row_ascents[row].max(metrics.baseline);
            row_descents[row] = row_descents[row].max(metrics.descent());
        }

        let mut column_x = Vec::with_capacity(columns);
        let mut cursor = 0.0;
        for width in &column_widths {
            column_x.push(cursor);
            cursor += width + cell_gap(font_size);
        }
        let width = (cursor - cell_gap(font_size)).max(0.0);

        let mut row_y = Vec::with_capacity(rows);
        let mut cursor = 0.0;
        for (ascent, descent) in row_ascents.iter().zip(&row_descents) {
            row_y.push(cursor);
            cursor += ascent + descent + line_gap(font_size);
        }
        let height = (cursor - line_gap(font_size)).max(0.0);

        MatrixGeometry {
            column_widths,
            column_x,
            row_ascents,
            row_y,
            width,
            height,
        }
    }
}
