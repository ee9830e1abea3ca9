//! The renderer contract.
//!
//! The platform renderer supplies a [`TextMeasurer`] and a [`RenderSink`].
//! Nodes compose the measurements of their children into their own [`LayoutMetrics`],
//! place their children, and emit drawing primitives.
//! The numbers are only used for drawing and for hit testing clicks, never for editing decisions.

mod measure;
mod render;

use serde::{Deserialize, Serialize};

use crate::text;

pub use render::DocumentHit;

/// Size of a node. The baseline is measured from the top.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub struct LayoutMetrics {
    pub width: f64,
    pub height: f64,
    pub baseline: f64,
}

/// Measured and placed node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub struct LayoutBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub baseline: f64,
    pub font_size: f64,
}

impl LayoutMetrics {
    pub fn descent(&self) -> f64 {
        self.height - self.baseline
    }
}

impl LayoutBox {
    pub fn from_metrics(metrics: LayoutMetrics, font_size: f64) -> Self {
        LayoutBox {
            x: 0.0,
            y: 0.0,
            width: metrics.width,
            height: metrics.height,
            baseline: metrics.baseline,
            font_size,
        }
    }

    pub fn metrics(&self) -> LayoutMetrics {
        LayoutMetrics {
            width: self.width,
            height: self.height,
            baseline: self.baseline,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum TextStyle {
    Expression,
    /// A variable that holds a vector
    VectorName,
    Comment,
    Title,
    Code,
    /// Operators drawn by structures, like the integral sign
    Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum BracketKind {
    SquareLeft,
    SquareRight,
    Radical,
}

/// Measures text in the renderer's font.
pub trait TextMeasurer {
    fn measure_text(&self, text: &str, font_size: f64, style: TextStyle) -> LayoutMetrics;
}

/// Receives drawing primitives. Coordinates are absolute, `y` of text is its baseline.
pub trait RenderSink {
    fn draw_text(&mut self, text: &str, x: f64, y: f64, font_size: f64, style: TextStyle);
    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), thickness: f64);
    fn draw_bracket(&mut self, kind: BracketKind, x: f64, y: f64, width: f64, height: f64);
}

/// Every grapheme has the same advance. Deterministic, so it works for tests and headless use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonospaceMeasurer {
    /// Advance of one grapheme, relative to the font size
    pub advance: f64,
    pub ascent: f64,
    pub descent: f64,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        MonospaceMeasurer {
            advance: 0.6,
            ascent: 0.8,
            descent: 0.2,
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure_text(&self, value: &str, font_size: f64, _style: TextStyle) -> LayoutMetrics {
        LayoutMetrics {
            width: text::len(value) as f64 * self.advance * font_size,
            height: (self.ascent + self.descent) * font_size,
            baseline: self.ascent * font_size,
        }
    }
}

/// A recorded drawing primitive, for renderers that replay a display list (like a JS canvas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum DrawCommand {
    Text {
        text: String,
        x: f64,
        y: f64,
        font_size: f64,
        style: TextStyle,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        thickness: f64,
    },
    Bracket {
        kind: BracketKind,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl RenderSink for Vec<DrawCommand> {
    fn draw_text(&mut self, text: &str, x: f64, y: f64, font_size: f64, style: TextStyle) {
        self.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            font_size,
            style,
        });
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), thickness: f64) {
        self.push(DrawCommand::Line {
            from,
            to,
            thickness,
        });
    }

    fn draw_bracket(&mut self, kind: BracketKind, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCommand::Bracket {
            kind,
            x,
            y,
            width,
            height,
        });
    }
}
