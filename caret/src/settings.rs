use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
#[serde(default)]
pub struct EditorSettings {
    pub font_size: f64,
    /// Extra space between document lines
    pub line_spacing: f64,
    /// What a typed space turns into. It is stored inside of a closed comment.
    pub nbsp_marker: String,
    /// Left and right at the edge of a matrix row continue in the neighbouring row
    pub wrap_matrix_rows: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            line_spacing: 4.0,
            nbsp_marker: "&nbsp;".to_string(),
            wrap_matrix_rows: true,
        }
    }
}
