use calc_tree::direction::Direction;
use serde::{Deserialize, Serialize};

use crate::primitive::MoveMode;

/// Discrete events from the UI. Each one is processed to completion before the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum EditorInput {
    InsertChar(char),
    DeleteBack,
    DeleteForward,
    MoveCursor { direction: Direction, mode: MoveMode },
    ExtendSelection { direction: Direction, mode: MoveMode },
    Click { x: f64, y: f64 },
    /// Plain text, typed character by character
    Paste(String),
    NewLine,
    Tab,
    SelectAll,
}
