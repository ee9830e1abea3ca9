use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum HorizontalDirection {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum VerticalDirection {
    Up,
    Down,
}

impl Direction {
    pub fn horizontal(self) -> Option<HorizontalDirection> {
        match self {
            Direction::Left => Some(HorizontalDirection::Left),
            Direction::Right => Some(HorizontalDirection::Right),
            Direction::Up | Direction::Down => None,
        }
    }

    pub fn vertical(self) -> Option<VerticalDirection> {
        match self {
            Direction::Up => Some(VerticalDirection::Up),
            Direction::Down => Some(VerticalDirection::Down),
            Direction::Left | Direction::Right => None,
        }
    }
}

impl HorizontalDirection {
    pub fn reverse(self) -> Self {
        match self {
            HorizontalDirection::Left => HorizontalDirection::Right,
            HorizontalDirection::Right => HorizontalDirection::Left,
        }
    }

    /// The neighbouring index in this direction, if it stays inside `0..len`.
    pub fn step(self, index: usize, len: usize) -> Option<usize> {
        match self {
            HorizontalDirection::Left => index.checked_sub(1),
            HorizontalDirection::Right => Some(index + 1).filter(|next| *next < len),
        }
    }
}

impl VerticalDirection {
    pub fn step(self, index: usize, len: usize) -> Option<usize> {
        match self {
            VerticalDirection::Up => index.checked_sub(1),
            VerticalDirection::Down => Some(index + 1).filter(|next| *next < len),
        }
    }
}

impl From<HorizontalDirection> for Direction {
    fn from(val: HorizontalDirection) -> Self {
        match val {
            HorizontalDirection::Left => Direction::Left,
            HorizontalDirection::Right => Direction::Right,
        }
    }
}

impl From<VerticalDirection> for Direction {
    fn from(val: VerticalDirection) -> Self {
        match val {
            VerticalDirection::Up => Direction::Up,
            VerticalDirection::Down => Direction::Down,
        }
    }
}
