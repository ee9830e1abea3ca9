use std::fmt;

use serde::{Deserialize, Serialize};

/// A rectangular grid of values, stored row by row.
/// Every row has exactly `width` values, so a grid can never become ragged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub struct Grid<T> {
    values: Vec<T>,
    width: usize,
}

/// A 2D index. `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub struct Index2D {
    pub x: usize,
    pub y: usize,
}

impl Index2D {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl<T> Grid<T> {
    pub fn from_one_dimensional(values: Vec<T>, width: usize) -> Self {
        assert!(width > 0);
        assert_eq!(values.len() % width, 0);
        Grid { values, width }
    }

    /// Builds a grid from rows of possibly different lengths.
    /// Short rows are padded, so the width is the length of the longest row.
    pub fn from_rows(rows: Vec<Vec<T>>, mut fill: impl FnMut() -> T) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let mut values = Vec::with_capacity(width * rows.len().max(1));
        for mut row in rows {
            while row.len() < width {
                row.push(fill());
            }
            values.extend(row);
        }
        if values.is_empty() {
            values.extend((0..width).map(|_| fill()));
        }
        Grid { values, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.values.len() / self.width
    }

    pub fn get(&self, xy: Index2D) -> Option<&T> {
        if xy.x >= self.width() || xy.y >= self.height() {
            return None;
        }
        self.values.get(self.xy_to_index(xy))
    }

    pub fn get_mut(&mut self, xy: Index2D) -> Option<&mut T> {
        if xy.x >= self.width() || xy.y >= self.height() {
            return None;
        }
        let index = self.xy_to_index(xy);
        self.values.get_mut(index)
    }

    pub fn get_by_index(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    pub fn index_to_xy(&self, index: usize) -> Index2D {
        Index2D {
            x: index % self.width,
            y: index / self.width,
        }
    }

    pub fn xy_to_index(&self, xy: Index2D) -> usize {
        xy.y * self.width + xy.x
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.values.chunks(self.width)
    }

    pub fn row(&self, y: usize) -> Option<&[T]> {
        self.rows().nth(y)
    }

    pub fn column(&self, x: usize) -> impl Iterator<Item = &T> {
        self.values.iter().skip(x).step_by(self.width)
    }

    /// Inserts a row before `y`. The values must match the width.
    pub fn insert_row(&mut self, y: usize, values: Vec<T>) {
        assert_eq!(values.len(), self.width);
        let y = y.min(self.height());
        let at = y * self.width;
        self.values.splice(at..at, values);
    }

    /// Inserts a column before `x`. There must be one value per row.
    pub fn insert_column(&mut self, x: usize, values: Vec<T>) {
        assert_eq!(values.len(), self.height());
        let x = x.min(self.width);
        let new_width = self.width + 1;
        let old_values = std::mem::take(&mut self.values);
        let mut inserted = values.into_iter();
        let mut result = Vec::with_capacity(old_values.len() + self.height());
        for (index, value) in old_values.into_iter().enumerate() {
            if index % self.width == x {
                result.extend(inserted.next());
            }
            result.push(value);
            if x == self.width && index % self.width == self.width - 1 {
                result.extend(inserted.next());
            }
        }
        self.values = result;
        self.width = new_width;
    }

    /// Removes a row. Refuses to remove the last remaining row.
    pub fn remove_row(&mut self, y: usize) -> Option<Vec<T>> {
        if self.height() <= 1 || y >= self.height() {
            return None;
        }
        let at = y * self.width;
        Some(self.values.drain(at..at + self.width).collect())
    }

    /// Removes a column. Refuses to remove the last remaining column.
    pub fn remove_column(&mut self, x: usize) -> Option<Vec<T>> {
        if self.width <= 1 || x >= self.width {
            return None;
        }
        let width = self.width;
        let old_values = std::mem::take(&mut self.values);
        let mut removed = Vec::with_capacity(self.height());
        for (index, value) in old_values.into_iter().enumerate() {
            if index % width == x {
                removed.push(value);
            } else {
                self.values.push(value);
            }
        }
        self.width = width - 1;
        Some(removed)
    }
}

impl<T: fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width(), self.height())?;
        for value in &self.values {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}
