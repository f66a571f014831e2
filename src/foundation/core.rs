use std::fmt;

/// Ordinal stored for inactive cells and for unused frame slots.
pub const NO_ORDINAL: i64 = -1;

/// Weight stored in unused frame slots. Iteration is bounded by the row length, never by this value.
pub const NO_WEIGHT: f64 = -1.0;

/// Row/column dimensions of a 2D grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn len(self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Translate `(row, col)` by a signed offset, returning `None` when the target leaves the grid.
    pub fn offset(self, row: usize, col: usize, dy: isize, dx: isize) -> Option<(usize, usize)> {
        let r = row.checked_add_signed(dy)?;
        let c = col.checked_add_signed(dx)?;
        (r < self.rows && c < self.cols).then_some((r, c))
    }

    pub(crate) fn as_tuple(self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

impl From<(usize, usize)> for GridShape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self { rows, cols }
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
