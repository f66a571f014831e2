use ndarray::{Array2, ArrayView2};

use crate::{
    foundation::core::{GridShape, NO_ORDINAL},
    grid::mask::Mask,
};

/// Bijection between active mask cells and the ordinals `0..active_count`.
///
/// Ordinals are handed out in row-major scan order; excluded cells hold [`NO_ORDINAL`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexMap {
    ordinals: Array2<i64>,
    coords: Vec<(usize, usize)>,
}

impl IndexMap {
    pub fn shape(&self) -> GridShape {
        self.ordinals.dim().into()
    }

    pub fn active_count(&self) -> usize {
        self.coords.len()
    }

    /// Ordinal at `(row, col)`, or `None` for an excluded cell.
    pub fn ordinal(&self, row: usize, col: usize) -> Option<usize> {
        let v = self.ordinals[[row, col]];
        (v != NO_ORDINAL).then_some(v as usize)
    }

    /// Raw ordinal at `(row, col)`, [`NO_ORDINAL`] for excluded cells.
    pub fn raw(&self, row: usize, col: usize) -> i64 {
        self.ordinals[[row, col]]
    }

    /// Grid coordinate of an ordinal.
    pub fn coord(&self, ordinal: usize) -> (usize, usize) {
        self.coords[ordinal]
    }

    /// Coordinates of every active cell, indexed by ordinal.
    pub fn coords(&self) -> &[(usize, usize)] {
        &self.coords
    }

    pub fn view(&self) -> ArrayView2<'_, i64> {
        self.ordinals.view()
    }
}

/// Number the active cells of `mask` in row-major order.
///
/// Any mask is valid; an all-excluded mask yields an empty map with `active_count == 0`.
pub fn build_index_map(mask: &Mask) -> (IndexMap, usize) {
    let mut ordinals = Array2::from_elem(mask.shape().as_tuple(), NO_ORDINAL);
    let mut coords = Vec::with_capacity(mask.pixels_in_mask());
    for rc in mask.active_coords() {
        ordinals[rc] = coords.len() as i64;
        coords.push(rc);
    }
    let count = coords.len();
    (IndexMap { ordinals, coords }, count)
}

#[cfg(test)]
#[path = "../../tests/unit/index/index_map.rs"]
mod tests;
