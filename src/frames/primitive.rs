use crate::{
    foundation::core::{NO_ORDINAL, NO_WEIGHT},
    grid::{kernel::Kernel, mask::Mask},
    index::index_map::IndexMap,
};

/// Kernel footprint of the cell at `coord`.
///
/// Offsets are visited row-major relative to the kernel center. An offset is kept only when its
/// target is on the grid and active in `mask`; kept targets contribute their ordinal from
/// `index_map` and the kernel weight at that offset. Both returned rows have `kernel.area()`
/// slots, with the tail padded by [`NO_ORDINAL`] / [`NO_WEIGHT`].
///
/// `coord` itself does not have to be active in `mask`, which is how blurring-region frames are
/// built against the primary mask. `mask` and `index_map` must describe the same grid.
pub fn frame_at(
    coord: (usize, usize),
    mask: &Mask,
    index_map: &IndexMap,
    kernel: &Kernel,
) -> (Vec<i64>, Vec<f64>) {
    let mut ordinals = vec![NO_ORDINAL; kernel.area()];
    let mut weights = vec![NO_WEIGHT; kernel.area()];
    fill_frame(coord, mask, index_map, kernel, &mut ordinals, &mut weights);
    (ordinals, weights)
}

/// Write the footprint of `coord` into preallocated row slices and return its valid length.
///
/// Slots past the returned length are left untouched, so callers hand in sentinel-filled rows.
pub(crate) fn fill_frame(
    coord: (usize, usize),
    mask: &Mask,
    index_map: &IndexMap,
    kernel: &Kernel,
    ordinals: &mut [i64],
    weights: &mut [f64],
) -> usize {
    debug_assert_eq!(mask.shape(), index_map.shape());
    debug_assert!(ordinals.len() >= kernel.area() && weights.len() >= kernel.area());

    let shape = mask.shape();
    let (ch, cw) = kernel.center();
    let (row, col) = coord;
    let mut len = 0;
    for ky in 0..2 * ch + 1 {
        let dy = ky as isize - ch as isize;
        for kx in 0..2 * cw + 1 {
            let dx = kx as isize - cw as isize;
            let Some((ty, tx)) = shape.offset(row, col, dy, dx) else {
                continue;
            };
            if mask.is_excluded(ty, tx) {
                continue;
            }
            ordinals[len] = index_map.raw(ty, tx);
            weights[len] = kernel.weight(ky, kx);
            len += 1;
        }
    }
    len
}

#[cfg(test)]
#[path = "../../tests/unit/frames/primitive.rs"]
mod tests;
