use rayon::prelude::*;

use crate::{
    foundation::core::{NO_ORDINAL, NO_WEIGHT},
    frames::primitive::fill_frame,
    grid::{kernel::Kernel, mask::Mask},
    index::index_map::IndexMap,
};

/// Fixed-width arena of frame rows.
///
/// Row `i` belongs to source ordinal `i`. Every row has `width` slots in the ordinal and weight
/// buffers; only the first `lengths[i]` are real, the rest hold [`NO_ORDINAL`] / [`NO_WEIGHT`].
#[derive(Clone, Debug, PartialEq)]
pub struct FrameTable {
    width: usize,
    ordinals: Vec<i64>,
    weights: Vec<f64>,
    lengths: Vec<usize>,
}

impl FrameTable {
    fn with_rows(rows: usize, width: usize) -> Self {
        Self {
            width,
            ordinals: vec![NO_ORDINAL; rows * width],
            weights: vec![NO_WEIGHT; rows * width],
            lengths: vec![0; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.lengths.len()
    }

    /// Slots per row (kernel height × kernel width).
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Valid target ordinals and weights of row `i`.
    pub fn row(&self, i: usize) -> (&[i64], &[f64]) {
        let start = i * self.width;
        let end = start + self.lengths[i];
        (&self.ordinals[start..end], &self.weights[start..end])
    }

    /// Full fixed-width row `i`, sentinels included.
    pub fn raw_row(&self, i: usize) -> (&[i64], &[f64]) {
        let start = i * self.width;
        let end = start + self.width;
        (&self.ordinals[start..end], &self.weights[start..end])
    }

    /// Sum of all row lengths.
    pub fn total_entries(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Scatter `values[i] * weight` from every row `i` into `output[target]`.
    pub(crate) fn scatter_into(&self, values: &[f64], output: &mut [f64]) {
        self.scatter_rows_into(0..self.rows(), values, output);
    }

    pub(crate) fn scatter_rows_into(
        &self,
        rows: std::ops::Range<usize>,
        values: &[f64],
        output: &mut [f64],
    ) {
        for i in rows {
            let v = values[i];
            if v == 0.0 {
                continue;
            }
            let (targets, weights) = self.row(i);
            for (&t, &w) in targets.iter().zip(weights) {
                output[t as usize] += v * w;
            }
        }
    }
}

/// Build one frame row per coordinate in `coords`, targets resolved against `mask`/`index_map`.
///
/// Row `i` of the result is the footprint of `coords[i]`. For the primary table `coords` is
/// `index_map.coords()`, so row `i` matches ordinal `i`.
pub fn build_frames(
    coords: &[(usize, usize)],
    mask: &Mask,
    index_map: &IndexMap,
    kernel: &Kernel,
) -> FrameTable {
    build_table("frames", coords, mask, index_map, kernel, None)
}

/// Rows rooted at the blurring region, in the blurring map's ordinal order.
///
/// Targets are restricted to cells active in the primary mask and numbered by the primary map.
pub fn build_blurring_frames(
    blurring_map: &IndexMap,
    primary_mask: &Mask,
    primary_map: &IndexMap,
    kernel: &Kernel,
) -> FrameTable {
    build_table(
        "blurring",
        blurring_map.coords(),
        primary_mask,
        primary_map,
        kernel,
        None,
    )
}

/// Worker pool and rows per task for parallel table construction.
#[derive(Clone, Copy)]
pub(crate) struct ParallelBuild<'a> {
    pub(crate) pool: &'a rayon::ThreadPool,
    pub(crate) chunk_rows: usize,
}

pub(crate) fn build_table(
    kind: &'static str,
    coords: &[(usize, usize)],
    mask: &Mask,
    index_map: &IndexMap,
    kernel: &Kernel,
    parallel: Option<ParallelBuild<'_>>,
) -> FrameTable {
    let mut table = FrameTable::with_rows(coords.len(), kernel.area());
    match parallel {
        Some(par) if coords.len() > par.chunk_rows => {
            fill_rows_parallel(&mut table, coords, mask, index_map, kernel, par)
        }
        _ => fill_rows(&mut table, coords, mask, index_map, kernel),
    }
    log_table(kind, &table);
    table
}

fn fill_rows(
    table: &mut FrameTable,
    coords: &[(usize, usize)],
    mask: &Mask,
    index_map: &IndexMap,
    kernel: &Kernel,
) {
    let width = table.width;
    for (i, &coord) in coords.iter().enumerate() {
        let span = i * width..(i + 1) * width;
        table.lengths[i] = fill_frame(
            coord,
            mask,
            index_map,
            kernel,
            &mut table.ordinals[span.clone()],
            &mut table.weights[span],
        );
    }
}

fn fill_rows_parallel(
    table: &mut FrameTable,
    coords: &[(usize, usize)],
    mask: &Mask,
    index_map: &IndexMap,
    kernel: &Kernel,
    par: ParallelBuild<'_>,
) {
    let width = table.width;
    let chunk_rows = par.chunk_rows.max(1);
    let FrameTable {
        ordinals,
        weights,
        lengths,
        ..
    } = table;

    // Each task owns a disjoint block of rows, so no synchronization is needed.
    par.pool.install(|| {
        ordinals
            .par_chunks_mut(width * chunk_rows)
            .zip(weights.par_chunks_mut(width * chunk_rows))
            .zip(lengths.par_chunks_mut(chunk_rows))
            .zip(coords.par_chunks(chunk_rows))
            .for_each(|(((ordinals, weights), lengths), coords)| {
                for (j, &coord) in coords.iter().enumerate() {
                    let span = j * width..(j + 1) * width;
                    lengths[j] = fill_frame(
                        coord,
                        mask,
                        index_map,
                        kernel,
                        &mut ordinals[span.clone()],
                        &mut weights[span],
                    );
                }
            });
    });
}

fn log_table(kind: &'static str, table: &FrameTable) {
    tracing::debug!(
        kind,
        rows = table.rows(),
        width = table.width(),
        entries = table.total_entries(),
        "built frame table"
    );
}

#[cfg(test)]
#[path = "../../tests/unit/frames/table.rs"]
mod tests;
