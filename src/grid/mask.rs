use ndarray::{Array2, ArrayView2};

use crate::{
    foundation::{
        core::GridShape,
        error::{MaskconvError, MaskconvResult},
    },
    grid::kernel::Kernel,
};

/// Boolean grid of excluded cells: `true` means the cell is masked out, `false` means active.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    excluded: Array2<bool>,
}

impl Mask {
    pub fn from_array(excluded: Array2<bool>) -> Self {
        Self { excluded }
    }

    /// A mask with every cell active.
    pub fn unmasked(shape: impl Into<GridShape>) -> Self {
        Self {
            excluded: Array2::from_elem(shape.into().as_tuple(), false),
        }
    }

    /// A mask with every cell excluded.
    pub fn fully_masked(shape: impl Into<GridShape>) -> Self {
        Self {
            excluded: Array2::from_elem(shape.into().as_tuple(), true),
        }
    }

    /// Build from row-major nested rows of "excluded" flags.
    pub fn from_rows(rows: &[Vec<bool>]) -> MaskconvResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return Err(MaskconvError::validation("mask rows must all have the same length"));
        }
        let flat = rows.iter().flatten().copied().collect::<Vec<_>>();
        let excluded = Array2::from_shape_vec((height, width), flat)
            .map_err(|e| MaskconvError::Other(anyhow::Error::new(e)))?;
        Ok(Self { excluded })
    }

    /// Active disc of `radius` pixels around the grid center; everything else is excluded.
    pub fn circular(shape: impl Into<GridShape>, radius: f64) -> Self {
        let shape = shape.into();
        let cy = (shape.rows as f64 - 1.0) / 2.0;
        let cx = (shape.cols as f64 - 1.0) / 2.0;
        let excluded = Array2::from_shape_fn(shape.as_tuple(), |(r, c)| {
            let dy = r as f64 - cy;
            let dx = c as f64 - cx;
            (dy * dy + dx * dx).sqrt() > radius
        });
        Self { excluded }
    }

    pub fn shape(&self) -> GridShape {
        self.excluded.dim().into()
    }

    pub fn is_excluded(&self, row: usize, col: usize) -> bool {
        self.excluded[[row, col]]
    }

    pub fn is_active(&self, row: usize, col: usize) -> bool {
        !self.excluded[[row, col]]
    }

    /// Number of active cells.
    pub fn pixels_in_mask(&self) -> usize {
        self.excluded.iter().filter(|&&m| !m).count()
    }

    pub fn view(&self) -> ArrayView2<'_, bool> {
        self.excluded.view()
    }

    /// Active coordinates in row-major scan order, i.e. ordinal order.
    pub fn active_coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.excluded
            .indexed_iter()
            .filter(|(_, m)| !**m)
            .map(|(rc, _)| rc)
    }

    pub(crate) fn ensure_same_shape(&self, other: &Mask) -> MaskconvResult<()> {
        if self.shape() != other.shape() {
            return Err(MaskconvError::shape_mismatch(self.shape(), other.shape()));
        }
        Ok(())
    }

    /// Gather the active cells of a full-size image into ordinal order.
    pub fn array_1d_from_array_2d(&self, image: &ArrayView2<'_, f64>) -> MaskconvResult<Vec<f64>> {
        let found: GridShape = image.dim().into();
        if found != self.shape() {
            return Err(MaskconvError::validation(format!(
                "image shape {found} does not match mask shape {}",
                self.shape()
            )));
        }
        Ok(self.active_coords().map(|rc| image[rc]).collect())
    }

    /// Scatter ordinal-ordered values back onto the grid; excluded cells become zero.
    pub fn array_2d_from_array_1d(&self, values: &[f64]) -> MaskconvResult<Array2<f64>> {
        let active = self.pixels_in_mask();
        if values.len() != active {
            return Err(MaskconvError::validation(format!(
                "expected {active} values for the active cells, got {}",
                values.len()
            )));
        }
        let mut out = Array2::zeros(self.excluded.dim());
        for (rc, &v) in self.active_coords().zip(values) {
            out[rc] = v;
        }
        Ok(out)
    }

    /// Blurring region for a kernel of `kernel_shape`.
    ///
    /// The returned mask activates every cell that this mask excludes but that lies inside the
    /// kernel footprint of at least one active cell, so its flux can be blurred into the mask.
    /// Footprints are clipped at the grid edge.
    pub fn blurring_mask_for_kernel_shape(
        &self,
        kernel_shape: impl Into<GridShape>,
    ) -> MaskconvResult<Mask> {
        let kernel_shape = Kernel::validate_shape(kernel_shape)?;
        let ch = (kernel_shape.rows / 2) as isize;
        let cw = (kernel_shape.cols / 2) as isize;
        let shape = self.shape();

        let mut blurring = Array2::from_elem(shape.as_tuple(), true);
        for (row, col) in self.active_coords() {
            for dy in -ch..=ch {
                for dx in -cw..=cw {
                    if let Some(target) = shape.offset(row, col, dy, dx)
                        && self.excluded[target]
                    {
                        blurring[target] = false;
                    }
                }
            }
        }
        Ok(Mask { excluded: blurring })
    }
}

impl From<Array2<bool>> for Mask {
    fn from(excluded: Array2<bool>) -> Self {
        Self::from_array(excluded)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/mask.rs"]
mod tests;
