use ndarray::{Array2, ArrayView2};

use crate::foundation::{
    core::GridShape,
    error::{MaskconvError, MaskconvResult},
};

/// Point-spread function applied by the engine.
///
/// Both dimensions are odd so the kernel has exactly one center cell. Weights are kept exactly
/// as given: nothing here normalizes or clamps them.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    weights: Array2<f64>,
}

impl Kernel {
    /// Wrap a weight grid, rejecting even (including zero) dimensions.
    pub fn new(weights: Array2<f64>) -> MaskconvResult<Self> {
        let (height, width) = weights.dim();
        if height % 2 == 0 || width % 2 == 0 {
            return Err(MaskconvError::kernel_shape(height, width));
        }
        Ok(Self { weights })
    }

    /// Build a kernel from row-major nested rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> MaskconvResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return Err(MaskconvError::validation("kernel rows must all have the same length"));
        }
        let flat = rows.iter().flatten().copied().collect::<Vec<_>>();
        let weights = Array2::from_shape_vec((height, width), flat)
            .map_err(|e| MaskconvError::Other(anyhow::Error::new(e)))?;
        Self::new(weights)
    }

    /// Check a bare shape without building a kernel.
    pub fn validate_shape(shape: impl Into<GridShape>) -> MaskconvResult<GridShape> {
        let shape = shape.into();
        if shape.rows % 2 == 0 || shape.cols % 2 == 0 {
            return Err(MaskconvError::kernel_shape(shape.rows, shape.cols));
        }
        Ok(shape)
    }

    pub fn shape(&self) -> GridShape {
        self.weights.dim().into()
    }

    /// Center cell `(height / 2, width / 2)`, which is also the half-extent in each direction.
    pub fn center(&self) -> (usize, usize) {
        let (h, w) = self.weights.dim();
        (h / 2, w / 2)
    }

    /// Number of cells, i.e. the fixed width of every frame row built from this kernel.
    pub fn area(&self) -> usize {
        self.weights.len()
    }

    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.weights[[row, col]]
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/kernel.rs"]
mod tests;
