use std::sync::Arc;

use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;

use crate::{
    engine::settings::EngineSettings,
    foundation::error::{MaskconvError, MaskconvResult},
    frames::table::{FrameTable, ParallelBuild, build_table},
    grid::{kernel::Kernel, mask::Mask},
    index::index_map::{IndexMap, build_index_map},
};

/// Cells outside the primary mask whose kernel footprint still reaches into it.
#[derive(Debug)]
struct BlurringRegion {
    mask: Mask,
    index_map: IndexMap,
    frames: FrameTable,
}

/// Masked sparse convolution with precomputed frames.
///
/// Construction numbers the active cells of the mask and records, for each one, which active
/// cells its kernel footprint reaches and with what weight. [`convolve`](Self::convolve) then
/// only walks those tables: the kernel is centered on every source cell and its weights are
/// scattered outward. Weight that would land off the grid or on an excluded cell is dropped for
/// that source; nothing is renormalized.
///
/// An optional blurring region adds a second table rooted at cells outside the mask, so flux
/// from just beyond the mask edge can be scattered in as well.
///
/// The engine is immutable. Clones and engines derived through
/// [`with_blurring_mask`](Self::with_blurring_mask) share the primary tables.
#[derive(Clone, Debug)]
pub struct ConvolutionEngine {
    mask: Arc<Mask>,
    kernel: Arc<Kernel>,
    index_map: Arc<IndexMap>,
    frames: Arc<FrameTable>,
    blurring: Option<Arc<BlurringRegion>>,
    settings: EngineSettings,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl ConvolutionEngine {
    /// Build an engine with default (serial) settings.
    pub fn new(mask: Mask, kernel: Kernel, blurring_mask: Option<Mask>) -> MaskconvResult<Self> {
        Self::with_settings(mask, kernel, blurring_mask, EngineSettings::default())
    }

    /// Build an engine from raw grids, validating the kernel shape here.
    pub fn from_arrays(
        mask: Array2<bool>,
        kernel: Array2<f64>,
        blurring_mask: Option<Array2<bool>>,
    ) -> MaskconvResult<Self> {
        Self::new(
            Mask::from_array(mask),
            Kernel::new(kernel)?,
            blurring_mask.map(Mask::from_array),
        )
    }

    #[tracing::instrument(
        skip_all,
        fields(shape = %mask.shape(), kernel = %kernel.shape(), blurring = blurring_mask.is_some())
    )]
    /// Build an engine, using `settings` for frame construction and batched convolution.
    pub fn with_settings(
        mask: Mask,
        kernel: Kernel,
        blurring_mask: Option<Mask>,
        settings: EngineSettings,
    ) -> MaskconvResult<Self> {
        if let Some(blurring_mask) = &blurring_mask {
            mask.ensure_same_shape(blurring_mask)?;
        }
        let pool = settings.build_pool()?.map(Arc::new);

        let (index_map, active) = build_index_map(&mask);
        let frames = build_table(
            "frames",
            index_map.coords(),
            &mask,
            &index_map,
            &kernel,
            parallel_build(pool.as_deref(), &settings),
        );
        tracing::debug!(active, "primary frames ready");

        let mut engine = Self {
            mask: Arc::new(mask),
            kernel: Arc::new(kernel),
            index_map: Arc::new(index_map),
            frames: Arc::new(frames),
            blurring: None,
            settings,
            pool,
        };
        if let Some(blurring_mask) = blurring_mask {
            engine.blurring = Some(Arc::new(engine.build_blurring(blurring_mask)));
        }
        Ok(engine)
    }

    #[tracing::instrument(skip_all, fields(shape = %blurring_mask.shape()))]
    /// Return a new engine with blurring frames for `blurring_mask`.
    ///
    /// The primary tables are shared with `self`, which is left untouched. Any blurring region
    /// `self` already had is replaced in the result.
    pub fn with_blurring_mask(&self, blurring_mask: Mask) -> MaskconvResult<Self> {
        self.mask.ensure_same_shape(&blurring_mask)?;
        let region = self.build_blurring(blurring_mask);
        Ok(Self {
            blurring: Some(Arc::new(region)),
            ..self.clone()
        })
    }

    /// Return a new engine whose blurring region is derived from the mask and kernel shape.
    pub fn with_derived_blurring_mask(&self) -> MaskconvResult<Self> {
        let blurring_mask = self
            .mask
            .blurring_mask_for_kernel_shape(self.kernel.shape())?;
        self.with_blurring_mask(blurring_mask)
    }

    fn build_blurring(&self, mask: Mask) -> BlurringRegion {
        let (index_map, cells) = build_index_map(&mask);
        let frames = build_table(
            "blurring",
            index_map.coords(),
            &self.mask,
            &self.index_map,
            &self.kernel,
            parallel_build(self.pool.as_deref(), &self.settings),
        );
        tracing::debug!(cells, "blurring frames ready");
        BlurringRegion {
            mask,
            index_map,
            frames,
        }
    }

    /// Convolve values given in ordinal order; the result is in the same order.
    ///
    /// `values` holds one entry per active cell. `blurring_values`, when given, holds one entry
    /// per blurring-region cell (in the blurring mask's own ordinal order) and is scattered into
    /// the same output.
    ///
    /// # Panics
    ///
    /// If a slice length does not match its cell count, or if `blurring_values` is given to an
    /// engine without a blurring region. [`try_convolve`](Self::try_convolve) reports these as
    /// errors instead.
    pub fn convolve(&self, values: &[f64], blurring_values: Option<&[f64]>) -> Vec<f64> {
        assert_eq!(
            values.len(),
            self.active_count(),
            "convolve expects one value per active cell"
        );
        let mut output = vec![0.0; self.active_count()];
        self.scatter(&self.frames, values, &mut output);

        if let Some(blurring_values) = blurring_values {
            let Some(region) = self.blurring.as_deref() else {
                panic!("blurring values given to an engine without a blurring region");
            };
            assert_eq!(
                blurring_values.len(),
                region.frames.rows(),
                "convolve expects one blurring value per blurring-region cell"
            );
            self.scatter(&region.frames, blurring_values, &mut output);
        }
        output
    }

    /// Checked form of [`convolve`](Self::convolve).
    pub fn try_convolve(
        &self,
        values: &[f64],
        blurring_values: Option<&[f64]>,
    ) -> MaskconvResult<Vec<f64>> {
        if values.len() != self.active_count() {
            return Err(MaskconvError::validation(format!(
                "expected {} values, got {}",
                self.active_count(),
                values.len()
            )));
        }
        if let Some(blurring_values) = blurring_values {
            let expected = self.blurring_count().ok_or_else(|| {
                MaskconvError::validation("engine has no blurring region for blurring values")
            })?;
            if blurring_values.len() != expected {
                return Err(MaskconvError::validation(format!(
                    "expected {expected} blurring values, got {}",
                    blurring_values.len()
                )));
            }
        }
        Ok(self.convolve(values, blurring_values))
    }

    /// Convolve every column of `matrix` (shape `[active_count, columns]`).
    ///
    /// Column `j` of the result equals `convolve(matrix.column(j), None)`. The blurring region
    /// plays no part here.
    ///
    /// # Panics
    ///
    /// If `matrix` does not have one row per active cell.
    pub fn convolve_matrix(&self, matrix: &ArrayView2<'_, f64>) -> Array2<f64> {
        let (rows, columns) = matrix.dim();
        assert_eq!(
            rows,
            self.active_count(),
            "convolve_matrix expects one row per active cell"
        );
        tracing::trace!(columns, "convolving matrix columns");

        let convolve_column = |j: usize| {
            let column = matrix.column(j).to_vec();
            self.convolve(&column, None)
        };
        let blurred: Vec<Vec<f64>> = match &self.pool {
            Some(pool) if columns > 1 => {
                pool.install(|| (0..columns).into_par_iter().map(convolve_column).collect())
            }
            _ => (0..columns).map(convolve_column).collect(),
        };

        let mut out = Array2::zeros((rows, columns));
        for (mut dst, src) in out.axis_iter_mut(Axis(1)).zip(blurred) {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = s;
            }
        }
        out
    }

    /// Scatter one table into `output`, in parallel when a pool exists and there is more than
    /// one chunk of sources.
    fn scatter(&self, table: &FrameTable, values: &[f64], output: &mut [f64]) {
        let chunk = self.settings.normalized_chunk_size();
        match &self.pool {
            Some(pool) if table.rows() > chunk => {
                scatter_parallel(pool, table, values, output, chunk);
            }
            _ => table.scatter_into(values, output),
        }
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Ordinal numbering of the primary mask.
    pub fn mask_index_array(&self) -> &IndexMap {
        &self.index_map
    }

    /// Primary frame rows, one per active cell.
    pub fn image_frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn blurring_mask(&self) -> Option<&Mask> {
        self.blurring.as_deref().map(|b| &b.mask)
    }

    /// Ordinal numbering of the blurring region, if any.
    pub fn blurring_index_array(&self) -> Option<&IndexMap> {
        self.blurring.as_deref().map(|b| &b.index_map)
    }

    /// Blurring frame rows, one per blurring-region cell.
    pub fn blurring_frames(&self) -> Option<&FrameTable> {
        self.blurring.as_deref().map(|b| &b.frames)
    }

    pub fn active_count(&self) -> usize {
        self.index_map.active_count()
    }

    /// Number of blurring-region cells, `None` without a blurring region.
    pub fn blurring_count(&self) -> Option<usize> {
        self.blurring.as_deref().map(|b| b.index_map.active_count())
    }

    /// Slots per frame row (kernel height × kernel width).
    pub fn frame_width(&self) -> usize {
        self.frames.width()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

/// Scatter `table` on `pool` with at most one partial output per worker.
///
/// Sources are cut into contiguous blocks of at least `min_rows` rows, one block per worker at
/// most. Partials are added in block order, so the result depends on the pool size but never on
/// scheduling. Returns the number of partial buffers used.
fn scatter_parallel(
    pool: &rayon::ThreadPool,
    table: &FrameTable,
    values: &[f64],
    output: &mut [f64],
    min_rows: usize,
) -> usize {
    let rows = table.rows();
    let workers = pool.current_num_threads().max(1);
    let block = rows.div_ceil(workers).max(min_rows).max(1);
    let len = output.len();

    let partials = pool.install(|| {
        (0..rows.div_ceil(block))
            .into_par_iter()
            .map(|b| {
                let mut acc = vec![0.0; len];
                table.scatter_rows_into(b * block..rows.min((b + 1) * block), values, &mut acc);
                acc
            })
            .collect::<Vec<_>>()
    });
    for partial in &partials {
        for (o, p) in output.iter_mut().zip(partial) {
            *o += p;
        }
    }
    partials.len()
}

fn parallel_build<'a>(
    pool: Option<&'a rayon::ThreadPool>,
    settings: &EngineSettings,
) -> Option<ParallelBuild<'a>> {
    pool.map(|pool| ParallelBuild {
        pool,
        chunk_rows: settings.normalized_chunk_size(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/engine/convolver.rs"]
mod tests;
