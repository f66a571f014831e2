use crate::foundation::error::{MaskconvError, MaskconvResult};

/// Threading and chunking controls for frame construction and batched convolution.
///
/// Settings never change results beyond floating-point summation order: frame tables are
/// identical in every mode, and parallel convolution only regroups the per-destination sums.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Use a dedicated rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Rows per rayon task when building frames, and the smallest source block per partial sum
    /// in parallel convolution. `0` is treated as `1`.
    pub chunk_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            chunk_size: 256,
        }
    }
}

impl EngineSettings {
    /// Parallel settings with rayon's default worker count.
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            ..Self::default()
        }
    }

    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> MaskconvResult<Self> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| MaskconvError::serde(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> MaskconvResult<()> {
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(MaskconvError::validation(
                "engine settings 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }

    pub(crate) fn normalized_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    /// Build the worker pool these settings ask for, or `None` in serial mode.
    pub(crate) fn build_pool(&self) -> MaskconvResult<Option<rayon::ThreadPool>> {
        self.validate()?;
        if !self.parallel {
            return Ok(None);
        }
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = self.threads {
            builder = builder.num_threads(n);
        }
        builder.build().map(Some).map_err(|e| {
            MaskconvError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/settings.rs"]
mod tests;
