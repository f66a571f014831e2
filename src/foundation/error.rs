use crate::foundation::core::GridShape;

/// Convenience result type used across maskconv.
pub type MaskconvResult<T> = Result<T, MaskconvError>;

/// Top-level error taxonomy used by engine APIs.
///
/// With default settings, construction of a [`ConvolutionEngine`](crate::ConvolutionEngine) can
/// only fail with [`MaskconvError::InvalidKernelShape`] or [`MaskconvError::MaskShapeMismatch`].
/// The remaining variants come from the settings layer and the grid constructors.
#[derive(thiserror::Error, Debug)]
pub enum MaskconvError {
    /// Kernel height or width is even, so it has no unambiguous center cell.
    #[error("invalid kernel shape: {height}x{width} (both dimensions must be odd)")]
    InvalidKernelShape {
        /// Kernel rows.
        height: usize,
        /// Kernel columns.
        width: usize,
    },

    /// A blurring mask does not have the primary mask's shape.
    #[error("mask shape mismatch: expected {expected}, found {found}")]
    MaskShapeMismatch {
        /// Shape of the primary mask.
        expected: GridShape,
        /// Shape of the offending blurring mask.
        found: GridShape,
    },

    /// Invalid user-provided settings or grid data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing settings.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MaskconvError {
    /// Build a [`MaskconvError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MaskconvError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub(crate) fn kernel_shape(height: usize, width: usize) -> Self {
        Self::InvalidKernelShape { height, width }
    }

    pub(crate) fn shape_mismatch(expected: GridShape, found: GridShape) -> Self {
        Self::MaskShapeMismatch { expected, found }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
