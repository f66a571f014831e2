//! Grid inputs: the boolean mask and the PSF kernel.

pub(crate) mod kernel;
pub(crate) mod mask;
