//! The convolution facade and its settings.

pub(crate) mod convolver;
pub(crate) mod settings;
