//! maskconv is a masked sparse 2D convolution engine.
//!
//! Given a boolean mask of excluded grid cells and a small point-spread function (PSF), the
//! engine precomputes once, for every active cell, which other active cells its kernel
//! footprint reaches. The same convolution can then be applied cheaply to many value arrays
//! without building a dense image or re-walking the mask.
//!
//! # Pipeline overview
//!
//! 1. **Index**: `Mask -> IndexMap` (dense row-major ordinals for active cells)
//! 2. **Frames**: `IndexMap + Kernel -> FrameTable` (fixed-width footprint rows per ordinal)
//! 3. **Convolve**: `FrameTable + values -> values` (scatter each source through its row)
//!
//! An optional blurring mask adds a second table rooted at cells just outside the mask, so flux
//! leaking in from the mask edge is not lost.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Immutable engines**: a [`ConvolutionEngine`] never changes after construction; adding a
//!   blurring region returns a new engine.
//! - **Exact kernels**: weights are used as given, never renormalized.
#![forbid(unsafe_code)]

mod engine;
mod foundation;
mod frames;
mod grid;
mod index;

pub use engine::convolver::ConvolutionEngine;
pub use engine::settings::EngineSettings;
pub use foundation::core::{GridShape, NO_ORDINAL, NO_WEIGHT};
pub use foundation::error::{MaskconvError, MaskconvResult};
pub use frames::primitive::frame_at;
pub use frames::table::{FrameTable, build_blurring_frames, build_frames};
pub use grid::kernel::Kernel;
pub use grid::mask::Mask;
pub use index::index_map::{IndexMap, build_index_map};
