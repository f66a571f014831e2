//! Precomputed kernel footprints ("frames") for every active cell.

pub(crate) mod primitive;
pub(crate) mod table;
