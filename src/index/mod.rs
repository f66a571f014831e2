//! Dense ordinal numbering of active mask cells.

pub(crate) mod index_map;
