//! Multi-reader multi-writer atomic snapshot objects for shared memory.
//!
//! See [`snapshot`] for the snapshot algorithms and [`register`] for the
//! primitives they are built from.
pub mod register;
pub mod snapshot;
pub(crate) mod sync;
