//! Readers and writers for the supported dump formats.
//!
//! Readers never fill in missing data; writers that need a complete dump run
//! it through [`crate::fill()`] themselves.

pub mod c_array;
pub mod keys;
pub mod mct;
pub mod mfd;
