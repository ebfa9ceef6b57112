//! Utility types and functions for JT.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - [`BBox3f`] / [`CountRange`] - Bounding and count statistics
//! - Math type re-exports from glam

mod error;
mod math;

pub use error::*;
pub use math::*;
