//! Filter operations
//!
//! Neighborhood filters over single channel images with configurable border handling.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::separable_filter;
