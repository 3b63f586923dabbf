#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// border handling of neighborhood operations.
pub mod border;

/// image filtering module.
pub mod filter;

/// compute image histogram module.
pub mod histogram;

/// module containing parallization utilities.
pub mod parallel;

/// operations to threshold images.
pub mod threshold;
