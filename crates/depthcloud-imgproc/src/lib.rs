#![deny(missing_docs)]
//! Image processing operations for the projection pipeline

/// Pixel interpolation kernels.
pub mod interpolation;

/// Image resizing.
pub mod resize;
