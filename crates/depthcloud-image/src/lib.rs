#![deny(missing_docs)]
//! Image types for color frames and depth maps

/// image representation for the projection pipeline.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};

/// An 8-bit RGB color frame.
pub type Rgb8 = Image<u8, 3>;

/// A single channel floating point depth map.
pub type Depthf32 = Image<f32, 1>;
