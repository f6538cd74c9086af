#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Every variant that touches a file carries its path.
pub mod error;

/// Directory scanning for color frames and depth maps keyed by file stem.
pub mod dir;

/// Color frame reading.
///
/// See [`functional::read_image_any_rgb8`] for automatic format detection.
pub mod functional;

/// Depth map reading with format detection by file extension.
pub mod depth;

/// NumPy `.npy` array decoding.
pub mod npy;

/// 16-bit PNG depth map decoding.
pub mod png;

/// Floating point TIFF depth map decoding.
pub mod tiff;

pub use error::IoError;
