//! Pixel interpolation methods for image resampling.
//!
//! Only nearest neighbor interpolation is provided: color frames are resampled to
//! the depth map resolution and every output pixel must be an actual source sample.

mod nearest;

pub use nearest::{nearest_neighbor_interpolation, source_coordinate};
