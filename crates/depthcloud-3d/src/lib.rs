#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Pinhole camera intrinsics.
pub mod camera;

/// I/O utilities for reading and writing 3D data.
pub mod io;

/// Colored point cloud container.
pub mod pointcloud;

/// Index samplers used to enforce point budgets.
pub mod sampler;

/// Depth map unprojection.
pub mod unproject;
