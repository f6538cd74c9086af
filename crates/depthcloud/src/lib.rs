//! Turn a directory of color frames and a directory of depth maps into colored
//! point clouds.
//!
//! The building blocks live in their own crates and are re-exported here; the
//! [`pipeline`] module wires them together.

#[doc(inline)]
pub use depthcloud_image as image;

#[doc(inline)]
pub use depthcloud_imgproc as imgproc;

#[doc(inline)]
pub use depthcloud_io as io;

#[doc(inline)]
pub use depthcloud_3d as k3d;

/// Run configuration.
pub mod config;

/// Matching color frames with depth maps.
pub mod pairing;

/// The end to end projection run.
pub mod pipeline;

pub use config::{ConfigError, OutputMode, PipelineConfig, ResolutionPolicy};
pub use pairing::{pair_frames, FramePair, FramePairs, PairingError};
pub use pipeline::{run, PipelineError, RunSummary};
