use std::borrow::Cow;

use depthcloud_image::{Depthf32, ImageError, Rgb8};
use depthcloud_imgproc::resize::resize_nearest;

use crate::{
    camera::PinholeCameraIntrinsic,
    pointcloud::{PointCloud, PointCloudError},
    sampler::PointSampler,
};

/// Error types for the unprojection module.
#[derive(Debug, thiserror::Error)]
pub enum UnprojectError {
    /// The pixel stride must be at least one.
    #[error("Pixel stride must be >= 1, got {0}")]
    InvalidStride(usize),

    /// The color frame could not be resampled to the depth resolution.
    #[error("Failed to resample the color frame")]
    Resize(#[from] ImageError),

    /// Points and colors went out of sync.
    #[error(transparent)]
    InvariantViolation(#[from] PointCloudError),
}

/// Parameters controlling how many pixels become points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnprojectConfig {
    /// Step between sampled pixels in both axes.
    pub pixel_stride: usize,
    /// Optional per-frame point budget.
    pub max_points: Option<usize>,
}

impl Default for UnprojectConfig {
    fn default() -> Self {
        Self {
            pixel_stride: 1,
            max_points: None,
        }
    }
}

/// Unproject a depth map into a colored point cloud.
///
/// The color frame is resampled to the depth resolution with nearest neighbor
/// interpolation when the two differ. Pixels are visited on a `pixel_stride` grid in
/// scanline order; pixels whose depth is not a positive finite value are dropped.
///
/// Each surviving pixel `(u, v)` with depth `z` becomes the point
/// `(x, -y, -z)` where `x = (u - cx) z / fx` and `y = (v - cy) z / fy`, so the cloud
/// is y-up with the camera looking down `-z`. Colors are normalized to `[0, 1]`.
///
/// When `max_points` is exceeded the `sampler` chooses which points survive; their
/// scanline order is kept.
///
/// # Arguments
///
/// * `color` - The color frame.
/// * `depth` - The depth map, one value per pixel.
/// * `intrinsics` - The camera intrinsics matching the depth resolution.
/// * `config` - Stride and budget parameters.
/// * `sampler` - The strategy selecting points under a budget.
///
/// # Returns
///
/// The point cloud, empty if no pixel has a valid depth.
pub fn unproject_rgbd(
    color: &Rgb8,
    depth: &Depthf32,
    intrinsics: &PinholeCameraIntrinsic,
    config: &UnprojectConfig,
    sampler: &mut dyn PointSampler,
) -> Result<PointCloud, UnprojectError> {
    if config.pixel_stride == 0 {
        return Err(UnprojectError::InvalidStride(config.pixel_stride));
    }

    let color = if color.size() == depth.size() {
        Cow::Borrowed(color)
    } else {
        log::debug!(
            "Resampling color frame {} to depth resolution {}",
            color.size(),
            depth.size()
        );
        Cow::Owned(resize_nearest(color, depth.size())?)
    };

    let stride = config.pixel_stride;
    let capacity = depth.width().div_ceil(stride) * depth.height().div_ceil(stride);
    let mut points = Vec::with_capacity(capacity);
    let mut colors = Vec::with_capacity(capacity);

    for v in (0..depth.height()).step_by(stride) {
        for u in (0..depth.width()).step_by(stride) {
            let z = depth.pixel_unchecked(u, v)[0];
            if !(z.is_finite() && z > 0.0) {
                continue;
            }

            let [x, y, z] = intrinsics.unproject(u as f64, v as f64, z as f64);
            points.push([x, -y, -z]);

            let rgb = color.pixel_unchecked(u, v);
            colors.push([
                rgb[0] as f32 / 255.0,
                rgb[1] as f32 / 255.0,
                rgb[2] as f32 / 255.0,
            ]);
        }
    }

    if let Some(max_points) = config.max_points {
        if points.len() > max_points {
            let indices = sampler.sample_indices(points.len(), max_points);
            points = indices.iter().map(|&i| points[i]).collect();
            colors = indices.iter().map(|&i| colors[i]).collect();
        }
    }

    Ok(PointCloud::new(points, colors)?)
}
