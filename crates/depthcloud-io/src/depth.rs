use std::path::Path;

use depthcloud_image::Depthf32;

use crate::{error::IoError, npy, png, tiff};

/// Read a depth map, choosing the decoder from the file extension.
///
/// * `.npy` - NumPy array, values taken verbatim.
/// * `.tiff` / `.tif` - single channel float TIFF, integer samples scaled.
/// * `.png` - single channel 8 or 16-bit PNG, scaled.
///
/// # Arguments
///
/// * `file_path` - The path to the depth file.
/// * `depth_scale` - The depth represented by one unit of an integer sample.
///
/// # Returns
///
/// The depth map as a single channel `f32` image.
pub fn read_depth_map(file_path: impl AsRef<Path>, depth_scale: f32) -> Result<Depthf32, IoError> {
    let file_path = file_path.as_ref();

    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| IoError::InvalidFileExtension(file_path.to_path_buf()))?;

    match extension.as_str() {
        "npy" => npy::read_depth_npy(file_path),
        "tiff" | "tif" => tiff::read_depth_tiff(file_path, depth_scale),
        "png" => png::read_depth_png(file_path, depth_scale),
        _ => Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
    }
}
