use std::{fs, path::Path};

use depthcloud_image::{Depthf32, Image, ImageSize};
use tiff::decoder::{Decoder, DecodingResult};

use crate::error::IoError;

/// Read a single channel TIFF depth map.
///
/// 32-bit and 64-bit float samples are taken verbatim, 16-bit integer samples are
/// multiplied by `depth_scale`.
///
/// # Arguments
///
/// * `file_path` - The path to the TIFF file.
/// * `depth_scale` - The depth represented by one unit of an integer sample.
///
/// # Returns
///
/// The depth map as a single channel `f32` image.
pub fn read_depth_tiff(file_path: impl AsRef<Path>, depth_scale: f32) -> Result<Depthf32, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let decode_err = |e: tiff::TiffError| IoError::TiffDecodeError(file_path.to_path_buf(), e);

    let file =
        fs::File::open(file_path).map_err(|e| IoError::FileError(file_path.to_path_buf(), e))?;
    let mut decoder = Decoder::new(file).map_err(decode_err)?;

    let colortype = decoder.colortype().map_err(decode_err)?;
    if !matches!(colortype, tiff::ColorType::Gray(_)) {
        return Err(IoError::UnsupportedDepthFormat(
            file_path.to_path_buf(),
            format!("expected a single channel image, got {colortype:?}"),
        ));
    }

    let (width, height) = decoder.dimensions().map_err(decode_err)?;
    let size = ImageSize {
        width: width as usize,
        height: height as usize,
    };

    let depth = match decoder.read_image().map_err(decode_err)? {
        DecodingResult::F32(data) => Image::new(size, data)?,
        // values beyond the f32 range fail the cast
        DecodingResult::F64(data) => Image::<f64, 1>::new(size, data)?.cast::<f32>()?,
        DecodingResult::U16(data) => Image::new(
            size,
            data.into_iter().map(|v| v as f32 * depth_scale).collect(),
        )?,
        _ => {
            return Err(IoError::UnsupportedDepthFormat(
                file_path.to_path_buf(),
                "expected float or 16-bit samples".to_string(),
            ))
        }
    };

    Ok(depth)
}
