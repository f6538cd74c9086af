use std::{fs, path::Path};

use depthcloud_image::{Depthf32, Image};
use png::{BitDepth, ColorType, Decoder};

use crate::error::IoError;

/// Read a single channel PNG depth map and scale it to depth units.
///
/// 16-bit images are the usual container, 8-bit grayscale is accepted as well.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
/// * `depth_scale` - The depth represented by one unit of the stored value,
///   e.g. `0.001` for millimeters stored as integers.
///
/// # Returns
///
/// The depth map as a single channel `f32` image.
pub fn read_depth_png(file_path: impl AsRef<Path>, depth_scale: f32) -> Result<Depthf32, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let decode_err =
        |e: png::DecodingError| IoError::PngDecodeError(file_path.to_path_buf(), e.to_string());

    let file =
        fs::File::open(file_path).map_err(|e| IoError::FileError(file_path.to_path_buf(), e))?;
    let mut reader = Decoder::new(file).read_info().map_err(decode_err)?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(decode_err)?;
    let buf = &buf[..info.buffer_size()];

    let depth = match (info.color_type, info.bit_depth) {
        (ColorType::Grayscale, BitDepth::Sixteen) => buf
            .chunks_exact(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]) as f32 * depth_scale)
            .collect::<Vec<_>>(),
        (ColorType::Grayscale, BitDepth::Eight) => {
            buf.iter().map(|&b| b as f32 * depth_scale).collect()
        }
        (color_type, bit_depth) => {
            return Err(IoError::UnsupportedDepthFormat(
                file_path.to_path_buf(),
                format!("expected 8 or 16 bit grayscale, got {color_type:?} {bit_depth:?}"),
            ))
        }
    };

    Ok(Image::new(
        [info.width as usize, info.height as usize].into(),
        depth,
    )?)
}
