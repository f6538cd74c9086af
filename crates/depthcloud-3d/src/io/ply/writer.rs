use std::io::{BufWriter, Write};
use std::path::Path;

use super::{PlyError, PlyFormat};
use crate::pointcloud::PointCloud;

/// Quantize a normalized color channel to `0..=255`.
#[inline]
pub fn color_to_u8(c: f32) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Write colored points to a PLY file.
///
/// Positions are stored as `float x y z` and colors as `uchar red green blue`.
/// An existing file at `path` is overwritten.
///
/// # Arguments
///
/// * `path` - The destination file. Its parent directory must exist.
/// * `points` - The vertex positions.
/// * `colors` - One color per point with channels in `[0, 1]`.
/// * `format` - The vertex encoding.
///
/// # Errors
///
/// [`PlyError::InvariantViolation`] if `points` and `colors` differ in length, checked
/// before the file is touched. [`PlyError::Io`] if the file cannot be written.
pub fn write_ply(
    path: impl AsRef<Path>,
    points: &[[f64; 3]],
    colors: &[[f32; 3]],
    format: PlyFormat,
) -> Result<(), PlyError> {
    if points.len() != colors.len() {
        return Err(PlyError::InvariantViolation {
            points: points.len(),
            colors: colors.len(),
        });
    }

    let path = path.as_ref();
    let io_err = |e| PlyError::Io(path.to_path_buf(), e);

    let file = std::fs::File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    write_records(&mut writer, points, colors, format).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    log::debug!("Wrote {} vertices to {}", points.len(), path.display());

    Ok(())
}

/// Write a [`PointCloud`] to a PLY file.
pub fn write_ply_pointcloud(
    path: impl AsRef<Path>,
    pointcloud: &PointCloud,
    format: PlyFormat,
) -> Result<(), PlyError> {
    write_ply(path, pointcloud.points(), pointcloud.colors(), format)
}

fn write_records<W: Write>(
    writer: &mut W,
    points: &[[f64; 3]],
    colors: &[[f32; 3]],
    format: PlyFormat,
) -> std::io::Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format {} 1.0", format.as_header_str())?;
    writeln!(writer, "element vertex {}", points.len())?;
    for axis in ["x", "y", "z"] {
        writeln!(writer, "property float {axis}")?;
    }
    for channel in ["red", "green", "blue"] {
        writeln!(writer, "property uchar {channel}")?;
    }
    writeln!(writer, "end_header")?;

    for (p, c) in points.iter().zip(colors) {
        let rgb = [color_to_u8(c[0]), color_to_u8(c[1]), color_to_u8(c[2])];
        match format {
            PlyFormat::BinaryLittleEndian => {
                for v in p {
                    writer.write_all(&(*v as f32).to_le_bytes())?;
                }
                writer.write_all(&rgb)?;
            }
            PlyFormat::Ascii => {
                writeln!(
                    writer,
                    "{} {} {} {} {} {}",
                    p[0] as f32, p[1] as f32, p[2] as f32, rgb[0], rgb[1], rgb[2]
                )?;
            }
        }
    }

    Ok(())
}
