use std::io::{BufRead, Read, Seek};
use std::path::Path;

use super::{
    properties::{PlyDataType, PlyPropertyDefinition, VertexLayout},
    PlyError, PlyFormat,
};
use crate::pointcloud::PointCloud;

struct PlyHeader {
    pub vertex_count: usize,
    pub properties: Vec<PlyPropertyDefinition>,
    pub format: PlyFormat,
}

fn malformed(msg: impl Into<String>) -> PlyError {
    PlyError::Malformed(msg.into())
}

fn parse_header<R: BufRead>(reader: &mut R, path: &Path) -> Result<PlyHeader, PlyError> {
    let mut line = String::new();
    let mut vertex_count = None;
    let mut format = None;
    let mut is_ply = false;
    let mut in_vertex_element = false;
    let mut properties = Vec::new();

    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| PlyError::Io(path.to_path_buf(), e))?;
        if read == 0 {
            return Err(malformed("missing end_header"));
        }
        let trimmed = line.trim();

        if trimmed == "ply" {
            is_ply = true;
            continue;
        }

        if !is_ply {
            return Err(malformed("missing ply magic"));
        }

        if trimmed == "end_header" {
            break;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        match parts.as_slice() {
            ["format", "binary_little_endian", ..] => format = Some(PlyFormat::BinaryLittleEndian),
            ["format", "ascii", ..] => format = Some(PlyFormat::Ascii),
            ["format", other, ..] => {
                return Err(PlyError::UnsupportedProperty(format!("format {other}")))
            }
            ["element", "vertex", count] => {
                let count = count
                    .parse()
                    .map_err(|_| malformed(format!("invalid vertex count {count}")))?;
                vertex_count = Some(count);
                in_vertex_element = true;
            }
            ["element", name, ..] => {
                if vertex_count.is_none() {
                    return Err(PlyError::UnsupportedProperty(format!(
                        "element {name} before vertex"
                    )));
                }
                in_vertex_element = false;
            }
            ["property", "list", ..] if in_vertex_element => {
                return Err(PlyError::UnsupportedProperty(trimmed.to_string()));
            }
            ["property", data_type, name] if in_vertex_element => {
                let data_type = PlyDataType::parse(data_type)?;
                properties.push(PlyPropertyDefinition {
                    name: name.to_string(),
                    data_type,
                });
            }
            _ => {}
        }
    }

    let format = format.ok_or_else(|| malformed("missing format line"))?;
    let vertex_count = vertex_count.ok_or_else(|| malformed("missing vertex element"))?;

    Ok(PlyHeader {
        vertex_count,
        properties,
        format,
    })
}

/// Read the vertices of a PLY file as a colored point cloud.
///
/// Both `ascii` and `binary_little_endian` files are supported, with any scalar
/// property layout as long as `x`, `y` and `z` are present. Integer colors are
/// normalized by 255, float colors are kept as is, and missing colors read as black.
///
/// # Arguments
///
/// * `path` - The path to the PLY file.
///
/// # Returns
///
/// The point cloud in file order.
pub fn read_ply(path: impl AsRef<Path>) -> Result<PointCloud, PlyError> {
    let path = path.as_ref();
    let io_err = |e| PlyError::Io(path.to_path_buf(), e);

    let file = std::fs::File::open(path).map_err(io_err)?;
    let file_len = file.metadata().map_err(io_err)?.len();
    let mut reader = std::io::BufReader::new(file);

    let header = parse_header(&mut reader, path)?;
    let layout = VertexLayout::from_properties(&header.properties)?;

    let rows = match header.format {
        PlyFormat::BinaryLittleEndian => {
            let remaining = file_len.saturating_sub(reader.stream_position().map_err(io_err)?);
            read_binary_rows(&mut reader, &header, remaining, path)?
        }
        PlyFormat::Ascii => read_ascii_rows(&mut reader, &header, path)?,
    };

    let vertex_count = rows.len() / header.properties.len();
    let mut points = Vec::with_capacity(vertex_count);
    let mut colors = Vec::with_capacity(vertex_count);
    for row in rows.chunks_exact(header.properties.len()) {
        let [x, y, z] = layout.xyz;
        points.push([row[x], row[y], row[z]]);

        let color = match layout.rgb {
            Some(rgb) => rgb.map(|i| {
                let value = row[i] as f32;
                if header.properties[i].data_type.is_integer() {
                    value / 255.0
                } else {
                    value
                }
            }),
            None => [0.0; 3],
        };
        colors.push(color);
    }

    PointCloud::new(points, colors).map_err(|_| malformed("vertex data out of sync"))
}

/// Decoded property values, `vertex_count * properties.len()` of them in row order.
type Rows = Vec<f64>;

fn read_binary_rows<R: Read>(
    reader: &mut R,
    header: &PlyHeader,
    remaining: u64,
    path: &Path,
) -> Result<Rows, PlyError> {
    let row_size: usize = header.properties.iter().map(|p| p.data_type.size()).sum();
    let fits = (row_size as u64)
        .checked_mul(header.vertex_count as u64)
        .is_some_and(|needed| needed <= remaining);
    if !fits {
        return Err(malformed(format!(
            "{} vertices of {row_size} bytes do not fit in the remaining {remaining} bytes",
            header.vertex_count
        )));
    }

    let mut buffer = vec![0u8; row_size];
    // bounded by the file size checked above
    let mut rows = Vec::with_capacity(header.vertex_count * header.properties.len());

    for _ in 0..header.vertex_count {
        reader
            .read_exact(&mut buffer)
            .map_err(|e| PlyError::Io(path.to_path_buf(), e))?;
        let mut offset = 0;
        for property in &header.properties {
            let size = property.data_type.size();
            // the buffer holds exactly one record, so every slice has the right size
            rows.extend(property.data_type.read_le(&buffer[offset..offset + size]));
            offset += size;
        }
    }

    Ok(rows)
}

fn read_ascii_rows<R: BufRead>(
    reader: &mut R,
    header: &PlyHeader,
    path: &Path,
) -> Result<Rows, PlyError> {
    // grown as lines are read, the header count is not trusted for allocation
    let mut rows = Vec::new();
    let mut line = String::new();

    for index in 0..header.vertex_count {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| PlyError::Io(path.to_path_buf(), e))?;
        if read == 0 {
            return Err(malformed(format!(
                "expected {} vertices, found {index}",
                header.vertex_count
            )));
        }

        let values = line
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| malformed(format!("vertex {index}: {e}")))?;

        if values.len() != header.properties.len() {
            return Err(malformed(format!(
                "vertex {index} has {} values, expected {}",
                values.len(),
                header.properties.len()
            )));
        }
        rows.extend(values);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ply::write_ply;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn header(text: &str) -> Result<PlyHeader, PlyError> {
        let mut reader = std::io::BufReader::new(text.as_bytes());
        parse_header(&mut reader, Path::new("memory.ply"))
    }

    #[test]
    fn test_parse_header_basic() -> Result<(), PlyError> {
        let header = header("ply\nformat binary_little_endian 1.0\nelement vertex 10\nproperty float x\nproperty float y\nproperty float z\nend_header\n")?;
        assert_eq!(header.vertex_count, 10);
        assert_eq!(header.properties.len(), 3);
        assert_eq!(header.properties[0].name, "x");
        assert_eq!(header.properties[0].data_type, PlyDataType::Float32);
        assert_eq!(header.format, PlyFormat::BinaryLittleEndian);
        Ok(())
    }

    #[test]
    fn test_parse_header_skips_trailing_elements() -> Result<(), PlyError> {
        let header = header("ply\nformat ascii 1.0\ncomment made by hand\nelement vertex 2\nproperty double x\nproperty double y\nproperty double z\nelement face 0\nproperty list uchar int vertex_indices\nend_header\n")?;
        assert_eq!(header.format, PlyFormat::Ascii);
        assert_eq!(header.vertex_count, 2);
        assert_eq!(header.properties.len(), 3);
        Ok(())
    }

    #[test]
    fn test_parse_header_rejects() {
        assert!(matches!(
            header("ply\nformat binary_big_endian 1.0\nelement vertex 1\nend_header\n"),
            Err(PlyError::UnsupportedProperty(_))
        ));
        assert!(matches!(
            header("format ascii 1.0\nend_header\n"),
            Err(PlyError::Malformed(_))
        ));
        assert!(matches!(
            header("ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n"),
            Err(PlyError::Malformed(_))
        ));
        assert!(matches!(
            header("ply\nformat ascii 1.0\nelement vertex many\nend_header\n"),
            Err(PlyError::Malformed(_))
        ));
    }

    #[test]
    fn test_read_ply_binary_written() -> Result<(), Box<dyn std::error::Error>> {
        let file = NamedTempFile::new()?;
        let points = [[1.0, 2.0, 3.0], [-0.5, 0.25, -4.0]];
        let colors = [[1.0, 0.0, 0.2], [0.0, 1.0, 0.0]];
        write_ply(file.path(), &points, &colors, PlyFormat::BinaryLittleEndian)?;

        let cloud = read_ply(file.path())?;
        assert_eq!(cloud.points(), &points);
        assert_eq!(cloud.colors()[0], [1.0, 0.0, 0.2]);
        assert_eq!(cloud.colors()[1], [0.0, 1.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_read_ply_ascii_float_colors() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        let text = "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nproperty float y\nproperty float z\nproperty float red\nproperty float green\nproperty float blue\nend_header\n1 2 3 0.5 0.25 1\n-1 0 0.5 0 0 0\n";
        file.write_all(text.as_bytes())?;

        let cloud = read_ply(file.path())?;
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.points()[1], [-1.0, 0.0, 0.5]);
        assert_eq!(cloud.colors()[0], [0.5, 0.25, 1.0]);
        Ok(())
    }

    #[test]
    fn test_read_ply_without_colors() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        let header = "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nproperty float intensity\nend_header\n";
        file.write_all(header.as_bytes())?;
        for v in [1.0f32, 2.0, 3.0, 0.5] {
            file.write_all(&v.to_le_bytes())?;
        }

        let cloud = read_ply(file.path())?;
        assert_eq!(cloud.points(), &[[1.0, 2.0, 3.0]]);
        assert_eq!(cloud.colors(), &[[0.0, 0.0, 0.0]]);
        Ok(())
    }

    #[test]
    fn test_read_ply_truncated() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nproperty float y\nproperty float z\nend_header\n1 2 3\n")?;
        assert!(matches!(read_ply(file.path()), Err(PlyError::Malformed(_))));

        let mut file = NamedTempFile::new()?;
        file.write_all(b"ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n\x00\x00")?;
        assert!(matches!(read_ply(file.path()), Err(PlyError::Malformed(_))));
        Ok(())
    }

    #[test]
    fn test_read_ply_huge_vertex_count() -> Result<(), Box<dyn std::error::Error>> {
        let count = usize::MAX / 2;
        for format in ["ascii", "binary_little_endian"] {
            let mut file = NamedTempFile::new()?;
            write!(
                file,
                "ply\nformat {format} 1.0\nelement vertex {count}\nproperty float x\nproperty float y\nproperty float z\nend_header\n1 2 3\n"
            )?;
            assert!(matches!(read_ply(file.path()), Err(PlyError::Malformed(_))));
        }
        Ok(())
    }
}
