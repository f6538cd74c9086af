use std::path::Path;

use depthcloud_image::{Depthf32, Image, ImageSize};

use crate::error::IoError;

const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Element types supported in `.npy` depth files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpyDtype {
    /// little-endian 32-bit float (`<f4`)
    Float32,
    /// little-endian 64-bit float (`<f8`)
    Float64,
    /// 8-bit unsigned integer (`|u1`)
    UInt8,
    /// little-endian 16-bit unsigned integer (`<u2`)
    UInt16,
    /// little-endian 32-bit signed integer (`<i4`)
    Int32,
}

impl NpyDtype {
    fn parse(descr: &str) -> Result<Self, String> {
        if !descr.is_ascii() {
            return Err(format!("unsupported dtype '{descr}'"));
        }
        let (order, kind) = descr.split_at(descr.len().min(1));
        let dtype = match kind {
            "f4" => NpyDtype::Float32,
            "f8" => NpyDtype::Float64,
            "u1" => NpyDtype::UInt8,
            "u2" => NpyDtype::UInt16,
            "i4" => NpyDtype::Int32,
            _ => return Err(format!("unsupported dtype '{descr}'")),
        };

        // single byte types carry no byte order
        let little_endian = matches!(order, "<" | "=") || (order == "|" && dtype.size() == 1);
        if !little_endian {
            return Err(format!("unsupported byte order in dtype '{descr}'"));
        }

        Ok(dtype)
    }

    /// Size in bytes of one element.
    pub fn size(&self) -> usize {
        match self {
            NpyDtype::Float64 => 8,
            NpyDtype::Float32 | NpyDtype::Int32 => 4,
            NpyDtype::UInt16 => 2,
            NpyDtype::UInt8 => 1,
        }
    }
}

/// The header of a `.npy` file.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyHeader {
    /// The element type.
    pub dtype: NpyDtype,
    /// The array shape.
    pub shape: Vec<usize>,
    /// Byte offset of the array data.
    pub data_offset: usize,
}

// extract the raw text of a dictionary value, e.g. `'<f4'` or `(480, 640)`
fn dict_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let start = header
        .find(&format!("'{key}'"))
        .or_else(|| header.find(&format!("\"{key}\"")))?;
    let rest = &header[start + key.len() + 2..];
    let rest = rest.trim_start().strip_prefix(':')?.trim_start();

    let end = match rest.chars().next()? {
        '(' => rest.find(')')? + 1,
        quote @ ('\'' | '"') => rest[1..].find(quote)? + 2,
        _ => rest.find([',', '}']).unwrap_or(rest.len()),
    };

    Some(rest[..end].trim())
}

fn parse_shape(value: &str) -> Result<Vec<usize>, String> {
    let inner = value
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| format!("malformed shape '{value}'"))?;

    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| format!("malformed shape '{value}'"))
        })
        .collect()
}

/// Parse the header of a `.npy` buffer.
///
/// Versions 1.0, 2.0 and 3.0 of the format are supported. Fortran ordered arrays are
/// rejected.
pub fn parse_header(bytes: &[u8]) -> Result<NpyHeader, String> {
    if bytes.len() < 10 || &bytes[..6] != NPY_MAGIC {
        return Err("missing NUMPY magic string".to_string());
    }

    let (header_len, header_start) = match bytes[6] {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err("truncated header".to_string());
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        major => return Err(format!("unsupported format version {major}.{}", bytes[7])),
    };

    let data_offset = header_start + header_len;
    let header = bytes
        .get(header_start..data_offset)
        .ok_or_else(|| "truncated header".to_string())?;
    let header = std::str::from_utf8(header).map_err(|_| "header is not valid text".to_string())?;

    let descr = dict_value(header, "descr").ok_or("missing 'descr' entry")?;
    let descr = descr.trim_matches(|c| c == '\'' || c == '"');
    let dtype = NpyDtype::parse(descr)?;

    let fortran_order = dict_value(header, "fortran_order").ok_or("missing 'fortran_order' entry")?;
    if fortran_order != "False" {
        return Err("fortran ordered arrays are not supported".to_string());
    }

    let shape = dict_value(header, "shape").ok_or("missing 'shape' entry")?;
    let shape = parse_shape(shape)?;

    Ok(NpyHeader {
        dtype,
        shape,
        data_offset,
    })
}

// accepts (H, W), (H, W, 1) and (1, H, W)
fn depth_size(shape: &[usize]) -> Result<ImageSize, String> {
    let (height, width) = match *shape {
        [h, w] => (h, w),
        [h, w, 1] => (h, w),
        [1, h, w] => (h, w),
        _ => return Err(format!("expected a (H, W) array, got shape {shape:?}")),
    };
    Ok(ImageSize { width, height })
}

fn decode_values(dtype: NpyDtype, data: &[u8]) -> Vec<f32> {
    match dtype {
        NpyDtype::Float32 => data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        NpyDtype::Float64 => data
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32)
            .collect(),
        NpyDtype::UInt8 => data.iter().map(|&b| b as f32).collect(),
        NpyDtype::UInt16 => data
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]) as f32)
            .collect(),
        NpyDtype::Int32 => data
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32)
            .collect(),
    }
}

/// Decode a depth map from the bytes of a `.npy` file.
///
/// Values are taken verbatim and converted to `f32`, no scaling is applied.
pub fn decode_npy_depth(bytes: &[u8]) -> Result<Depthf32, String> {
    let header = parse_header(bytes)?;
    let size = depth_size(&header.shape)?;

    let expected = size
        .width
        .checked_mul(size.height)
        .and_then(|n| n.checked_mul(header.dtype.size()))
        .ok_or_else(|| format!("shape {:?} is too large", header.shape))?;
    let data = &bytes[header.data_offset.min(bytes.len())..];
    if data.len() != expected {
        return Err(format!(
            "expected {expected} bytes of array data, found {}",
            data.len()
        ));
    }

    Image::new(size, decode_values(header.dtype, data)).map_err(|e| e.to_string())
}

/// Read a depth map stored as a NumPy `.npy` array.
///
/// # Arguments
///
/// * `file_path` - The path to the `.npy` file.
///
/// # Returns
///
/// The depth map as a single channel `f32` image.
pub fn read_depth_npy(file_path: impl AsRef<Path>) -> Result<Depthf32, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let bytes =
        std::fs::read(file_path).map_err(|e| IoError::FileError(file_path.to_path_buf(), e))?;

    decode_npy_depth(&bytes).map_err(|msg| IoError::NpyFormat(file_path.to_path_buf(), msg))
}
