use super::PlyError;

/// A named scalar property of the vertex element.
#[derive(Debug, PartialEq, Clone)]
pub struct PlyPropertyDefinition {
    /// The property name, e.g. `x` or `red`.
    pub name: String,
    /// The scalar type of the property.
    pub data_type: PlyDataType,
}

/// Scalar types allowed in a PLY property.
#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(missing_docs)]
pub enum PlyDataType {
    Float32,
    Float64,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
}

impl PlyDataType {
    /// Size in bytes of one binary value.
    pub fn size(&self) -> usize {
        match self {
            PlyDataType::Float32 | PlyDataType::Int32 | PlyDataType::UInt32 => 4,
            PlyDataType::Float64 => 8,
            PlyDataType::Int16 | PlyDataType::UInt16 => 2,
            PlyDataType::Int8 | PlyDataType::UInt8 => 1,
        }
    }

    /// Parse a type name as written in a `property` header line.
    pub fn parse(type_str: &str) -> Result<Self, PlyError> {
        match type_str {
            "float" | "float32" => Ok(PlyDataType::Float32),
            "double" | "float64" => Ok(PlyDataType::Float64),
            "char" | "int8" => Ok(PlyDataType::Int8),
            "uchar" | "uint8" => Ok(PlyDataType::UInt8),
            "short" | "int16" => Ok(PlyDataType::Int16),
            "ushort" | "uint16" => Ok(PlyDataType::UInt16),
            "int" | "int32" => Ok(PlyDataType::Int32),
            "uint" | "uint32" => Ok(PlyDataType::UInt32),
            _ => Err(PlyError::UnsupportedProperty(type_str.to_string())),
        }
    }

    /// Whether a color stored with this type is in `0..=255` rather than `[0, 1]`.
    pub fn is_integer(&self) -> bool {
        !matches!(self, PlyDataType::Float32 | PlyDataType::Float64)
    }

    /// Decode one little endian value. `bytes` must hold exactly [`Self::size`] bytes.
    pub(crate) fn read_le(&self, bytes: &[u8]) -> Option<f64> {
        let value = match self {
            PlyDataType::Float32 => f32::from_le_bytes(bytes.try_into().ok()?) as f64,
            PlyDataType::Float64 => f64::from_le_bytes(bytes.try_into().ok()?),
            PlyDataType::Int8 => i8::from_le_bytes(bytes.try_into().ok()?) as f64,
            PlyDataType::UInt8 => u8::from_le_bytes(bytes.try_into().ok()?) as f64,
            PlyDataType::Int16 => i16::from_le_bytes(bytes.try_into().ok()?) as f64,
            PlyDataType::UInt16 => u16::from_le_bytes(bytes.try_into().ok()?) as f64,
            PlyDataType::Int32 => i32::from_le_bytes(bytes.try_into().ok()?) as f64,
            PlyDataType::UInt32 => u32::from_le_bytes(bytes.try_into().ok()?) as f64,
        };
        Some(value)
    }
}

/// Positions of the properties the point cloud reader understands.
#[derive(Debug, PartialEq)]
pub(crate) struct VertexLayout {
    pub xyz: [usize; 3],
    pub rgb: Option<[usize; 3]>,
}

impl VertexLayout {
    pub fn from_properties(properties: &[PlyPropertyDefinition]) -> Result<Self, PlyError> {
        let find = |name: &str| properties.iter().position(|p| p.name == name);

        let xyz = match (find("x"), find("y"), find("z")) {
            (Some(x), Some(y), Some(z)) => [x, y, z],
            _ => {
                return Err(PlyError::Malformed(
                    "vertex element needs x, y and z properties".to_string(),
                ))
            }
        };

        let rgb = match (find("red"), find("green"), find("blue")) {
            (Some(r), Some(g), Some(b)) => Some([r, g, b]),
            _ => None,
        };

        Ok(Self { xyz, rgb })
    }
}
