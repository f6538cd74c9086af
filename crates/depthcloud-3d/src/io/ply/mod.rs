mod parser;
mod properties;
mod writer;

pub use parser::*;
pub use properties::*;
pub use writer::*;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Error types for the PLY module.
#[derive(Debug, thiserror::Error)]
pub enum PlyError {
    /// Failed to read or write a PLY file
    #[error("Failed to access PLY file {0}")]
    Io(PathBuf, #[source] std::io::Error),

    /// Points and colors have different lengths
    #[error("Cannot write {points} points with {colors} colors")]
    InvariantViolation {
        /// Number of points.
        points: usize,
        /// Number of colors.
        colors: usize,
    },

    /// The PLY header or body is malformed
    #[error("Malformed PLY file: {0}")]
    Malformed(String),

    /// Unsupported PLY property
    #[error("Unsupported PLY property: {0}")]
    UnsupportedProperty(String),
}

/// Encoding of the vertex data of a PLY file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlyFormat {
    /// Little endian binary vertex records
    #[default]
    #[serde(alias = "binary")]
    BinaryLittleEndian,
    /// One whitespace separated vertex per line
    Ascii,
}

impl PlyFormat {
    /// The name used on the `format` header line.
    pub fn as_header_str(&self) -> &'static str {
        match self {
            PlyFormat::BinaryLittleEndian => "binary_little_endian",
            PlyFormat::Ascii => "ascii",
        }
    }
}
