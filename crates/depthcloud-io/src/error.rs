use std::path::PathBuf;

/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(PathBuf),

    /// Error when a directory was expected.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(PathBuf),

    /// Error to read the file.
    #[error("Failed to read {0}. {1}")]
    FileError(PathBuf, #[source] std::io::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] depthcloud_image::ImageError),

    /// Error to decode a color frame.
    #[error("Failed to decode the image {0}. {1}")]
    ImageDecodeError(PathBuf, #[source] image::ImageError),

    /// Error to decode the PNG image.
    #[error("Failed to decode the png image {0}. {1}")]
    PngDecodeError(PathBuf, String),

    /// Error to decode the TIFF image.
    #[error("Failed to decode the tiff image {0}. {1}")]
    TiffDecodeError(PathBuf, #[source] ::tiff::TiffError),

    /// Error when a `.npy` file is malformed or uses an unsupported layout.
    #[error("Unsupported npy file {0}: {1}")]
    NpyFormat(PathBuf, String),

    /// Error when a depth file decodes to a pixel layout that is not a depth map.
    #[error("Unsupported depth map layout in {0}: {1}")]
    UnsupportedDepthFormat(PathBuf, String),
}
