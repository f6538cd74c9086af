use std::path::Path;

use depthcloud_image::{Image, ImageSize, Rgb8};

use crate::error::IoError;

/// Reads a color frame from the given file path as an RGB8 image.
///
/// The method tries to read from any image format supported by the image crate and
/// converts grayscale, alpha and 16-bit frames to 8-bit RGB.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An RGB8 image containing the frame.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Rgb8, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)
        .map_err(|e| IoError::FileError(file_path.to_path_buf(), e))?
        .with_guessed_format()
        .map_err(|e| IoError::FileError(file_path.to_path_buf(), e))?
        .decode()
        .map_err(|e| IoError::ImageDecodeError(file_path.to_path_buf(), e))?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_any_png_rgb8() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("frame_000000.png");

        let pixels = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 10, 20, 30];
        image::RgbImage::from_raw(2, 2, pixels.clone())
            .ok_or("invalid buffer")?
            .save(&file_path)?;

        let image = read_image_any_rgb8(&file_path)?;
        assert_eq!(image.size(), ImageSize { width: 2, height: 2 });
        assert_eq!(image.as_slice(), pixels.as_slice());
        Ok(())
    }

    #[test]
    fn read_any_gray_expands_to_rgb() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gray.png");

        image::GrayImage::from_raw(2, 1, vec![7, 200])
            .ok_or("invalid buffer")?
            .save(&file_path)?;

        let image = read_image_any_rgb8(&file_path)?;
        assert_eq!(image.as_slice(), &[7, 7, 7, 200, 200, 200]);
        Ok(())
    }

    #[test]
    fn read_any_missing_file() {
        let result = read_image_any_rgb8("does/not/exist.jpg");
        assert!(matches!(result, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn read_any_garbage_reports_path() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("broken.jpg");
        std::fs::write(&file_path, b"not an image")?;

        match read_image_any_rgb8(&file_path) {
            Err(IoError::ImageDecodeError(path, _)) => assert_eq!(path, file_path),
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    }
}
