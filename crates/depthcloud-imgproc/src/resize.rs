use rayon::prelude::*;

use crate::interpolation::{nearest_neighbor_interpolation, source_coordinate};
use depthcloud_image::{Image, ImageError, ImageSize};

/// Resize an image to a new size using nearest neighbor interpolation.
///
/// Every output pixel is a copy of one source pixel, the sampling grid spans the
/// source corner to corner. Output rows are filled in parallel.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `new_size` - The size of the output image.
///
/// # Returns
///
/// The resized image with the new size.
///
/// # Example
///
/// ```
/// use depthcloud_image::{Image, ImageSize};
/// use depthcloud_imgproc::resize::resize_nearest;
///
/// let image = Image::<u8, 3>::new([4, 5].into(), vec![0u8; 4 * 5 * 3]).unwrap();
///
/// let image_resized = resize_nearest(&image, [2, 3].into()).unwrap();
///
/// assert_eq!(image_resized.num_channels(), 3);
/// assert_eq!(image_resized.size().width, 2);
/// assert_eq!(image_resized.size().height, 3);
/// ```
pub fn resize_nearest<T, const C: usize>(
    src: &Image<T, C>,
    new_size: ImageSize,
) -> Result<Image<T, C>, ImageError>
where
    T: Copy + Send + Sync,
{
    if new_size.width == 0 || new_size.height == 0 {
        return Err(ImageError::EmptyImageSize(new_size.width, new_size.height));
    }

    if src.size() == new_size {
        return Ok(src.clone());
    }

    let row_stride = new_size.width * C;
    let mut data = vec![src.as_slice()[0]; new_size.height * row_stride];

    data.par_chunks_exact_mut(row_stride)
        .enumerate()
        .for_each(|(y, row)| {
            let v = source_coordinate(y, src.height(), new_size.height);
            row.chunks_exact_mut(C).enumerate().for_each(|(x, out)| {
                let u = source_coordinate(x, src.width(), new_size.width);
                out.copy_from_slice(nearest_neighbor_interpolation(src, u, v));
            });
        });

    Image::new(new_size, data)
}
