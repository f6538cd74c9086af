use depthcloud_image::Image;

/// Map a destination coordinate to the source grid.
///
/// The first and last destination samples are aligned with the first and last
/// source samples, the same spacing as a linspace over `[0, src_len - 1]`.
///
/// # Arguments
///
/// * `dst` - The destination coordinate.
/// * `src_len` - The number of samples in the source axis.
/// * `dst_len` - The number of samples in the destination axis.
///
/// # Returns
///
/// The continuous source coordinate.
#[inline]
pub fn source_coordinate(dst: usize, src_len: usize, dst_len: usize) -> f32 {
    if dst_len <= 1 || src_len <= 1 {
        return 0.0;
    }
    dst as f32 * (src_len - 1) as f32 / (dst_len - 1) as f32
}

/// Kernel for nearest neighbor interpolation
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
///
/// # Returns
///
/// The channels of the nearest source pixel.
pub fn nearest_neighbor_interpolation<T, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
) -> &[T] {
    let (rows, cols) = (image.rows(), image.cols());

    let iu = (u.round().max(0.0) as usize).min(cols - 1);
    let iv = (v.round().max(0.0) as usize).min(rows - 1);

    image.pixel_unchecked(iu, iv)
}
