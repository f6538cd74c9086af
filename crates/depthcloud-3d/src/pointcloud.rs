/// Errors raised when building a point cloud.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PointCloudError {
    /// Every point needs exactly one color.
    #[error("Point cloud has {points} points but {colors} colors")]
    LengthMismatch {
        /// Number of points.
        points: usize,
        /// Number of colors.
        colors: usize,
    },
}

/// A point cloud with one RGB color per point.
///
/// Colors are stored as floats in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
    // The colors of the points.
    colors: Vec<[f32; 3]>,
}

impl PointCloud {
    /// Create a new point cloud from matching points and colors.
    ///
    /// # Errors
    ///
    /// Returns [`PointCloudError::LengthMismatch`] if the lengths differ.
    pub fn new(points: Vec<[f64; 3]>, colors: Vec<[f32; 3]>) -> Result<Self, PointCloudError> {
        if points.len() != colors.len() {
            return Err(PointCloudError::LengthMismatch {
                points: points.len(),
                colors: colors.len(),
            });
        }
        Ok(Self { points, colors })
    }

    /// Create an empty point cloud.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Get as reference the colors of the points in the point cloud.
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Append the points of another cloud, keeping their order.
    pub fn append(&mut self, other: PointCloud) {
        self.points.extend(other.points);
        self.colors.extend(other.colors);
    }

    /// Concatenate clouds in iteration order.
    pub fn concat(clouds: impl IntoIterator<Item = PointCloud>) -> Self {
        clouds.into_iter().fold(Self::empty(), |mut acc, cloud| {
            acc.append(cloud);
            acc
        })
    }

    /// Get the minimum bound of the point cloud, or `None` if empty.
    pub fn min_bound(&self) -> Option<[f64; 3]> {
        self.fold_bound(f64::min)
    }

    /// Get the maximum bound of the point cloud, or `None` if empty.
    pub fn max_bound(&self) -> Option<[f64; 3]> {
        self.fold_bound(f64::max)
    }

    fn fold_bound(&self, f: impl Fn(f64, f64) -> f64) -> Option<[f64; 3]> {
        let (first, rest) = self.points.split_first()?;
        Some(rest.iter().fold(*first, |acc, p| {
            [f(acc[0], p[0]), f(acc[1], p[1]), f(acc[2], p[2])]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointcloud() -> Result<(), PointCloudError> {
        let cloud = PointCloud::new(
            vec![[1.0, -2.0, 3.0], [-4.0, 5.0, 0.5]],
            vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        )?;
        assert_eq!(cloud.len(), 2);
        assert!(!cloud.is_empty());
        assert_eq!(cloud.min_bound(), Some([-4.0, -2.0, 0.5]));
        assert_eq!(cloud.max_bound(), Some([1.0, 5.0, 3.0]));
        Ok(())
    }

    #[test]
    fn test_pointcloud_length_mismatch() {
        let result = PointCloud::new(vec![[0.0; 3]; 2], vec![[0.0; 3]]);
        assert_eq!(
            result,
            Err(PointCloudError::LengthMismatch {
                points: 2,
                colors: 1
            })
        );
    }

    #[test]
    fn test_pointcloud_concat_keeps_order() -> Result<(), PointCloudError> {
        let a = PointCloud::new(vec![[1.0; 3]], vec![[0.1; 3]])?;
        let b = PointCloud::new(vec![[2.0; 3], [3.0; 3]], vec![[0.2; 3], [0.3; 3]])?;
        let merged = PointCloud::concat([a, PointCloud::empty(), b]);
        assert_eq!(merged.points(), &[[1.0; 3], [2.0; 3], [3.0; 3]]);
        assert_eq!(merged.colors(), &[[0.1; 3], [0.2; 3], [0.3; 3]]);
        assert_eq!(PointCloud::empty().min_bound(), None);
        Ok(())
    }
}
