use depthcloud_image::ImageSize;

/// Error types for the camera module.
///
/// Every variant describes an invalid camera geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    /// The field of view cannot produce a focal length.
    #[error("Invalid geometry: field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f64),

    /// A focal length is zero, negative or not finite.
    #[error("Invalid geometry: focal lengths must be positive, got fx={0} fy={1}")]
    InvalidFocalLength(f64, f64),

    /// The principal point is not finite.
    #[error("Invalid geometry: principal point must be finite, got cx={0} cy={1}")]
    InvalidPrincipalPoint(f64, f64),
}

/// Explicit values that take precedence over the field of view derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntrinsicsOverrides {
    /// Focal length in x, in pixels.
    pub fx: Option<f64>,
    /// Focal length in y, in pixels.
    pub fy: Option<f64>,
    /// Principal point x, in pixels.
    pub cx: Option<f64>,
    /// Principal point y, in pixels.
    pub cy: Option<f64>,
}

/// The intrinsic parameters of a pinhole camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeCameraIntrinsic {
    /// The focal length in the x direction, in pixels
    pub fx: f64,
    /// The focal length in the y direction, in pixels
    pub fy: f64,
    /// The x coordinate of the principal point
    pub cx: f64,
    /// The y coordinate of the principal point
    pub cy: f64,
    /// The resolution the parameters were derived for
    pub image_size: ImageSize,
}

impl std::fmt::Display for PinholeCameraIntrinsic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "fx={:.2}, fy={:.2}, cx={:.2}, cy={:.2}",
            self.fx, self.fy, self.cx, self.cy
        )
    }
}

/// Compute the focal length in pixels from a horizontal field of view.
///
/// `fx = width / (2 * tan(fov / 2))`
///
/// # Arguments
///
/// * `width` - The image width in pixels.
/// * `fov_deg` - The horizontal field of view in degrees, in the open range (0, 180).
pub fn focal_length_from_fov(width: usize, fov_deg: f64) -> Result<f64, CameraError> {
    if !(fov_deg > 0.0 && fov_deg < 180.0) {
        return Err(CameraError::InvalidFieldOfView(fov_deg));
    }
    Ok(width as f64 / (2.0 * (fov_deg.to_radians() / 2.0).tan()))
}

impl PinholeCameraIntrinsic {
    /// Create the intrinsics from explicit values.
    ///
    /// # Errors
    ///
    /// Focal lengths must be positive and finite, the principal point finite.
    pub fn new(
        fx: f64,
        fy: f64,
        cx: f64,
        cy: f64,
        image_size: ImageSize,
    ) -> Result<Self, CameraError> {
        let valid_focal = |f: f64| f.is_finite() && f > 0.0;
        if !valid_focal(fx) || !valid_focal(fy) {
            return Err(CameraError::InvalidFocalLength(fx, fy));
        }
        if !cx.is_finite() || !cy.is_finite() {
            return Err(CameraError::InvalidPrincipalPoint(cx, cy));
        }
        Ok(Self {
            fx,
            fy,
            cx,
            cy,
            image_size,
        })
    }

    /// Resolve the intrinsics of an image from a field of view and optional overrides.
    ///
    /// * `fx` is the override when given, otherwise derived from `fov_deg`.
    /// * `fy` defaults to the resolved `fx`.
    /// * `cx` and `cy` default to the image center.
    ///
    /// The field of view is only validated when it is used.
    ///
    /// # Example
    ///
    /// ```
    /// use depthcloud_3d::camera::{IntrinsicsOverrides, PinholeCameraIntrinsic};
    ///
    /// let overrides = IntrinsicsOverrides::default();
    /// let k = PinholeCameraIntrinsic::from_fov([640, 480].into(), 60.0, &overrides).unwrap();
    ///
    /// assert!((k.fx - 554.26).abs() < 0.01);
    /// assert_eq!(k.fy, k.fx);
    /// assert_eq!((k.cx, k.cy), (320.0, 240.0));
    /// ```
    pub fn from_fov(
        image_size: ImageSize,
        fov_deg: f64,
        overrides: &IntrinsicsOverrides,
    ) -> Result<Self, CameraError> {
        let fx = match overrides.fx {
            Some(fx) => fx,
            None => focal_length_from_fov(image_size.width, fov_deg)?,
        };
        let fy = overrides.fy.unwrap_or(fx);
        let cx = overrides.cx.unwrap_or(image_size.width as f64 / 2.0);
        let cy = overrides.cy.unwrap_or(image_size.height as f64 / 2.0);

        Self::new(fx, fy, cx, cy, image_size)
    }

    /// Back-project a pixel with known depth into camera coordinates.
    ///
    /// The result follows the image convention: x right, y down, z into the scene.
    #[inline]
    pub fn unproject(&self, u: f64, v: f64, depth: f64) -> [f64; 3] {
        [
            (u - self.cx) * depth / self.fx,
            (v - self.cy) * depth / self.fy,
            depth,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_fov_default_center() -> Result<(), CameraError> {
        let k = PinholeCameraIntrinsic::from_fov(
            [640, 480].into(),
            60.0,
            &IntrinsicsOverrides::default(),
        )?;

        // 640 / (2 * tan(30 deg))
        assert_relative_eq!(k.fx, 554.256_258_422_040_8, epsilon = 1e-9);
        assert_eq!(k.fy, k.fx);
        assert_eq!(k.cx, 320.0);
        assert_eq!(k.cy, 240.0);
        assert_eq!(k.image_size, ImageSize { width: 640, height: 480 });

        let again = PinholeCameraIntrinsic::from_fov(
            [640, 480].into(),
            60.0,
            &IntrinsicsOverrides::default(),
        )?;
        assert_eq!(k, again);
        Ok(())
    }

    #[test]
    fn fx_override_ignores_fov() -> Result<(), CameraError> {
        let overrides = IntrinsicsOverrides {
            fx: Some(500.0),
            ..Default::default()
        };
        for fov in [1.0, 60.0, 179.0, 0.0, 360.0, f64::NAN] {
            let k = PinholeCameraIntrinsic::from_fov([640, 480].into(), fov, &overrides)?;
            assert_eq!(k.fx, 500.0);
            assert_eq!(k.fy, 500.0);
        }
        Ok(())
    }

    #[test]
    fn all_overrides() -> Result<(), CameraError> {
        let overrides = IntrinsicsOverrides {
            fx: Some(500.0),
            fy: Some(510.0),
            cx: Some(300.5),
            cy: Some(200.25),
        };
        let k = PinholeCameraIntrinsic::from_fov([640, 480].into(), 60.0, &overrides)?;
        assert_eq!((k.fx, k.fy, k.cx, k.cy), (500.0, 510.0, 300.5, 200.25));
        assert_eq!(k.to_string(), "fx=500.00, fy=510.00, cx=300.50, cy=200.25");
        Ok(())
    }

    #[test]
    fn invalid_fov() {
        let none = IntrinsicsOverrides::default();
        for fov in [0.0, -10.0, 180.0, 200.0] {
            assert_eq!(
                PinholeCameraIntrinsic::from_fov([640, 480].into(), fov, &none),
                Err(CameraError::InvalidFieldOfView(fov))
            );
        }
        assert!(PinholeCameraIntrinsic::from_fov([640, 480].into(), f64::NAN, &none).is_err());
    }

    #[test]
    fn invalid_focal_length() {
        let overrides = IntrinsicsOverrides {
            fx: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(
            PinholeCameraIntrinsic::from_fov([640, 480].into(), 60.0, &overrides),
            Err(CameraError::InvalidFocalLength(-1.0, -1.0))
        );

        let overrides = IntrinsicsOverrides {
            fy: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(
            PinholeCameraIntrinsic::from_fov([640, 480].into(), 60.0, &overrides),
            Err(CameraError::InvalidFocalLength(_, fy)) if fy == 0.0
        ));
    }

    #[test]
    fn unproject_pixel() -> Result<(), CameraError> {
        let k = PinholeCameraIntrinsic::new(2.0, 2.0, 2.0, 2.0, [4, 4].into())?;
        assert_eq!(k.unproject(0.0, 0.0, 1.0), [-1.0, -1.0, 1.0]);
        assert_eq!(k.unproject(3.0, 2.0, 2.0), [1.0, 0.0, 2.0]);
        Ok(())
    }
}
