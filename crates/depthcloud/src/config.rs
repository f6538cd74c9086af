use std::path::{Path, PathBuf};

use depthcloud_3d::{camera::IntrinsicsOverrides, io::ply::PlyFormat};
use serde::{Deserialize, Serialize};

/// Error types for loading and validating a [`PipelineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {0}")]
    Io(PathBuf, #[source] std::io::Error),

    /// The configuration file is not valid JSON for this schema.
    #[error("Failed to parse config file {0}")]
    Parse(PathBuf, #[source] serde_json::Error),

    /// A field holds a value that cannot be used.
    #[error("Invalid config value for `{field}`: {reason}")]
    InvalidValue {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Where projected points are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// All pairs in a single `pointcloud.ply`.
    #[default]
    Merged,
    /// One `<id>.ply` per pair.
    PerFrame,
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merged" => Ok(OutputMode::Merged),
            "per-frame" | "per_frame" => Ok(OutputMode::PerFrame),
            _ => Err(format!("unknown output mode `{s}`, expected merged or per-frame")),
        }
    }
}

/// How pairs whose resolution differs from the first pair are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPolicy {
    /// Intrinsics come from the first pair; other resolutions are skipped.
    #[default]
    Strict,
    /// Intrinsics are resolved again for each pair's resolution.
    PerPair,
}

impl std::str::FromStr for ResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(ResolutionPolicy::Strict),
            "per-pair" | "per_pair" => Ok(ResolutionPolicy::PerPair),
            _ => Err(format!(
                "unknown resolution policy `{s}`, expected strict or per-pair"
            )),
        }
    }
}

/// Parameters of a projection run.
///
/// Every field has a default so a JSON file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Horizontal field of view in degrees, used when `fx` is not given.
    pub fov_deg: f64,
    /// Focal length in x, overrides `fov_deg`.
    pub fx: Option<f64>,
    /// Focal length in y, defaults to the resolved `fx`.
    pub fy: Option<f64>,
    /// Principal point x, defaults to the image center.
    pub cx: Option<f64>,
    /// Principal point y, defaults to the image center.
    pub cy: Option<f64>,
    /// Step between sampled pixels.
    pub pixel_stride: usize,
    /// Optional point budget per pair.
    pub max_points_per_frame: Option<usize>,
    /// Seed for the point budget sampler. Pair `i` uses `seed + i`.
    pub seed: Option<u64>,
    /// Single merged file or one file per pair.
    pub output_mode: OutputMode,
    /// The PLY vertex encoding.
    pub ply_format: PlyFormat,
    /// Handling of pairs with a different resolution.
    pub resolution_policy: ResolutionPolicy,
    /// Depth units per integer sample for PNG and integer TIFF depth maps.
    pub depth_scale: f32,
    /// Project pairs on the rayon thread pool.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fov_deg: 60.0,
            fx: None,
            fy: None,
            cx: None,
            cy: None,
            pixel_stride: 2,
            max_points_per_frame: None,
            seed: None,
            output_mode: OutputMode::default(),
            ply_format: PlyFormat::default(),
            resolution_policy: ResolutionPolicy::default(),
            depth_scale: 0.001,
            parallel: true,
        }
    }
}

impl PipelineConfig {
    /// The explicit intrinsics of this configuration.
    pub fn intrinsics_overrides(&self) -> IntrinsicsOverrides {
        IntrinsicsOverrides {
            fx: self.fx,
            fy: self.fy,
            cx: self.cx,
            cy: self.cy,
        }
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self =
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that can be checked without looking at any frame.
    ///
    /// The field of view is only checked when no `fx` override is given.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pixel_stride == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pixel_stride",
                reason: "must be >= 1".to_string(),
            });
        }
        if self.max_points_per_frame == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "max_points_per_frame",
                reason: "must be >= 1 when set".to_string(),
            });
        }
        if self.fx.is_none() && !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(ConfigError::InvalidValue {
                field: "fov_deg",
                reason: format!("must be in (0, 180), got {}", self.fov_deg),
            });
        }
        if !(self.depth_scale.is_finite() && self.depth_scale > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "depth_scale",
                reason: format!("must be positive, got {}", self.depth_scale),
            });
        }
        let overrides = [
            ("fx", self.fx),
            ("fy", self.fy),
            ("cx", self.cx),
            ("cy", self.cy),
        ];
        for (field, value) in overrides {
            let Some(value) = value else {
                continue;
            };
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be finite, got {value}"),
                });
            }
            if matches!(field, "fx" | "fy") && value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        Ok(())
    }
}
