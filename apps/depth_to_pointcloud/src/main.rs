use std::path::PathBuf;

use argh::FromArgs;
use depthcloud::{k3d::io::ply::PlyFormat, run, OutputMode, PipelineConfig, ResolutionPolicy};

/// Generate a colored point cloud from frames and depth maps
#[derive(Debug, FromArgs)]
struct Args {
    /// directory containing the color frames
    #[argh(option)]
    frames_dir: PathBuf,

    /// directory containing the depth maps (.npy, .tiff or 16-bit .png)
    #[argh(option)]
    depth_dir: PathBuf,

    /// output directory for the point cloud
    #[argh(option)]
    out_dir: PathBuf,

    /// JSON file with the run configuration, overridden by the flags below
    #[argh(option)]
    config: Option<PathBuf>,

    /// horizontal field of view in degrees (default: 60)
    #[argh(option)]
    fov_deg: Option<f64>,

    /// explicit focal length x, overrides --fov-deg
    #[argh(option)]
    fx: Option<f64>,

    /// explicit focal length y (default: fx)
    #[argh(option)]
    fy: Option<f64>,

    /// principal point x (default: image width / 2)
    #[argh(option)]
    cx: Option<f64>,

    /// principal point y (default: image height / 2)
    #[argh(option)]
    cy: Option<f64>,

    /// step between sampled pixels (default: 2)
    #[argh(option)]
    pixel_stride: Option<usize>,

    /// maximum number of points kept per frame
    #[argh(option)]
    max_points: Option<usize>,

    /// seed for the point budget sampling
    #[argh(option)]
    seed: Option<u64>,

    /// merged or per-frame (default: merged)
    #[argh(option)]
    output_mode: Option<OutputMode>,

    /// strict or per-pair (default: strict)
    #[argh(option)]
    resolution_policy: Option<ResolutionPolicy>,

    /// depth per integer unit of 16-bit depth maps (default: 0.001)
    #[argh(option)]
    depth_scale: Option<f32>,

    /// write ascii instead of binary PLY
    #[argh(switch)]
    ascii: bool,

    /// project the pairs on a single thread
    #[argh(switch)]
    serial: bool,
}

impl Args {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(fov_deg) = self.fov_deg {
            config.fov_deg = fov_deg;
        }
        config.fx = self.fx.or(config.fx);
        config.fy = self.fy.or(config.fy);
        config.cx = self.cx.or(config.cx);
        config.cy = self.cy.or(config.cy);
        if let Some(pixel_stride) = self.pixel_stride {
            config.pixel_stride = pixel_stride;
        }
        config.max_points_per_frame = self.max_points.or(config.max_points_per_frame);
        config.seed = self.seed.or(config.seed);
        if let Some(output_mode) = self.output_mode {
            config.output_mode = output_mode;
        }
        if let Some(resolution_policy) = self.resolution_policy {
            config.resolution_policy = resolution_policy;
        }
        if let Some(depth_scale) = self.depth_scale {
            config.depth_scale = depth_scale;
        }
        if self.ascii {
            config.ply_format = PlyFormat::Ascii;
        }
        if self.serial {
            config.parallel = false;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    args.apply(&mut config);
    log::debug!("Run configuration: {config:?}");

    let summary = run(&args.frames_dir, &args.depth_dir, &args.out_dir, &config)?;

    if !summary.skipped.is_empty() {
        log::warn!("Skipped {} pairs: {:?}", summary.skipped.len(), summary.skipped);
    }
    for path in &summary.outputs {
        log::info!("Saved {}", path.display());
    }

    Ok(())
}
