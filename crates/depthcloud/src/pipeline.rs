use std::path::{Path, PathBuf};

use depthcloud_3d::{
    camera::{CameraError, PinholeCameraIntrinsic},
    io::ply::{write_ply_pointcloud, PlyError},
    pointcloud::PointCloud,
    sampler::RandomSampler,
    unproject::{unproject_rgbd, UnprojectConfig, UnprojectError},
};
use depthcloud_image::Depthf32;
use depthcloud_io::{
    depth::read_depth_map,
    dir::{ensure_directory, list_color_frames, list_depth_maps},
    functional::read_image_any_rgb8,
    IoError,
};
use rayon::prelude::*;

use crate::{
    config::{ConfigError, OutputMode, PipelineConfig, ResolutionPolicy},
    pairing::{pair_frames, FramePair, FramePairs, PairingError},
};

/// File name of the point cloud written in [`OutputMode::Merged`].
pub const MERGED_FILE_NAME: &str = "pointcloud.ply";

/// Number of missing identifiers listed individually in the log.
const MISSING_LOG_LIMIT: usize = 5;

/// Error types for a projection run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// An input directory does not exist.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// An input path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The output directory could not be created.
    #[error("Failed to create output directory {0}")]
    CreateOutputDir(PathBuf, #[source] std::io::Error),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No frame could be paired with a depth map.
    #[error(transparent)]
    Pairing(#[from] PairingError),

    /// The intrinsics cannot be resolved.
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// A frame or depth map could not be read.
    #[error(transparent)]
    Io(#[from] IoError),

    /// A pair could not be projected.
    #[error("Failed to project pair {0}")]
    Unproject(String, #[source] UnprojectError),

    /// A point cloud could not be written.
    #[error(transparent)]
    Ply(#[from] PlyError),
}

/// What happened during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Identifiers of the matched pairs, ascending.
    pub pairs: Vec<String>,
    /// Identifiers of color frames without a depth map.
    pub missing: Vec<String>,
    /// Identifiers of pairs that were skipped.
    pub skipped: Vec<String>,
    /// Identifiers of pairs without a single valid depth pixel, left out of the output.
    pub empty: Vec<String>,
    /// Total number of points written.
    pub points: usize,
    /// The files written, in pair order.
    pub outputs: Vec<PathBuf>,
}

type PathPair = FramePair<PathBuf, PathBuf>;

/// A projected pair, or `None` when the pair was skipped.
type PairOutcome = (String, Option<PointCloud>);

/// Project every color frame with a matching depth map and write the result.
///
/// The intrinsics are resolved once from the depth resolution of the first pair.
/// Pairs are projected independently, in parallel if `config.parallel` is set, and
/// always assembled in identifier order.
///
/// # Arguments
///
/// * `frames_dir` - Directory with the color frames.
/// * `depth_dir` - Directory with the depth maps, named after the frames.
/// * `out_dir` - Directory receiving the PLY files, created if needed.
/// * `config` - The run parameters.
///
/// # Errors
///
/// Configuration, geometry, read and write failures abort the run. Frames without
/// depth and pairs with a mismatching resolution are reported in the summary instead.
pub fn run(
    frames_dir: impl AsRef<Path>,
    depth_dir: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<RunSummary, PipelineError> {
    let frames_dir = frames_dir.as_ref();
    let depth_dir = depth_dir.as_ref();
    let out_dir = out_dir.as_ref();

    config.validate()?;
    check_input_directory(frames_dir)?;
    check_input_directory(depth_dir)?;

    let colors = list_color_frames(frames_dir)?;
    let depths = list_depth_maps(depth_dir)?;
    log::debug!(
        "Found {} color frames and {} depth maps",
        colors.len(),
        depths.len()
    );

    let FramePairs { pairs, missing } = match pair_frames(colors, depths) {
        Ok(matched) => matched,
        Err(err) => {
            if let PairingError::NoPairsFound { missing } = &err {
                log_missing(missing);
            }
            return Err(err.into());
        }
    };

    log::info!("Found {} frame/depth pairs", pairs.len());
    log_missing(&missing);

    std::fs::create_dir_all(out_dir)
        .map_err(|e| PipelineError::CreateOutputDir(out_dir.to_path_buf(), e))?;
    log::info!("Output directory: {}", out_dir.display());

    let first_depth = match pairs.first() {
        Some(first) => read_depth_map(&first.depth, config.depth_scale)?,
        None => return Err(PairingError::NoPairsFound { missing }.into()),
    };
    let intrinsics = PinholeCameraIntrinsic::from_fov(
        first_depth.size(),
        config.fov_deg,
        &config.intrinsics_overrides(),
    )?;
    log::info!("Camera intrinsics: {intrinsics}");

    let project = |(index, pair): (usize, &PathPair)| -> Result<PairOutcome, PipelineError> {
        let depth = if index == 0 {
            first_depth.clone()
        } else {
            read_depth_map(&pair.depth, config.depth_scale)?
        };
        let cloud = project_pair(index, pair, depth, &intrinsics, config)?;
        Ok((pair.id.clone(), cloud))
    };

    let outcomes = if config.parallel {
        pairs
            .par_iter()
            .enumerate()
            .map(project)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        pairs
            .iter()
            .enumerate()
            .map(project)
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut summary = RunSummary {
        pairs: pairs.into_iter().map(|p| p.id).collect(),
        missing,
        ..Default::default()
    };

    let mut projected = Vec::with_capacity(outcomes.len());
    for (id, cloud) in outcomes {
        match cloud {
            Some(cloud) if cloud.is_empty() => summary.empty.push(id),
            Some(cloud) => projected.push((id, cloud)),
            None => summary.skipped.push(id),
        }
    }

    match config.output_mode {
        OutputMode::Merged => {
            let merged = PointCloud::concat(projected.into_iter().map(|(_, cloud)| cloud));
            if merged.is_empty() {
                log::warn!("No valid points in any pair, writing an empty point cloud");
            }
            let path = out_dir.join(MERGED_FILE_NAME);
            write_ply_pointcloud(&path, &merged, config.ply_format)?;
            summary.points = merged.len();
            summary.outputs.push(path);
        }
        OutputMode::PerFrame => {
            for (id, cloud) in projected {
                let path = out_dir.join(format!("{id}.ply"));
                write_ply_pointcloud(&path, &cloud, config.ply_format)?;
                summary.points += cloud.len();
                summary.outputs.push(path);
            }
        }
    }

    log::info!(
        "Wrote {} points from {} pairs to {} file(s)",
        summary.points,
        summary.pairs.len() - summary.skipped.len() - summary.empty.len(),
        summary.outputs.len()
    );

    Ok(summary)
}

/// Project a single pair, returning `None` if it has to be skipped.
fn project_pair(
    index: usize,
    pair: &PathPair,
    depth: Depthf32,
    intrinsics: &PinholeCameraIntrinsic,
    config: &PipelineConfig,
) -> Result<Option<PointCloud>, PipelineError> {
    let color = read_image_any_rgb8(&pair.color)?;

    let intrinsics = match config.resolution_policy {
        ResolutionPolicy::Strict if depth.size() != intrinsics.image_size => {
            log::warn!(
                "Skipping {}: depth resolution {} differs from {} used for the intrinsics",
                pair.id,
                depth.size(),
                intrinsics.image_size
            );
            return Ok(None);
        }
        ResolutionPolicy::Strict => *intrinsics,
        ResolutionPolicy::PerPair if depth.size() == intrinsics.image_size => *intrinsics,
        ResolutionPolicy::PerPair => {
            let resolved = PinholeCameraIntrinsic::from_fov(
                depth.size(),
                config.fov_deg,
                &config.intrinsics_overrides(),
            )?;
            log::debug!("Intrinsics for {} at {}: {resolved}", pair.id, depth.size());
            resolved
        }
    };

    let unproject_config = UnprojectConfig {
        pixel_stride: config.pixel_stride,
        max_points: config.max_points_per_frame,
    };
    let mut sampler = RandomSampler::new(config.seed.map(|seed| seed.wrapping_add(index as u64)));

    let cloud = match unproject_rgbd(&color, &depth, &intrinsics, &unproject_config, &mut sampler)
    {
        Ok(cloud) => cloud,
        Err(err @ UnprojectError::InvariantViolation(_)) => {
            log::warn!("Skipping {}: {err}", pair.id);
            return Ok(None);
        }
        Err(err) => return Err(PipelineError::Unproject(pair.id.clone(), err)),
    };

    match (cloud.min_bound(), cloud.max_bound()) {
        (Some(min), Some(max)) => {
            log::debug!("{}: {} points, bounds {min:?} .. {max:?}", pair.id, cloud.len());
        }
        _ => log::warn!("No valid depth in {}", pair.id),
    }

    Ok(Some(cloud))
}

fn check_input_directory(dir: &Path) -> Result<(), PipelineError> {
    ensure_directory(dir).map_err(|err| match err {
        IoError::FileDoesNotExist(path) => PipelineError::DirectoryNotFound(path),
        IoError::NotADirectory(path) => PipelineError::NotADirectory(path),
        other => PipelineError::Io(other),
    })
}

fn log_missing(missing: &[String]) {
    if missing.is_empty() {
        return;
    }
    log::warn!("{} frames without matching depth maps:", missing.len());
    for id in missing.iter().take(MISSING_LOG_LIMIT) {
        log::warn!("  - {id}");
    }
    if missing.len() > MISSING_LOG_LIMIT {
        log::warn!("  ... and {} more", missing.len() - MISSING_LOG_LIMIT);
    }
}
