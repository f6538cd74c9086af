use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::IoError;

/// File extensions recognised as color frames, matched case-insensitively.
pub const COLOR_FRAME_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tiff"];

/// File extensions recognised as depth maps, matched case-insensitively.
///
/// The order is the precedence used when two depth files share a stem.
pub const DEPTH_MAP_EXTENSIONS: [&str; 4] = ["npy", "tiff", "tif", "png"];

/// List the color frames of a directory keyed by file stem.
///
/// # Arguments
///
/// * `dir` - The directory containing the color frames.
///
/// # Returns
///
/// A map from file stem to path. When two frames share a stem the first one in
/// file name order is kept.
pub fn list_color_frames(dir: impl AsRef<Path>) -> Result<BTreeMap<String, PathBuf>, IoError> {
    list_files_by_stem(dir.as_ref(), &COLOR_FRAME_EXTENSIONS, false)
}

/// List the depth maps of a directory keyed by file stem.
///
/// # Arguments
///
/// * `dir` - The directory containing the depth maps.
///
/// # Returns
///
/// A map from file stem to path. When two depth maps share a stem the one whose
/// extension comes first in [`DEPTH_MAP_EXTENSIONS`] is kept.
pub fn list_depth_maps(dir: impl AsRef<Path>) -> Result<BTreeMap<String, PathBuf>, IoError> {
    list_files_by_stem(dir.as_ref(), &DEPTH_MAP_EXTENSIONS, true)
}

/// Check that the given path exists and is a directory.
pub fn ensure_directory(dir: impl AsRef<Path>) -> Result<(), IoError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Err(IoError::FileDoesNotExist(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(IoError::NotADirectory(dir.to_path_buf()));
    }
    Ok(())
}

fn extension_rank(path: &Path, extensions: &[&str]) -> Option<usize> {
    let ext = path.extension()?.to_str()?;
    extensions
        .iter()
        .position(|candidate| ext.eq_ignore_ascii_case(candidate))
}

fn list_files_by_stem(
    dir: &Path,
    extensions: &[&str],
    rank_by_extension: bool,
) -> Result<BTreeMap<String, PathBuf>, IoError> {
    ensure_directory(dir)?;

    let read_dir = std::fs::read_dir(dir).map_err(|e| IoError::FileError(dir.to_path_buf(), e))?;

    let mut candidates = Vec::new();
    for entry in read_dir {
        let path = entry
            .map_err(|e| IoError::FileError(dir.to_path_buf(), e))?
            .path();

        if !path.is_file() {
            continue;
        }

        let Some(rank) = extension_rank(&path, extensions) else {
            continue;
        };

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            log::warn!("Skipping file with a non UTF-8 name: {}", path.display());
            continue;
        };

        let rank = if rank_by_extension { rank } else { 0 };
        candidates.push((stem.to_string(), rank, path));
    }

    candidates.sort_by(|a, b| {
        (&a.0, a.1, a.2.file_name()).cmp(&(&b.0, b.1, b.2.file_name()))
    });

    let mut files: BTreeMap<String, PathBuf> = BTreeMap::new();
    for (stem, _, path) in candidates {
        if let Some(kept) = files.get(&stem) {
            log::warn!(
                "Ignoring {} because {} has the same name",
                path.display(),
                kept.display()
            );
            continue;
        }
        files.insert(stem, path);
    }

    Ok(files)
}
