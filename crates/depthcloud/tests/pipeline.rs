use std::path::Path;

use depthcloud::{
    k3d::io::ply::{read_ply, PlyFormat},
    pipeline::MERGED_FILE_NAME,
    run, OutputMode, PairingError, PipelineConfig, PipelineError, ResolutionPolicy,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Serialize a little endian `f32` array as a version 1.0 `.npy` file.
fn write_npy(path: &Path, height: usize, width: usize, values: &[f32]) -> std::io::Result<()> {
    let mut header = format!(
        "{{'descr': '<f4', 'fortran_order': False, 'shape': ({height}, {width}), }}"
    );
    let unpadded = 10 + header.len() + 1;
    header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
    header.push('\n');

    let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    std::fs::write(path, bytes)
}

fn write_frame(path: &Path, width: u32, height: u32, rgb: [u8; 3]) -> TestResult {
    image::RgbImage::from_pixel(width, height, image::Rgb(rgb)).save(path)?;
    Ok(())
}

struct Scene {
    _tmp: tempfile::TempDir,
    frames: std::path::PathBuf,
    depth: std::path::PathBuf,
    out: std::path::PathBuf,
}

impl Scene {
    fn new() -> std::io::Result<Self> {
        let tmp = tempfile::tempdir()?;
        let frames = tmp.path().join("frames");
        let depth = tmp.path().join("depth");
        std::fs::create_dir(&frames)?;
        std::fs::create_dir(&depth)?;
        let out = tmp.path().join("out").join("clouds");
        Ok(Self {
            _tmp: tmp,
            frames,
            depth,
            out,
        })
    }
}

fn unit_config() -> PipelineConfig {
    PipelineConfig {
        fx: Some(2.0),
        fy: Some(2.0),
        cx: Some(2.0),
        cy: Some(2.0),
        pixel_stride: 1,
        ply_format: PlyFormat::Ascii,
        parallel: false,
        ..Default::default()
    }
}

#[test]
fn frames_without_depth_are_reported_not_fatal() -> TestResult {
    let scene = Scene::new()?;
    write_frame(&scene.frames.join("a.png"), 4, 4, [255, 0, 0])?;
    write_frame(&scene.frames.join("b.png"), 4, 4, [0, 255, 0])?;
    write_npy(&scene.depth.join("a.npy"), 4, 4, &[1.0; 16])?;

    let summary = run(&scene.frames, &scene.depth, &scene.out, &unit_config())?;

    assert_eq!(summary.pairs, vec!["a"]);
    assert_eq!(summary.missing, vec!["b"]);
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.points, 16);
    assert_eq!(summary.outputs, vec![scene.out.join(MERGED_FILE_NAME)]);

    let cloud = read_ply(&summary.outputs[0])?;
    assert_eq!(cloud.len(), 16);
    assert_eq!(cloud.points()[0], [-1.0, 1.0, -1.0]);
    assert!(cloud.colors().iter().all(|c| *c == [1.0, 0.0, 0.0]));
    Ok(())
}

#[test]
fn merged_cloud_follows_pair_order() -> TestResult {
    let scene = Scene::new()?;
    for (id, rgb, z) in [("f1", [255, 0, 0], 1.0), ("f0", [0, 0, 255], 2.0)] {
        write_frame(&scene.frames.join(format!("{id}.jpg")), 4, 4, rgb)?;
        write_npy(&scene.depth.join(format!("{id}.npy")), 4, 4, &[z; 16])?;
    }

    let config = PipelineConfig {
        pixel_stride: 2,
        parallel: true,
        ..unit_config()
    };
    let summary = run(&scene.frames, &scene.depth, &scene.out, &config)?;
    assert_eq!(summary.pairs, vec!["f0", "f1"]);
    assert_eq!(summary.points, 8);

    let cloud = read_ply(scene.out.join(MERGED_FILE_NAME))?;
    let depths = cloud.points().iter().map(|p| p[2]).collect::<Vec<_>>();
    assert_eq!(depths, vec![-2.0, -2.0, -2.0, -2.0, -1.0, -1.0, -1.0, -1.0]);
    Ok(())
}

#[test]
fn per_frame_output_with_seeded_budget() -> TestResult {
    let scene = Scene::new()?;
    for id in ["a", "b"] {
        write_frame(&scene.frames.join(format!("{id}.png")), 8, 8, [10, 20, 30])?;
        let values = (0..64).map(|i| 1.0 + i as f32).collect::<Vec<_>>();
        write_npy(&scene.depth.join(format!("{id}.npy")), 8, 8, &values)?;
    }

    let config = PipelineConfig {
        output_mode: OutputMode::PerFrame,
        max_points_per_frame: Some(5),
        seed: Some(3),
        ply_format: PlyFormat::BinaryLittleEndian,
        ..unit_config()
    };

    let serial = run(&scene.frames, &scene.depth, &scene.out, &config)?;
    assert_eq!(
        serial.outputs,
        vec![scene.out.join("a.ply"), scene.out.join("b.ply")]
    );
    assert_eq!(serial.points, 10);

    let parallel_out = scene.out.with_file_name("parallel");
    let parallel = run(
        &scene.frames,
        &scene.depth,
        &parallel_out,
        &PipelineConfig {
            parallel: true,
            ..config.clone()
        },
    )?;
    assert_eq!(parallel.points, 10);

    for name in ["a.ply", "b.ply"] {
        let serial_bytes = std::fs::read(scene.out.join(name))?;
        let parallel_bytes = std::fs::read(parallel_out.join(name))?;
        assert_eq!(serial_bytes, parallel_bytes);
        assert_eq!(read_ply(scene.out.join(name))?.len(), 5);
    }
    Ok(())
}

#[test]
fn resolution_policy_controls_mismatched_pairs() -> TestResult {
    let scene = Scene::new()?;
    write_frame(&scene.frames.join("a.png"), 4, 4, [0, 0, 0])?;
    write_frame(&scene.frames.join("b.png"), 2, 2, [0, 0, 0])?;
    write_npy(&scene.depth.join("a.npy"), 4, 4, &[1.0; 16])?;
    write_npy(&scene.depth.join("b.npy"), 2, 2, &[1.0; 4])?;

    let config = PipelineConfig {
        fx: None,
        fy: None,
        cx: None,
        cy: None,
        ..unit_config()
    };

    let strict = run(&scene.frames, &scene.depth, &scene.out, &config)?;
    assert_eq!(strict.skipped, vec!["b"]);
    assert_eq!(strict.points, 16);

    let per_pair = run(
        &scene.frames,
        &scene.depth,
        &scene.out,
        &PipelineConfig {
            resolution_policy: ResolutionPolicy::PerPair,
            ..config
        },
    )?;
    assert!(per_pair.skipped.is_empty());
    assert_eq!(per_pair.points, 20);
    Ok(())
}

#[test]
fn color_is_resampled_to_depth_resolution() -> TestResult {
    let scene = Scene::new()?;
    write_frame(&scene.frames.join("a.png"), 2, 2, [0, 255, 0])?;
    write_npy(&scene.depth.join("a.npy"), 4, 4, &[1.0; 16])?;

    let summary = run(&scene.frames, &scene.depth, &scene.out, &unit_config())?;
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.points, 16);

    let cloud = read_ply(&summary.outputs[0])?;
    assert!(cloud.colors().iter().all(|c| *c == [0.0, 1.0, 0.0]));
    Ok(())
}

#[test]
fn frames_without_valid_depth_produce_an_empty_cloud() -> TestResult {
    let scene = Scene::new()?;
    write_frame(&scene.frames.join("a.png"), 4, 4, [1, 2, 3])?;
    write_npy(&scene.depth.join("a.npy"), 4, 4, &[-1.0; 16])?;

    let summary = run(&scene.frames, &scene.depth, &scene.out, &unit_config())?;
    assert_eq!(summary.empty, vec!["a"]);
    assert_eq!(summary.points, 0);

    let text = std::fs::read_to_string(&summary.outputs[0])?;
    assert!(text.contains("element vertex 0\n"));
    assert!(read_ply(&summary.outputs[0])?.is_empty());
    Ok(())
}

#[test]
fn per_frame_output_leaves_out_empty_clouds() -> TestResult {
    let scene = Scene::new()?;
    for id in ["a", "b"] {
        write_frame(&scene.frames.join(format!("{id}.png")), 4, 4, [1, 2, 3])?;
    }
    write_npy(&scene.depth.join("a.npy"), 4, 4, &[1.0; 16])?;
    write_npy(&scene.depth.join("b.npy"), 4, 4, &[-1.0; 16])?;

    let config = PipelineConfig {
        output_mode: OutputMode::PerFrame,
        ..unit_config()
    };
    let summary = run(&scene.frames, &scene.depth, &scene.out, &config)?;
    assert_eq!(summary.empty, vec!["b"]);
    assert_eq!(summary.outputs, vec![scene.out.join("a.ply")]);
    assert_eq!(summary.points, 16);
    assert!(!scene.out.join("b.ply").exists());
    Ok(())
}

#[test]
fn no_pairs_is_an_error() -> TestResult {
    let scene = Scene::new()?;
    write_frame(&scene.frames.join("a.png"), 4, 4, [0, 0, 0])?;
    write_npy(&scene.depth.join("z.npy"), 4, 4, &[1.0; 16])?;

    match run(&scene.frames, &scene.depth, &scene.out, &unit_config()) {
        Err(PipelineError::Pairing(PairingError::NoPairsFound { missing })) => {
            assert_eq!(missing, vec!["a"]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!scene.out.exists());
    Ok(())
}

#[test]
fn missing_input_directories_are_rejected() -> TestResult {
    let scene = Scene::new()?;
    let missing = scene.frames.join("nope");

    assert!(matches!(
        run(&missing, &scene.depth, &scene.out, &unit_config()),
        Err(PipelineError::DirectoryNotFound(p)) if p == missing
    ));

    let file = scene.depth.join("file.npy");
    write_npy(&file, 1, 1, &[1.0])?;
    assert!(matches!(
        run(&scene.frames, &file, &scene.out, &unit_config()),
        Err(PipelineError::NotADirectory(p)) if p == file
    ));
    Ok(())
}

#[test]
fn invalid_geometry_aborts_before_projection() -> TestResult {
    let scene = Scene::new()?;
    write_frame(&scene.frames.join("a.png"), 4, 4, [0, 0, 0])?;
    write_npy(&scene.depth.join("a.npy"), 4, 4, &[1.0; 16])?;

    let config = PipelineConfig {
        fov_deg: 0.0,
        ..PipelineConfig::default()
    };
    assert!(matches!(
        run(&scene.frames, &scene.depth, &scene.out, &config),
        Err(PipelineError::Config(_))
    ));
    Ok(())
}
