use clap::Parser;
use std::f32::consts::TAU;
use std::path::{Path, PathBuf};
use std::time::Instant;

use splatsort::camera::{self, Camera};
use splatsort::demo::generate_demo_records;
use splatsort::math::Vec3;
use splatsort::parser::dot_splat::{load_splat_file, write_splat_file};
use splatsort::record::RecordBuffer;
use splatsort::{DepthCheck, SortConfig, SortedSplats, SplatSorter};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Parser)]
#[command(name = "splatsort", version, about = "Back-to-front radix depth sort for .splat scenes")]
struct Cli {
    /// Path to a .splat scene file (sorts the demo scene if omitted)
    input: Option<PathBuf>,
    #[arg(long, help = "Sort the built-in demo scene", conflicts_with = "input")]
    demo: bool,
    #[arg(long, value_name = "N", default_value_t = 45_000, help = "Splats in the demo scene")]
    demo_count: usize,
    #[arg(long, default_value_t = 0, help = "Seed for the demo scene")]
    seed: u64,
    #[arg(long, value_name = "PATH", help = "TOML sort configuration")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "K", help = "Depth key offset (overrides the config)")]
    depth_offset: Option<f32>,
    #[arg(long, help = "Fail when depth keys leave the offset's positive range")]
    reject_out_of_range: bool,
    #[arg(long, value_name = "N", help = "Maximum splats to keep from the input")]
    max_splats: Option<usize>,
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_vec3, help = "Camera position")]
    eye: Option<Vec3>,
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_vec3, help = "Camera target")]
    target: Option<Vec3>,
    #[arg(long, value_name = "DEG", default_value_t = 60.0, help = "Vertical field of view")]
    fov: f32,
    #[arg(long, default_value_t = 16.0 / 9.0, help = "Viewport aspect ratio")]
    aspect: f32,
    #[arg(
        long,
        value_name = "N",
        default_value_t = 1,
        help = "Sorts to run; more than one orbits the camera around the target"
    )]
    frames: u32,
    #[arg(short, long, value_name = "PATH", help = "Write the last combined buffer (f32 LE)")]
    output: Option<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Write the loaded scene as a .splat file")]
    export_demo: Option<PathBuf>,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected X,Y,Z but got {} components", parts.len())),
    }
}

fn load_config(cli: &Cli) -> AppResult<SortConfig> {
    let mut config = match cli.config.as_ref() {
        Some(path) => SortConfig::load(path)?,
        None => SortConfig::default(),
    };
    if let Some(offset) = cli.depth_offset {
        config.depth_offset = offset;
    }
    if cli.reject_out_of_range {
        config.depth_check = DepthCheck::Reject;
    }
    if let Some(max) = cli.max_splats {
        config.max_splats = max;
    }
    config.validate()?;
    Ok(config)
}

fn load_records(cli: &Cli) -> AppResult<Vec<u8>> {
    match cli.input.as_ref() {
        Some(path) if !cli.demo => {
            let ext = path
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            if ext != "splat" {
                return Err(format!("Unsupported input '{}'. Use a .splat file or --demo", path.display()).into());
            }
            Ok(load_splat_file(path)?)
        }
        _ => Ok(generate_demo_records(cli.demo_count, cli.seed)),
    }
}

/// AABB center of all splat centers.
fn scene_center(records: &[u8]) -> AppResult<Vec3> {
    let records = RecordBuffer::from_bytes(records)?;
    if records.is_empty() {
        return Ok(Vec3::ZERO);
    }
    let mut min = Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
    let mut max = Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
    for record in records.iter() {
        let c = Vec3::from(record.center());
        min = min.min(c);
        max = max.max(c);
    }
    Ok((min + max) * 0.5)
}

fn write_combined(path: &Path, sorted: &SortedSplats) -> AppResult<()> {
    std::fs::write(path, sorted.to_le_bytes())?;
    log::info!(
        "wrote {} floats ({} splats) to {}",
        sorted.as_slice().len(),
        sorted.layout().vertex_count(),
        path.display()
    );
    Ok(())
}

fn main() -> AppResult<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let records = load_records(&cli)?;
    if let Some(path) = cli.export_demo.as_ref() {
        write_splat_file(path, &records)?;
        log::info!("exported scene to {}", path.display());
    }

    let center = scene_center(&records)?;
    let target = cli.target.unwrap_or(center);
    let eye = cli
        .eye
        .unwrap_or(Vec3::new(center.x, center.y, center.z + 5.0));

    let mut sorter = SplatSorter::new(records, config)?;
    log::info!(
        "sorting {} splats, depth offset {}, {} frame(s)",
        sorter.vertex_count(),
        config.depth_offset,
        cli.frames
    );

    let mut cam = Camera::new(eye, -std::f32::consts::FRAC_PI_2, 0.0);
    cam.fov = cli.fov.to_radians();

    let offset = eye - target;
    let orbit_radius = (offset.x * offset.x + offset.z * offset.z).sqrt();
    let orbit_start = offset.x.atan2(offset.z);
    let frames = cli.frames.max(1);

    let mut last: Option<SortedSplats> = None;
    let mut total_ms = 0.0_f64;
    for frame in 0..frames {
        let angle = orbit_start + frame as f32 / frames as f32 * TAU;
        cam.position = if frames > 1 {
            camera::orbit_position(target, orbit_radius, angle, offset.y)
        } else {
            eye
        };
        camera::look_at_target(&mut cam, target);
        let view_proj = cam.view_projection(cli.aspect);

        let start = Instant::now();
        let sorted = sorter.run_sort(&view_proj)?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        total_ms += elapsed_ms;

        let stats = sorted.stats();
        log::info!(
            "frame {frame}: {:.3} ms, depth keys [{:.3}, {:.3}]",
            elapsed_ms,
            stats.min_depth,
            stats.max_depth
        );

        if let Some(previous) = last.replace(sorted) {
            sorter.return_buffer(previous)?;
        }
    }
    log::info!(
        "{} sort(s), {:.3} ms average",
        sorter.sort_count(),
        total_ms / f64::from(frames)
    );

    if let (Some(path), Some(sorted)) = (cli.output.as_ref(), last.as_ref()) {
        write_combined(path, sorted)?;
    }
    Ok(())
}
