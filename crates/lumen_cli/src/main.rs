use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::RgbaImage;
use lumen_tracer::{
    Camera, DisplayBuffer, OrbitController, ProgressiveRenderer, RenderConfig, RenderPhase, Scene,
    Vec3,
};

/// Headless progressive renderer: drives frames the way a viewer would and
/// writes the final display buffer as a PNG.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Progressive CPU path tracer for sphere scenes")]
struct Cli {
    /// Window width; the image is rendered at half this
    #[arg(long, default_value_t = 1280)]
    width: u32,
    /// Window height; the image is rendered at half this
    #[arg(long, default_value_t = 720)]
    height: u32,
    /// Frames to run (stops early once converged)
    #[arg(long, default_value_t = 64)]
    frames: u32,
    #[arg(long, default_value_t = 200)]
    max_samples: u32,
    #[arg(long, default_value_t = 6)]
    depth: u32,
    /// Worker threads (default: hardware parallelism)
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// JSON scene description (default: built-in demo scene)
    #[arg(long)]
    scene: Option<PathBuf>,
    /// Initial orbit yaw in degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    yaw: f32,
    /// Initial orbit pitch in degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pitch: f32,
    #[arg(long, default_value_t = 7.0)]
    distance: f32,
    /// Horizontal drag in pixels applied before the first frame; the orbit
    /// eases toward it, restarting accumulation until it settles
    #[arg(long, default_value_t = 0.0)]
    drag: f32,
    #[arg(long, default_value = "lumen.png")]
    output: PathBuf,
}

fn load_scene(path: Option<&PathBuf>) -> Result<Scene> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read scene {}", path.display()))?;
            Scene::from_json(&json)
                .with_context(|| format!("Invalid scene {}", path.display()))
        }
        None => Ok(Scene::demo()?),
    }
}

/// Copy the bottom-up display buffer into a top-down image.
fn to_image(frame: &DisplayBuffer<'_>) -> Result<RgbaImage> {
    let row = frame.width as usize * 4;
    let flipped: Vec<u8> = frame
        .pixels
        .chunks_exact(row)
        .rev()
        .flatten()
        .copied()
        .collect();
    RgbaImage::from_raw(frame.width, frame.height, flipped)
        .context("Display buffer does not match its dimensions")
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    log::info!("Starting Lumen");

    let scene = load_scene(cli.scene.as_ref())?;
    log::info!("Scene has {} spheres", scene.len());

    let config = RenderConfig {
        max_depth: cli.depth,
        max_samples: cli.max_samples,
        threads: cli.threads,
        seed: cli.seed,
        ..Default::default()
    };

    let mut orbit = OrbitController::new(cli.distance)
        .with_angles(cli.yaw.to_radians(), cli.pitch.to_radians());
    orbit.drag(cli.drag, 0.0);

    let camera = Camera::new()
        .with_position(orbit.eye(), Vec3::ZERO, Vec3::Y)
        .with_fov(45.0);
    let mut renderer = ProgressiveRenderer::new(config, camera)?;
    renderer.resize(cli.width, cli.height);
    if renderer.width() == 0 || renderer.height() == 0 {
        bail!("Window {}x{} is too small to render", cli.width, cli.height);
    }

    let start = Instant::now();
    for _ in 0..cli.frames {
        renderer.on_camera_moved(orbit.update());
        if let Some(stats) = renderer.render_frame(&scene) {
            log::debug!("Frame done in {:?} ({} samples)", stats.elapsed, stats.samples);
        }
        if renderer.phase() == RenderPhase::Converged && !orbit.is_settling() {
            log::info!("Converged");
            break;
        }
    }
    log::info!(
        "Rendered {} samples per pixel in {:?}",
        renderer.samples(),
        start.elapsed()
    );

    let image = to_image(&renderer.display_buffer())?;
    image
        .save(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    log::info!("Saved to {}", cli.output.display());

    Ok(())
}
