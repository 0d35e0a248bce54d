//! Progressive rendering driver.
//!
//! Owns the per-pixel accumulator, the RGBA display buffer and the sample
//! counter. Every call to [`ProgressiveRenderer::render_frame`] adds one
//! jittered sample per pixel, split into row bands rendered on a worker
//! pool, and returns only after every band has finished.

use std::time::{Duration, Instant};

use lumen_math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::band::{band_count, generate_bands, render_band, rows_per_band, FrameContext};
use crate::error::RenderError;
use crate::{Camera, Color, Hittable, RenderConfig};

/// Frames averaged per frame-rate report.
const FPS_REPORT_FRAMES: u32 = 30;

/// Where the renderer is in its accumulate / converge cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    /// Nothing accumulated since the last reset.
    Idle,
    /// `n` samples per pixel accumulated.
    Accumulating(u32),
    /// Sample cap exceeded; frames are skipped until the camera moves.
    Converged,
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    /// Samples per pixel after this frame
    pub samples: u32,
    /// Bands the frame was split into
    pub bands: usize,
    /// Whether the accumulator was cleared before this frame (camera moved,
    /// target resized, or first frame)
    pub reset: bool,
    /// Wall time for the dispatch and join
    pub elapsed: Duration,
}

/// Read-only view of the tone-mapped RGBA8 image.
///
/// Row 0 is the bottom of the image.
#[derive(Debug, Clone, Copy)]
pub struct DisplayBuffer<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
}

impl DisplayBuffer<'_> {
    /// RGBA of pixel `(i, j)`.
    pub fn pixel(&self, i: u32, j: u32) -> [u8; 4] {
        let index = (j as usize * self.width as usize + i as usize) * 4;
        [
            self.pixels[index],
            self.pixels[index + 1],
            self.pixels[index + 2],
            self.pixels[index + 3],
        ]
    }
}

/// Progressive render state.
pub struct ProgressiveRenderer {
    config: RenderConfig,
    camera: Camera,
    prev_eye: Option<Vec3>,
    /// Set by `resize`; reported by the next frame
    resized: bool,

    width: u32,
    height: u32,
    accumulator: Vec<Color>,
    display: Vec<u8>,
    samples: u32,

    pool: ThreadPool,
    threads: usize,
    rng: StdRng,
    fps: FrameRateCounter,
}

impl ProgressiveRenderer {
    /// Create a renderer with a zero-sized target; call [`resize`](Self::resize)
    /// before rendering.
    pub fn new(config: RenderConfig, camera: Camera) -> Result<Self, RenderError> {
        let threads = config.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
        .max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("lumen-worker-{i}"))
            .build()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        log::info!("{} concurrent render threads", threads);

        Ok(Self {
            config,
            camera,
            prev_eye: None,
            resized: false,
            width: 0,
            height: 0,
            accumulator: Vec::new(),
            display: Vec::new(),
            samples: 0,
            pool,
            threads,
            rng,
            fps: FrameRateCounter::default(),
        })
    }

    /// Resize for a window of `window_width` x `window_height`.
    ///
    /// Renders at half the window resolution. Both buffers are reallocated
    /// zeroed and the sample count restarts.
    pub fn resize(&mut self, window_width: u32, window_height: u32) {
        self.width = window_width / 2;
        self.height = window_height / 2;

        let pixels = self.width as usize * self.height as usize;
        self.accumulator = vec![Color::ZERO; pixels];
        self.display = vec![0; pixels * 4];
        self.samples = 0;
        self.resized = true;

        if self.height > 0 {
            self.camera
                .set_aspect(self.width as f32 / self.height as f32);
        }

        log::info!(
            "Render target {}x{} (window {}x{})",
            self.width,
            self.height,
            window_width,
            window_height
        );
    }

    /// Report a new eye position. Takes effect at the start of the next
    /// frame; any change from the previous frame's eye discards the
    /// accumulated image.
    pub fn on_camera_moved(&mut self, eye: Vec3) {
        self.camera.set_eye(eye);
    }

    /// Render one progressive frame.
    ///
    /// Returns `None` without touching the buffers when the target is empty
    /// or the image has converged.
    pub fn render_frame(&mut self, world: &dyn Hittable) -> Option<FrameStats> {
        let eye = self.camera.eye();
        let moved = self.prev_eye != Some(eye);
        if moved {
            self.clear();
        }
        let reset = moved || self.resized;
        self.prev_eye = Some(eye);

        if self.phase() == RenderPhase::Converged || self.width == 0 || self.height == 0 {
            return None;
        }
        self.resized = false;

        let start = Instant::now();

        // The divisor must include this frame before any worker tone-maps
        self.samples += 1;

        let basis = self.camera.basis();
        let count = band_count(self.threads, self.height);
        let bands = generate_bands(self.height, count);
        let band_pixels = rows_per_band(self.height, count) as usize * self.width as usize;
        let seeds: Vec<u64> = bands.iter().map(|_| self.rng.gen()).collect();

        let ctx = FrameContext {
            basis: &basis,
            world,
            config: &self.config,
            width: self.width,
            height: self.height,
            samples: self.samples,
        };

        log::debug!(
            "Frame {}: {} bands of {} rows",
            self.samples,
            bands.len(),
            band_pixels / self.width as usize
        );

        let work = bands
            .iter()
            .zip(seeds)
            .zip(self.accumulator.chunks_mut(band_pixels))
            .zip(self.display.chunks_mut(band_pixels * 4));

        // Returns once every spawned band has finished
        self.pool.scope(|s| {
            for (((band, seed), accum), display) in work {
                s.spawn(move |_| {
                    let mut rng = StdRng::seed_from_u64(seed);
                    render_band(band, &ctx, accum, display, &mut rng);
                });
            }
        });

        let elapsed = start.elapsed();
        self.fps.record(elapsed, self.samples);

        Some(FrameStats {
            samples: self.samples,
            bands: bands.len(),
            reset,
            elapsed,
        })
    }

    /// Current phase of the accumulate / converge cycle.
    pub fn phase(&self) -> RenderPhase {
        if self.samples == 0 {
            RenderPhase::Idle
        } else if self.samples > self.config.max_samples {
            RenderPhase::Converged
        } else {
            RenderPhase::Accumulating(self.samples)
        }
    }

    /// The tone-mapped image of the last completed frame.
    ///
    /// Overwritten in place by the next `render_frame`.
    pub fn display_buffer(&self) -> DisplayBuffer<'_> {
        DisplayBuffer {
            pixels: &self.display,
            width: self.width,
            height: self.height,
        }
    }

    /// Running per-pixel radiance sums.
    pub fn accumulator(&self) -> &[Color] {
        &self.accumulator
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn clear(&mut self) {
        log::info!("Camera moved, discarding {} samples", self.samples);
        self.accumulator.fill(Color::ZERO);
        self.display.fill(0);
        self.samples = 0;
    }
}

/// Averages frame times and logs a frames-per-second figure periodically.
#[derive(Debug, Default)]
struct FrameRateCounter {
    time: Duration,
    frames: u32,
}

impl FrameRateCounter {
    /// Record one frame; returns the reported rate when a report is due.
    fn record(&mut self, elapsed: Duration, samples: u32) -> Option<f32> {
        self.time += elapsed;
        self.frames += 1;
        if self.frames <= FPS_REPORT_FRAMES {
            return None;
        }

        let fps = self.frames as f32 / self.time.as_secs_f32().max(f32::EPSILON);
        log::info!("FPS: {:.1} - {} samples", fps, samples);
        self.time = Duration::ZERO;
        self.frames = 0;
        Some(fps)
    }
}
