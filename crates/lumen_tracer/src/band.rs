//! Band-based frame partitioning.
//!
//! Divides the image into contiguous row ranges (bands). Each band owns its
//! rows of the accumulator and display buffer exclusively, so workers never
//! write the same pixel and need no locking.

use crate::camera::ViewBasis;
use crate::integrator::{color_to_rgba, ray_color, RenderConfig};
use crate::{gen_f32, Color, Hittable};
use rand::RngCore;

/// A contiguous range of image rows `[start_row, end_row)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub start_row: u32,
    pub end_row: u32,
    /// Index of this band in dispatch order
    pub index: usize,
}

impl Band {
    /// Create a new band.
    pub fn new(start_row: u32, end_row: u32, index: usize) -> Self {
        Self {
            start_row,
            end_row,
            index,
        }
    }

    /// Number of rows in this band.
    pub fn rows(&self) -> u32 {
        self.end_row - self.start_row
    }

    /// Get the total number of pixels in this band.
    pub fn pixel_count(&self, width: u32) -> usize {
        self.rows() as usize * width as usize
    }
}

/// Number of bands to split a frame into: two per worker, never more than
/// one per row.
pub fn band_count(threads: usize, height: u32) -> usize {
    (threads.max(1) * 2).min(height as usize)
}

/// Rows per band when splitting `height` rows `count` ways (rounded up).
pub fn rows_per_band(height: u32, count: usize) -> u32 {
    let count = count.clamp(1, u32::MAX as usize) as u32;
    height.div_ceil(count).max(1)
}

/// Split `height` rows into at most `count` contiguous non-empty bands.
///
/// Every band except possibly the last has `rows_per_band(height, count)`
/// rows; together they cover every row exactly once.
pub fn generate_bands(height: u32, count: usize) -> Vec<Band> {
    let step = rows_per_band(height, count);

    (0..height)
        .step_by(step as usize)
        .enumerate()
        .map(|(index, start)| Band::new(start, (start + step).min(height), index))
        .collect()
}

/// Everything a worker needs to render its band for one frame.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    pub basis: &'a ViewBasis,
    pub world: &'a dyn Hittable,
    pub config: &'a RenderConfig,
    pub width: u32,
    pub height: u32,
    /// Frames accumulated including this one
    pub samples: u32,
}

/// Render one jittered sample per pixel of a band.
///
/// `accum` holds the band's running RGB sums and `display` its RGBA bytes,
/// both in row-major order starting at `band.start_row`. Each sum gets this
/// frame's estimate added, then the averaged, tone-mapped color is written
/// to the display bytes.
pub fn render_band(
    band: &Band,
    ctx: &FrameContext<'_>,
    accum: &mut [Color],
    display: &mut [u8],
    rng: &mut dyn RngCore,
) {
    debug_assert_eq!(accum.len(), band.pixel_count(ctx.width));
    debug_assert_eq!(display.len(), band.pixel_count(ctx.width) * 4);

    // A one-pixel-wide (or tall) target would otherwise divide by zero
    let s_scale = 1.0 / (ctx.width.max(2) - 1) as f32;
    let t_scale = 1.0 / (ctx.height.max(2) - 1) as f32;

    let rows = accum
        .chunks_exact_mut(ctx.width as usize)
        .zip(display.chunks_exact_mut(ctx.width as usize * 4));

    for (j, (accum_row, display_row)) in (band.start_row..band.end_row).zip(rows) {
        for (i, (sum, rgba)) in accum_row
            .iter_mut()
            .zip(display_row.chunks_exact_mut(4))
            .enumerate()
        {
            let s = (i as f32 + gen_f32(rng)) * s_scale;
            let t = (j as f32 + gen_f32(rng)) * t_scale;
            let ray = ctx.basis.ray(s, t);

            *sum += ray_color(&ray, ctx.world, ctx.config.max_depth, ctx.config, rng);
            rgba.copy_from_slice(&color_to_rgba(*sum, ctx.samples));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Camera, Scene};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_band_count() {
        assert_eq!(band_count(8, 1080), 16);
        assert_eq!(band_count(8, 10), 10);
        assert_eq!(band_count(0, 100), 2);
        assert_eq!(band_count(4, 0), 0);
    }

    #[test]
    fn test_generate_bands_exact_fit() {
        let bands = generate_bands(128, 4);
        assert_eq!(bands.len(), 4);
        assert!(bands.iter().all(|b| b.rows() == 32));
    }

    #[test]
    fn test_generate_bands_cover_every_row_once() {
        for (height, count) in [(100, 16), (10, 8), (7, 7), (1, 16), (359, 24)] {
            let bands = generate_bands(height, count);
            assert!(bands.len() <= count);

            let mut next = 0;
            for (i, band) in bands.iter().enumerate() {
                assert_eq!(band.index, i);
                assert_eq!(band.start_row, next, "gap before band {i}");
                assert!(band.rows() > 0);
                next = band.end_row;
            }
            assert_eq!(next, height);
        }
    }

    #[test]
    fn test_generate_bands_trailing_short_band() {
        // ceil(10 / 8) = 2 rows per band -> 5 bands, none empty
        let bands = generate_bands(10, 8);
        assert_eq!(bands.len(), 5);
        assert_eq!(bands[4], Band::new(8, 10, 4));
    }

    #[test]
    fn test_generate_bands_empty_image() {
        assert!(generate_bands(0, 4).is_empty());
    }

    #[test]
    fn test_render_band_writes_only_sky_for_empty_scene() {
        let scene = Scene::default();
        let config = RenderConfig::default();
        let basis = Camera::new().basis();
        let ctx = FrameContext {
            basis: &basis,
            world: &scene,
            config: &config,
            width: 4,
            height: 4,
            samples: 1,
        };
        let band = Band::new(1, 3, 0);
        let mut accum = vec![Color::ZERO; band.pixel_count(4)];
        let mut display = vec![0u8; band.pixel_count(4) * 4];
        let mut rng = StdRng::seed_from_u64(8);

        render_band(&band, &ctx, &mut accum, &mut display, &mut rng);

        assert!(accum.iter().all(|c| *c == config.sky));
        for rgba in display.chunks_exact(4) {
            assert_eq!(rgba, [181, 214, 255, 255]);
        }
    }
}
