use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use super::{Layer, LayerCtx, order};
use crate::engine::context::Request;
use crate::render::{Canvas, Rgb, color};

const DEPTH_TINT: Rgb = (6, 26, 34);

struct Weed {
    x: f64,
    height: f64,
    /// Noise lane, keeps neighbouring stalks out of step
    lane: f64,
    shade: Rgb,
}

/// Static backdrop under the water: pond weed swaying from the bottom and a
/// darkening tint toward the floor.
pub struct BackLayer {
    noise: Perlin,
    seed: u64,
    /// Weed is generated once per viewport size
    cache: Option<((usize, usize), Vec<Weed>)>,
}

impl BackLayer {
    pub fn new(seed: u64) -> Self {
        BackLayer {
            noise: Perlin::new(seed as u32),
            seed,
            cache: None,
        }
    }

    fn ensure_weeds(&mut self, width: usize, height: usize, column: f64) {
        let stale = self.cache.as_ref().is_none_or(|(size, _)| *size != (width, height));
        if stale {
            let mut rng = StdRng::seed_from_u64(self.seed ^ ((width as u64) << 32) ^ height as u64);
            let count = (width / 7).max(1);
            let weeds = (0..count)
                .map(|i| Weed {
                    x: (i as f64 + rng.random_range(0.1..0.9)) * width as f64 / count as f64,
                    height: column * rng.random_range(0.12..0.42),
                    lane: rng.random_range(0.0..100.0),
                    shade: color::lerp((30, 92, 52), (64, 128, 60), rng.random_range(0.0..1.0)),
                })
                .collect();
            log::debug!("generated {count} weed stalks for {width}x{height}");
            self.cache = Some(((width, height), weeds));
        }
    }

    fn weeds(&self) -> &[Weed] {
        self.cache.as_ref().map(|(_, w)| w.as_slice()).unwrap_or_default()
    }
}

impl Layer for BackLayer {
    fn name(&self) -> &str {
        "back"
    }

    fn order(&self) -> i32 {
        order::BACK
    }

    fn draw(&mut self, ctx: &mut LayerCtx<'_>, canvas: &mut Canvas) -> Vec<Request> {
        let frame = ctx.frame;
        canvas.clip_below(&ctx.state.waves.profile(frame));

        // Tint the lower half of the column toward the pond floor
        let column = (frame.height - frame.water_top_y).max(1.0);
        let tint_start = frame.water_top_y + column * 0.5;
        for y in tint_start.floor() as i32..canvas.height as i32 {
            let alpha = ((y as f64 - tint_start) / (frame.height - tint_start).max(1.0)) * 0.45;
            canvas.fill_rect(0, y, canvas.width as i32, 1, DEPTH_TINT, alpha);
        }

        let t = frame.time * 0.3;
        let bottom = frame.height - 1.0;
        self.ensure_weeds(canvas.width, canvas.height, column);
        for weed in self.weeds() {
            let segments = weed.height.ceil() as i32;
            for s in 0..segments {
                let rise = s as f64 / weed.height.max(1.0);
                let sway = self.noise.get([weed.lane, rise * 1.5, t]) * 3.0 * rise;
                let x = weed.x + sway;
                let y = bottom - s as f64;
                canvas.plot(x.round() as i32, y as i32, weed.shade, 0.85 - rise * 0.35);
            }
        }
        Vec::new()
    }
}
