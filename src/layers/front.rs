use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use super::{Layer, LayerCtx, order};
use crate::engine::context::Request;
use crate::engine::frame::FrameInfo;
use crate::render::{Canvas, Rgb};

const FOG: Rgb = (10, 24, 44);
const MOTE: Rgb = (170, 200, 190);
const BUBBLE: Rgb = (200, 235, 250);

/// Motes on screen at scale 1.0
const MOTE_COUNT: usize = 28;
/// Bubble pool cap at scale 1.0
const MAX_BUBBLES: usize = 40;
/// Expected bubbles per pixel of width per second
const BUBBLE_RATE: f64 = 0.004;
/// How far above the resting water line a bubble may drift before it is culled
const TOP_MARGIN: f64 = 4.0;

struct Mote {
    x: f64,
    y: f64,
    rise: f64,
    phase: f64,
}

struct Bubble {
    x: f64,
    y: f64,
    vy: f64,
    wobble: f64,
    life: f64,
    max_life: f64,
}

impl Bubble {
    /// Remaining life fraction (1.0 = just spawned)
    fn life_frac(&self) -> f64 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Foreground water effects: depth fog, drifting motes and rising bubbles.
pub struct FrontLayer {
    rng: StdRng,
    motes: Vec<Mote>,
    bubbles: Vec<Bubble>,
    mote_count: usize,
    max_bubbles: usize,
    size: (usize, usize),
}

impl FrontLayer {
    pub fn new(seed: u64, scale: f64) -> Self {
        FrontLayer {
            rng: StdRng::seed_from_u64(seed),
            motes: Vec::new(),
            bubbles: Vec::new(),
            mote_count: ((MOTE_COUNT as f64 * scale) as usize).max(1),
            max_bubbles: ((MAX_BUBBLES as f64 * scale) as usize).max(1),
            size: (0, 0),
        }
    }

    fn reseed_motes(&mut self, frame: &FrameInfo) {
        let (w, h) = (frame.width.max(1.0), frame.height.max(1.0));
        let top = frame.water_top_y.min(h - 1.0);
        self.motes = (0..self.mote_count)
            .map(|_| Mote {
                x: self.rng.random_range(0.0..w),
                y: self.rng.random_range(top..h),
                rise: self.rng.random_range(0.6..2.2),
                phase: self.rng.random_range(0.0..std::f64::consts::TAU),
            })
            .collect();
        self.bubbles.clear();
    }

    fn step_motes(&mut self, frame: &FrameInfo, surface: &dyn Fn(f64) -> f64) {
        for m in &mut self.motes {
            m.y -= m.rise * frame.delta;
            m.x += (frame.time * 0.4 + m.phase).sin() * 0.6 * frame.delta;
            m.x = m.x.rem_euclid(frame.width.max(1.0));
            // wrap from the surface back to the floor
            if m.y < surface(m.x) + 1.0 {
                m.y = frame.height - 1.0;
            }
        }
    }

    fn step_bubbles(&mut self, frame: &FrameInfo, surface: &dyn Fn(f64) -> f64) {
        let p = (BUBBLE_RATE * frame.width * frame.delta).min(1.0);
        if self.bubbles.len() < self.max_bubbles && p > 0.0 && self.rng.random_bool(p) {
            let life = self.rng.random_range(3.0..7.0);
            self.bubbles.push(Bubble {
                x: self.rng.random_range(0.0..frame.width.max(1.0)),
                y: frame.height - 1.0,
                vy: -self.rng.random_range(5.0..12.0),
                wobble: self.rng.random_range(1.5..4.0),
                life,
                max_life: life,
            });
        }

        let t = frame.time;
        for b in &mut self.bubbles {
            b.y += b.vy * frame.delta;
            b.x += (t * b.wobble).sin() * 1.2 * frame.delta;
            b.life -= frame.delta;
        }
        let top = frame.water_top_y - TOP_MARGIN;
        self.bubbles.retain(|b| {
            b.life > 0.0
                && b.x >= 0.0
                && b.x < frame.width
                && b.y > top
                && b.y > surface(b.x)
        });
    }
}

impl Layer for FrontLayer {
    fn name(&self) -> &str {
        "front"
    }

    fn order(&self) -> i32 {
        order::FRONT
    }

    fn draw(&mut self, ctx: &mut LayerCtx<'_>, canvas: &mut Canvas) -> Vec<Request> {
        let frame = ctx.frame;
        if self.size != (canvas.width, canvas.height) {
            self.size = (canvas.width, canvas.height);
            self.reseed_motes(frame);
        }
        let wave = ctx.state.waves.current();
        let surface = |x: f64| wave(frame.time, x, frame);
        self.step_motes(frame, &surface);
        self.step_bubbles(frame, &surface);

        canvas.clip_below(&ctx.state.waves.profile(frame));

        let column = (frame.height - frame.water_top_y).max(1.0);
        for y in frame.water_top_y.floor() as i32..canvas.height as i32 {
            let depth = ((y as f64 - frame.water_top_y) / column).clamp(0.0, 1.0);
            canvas.fill_rect(0, y, canvas.width as i32, 1, FOG, depth * depth * 0.35);
        }

        for m in &self.motes {
            let glint = 0.25 + 0.2 * (frame.time * 1.3 + m.phase).sin();
            canvas.plot(m.x as i32, m.y as i32, MOTE, glint);
        }
        for b in &self.bubbles {
            canvas.plot(b.x.round() as i32, b.y.round() as i32, BUBBLE, 0.8 * b.life_frac());
        }
        Vec::new()
    }
}
