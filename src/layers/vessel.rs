use super::{Layer, LayerCtx, order};
use crate::engine::context::Request;
use crate::engine::frame::FrameInfo;
use crate::engine::wave::WaveFn;
use crate::render::{Canvas, Rgb};

/// Rod tip offset from the point where the hull meets the water
pub const ROD_TIP_DX: f64 = 7.0;
pub const ROD_TIP_DY: f64 = 9.0;

/// Share of the surface slope angle the hull follows
const TILT_DAMPING: f64 = 0.35;
/// How far the hull's center rides below the surface
const DRAFT: f64 = 0.5;
const HALF_LENGTH: i32 = 6;

const HULL: Rgb = (120, 72, 40);
const DECK: Rgb = (176, 118, 66);
const CABIN: Rgb = (214, 200, 170);
const ROD: Rgb = (90, 60, 36);

/// Damped tilt of a floating body at column `x`, from the central difference
/// of the surface around it.
pub fn tilt_at(wave: &WaveFn, t: f64, x: f64, frame: &FrameInfo) -> f64 {
    let slope = (wave(t, x + 1.0, frame) - wave(t, x - 1.0, frame)) * 0.5;
    slope.atan() * TILT_DAMPING
}

/// The boat. Rides the published wave and never changes shared state.
#[derive(Default)]
pub struct VesselLayer;

impl VesselLayer {
    pub fn new() -> Self {
        VesselLayer
    }

    /// Hull, deck and cabin as `(dx, dy, color)` offsets from the hull center.
    fn shape() -> impl Iterator<Item = (i32, i32, Rgb)> {
        let hull = (0..3).flat_map(|row| {
            let reach = HALF_LENGTH - row;
            (-reach..=reach).map(move |dx| (dx, row, if row == 0 { DECK } else { HULL }))
        });
        let cabin = (-2..=1).flat_map(|dx| [-2, -1].into_iter().map(move |dy| (dx, dy, CABIN)));
        hull.chain(cabin)
    }
}

impl Layer for VesselLayer {
    fn name(&self) -> &str {
        "vessel"
    }

    fn order(&self) -> i32 {
        order::VESSEL
    }

    fn draw(&mut self, ctx: &mut LayerCtx<'_>, canvas: &mut Canvas) -> Vec<Request> {
        let frame = ctx.frame;
        let x = ctx.state.vessel.x;
        let wave = ctx.state.waves.current();
        let surface = wave(frame.time, x, frame);
        let angle = tilt_at(&wave, frame.time, x, frame);
        let (sin, cos) = angle.sin_cos();
        let cy = surface - 1.0 + DRAFT;

        for (dx, dy, rgb) in Self::shape() {
            let (dx, dy) = (dx as f64, dy as f64);
            let px = x + dx * cos - dy * sin;
            let py = cy + dx * sin + dy * cos;
            canvas.plot(px.round() as i32, py.round() as i32, rgb, 1.0);
        }

        // rod rises from the stern; its tip is where the line starts
        let base = (x + 3.0 * cos, cy + 3.0 * sin);
        canvas.line(base.0, base.1, x + ROD_TIP_DX, surface - ROD_TIP_DY, ROD, 1.0);
        Vec::new()
    }
}
