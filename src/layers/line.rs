use super::vessel::{ROD_TIP_DX, ROD_TIP_DY};
use super::{Layer, LayerCtx, order};
use crate::engine::context::Request;
use crate::engine::fishing::{FishingPhase, Point, ease_out_cubic};
use crate::render::{Canvas, Rgb};

/// Wall-clock seconds for the hook to sink, and again to rise
pub const CAST_SECONDS: f64 = 1.2;

const LINE: Rgb = (226, 226, 214);
const HOOK: Rgb = (190, 190, 200);

/// Per-cast bookkeeping, reset whenever a new process id shows up.
#[derive(Debug, Default)]
struct Cast {
    process_id: u64,
    target_depth: f64,
    cast_started: f64,
    reel_started: Option<f64>,
}

/// Fishing line and hook. Drives casting → luring and reeling → done.
#[derive(Default)]
pub struct LineLayer {
    cast: Option<Cast>,
}

impl LineLayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn paint(canvas: &mut Canvas, anchor: Point, hook: Point) {
        let tip = Point::new(anchor.x + ROD_TIP_DX, anchor.y - ROD_TIP_DY);
        canvas.line(tip.x, tip.y, hook.x, hook.y, LINE, 0.8);
        // barb
        let (hx, hy) = (hook.x.round() as i32, hook.y.round() as i32);
        canvas.plot(hx, hy + 1, HOOK, 1.0);
        canvas.plot(hx - 1, hy + 1, HOOK, 1.0);
        canvas.plot(hx - 1, hy, HOOK, 0.8);
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl Layer for LineLayer {
    fn name(&self) -> &str {
        "line"
    }

    fn order(&self) -> i32 {
        order::LINE
    }

    fn draw(&mut self, ctx: &mut LayerCtx<'_>, canvas: &mut Canvas) -> Vec<Request> {
        let frame = ctx.frame;
        let fishing = &ctx.state.fishing;
        if !fishing.is_active() {
            self.cast = None;
            return Vec::new();
        }

        let wave = ctx.state.waves.current();
        let anchor = Point::new(fishing.vessel_x, wave(frame.time, fishing.vessel_x, frame));

        if self.cast.as_ref().is_none_or(|c| c.process_id != fishing.process_id) {
            let band = ctx
                .state
                .target_card()
                .map_or(0, |card| ctx.bands.clamp_index(card.depth_level));
            self.cast = Some(Cast {
                process_id: fishing.process_id,
                target_depth: ctx.bands.midline(band),
                cast_started: frame.wall,
                reel_started: None,
            });
        }
        let Some(cast) = self.cast.as_mut() else {
            return Vec::new();
        };

        let mut requests = Vec::new();
        let hook_y = match fishing.phase() {
            FishingPhase::Casting => {
                let p = (frame.wall - cast.cast_started) / CAST_SECONDS;
                if p >= 1.0 {
                    requests.push(Request::Advance(FishingPhase::Luring));
                    cast.target_depth
                } else {
                    lerp(anchor.y, cast.target_depth, ease_out_cubic(p))
                }
            }
            FishingPhase::Luring => cast.target_depth,
            FishingPhase::Reeling => {
                let started = *cast.reel_started.get_or_insert(frame.wall);
                let p = (frame.wall - started) / CAST_SECONDS;
                if p >= 1.0 {
                    if let Some(id) = fishing.target() {
                        requests.push(Request::OpenDialog(id));
                    }
                    requests.push(Request::Advance(FishingPhase::Done));
                    anchor.y
                } else {
                    lerp(cast.target_depth, anchor.y, ease_out_cubic(p))
                }
            }
            FishingPhase::Done | FishingPhase::Idle => anchor.y,
        };

        let hook = Point::new(anchor.x, hook_y);
        requests.insert(0, Request::SetHook(hook));
        Self::paint(canvas, anchor, hook);
        requests
    }
}
