use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{Layer, LayerCtx, order};
use crate::engine::context::Request;
use crate::engine::fishing::FishingPhase;
use crate::engine::motion::{EntityMotion, MotionTuning};
use crate::engine::sprite::{AnimationClip, Cell, SpriteSheet};
use crate::render::{Canvas, Rgb, color};

const READY_BODY: Rgb = (244, 132, 58);
const READY_ACCENT: Rgb = (252, 246, 236);
const FALLBACK_RADIUS: f64 = 2.5;

/// Cards swimming as fish. Also the half of the fishing state machine that
/// decides when the lured fish bites.
pub struct EntityLayer {
    rng: StdRng,
    sprite: Option<SpriteSheet>,
    clip: AnimationClip,
    tuning: MotionTuning,
}

impl EntityLayer {
    pub fn new(seed: u64, sprite: Option<SpriteSheet>, tuning: MotionTuning) -> Self {
        if sprite.is_none() {
            log::info!("no fish sprite available, drawing fallback circles");
        }
        EntityLayer {
            rng: StdRng::seed_from_u64(seed),
            clip: AnimationClip::for_sheet(sprite.as_ref()),
            sprite,
            tuning,
        }
    }

    fn half_width(&self) -> f64 {
        self.sprite.as_ref().map_or(FALLBACK_RADIUS, |s| s.half_width())
    }

    fn paint(&self, canvas: &mut Canvas, m: &EntityMotion, ready: bool, time: f64) {
        let (body, accent, alpha) = if ready {
            (READY_BODY, READY_ACCENT, 1.0)
        } else {
            (color::desaturate(READY_BODY, 0.75), color::desaturate(READY_ACCENT, 0.75), 0.55)
        };

        let Some(sheet) = &self.sprite else {
            canvas.fill_circle(m.x, m.center_y, FALLBACK_RADIUS, body, alpha);
            return;
        };
        let frame = sheet.frame(self.clip.frame_at(time, m.speed));
        let flip = m.direction < 0.0;
        let left = (m.x - frame.width as f64 * 0.5).round() as i32;
        let top = (m.center_y - frame.height as f64 * 0.5).round() as i32;
        for row in 0..frame.height {
            for col in 0..frame.width {
                let rgb = match frame.cell(col, row, flip) {
                    Cell::Empty => continue,
                    Cell::Body => body,
                    Cell::Accent => accent,
                };
                canvas.plot(left + col as i32, top + row as i32, rgb, alpha);
            }
        }
    }
}

impl Layer for EntityLayer {
    fn name(&self) -> &str {
        "entities"
    }

    fn order(&self) -> i32 {
        order::ENTITIES
    }

    fn draw(&mut self, ctx: &mut LayerCtx<'_>, canvas: &mut Canvas) -> Vec<Request> {
        let frame = ctx.frame;
        let state = ctx.state;
        let fishing = &state.fishing;
        let half_width = self.half_width();
        let mut requests = Vec::new();

        for card in &state.cards {
            let ready = card.is_ready(frame.now);
            let m = ctx
                .motions
                .get_or_spawn(&mut self.rng, card, frame, ctx.bands, half_width, &self.tuning);

            match (fishing.targets(card.id), fishing.phase(), fishing.hook) {
                (true, FishingPhase::Luring, Some(hook)) => {
                    if m.pull_toward(hook, frame.delta, &self.tuning) {
                        requests.push(Request::Advance(FishingPhase::Reeling));
                    }
                }
                (true, FishingPhase::Reeling | FishingPhase::Done, Some(hook)) => {
                    m.pin_to(hook, &self.tuning);
                }
                _ => m.step_free(frame, ctx.bands, card.depth_level, half_width, &self.tuning),
            }

            self.paint(canvas, m, ready, frame.time);
        }
        requests
    }
}
