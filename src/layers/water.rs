use super::{Layer, LayerCtx, order};
use crate::engine::context::Request;
use crate::engine::wave::Harmonics;
use crate::render::{Canvas, ColorGradient, Rgb};

const FOAM: Rgb = (215, 238, 245);

/// The water surface: publishes the wave function and paints the depth bands.
pub struct WaterLayer {
    harmonics: Harmonics,
    /// Sampled top to bottom across the whole column; each band takes its slice
    depth: ColorGradient,
}

impl WaterLayer {
    pub fn new(harmonics: Harmonics) -> Self {
        WaterLayer {
            harmonics,
            depth: ColorGradient::new(vec![
                (0.0, (72, 164, 196)),
                (0.35, (38, 112, 160)),
                (0.7, (22, 70, 118)),
                (1.0, (8, 30, 62)),
            ]),
        }
    }

    /// Top and bottom colors of band `index` out of `count`. Bands stop short
    /// of their lower neighbour's color so each edge stays visible.
    fn band_colors(&self, index: usize, count: usize) -> (Rgb, Rgb) {
        let n = count as f64;
        let i = index as f64;
        (self.depth.sample(i / n), self.depth.sample((i + 0.8) / n))
    }
}

impl Layer for WaterLayer {
    fn name(&self) -> &str {
        "water"
    }

    fn order(&self) -> i32 {
        order::WATER
    }

    fn draw(&mut self, ctx: &mut LayerCtx<'_>, canvas: &mut Canvas) -> Vec<Request> {
        let frame = ctx.frame;
        let wave = self.harmonics.surface_fn();
        let surface: Vec<f64> = (0..canvas.width)
            .map(|x| wave(frame.time, x as f64, frame))
            .collect();

        canvas.clip_below(&surface);
        let count = ctx.bands.count();
        let crest = self.harmonics.max_amplitude();
        for (i, (top, bottom)) in ctx.bands.iter().enumerate() {
            // The first band reaches up past the highest crest so peaks never show sky
            let top = if i == 0 { top - crest } else { top };
            let (c0, c1) = self.band_colors(i, count);
            let (y0, y1) = (top.floor() as i32, bottom.ceil() as i32);
            let span = (y1 - y0).max(1) as f64;
            for y in y0..y1 {
                let rgb = crate::render::color::lerp(c0, c1, (y - y0) as f64 / span);
                canvas.fill_rect(0, y, canvas.width as i32, 1, rgb, 1.0);
            }
        }

        for (x, &y) in surface.iter().enumerate() {
            canvas.plot(x as i32, y.ceil() as i32, FOAM, 0.55);
        }

        vec![Request::PublishWave(wave)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bands::BandLayout;
    use crate::engine::context::SimState;
    use crate::engine::frame::FrameInfo;
    use crate::engine::model::Pond;
    use crate::engine::motion::MotionRegistry;
    use crate::engine::{Engine, EngineSettings};
    use crate::render::{ColorMode, RenderMode};
    use chrono::Utc;

    const SKY: Rgb = (255, 0, 255);

    fn pond() -> Pond {
        Pond {
            id: 1,
            name: "p".into(),
            description: String::new(),
            review_intervals_days: vec![1],
        }
    }

    /// 60x80 pixel canvas pre-filled with sky, water drawn once at `time`.
    fn paint(time: f64, water_top_y: f64, bands: usize) -> (WaterLayer, Canvas, SimState, FrameInfo) {
        let frame = FrameInfo {
            time,
            delta: 0.0,
            wall: 0.0,
            width: 60.0,
            height: 80.0,
            water_top_y,
            now: Utc::now(),
        };
        let layout = BandLayout::split(&frame, bands);
        let mut canvas = Canvas::new(60, 40, RenderMode::HalfBlock, ColorMode::TrueColor);
        canvas.fill(SKY);
        let mut state = SimState::new(pond(), Vec::new());
        let mut motions = MotionRegistry::new();
        let mut layer = WaterLayer::new(Harmonics::POND);
        let requests = {
            let mut ctx = LayerCtx {
                frame: &frame,
                bands: &layout,
                state: &state,
                motions: &mut motions,
            };
            layer.draw(&mut ctx, &mut canvas)
        };
        for r in requests {
            state.apply(r);
        }
        canvas.reset_clip();
        (layer, canvas, state, frame)
    }

    fn color_at(canvas: &Canvas, x: usize, y: usize) -> Rgb {
        canvas.colors[y * canvas.width + x]
    }

    #[test]
    fn tick_publishes_the_pond_surface() {
        let mut engine = Engine::new(EngineSettings::default(), pond(), Vec::new(), None);
        let mut canvas = Canvas::new(80, 30, RenderMode::HalfBlock, ColorMode::TrueColor);
        engine.tick(&mut canvas, 0.0, Utc::now());
        let frame = engine.tick(&mut canvas, 0.4, Utc::now());

        let wave = engine.state().waves.current();
        for t in [0.0, frame.time, 3.7] {
            for x in [0.0, 13.0, 41.5, 79.0] {
                let expected = frame.water_top_y + Harmonics::POND.height(t, x);
                assert!((wave(t, x, &frame) - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn water_covers_every_pixel_under_the_surface() {
        let (_, canvas, state, frame) = paint(0.7, 20.0, 4);
        let wave = state.waves.current();
        for x in 0..canvas.width {
            let surface = wave(frame.time, x as f64, &frame);
            for y in 0..canvas.height {
                let rgb = color_at(&canvas, x, y);
                if (y as f64) < surface {
                    assert_eq!(rgb, SKY, "sky at ({x}, {y}) above surface {surface}");
                } else {
                    assert_ne!(rgb, SKY, "sky shows through at ({x}, {y}) below surface {surface}");
                }
            }
        }
    }

    #[test]
    fn uneven_column_gives_the_extra_row_to_the_first_band() {
        // 61 rows of water over 4 bands: 16, 15, 15, 15
        let (layer, canvas, _, _) = paint(0.0, 19.0, 4);
        for x in [0, 30, 59] {
            for (index, y) in [(1, 35), (2, 50), (3, 65)] {
                let (top, _) = layer.band_colors(index, 4);
                assert_eq!(color_at(&canvas, x, y), top, "band {index} starts at row {y}");
                assert_ne!(color_at(&canvas, x, y - 1), top);
            }
        }
    }
}
