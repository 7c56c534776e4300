pub mod back;
pub mod entities;
pub mod front;
pub mod line;
pub mod vessel;
pub mod water;

use crate::engine::bands::BandLayout;
use crate::engine::context::{EngineEvent, Request, SimState};
use crate::engine::frame::FrameInfo;
use crate::engine::motion::MotionRegistry;
use crate::render::Canvas;

/// Fixed draw priorities. The entity layer runs before the line layer so a
/// bite detected this tick is seen by the line in the same tick.
pub mod order {
    pub const WATER: i32 = 0;
    pub const BACK: i32 = 10;
    pub const ENTITIES: i32 = 20;
    pub const FRONT: i32 = 30;
    pub const LINE: i32 = 40;
    pub const VESSEL: i32 = 50;
}

/// What a layer sees during one tick.
pub struct LayerCtx<'a> {
    pub frame: &'a FrameInfo,
    pub bands: &'a BandLayout,
    /// Fresh view of the shared state, including requests applied by earlier layers
    pub state: &'a SimState,
    pub motions: &'a mut MotionRegistry,
}

/// An ordered unit of drawing and behavior, run once per tick.
pub trait Layer {
    fn name(&self) -> &str;

    /// Lower runs first
    fn order(&self) -> i32;

    /// Draw into the canvas and return the state changes this layer wants.
    fn draw(&mut self, ctx: &mut LayerCtx<'_>, canvas: &mut Canvas) -> Vec<Request>;
}

/// Layers sorted by priority.
pub struct LayerSet {
    layers: Vec<Box<dyn Layer>>,
}

impl LayerSet {
    pub fn new(mut layers: Vec<Box<dyn Layer>>) -> Self {
        layers.sort_by_key(|l| l.order());
        LayerSet { layers }
    }

    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    /// Run every layer in order, applying each layer's requests before the next starts.
    pub fn run(
        &mut self,
        frame: &FrameInfo,
        bands: &BandLayout,
        state: &mut SimState,
        motions: &mut MotionRegistry,
        canvas: &mut Canvas,
    ) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for layer in &mut self.layers {
            let requests = {
                let mut ctx = LayerCtx {
                    frame,
                    bands,
                    state,
                    motions: &mut *motions,
                };
                layer.draw(&mut ctx, canvas)
            };
            events.extend(requests.into_iter().filter_map(|r| state.apply(r)));
            canvas.reset_clip();
        }
        events
    }
}
