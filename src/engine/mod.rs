pub mod bands;
pub mod context;
pub mod fishing;
pub mod frame;
pub mod model;
pub mod motion;
pub mod sprite;
pub mod wave;

use chrono::{DateTime, Utc};

use crate::layers::back::BackLayer;
use crate::layers::entities::EntityLayer;
use crate::layers::front::FrontLayer;
use crate::layers::line::LineLayer;
use crate::layers::vessel::VesselLayer;
use crate::layers::water::WaterLayer;
use crate::layers::{Layer, LayerSet};
use crate::render::{Canvas, ColorGradient};
use bands::{BandLayout, DEFAULT_BAND_COUNT};
use context::{EngineEvent, SimState};
use fishing::FishingPhase;
use frame::{FrameClock, FrameInfo};
use model::{Card, CardId, Pond};
use motion::{EntityMotion, MotionRegistry, MotionTuning};
use sprite::SpriteSheet;
use wave::Harmonics;

/// Knobs fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Fraction of the viewport height above the resting water line
    pub sky_ratio: f64,
    pub band_count: usize,
    pub seed: u64,
    /// Particle density multiplier for the ambient layers
    pub scale: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            sky_ratio: 0.12,
            band_count: DEFAULT_BAND_COUNT,
            seed: 0x5eed,
            scale: 1.0,
        }
    }
}

/// One pond simulation: shared state, per-card motion, and the ordered layers
/// that draw and drive it.
pub struct Engine {
    state: SimState,
    motions: MotionRegistry,
    layers: LayerSet,
    clock: FrameClock,
    settings: EngineSettings,
    sky: ColorGradient,
    events: Vec<EngineEvent>,
    /// Viewport width seen on the last tick, 0 before the first
    width: f64,
    /// Calendar time of the last tick, for readiness checks between ticks
    now: DateTime<Utc>,
}

impl Engine {
    pub fn new(settings: EngineSettings, pond: Pond, cards: Vec<Card>, sprite: Option<SpriteSheet>) -> Self {
        let seed = settings.seed;
        let layers: Vec<Box<dyn Layer>> = vec![
            Box::new(WaterLayer::new(Harmonics::POND)),
            Box::new(BackLayer::new(seed)),
            Box::new(EntityLayer::new(seed.wrapping_add(1), sprite, MotionTuning::default())),
            Box::new(FrontLayer::new(seed.wrapping_add(2), settings.scale)),
            Box::new(LineLayer::new()),
            Box::new(VesselLayer::new()),
        ];
        let layers = LayerSet::new(layers);
        log::info!("engine up with layers {:?}", layers.names());
        Engine {
            state: SimState::new(pond, cards),
            motions: MotionRegistry::new(),
            layers,
            clock: FrameClock::new(),
            settings,
            sky: ColorGradient::new(vec![(0.0, (20, 32, 64)), (0.7, (96, 126, 168)), (1.0, (170, 190, 206))]),
            events: Vec::new(),
            width: 0.0,
            now: Utc::now(),
        }
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    #[cfg(test)]
    pub fn motion(&self, id: CardId) -> Option<&EntityMotion> {
        self.motions.get(id)
    }

    /// Advance to wall-clock second `wall` and draw one frame into `canvas`.
    pub fn tick(&mut self, canvas: &mut Canvas, wall: f64, now: DateTime<Utc>) -> FrameInfo {
        let (time, delta) = self.clock.advance(wall);
        let size = (canvas.width as f64, canvas.height as f64);
        let frame = FrameInfo::new(time, delta, wall, size, self.settings.sky_ratio, now);

        if self.width <= 0.0 {
            self.state.vessel.x = frame.width * 0.5;
        } else if frame.width != self.width {
            let max_x = frame.width.max(0.0);
            self.state.vessel.x = self.state.vessel.x.clamp(0.0, max_x);
            // the line hangs from the snapshot, keep it on screen too
            self.state.fishing.vessel_x = self.state.fishing.vessel_x.clamp(0.0, max_x);
        }
        self.width = frame.width;
        self.now = now;

        let horizon = frame.water_top_y.max(1.0);
        for y in 0..canvas.height {
            let rgb = self.sky.sample(y as f64 / horizon);
            canvas.fill_rect(0, y as i32, canvas.width as i32, 1, rgb, 1.0);
        }

        let bands = BandLayout::split(&frame, self.settings.band_count);
        self.motions.retain_cards(&self.state.cards);
        let events = self
            .layers
            .run(&frame, &bands, &mut self.state, &mut self.motions, canvas);
        self.events.extend(events);
        frame
    }

    /// Cast for `target`, or for the ready card nearest the boat when `None`.
    /// Returns the card being fished for, or `None` when a cast is already
    /// running or there is nothing to catch.
    pub fn start_fishing(&mut self, target: Option<CardId>) -> Option<CardId> {
        if self.state.fishing.is_active() {
            log::debug!("start_fishing ignored, already {}", self.state.fishing.phase().label());
            return None;
        }
        let id = match target {
            Some(id) => self.state.card(id)?.id,
            None => self.nearest_ready()?,
        };
        let vessel_x = self.state.vessel.x;
        match self.state.fishing.begin(id, vessel_x) {
            Ok(pid) => {
                log::debug!("cast {pid} for card {id} from x={vessel_x:.1}");
                Some(id)
            }
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }

    fn nearest_ready(&self) -> Option<CardId> {
        let x = self.state.vessel.x;
        self.state
            .cards
            .iter()
            .filter(|c| c.is_ready(self.now))
            .map(|c| {
                let dist = self.motions.get(c.id).map_or(f64::MAX, |m| (m.x - x).abs());
                (c.id, dist)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Record a review outcome for the open dialog. Returns false when no
    /// dialog is open, so repeated submissions are harmless.
    pub fn submit_review(&mut self, quality: u8) -> bool {
        let Some(card_id) = self.close_cast() else {
            return false;
        };
        self.events.push(EngineEvent::ReviewSubmitted { card_id, quality });
        true
    }

    /// Close the dialog without grading and return to idle.
    pub fn dismiss_dialog(&mut self) -> bool {
        self.close_cast().is_some()
    }

    fn close_cast(&mut self) -> Option<CardId> {
        if !self.state.dialog.open {
            return None;
        }
        let card_id = self.state.dialog.card?;
        self.state.dialog.close();
        if self.state.fishing.phase() == FishingPhase::Done {
            if let Err(e) = self.state.fishing.advance(FishingPhase::Idle) {
                log::warn!("{e}");
            }
        } else {
            self.state.fishing.abandon();
        }
        self.motions.evict(card_id);
        Some(card_id)
    }

    /// Slide the boat. Ignored mid-cast so the line stays attached.
    pub fn move_vessel(&mut self, dx: f64) {
        if self.state.fishing.is_active() {
            return;
        }
        let x = self.state.vessel.x + dx;
        self.state.vessel.x = if self.width > 0.0 { x.clamp(0.0, self.width) } else { x };
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.clock.set_paused(paused);
    }

    pub fn paused(&self) -> bool {
        self.clock.paused()
    }

    pub fn set_pond(&mut self, pond: Pond) {
        self.state.pond = pond;
    }

    /// Swap in a reloaded card list. A cast whose target vanished is dropped.
    pub fn replace_cards(&mut self, cards: Vec<Card>) {
        if let Some(target) = self.state.fishing.target()
            && !cards.iter().any(|c| c.id == target)
        {
            log::info!("card {target} left the deck mid-cast, abandoning");
            self.state.fishing.abandon();
            self.state.dialog.close();
        }
        self.state.cards = cards;
        self.motions.retain_cards(&self.state.cards);
    }

    /// Replace one card in place, e.g. after it was rescheduled.
    pub fn update_card(&mut self, card: Card) -> bool {
        match self.state.cards.iter_mut().find(|c| c.id == card.id) {
            Some(slot) => {
                *slot = card;
                true
            }
            None => false,
        }
    }

    pub fn ready_count(&self, now: DateTime<Utc>) -> usize {
        self.state.cards.iter().filter(|c| c.is_ready(now)).count()
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}
