use std::collections::HashMap;
use std::f64::consts::TAU;
use std::ops::Range;

use rand::RngExt;

use super::bands::BandLayout;
use super::fishing::Point;
use super::frame::FrameInfo;
use super::model::{Card, CardId};

/// Knobs for the swimming model, in pixels and seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionTuning {
    /// Gap kept between a fish and the viewport's left/right edge
    pub side_margin: f64,
    /// Gap kept between a fish's center and its band's top/bottom edge
    pub band_padding: f64,
    pub ready_speed: Range<f64>,
    pub resting_speed: Range<f64>,
    /// Vertical swing as a fraction of the padded band half-height
    pub amplitude: Range<f64>,
    /// Vertical swing frequency in rad/s
    pub frequency: Range<f64>,
    /// Share of the previous center kept each tick
    pub inertia: f64,
    /// Speed at which a lured fish swims to the hook, independent of its own speed
    pub boost_speed: f64,
    /// Distance at which a lured fish counts as hooked
    pub snap_distance: f64,
    /// How far below the hook a hooked fish hangs
    pub pin_offset: f64,
}

impl Default for MotionTuning {
    fn default() -> Self {
        MotionTuning {
            side_margin: 4.0,
            band_padding: 3.0,
            ready_speed: 10.0..18.0,
            resting_speed: 4.0..8.0,
            amplitude: 0.3..0.9,
            frequency: 0.6..1.4,
            inertia: 0.9,
            boost_speed: 45.0,
            snap_distance: 2.5,
            pin_offset: 2.0,
        }
    }
}

/// Per-card swimming state. Lives only as long as the card is on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMotion {
    pub x: f64,
    /// +1 swimming right, -1 swimming left
    pub direction: f64,
    pub speed: f64,
    pub phase: f64,
    pub amplitude: f64,
    pub frequency: f64,
    pub band: usize,
    pub center_y: f64,
    /// Readiness the speed was rolled for
    pub ready: bool,
}

/// Horizontal range a fish of half-width `half_width` may occupy.
pub fn horizontal_bounds(width: f64, half_width: f64, tuning: &MotionTuning) -> (f64, f64) {
    let lo = tuning.side_margin + half_width;
    let hi = width - tuning.side_margin - half_width;
    if lo > hi {
        let mid = width * 0.5;
        return (mid, mid);
    }
    (lo, hi)
}

fn roll<R: RngExt>(rng: &mut R, range: &Range<f64>) -> f64 {
    if range.is_empty() {
        range.start
    } else {
        rng.random_range(range.clone())
    }
}

impl EntityMotion {
    pub fn spawn<R: RngExt>(
        rng: &mut R,
        band: usize,
        bands: &BandLayout,
        x_range: (f64, f64),
        ready: bool,
        tuning: &MotionTuning,
    ) -> Self {
        let (lo, hi) = x_range;
        EntityMotion {
            x: roll(rng, &(lo..hi)),
            direction: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            speed: Self::roll_speed(rng, ready, tuning),
            phase: rng.random_range(0.0..TAU),
            amplitude: roll(rng, &tuning.amplitude),
            frequency: roll(rng, &tuning.frequency),
            band,
            center_y: bands.midline(band),
            ready,
        }
    }

    fn roll_speed<R: RngExt>(rng: &mut R, ready: bool, tuning: &MotionTuning) -> f64 {
        if ready {
            roll(rng, &tuning.ready_speed)
        } else {
            roll(rng, &tuning.resting_speed)
        }
    }

    /// One tick of free swimming: patrol side to side inside the margins and
    /// bob inside the card's band.
    pub fn step_free(
        &mut self,
        frame: &FrameInfo,
        bands: &BandLayout,
        depth_level: i64,
        half_width: f64,
        tuning: &MotionTuning,
    ) {
        let (lo, hi) = horizontal_bounds(frame.width, half_width, tuning);
        self.x += self.direction * self.speed * frame.delta;
        if self.x <= lo {
            self.x = lo;
            self.direction = 1.0;
        } else if self.x >= hi {
            self.x = hi;
            self.direction = -1.0;
        }

        self.band = bands.clamp_index(depth_level);
        let (top, bottom) = bands.padded(self.band, tuning.band_padding);
        let mid = (top + bottom) * 0.5;
        let swing = self.amplitude * (bottom - top) * 0.5;
        let target = (mid + swing * (self.frequency * frame.time + self.phase).sin()).clamp(top, bottom);
        let blended = self.center_y * tuning.inertia + target * (1.0 - tuning.inertia);
        // A band change or resize can leave the old center outside the new range
        self.center_y = blended.clamp(top, bottom);
    }

    /// Swim toward the hook at boost speed. Returns true once close enough to bite.
    pub fn pull_toward(&mut self, hook: Point, dt: f64, tuning: &MotionTuning) -> bool {
        let here = Point::new(self.x, self.center_y);
        let dist = here.distance(hook);
        if dist > f64::EPSILON {
            let step = (tuning.boost_speed * dt).min(dist);
            let (dx, dy) = (hook.x - self.x, hook.y - self.center_y);
            self.x += dx / dist * step;
            self.center_y += dy / dist * step;
            if dx.abs() > 0.5 {
                self.direction = dx.signum();
            }
        }
        Point::new(self.x, self.center_y).distance(hook) <= tuning.snap_distance
    }

    /// Hang just under the hook.
    pub fn pin_to(&mut self, hook: Point, tuning: &MotionTuning) {
        self.x = hook.x;
        self.center_y = hook.y + tuning.pin_offset;
    }
}

/// Motion state for every visible card, created on first sighting.
#[derive(Debug, Default)]
pub struct MotionRegistry {
    entries: HashMap<CardId, EntityMotion>,
}

impl MotionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: CardId) -> Option<&EntityMotion> {
        self.entries.get(&id)
    }

    /// Fetch the card's motion, spawning fresh randomized parameters if this is
    /// the first time it is seen. Re-rolls speed when readiness flipped.
    pub fn get_or_spawn<R: RngExt>(
        &mut self,
        rng: &mut R,
        card: &Card,
        frame: &FrameInfo,
        bands: &BandLayout,
        half_width: f64,
        tuning: &MotionTuning,
    ) -> &mut EntityMotion {
        let ready = card.is_ready(frame.now);
        let motion = self.entries.entry(card.id).or_insert_with(|| {
            let band = bands.clamp_index(card.depth_level);
            let x_range = horizontal_bounds(frame.width, half_width, tuning);
            EntityMotion::spawn(rng, band, bands, x_range, ready, tuning)
        });
        if motion.ready != ready {
            motion.ready = ready;
            motion.speed = EntityMotion::roll_speed(rng, ready, tuning);
        }
        motion
    }

    /// Forget a card so its next appearance starts from fresh parameters.
    pub fn evict(&mut self, id: CardId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Drop state for cards no longer in the deck.
    pub fn retain_cards(&mut self, cards: &[Card]) {
        self.entries.retain(|id, _| cards.iter().any(|c| c.id == *id));
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn card(id: CardId, depth: i64, ready: bool) -> Card {
        let now = Utc::now();
        Card {
            id,
            prompt: String::new(),
            answer: String::new(),
            depth_level: depth,
            next_review_date: if ready { now - Duration::days(1) } else { now + Duration::days(1) },
        }
    }

    fn frame(time: f64, delta: f64) -> FrameInfo {
        FrameInfo::new(time, delta, time, (800.0, 600.0), 0.12, Utc::now())
    }

    #[test]
    fn spawns_lazily_once() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut reg = MotionRegistry::new();
        let f = frame(0.0, 0.0);
        let bands = BandLayout::split(&f, 4);
        let tuning = MotionTuning::default();
        let c = card(9, 2, true);
        let x = reg.get_or_spawn(&mut rng, &c, &f, &bands, 4.0, &tuning).x;
        let again = reg.get_or_spawn(&mut rng, &c, &f, &bands, 4.0, &tuning).x;
        assert_eq!(x, again);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(9).map(|m| m.band), Some(2));
        assert!(reg.evict(9));
        assert!(!reg.evict(9));
    }

    #[test]
    fn ready_cards_swim_faster() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut reg = MotionRegistry::new();
        let f = frame(0.0, 0.0);
        let bands = BandLayout::split(&f, 4);
        let tuning = MotionTuning::default();
        for id in 0..20 {
            let ready = id % 2 == 0;
            let m = reg.get_or_spawn(&mut rng, &card(id, 0, ready), &f, &bands, 4.0, &tuning);
            if ready {
                assert!(tuning.ready_speed.contains(&m.speed));
            } else {
                assert!(tuning.resting_speed.contains(&m.speed));
            }
        }
    }

    #[test]
    fn bounces_off_side_margin() {
        let tuning = MotionTuning::default();
        let f = frame(1.0, 0.5);
        let bands = BandLayout::split(&f, 4);
        let mut m = EntityMotion {
            x: 9.0,
            direction: -1.0,
            speed: 10.0,
            phase: 0.0,
            amplitude: 0.5,
            frequency: 1.0,
            band: 0,
            center_y: bands.midline(0),
            ready: true,
        };
        m.step_free(&f, &bands, 0, 4.0, &tuning);
        assert_eq!(m.x, 8.0);
        assert_eq!(m.direction, 1.0);
    }

    #[test]
    fn pull_reaches_hook_and_reports_bite() {
        let tuning = MotionTuning::default();
        let mut m = EntityMotion {
            x: 100.0,
            direction: 1.0,
            speed: 5.0,
            phase: 0.0,
            amplitude: 0.0,
            frequency: 0.0,
            band: 1,
            center_y: 200.0,
            ready: true,
        };
        let hook = Point::new(60.0, 200.0);
        assert!(!m.pull_toward(hook, 0.1, &tuning));
        assert!((m.x - 95.5).abs() < 1e-9);
        assert_eq!(m.direction, -1.0);
        let mut bitten = false;
        for _ in 0..20 {
            bitten = m.pull_toward(hook, 0.1, &tuning);
            if bitten {
                break;
            }
        }
        assert!(bitten);
    }

    #[test]
    fn retain_drops_missing_cards() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut reg = MotionRegistry::new();
        let f = frame(0.0, 0.0);
        let bands = BandLayout::split(&f, 4);
        let tuning = MotionTuning::default();
        let cards = vec![card(1, 0, true), card(2, 1, true)];
        for c in &cards {
            reg.get_or_spawn(&mut rng, c, &f, &bands, 4.0, &tuning);
        }
        reg.retain_cards(&cards[..1]);
        assert_eq!(reg.len(), 1);
        assert!(reg.get(2).is_none());
    }

    proptest! {
        #[test]
        fn free_motion_stays_in_band_and_margins(
            seed in any::<u64>(),
            depth in -3i64..8,
            dts in proptest::collection::vec(0.0f64..0.25, 1..200),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let tuning = MotionTuning::default();
            let half_width = 4.0;
            let mut reg = MotionRegistry::new();
            let c = card(1, depth, seed % 2 == 0);
            let mut t = 0.0;
            for dt in dts {
                t += dt;
                let f = frame(t, dt);
                let bands = BandLayout::split(&f, 4);
                let m = reg.get_or_spawn(&mut rng, &c, &f, &bands, half_width, &tuning);
                m.step_free(&f, &bands, c.depth_level, half_width, &tuning);
                let (top, bottom) = bands.padded(bands.clamp_index(depth), tuning.band_padding);
                prop_assert!(m.center_y >= top && m.center_y <= bottom);
                let (lo, hi) = horizontal_bounds(f.width, half_width, &tuning);
                prop_assert!(m.x >= lo && m.x <= hi);
            }
        }
    }
}
