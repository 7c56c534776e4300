use chrono::{DateTime, Utc};

/// Largest simulation step taken in one tick. A stalled terminal should not
/// teleport fish across the pond when it wakes up.
pub const MAX_DELTA: f64 = 0.25;

/// Everything a layer needs to know about the current tick.
#[derive(Debug, Clone)]
pub struct FrameInfo {
    /// Simulation time in seconds (stops while paused)
    pub time: f64,
    /// Simulation seconds since the previous tick (0 on the first tick)
    pub delta: f64,
    /// Wall-clock seconds since the engine started, never paused
    pub wall: f64,
    /// Viewport width in pixels
    pub width: f64,
    /// Viewport height in pixels
    pub height: f64,
    /// Boundary between sky and water at rest
    pub water_top_y: f64,
    /// Calendar time used for card readiness
    pub now: DateTime<Utc>,
}

impl FrameInfo {
    pub fn new(
        time: f64,
        delta: f64,
        wall: f64,
        (width, height): (f64, f64),
        sky_ratio: f64,
        now: DateTime<Utc>,
    ) -> Self {
        FrameInfo {
            time,
            delta,
            wall,
            width,
            height,
            water_top_y: height * sky_ratio,
            now,
        }
    }
}

/// Turns host timestamps into simulation time and per-tick deltas.
#[derive(Debug, Default)]
pub struct FrameClock {
    prev_wall: Option<f64>,
    sim_time: f64,
    paused: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Advance to wall-clock second `wall`, returning `(time, delta)`.
    pub fn advance(&mut self, wall: f64) -> (f64, f64) {
        let step = match self.prev_wall {
            Some(prev) => (wall - prev).clamp(0.0, MAX_DELTA),
            None => 0.0,
        };
        self.prev_wall = Some(wall);
        let delta = if self.paused { 0.0 } else { step };
        self.sim_time += delta;
        (self.sim_time, delta)
    }
}
