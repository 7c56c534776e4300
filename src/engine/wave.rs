use std::rc::Rc;

use super::frame::FrameInfo;

/// Water surface height (pixel row) at simulation time `t` and column `x`.
pub type WaveFn = Rc<dyn Fn(f64, f64, &FrameInfo) -> f64>;

/// One sine component: `amplitude * sin(frequency * t + spatial * x)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonic {
    pub amplitude: f64,
    pub frequency: f64,
    pub spatial: f64,
}

/// Sum of three sine harmonics describing the pond surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonics(pub [Harmonic; 3]);

impl Harmonics {
    /// Gentle pond swell tuned for terminal-sized viewports.
    pub const POND: Harmonics = Harmonics([
        Harmonic { amplitude: 1.6, frequency: 1.1, spatial: 0.045 },
        Harmonic { amplitude: 0.9, frequency: 1.9, spatial: 0.093 },
        Harmonic { amplitude: 0.5, frequency: 3.3, spatial: 0.171 },
    ]);

    /// Height offset relative to the resting water line.
    pub fn height(&self, t: f64, x: f64) -> f64 {
        self.0
            .iter()
            .map(|h| h.amplitude * (h.frequency * t + h.spatial * x).sin())
            .sum()
    }

    /// Largest crest the sum can ever reach.
    pub fn max_amplitude(&self) -> f64 {
        self.0.iter().map(|h| h.amplitude.abs()).sum()
    }

    /// Bind these harmonics to the frame's water line.
    pub fn surface_fn(self) -> WaveFn {
        Rc::new(move |t, x, frame: &FrameInfo| frame.water_top_y + self.height(t, x))
    }
}

/// Slot holding the surface function published by the water layer this tick.
pub struct WaveRegistry {
    current: Option<WaveFn>,
    flat: WaveFn,
}

impl Default for WaveRegistry {
    fn default() -> Self {
        WaveRegistry {
            current: None,
            flat: Rc::new(|_: f64, _: f64, frame: &FrameInfo| frame.water_top_y),
        }
    }
}

impl WaveRegistry {
    /// Replace the current function wholesale.
    pub fn publish(&mut self, wave: WaveFn) {
        self.current = Some(wave);
    }

    /// The published function, or flat water at rest when nothing has been published yet.
    pub fn current(&self) -> WaveFn {
        self.current.clone().unwrap_or_else(|| self.flat.clone())
    }

    #[cfg(test)]
    pub fn is_published(&self) -> bool {
        self.current.is_some()
    }

    /// Surface row under every pixel column of the viewport.
    pub fn profile(&self, frame: &FrameInfo) -> Vec<f64> {
        let wave = self.current();
        (0..frame.width.max(0.0) as usize)
            .map(|x| wave(frame.time, x as f64, frame))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn frame() -> FrameInfo {
        FrameInfo::new(0.0, 0.0, 0.0, (800.0, 600.0), 0.12, Utc::now())
    }

    #[test]
    fn unpublished_registry_is_flat() {
        let reg = WaveRegistry::default();
        let f = frame();
        assert!(!reg.is_published());
        assert_eq!((reg.current())(3.0, 17.0, &f), f.water_top_y);
    }

    #[test]
    fn publish_replaces_function() {
        let mut reg = WaveRegistry::default();
        let f = frame();
        reg.publish(Rc::new(|_: f64, _: f64, _: &FrameInfo| 10.0));
        reg.publish(Harmonics::POND.surface_fn());
        let y = (reg.current())(1.0, 2.0, &f);
        assert_eq!(y, f.water_top_y + Harmonics::POND.height(1.0, 2.0));
    }

    #[test]
    fn height_bounded_by_max_amplitude() {
        let h = Harmonics::POND;
        for i in 0..500 {
            let t = i as f64 * 0.37;
            let x = i as f64 * 1.3;
            assert!(h.height(t, x).abs() <= h.max_amplitude() + 1e-12);
        }
    }

    proptest! {
        #[test]
        fn height_is_deterministic(t in -1e4f64..1e4, x in -1e4f64..1e4) {
            let h = Harmonics::POND;
            prop_assert_eq!(h.height(t, x), h.height(t, x));
        }

        #[test]
        fn height_is_continuous(t in -1e3f64..1e3, x in -1e3f64..1e3) {
            // Lipschitz bound: |dh| <= sum(a * (f*dt + s*dx))
            let h = Harmonics::POND;
            let eps = 1e-6;
            let bound: f64 = h.0.iter().map(|c| c.amplitude * (c.frequency + c.spatial) * eps).sum();
            prop_assert!((h.height(t + eps, x + eps) - h.height(t, x)).abs() <= bound + 1e-12);
        }

        #[test]
        fn no_jump_at_integer_boundaries(n in -500i32..500) {
            let h = Harmonics::POND;
            let k = n as f64;
            let eps = 1e-9;
            prop_assert!((h.height(k - eps, k - eps) - h.height(k + eps, k + eps)).abs() < 1e-6);
        }
    }
}
