use super::color::{self, Rgb};

/// Linear gradient through color stops, sampled by t in 0.0..=1.0.
#[derive(Debug, Clone)]
pub struct ColorGradient {
    stops: Vec<(f64, Rgb)>,
}

impl ColorGradient {
    /// Stops must be sorted by t. A single stop yields a flat color.
    pub fn new(stops: Vec<(f64, Rgb)>) -> Self {
        debug_assert!(!stops.is_empty(), "gradient needs at least one stop");
        ColorGradient { stops }
    }

    pub fn sample(&self, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let Some(&(first_t, first)) = self.stops.first() else {
            return (0, 0, 0);
        };
        if t <= first_t {
            return first;
        }
        for pair in self.stops.windows(2) {
            let ((ta, a), (tb, b)) = (pair[0], pair[1]);
            if t <= tb {
                let span = (tb - ta).max(f64::EPSILON);
                return color::lerp(a, b, (t - ta) / span);
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_between_stops() {
        let g = ColorGradient::new(vec![(0.0, (0, 0, 0)), (0.5, (100, 100, 100)), (1.0, (200, 0, 0))]);
        assert_eq!(g.sample(0.25), (50, 50, 50));
        assert_eq!(g.sample(0.75), (150, 50, 50));
        assert_eq!(g.sample(-1.0), (0, 0, 0));
        assert_eq!(g.sample(2.0), (200, 0, 0));
    }
}
