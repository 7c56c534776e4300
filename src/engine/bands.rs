use super::frame::FrameInfo;

/// Default number of depth bands in the water column
pub const DEFAULT_BAND_COUNT: usize = 4;

/// The water column below `water_top_y` cut into equal horizontal slices.
///
/// Each band gets `column / n` pixels and the first `column % n` bands get one
/// extra, so the bands always tile the column exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct BandLayout {
    top: f64,
    heights: Vec<f64>,
}

impl BandLayout {
    pub fn split(frame: &FrameInfo, count: usize) -> Self {
        let count = count.max(1);
        let column = (frame.height - frame.water_top_y).max(0.0).floor() as usize;
        let (base, rem) = (column / count, column % count);
        let heights = (0..count)
            .map(|i| (base + usize::from(i < rem)) as f64)
            .collect();
        BandLayout {
            top: frame.water_top_y,
            heights,
        }
    }

    pub fn count(&self) -> usize {
        self.heights.len()
    }

    /// Clamp an arbitrary depth level to a valid band index.
    pub fn clamp_index(&self, level: i64) -> usize {
        level.clamp(0, self.count() as i64 - 1) as usize
    }

    /// `(top, bottom)` of band `index` (clamped).
    pub fn range(&self, index: usize) -> (f64, f64) {
        let index = index.min(self.count() - 1);
        let top = self.top + self.heights[..index].iter().sum::<f64>();
        (top, top + self.heights[index])
    }

    /// Band range shrunk by `padding` on both sides. Collapses to the midline
    /// when the band is too thin to hold the padding.
    pub fn padded(&self, index: usize, padding: f64) -> (f64, f64) {
        let (top, bottom) = self.range(index);
        if bottom - top < padding * 2.0 {
            let mid = (top + bottom) * 0.5;
            return (mid, mid);
        }
        (top + padding, bottom - padding)
    }

    pub fn midline(&self, index: usize) -> f64 {
        let (top, bottom) = self.range(index);
        (top + bottom) * 0.5
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.count()).map(|i| self.range(i))
    }
}
