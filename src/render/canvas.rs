use super::color::{self, ColorMode, Rgb};

/// How sub-cell pixels map onto terminal characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    /// Half-block characters ▀ with fg/bg colors (1x2 pixels per cell)
    HalfBlock,
    /// Plain ASCII density ramp (1x1 pixels per cell)
    Ascii,
}

impl RenderMode {
    /// Pixels per terminal cell as (columns, rows). This is the terminal
    /// counterpart of a device pixel ratio.
    pub fn pixel_ratio(self) -> (usize, usize) {
        match self {
            RenderMode::HalfBlock => (1, 2),
            RenderMode::Ascii => (1, 1),
        }
    }
}

/// A pixel surface that gets encoded to terminal characters.
/// Coordinates are in sub-cell pixel space, origin top-left.
pub struct Canvas {
    /// Width in pixels (sub-cell)
    pub width: usize,
    /// Height in pixels (sub-cell)
    pub height: usize,
    /// Coverage per pixel: 0.0 = never drawn this frame, 1.0 = opaque
    pub pixels: Vec<f64>,
    /// Per-pixel color
    pub colors: Vec<Rgb>,
    pub render_mode: RenderMode,
    pub color_mode: ColorMode,
    /// Color quantization step (0 = off, 4/8/16 = round RGB to nearest N).
    pub color_quant: u8,
    /// Per-column topmost drawable row. Pixels above it are discarded by `plot`.
    clip: Vec<f64>,
}

impl Canvas {
    pub fn new(
        term_cols: usize,
        term_rows: usize,
        render_mode: RenderMode,
        color_mode: ColorMode,
    ) -> Self {
        let (rx, ry) = render_mode.pixel_ratio();
        let (px_w, px_h) = (term_cols * rx, term_rows * ry);
        let size = px_w * px_h;
        Canvas {
            width: px_w,
            height: px_h,
            pixels: vec![0.0; size],
            colors: vec![(0, 0, 0); size],
            render_mode,
            color_mode,
            color_quant: 0,
            clip: vec![f64::NEG_INFINITY; px_w],
        }
    }

    /// Terminal dimensions covered by this canvas
    pub fn term_size(&self) -> (usize, usize) {
        let (rx, ry) = self.render_mode.pixel_ratio();
        (self.width / rx, self.height / ry)
    }

    /// Paint every pixel opaque with one color and drop any clip.
    #[cfg(test)]
    pub fn fill(&mut self, rgb: Rgb) {
        self.pixels.fill(1.0);
        self.colors.fill(rgb);
        self.reset_clip();
    }

    /// Restrict subsequent `plot` calls to pixels at or below `tops[x]` in each column.
    /// Columns past the end of `tops` are left unclipped.
    pub fn clip_below(&mut self, tops: &[f64]) {
        for (slot, &top) in self.clip.iter_mut().zip(tops) {
            *slot = top;
        }
    }

    pub fn reset_clip(&mut self) {
        self.clip.fill(f64::NEG_INFINITY);
    }

    #[inline]
    fn visible(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (ux, uy) = (x as usize, y as usize);
        if ux >= self.width || uy >= self.height || (y as f64) < self.clip[ux] {
            return None;
        }
        Some(uy * self.width + ux)
    }

    /// Blend `rgb` over the pixel at (x, y) with opacity `alpha`. Bounds- and clip-checked.
    #[inline]
    pub fn plot(&mut self, x: i32, y: i32, rgb: Rgb, alpha: f64) {
        let Some(idx) = self.visible(x, y) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        self.colors[idx] = color::lerp(self.colors[idx], rgb, a);
        self.pixels[idx] += (1.0 - self.pixels[idx]) * a;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, rgb: Rgb, alpha: f64) {
        for py in y..y + h {
            for px in x..x + w {
                self.plot(px, py, rgb, alpha);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, rgb: Rgb, alpha: f64) {
        let r = radius.ceil() as i32;
        let (ix, iy) = (cx.round() as i32, cy.round() as i32);
        for dy in -r..=r {
            for dx in -r..=r {
                let ddx = (ix + dx) as f64 - cx;
                let ddy = (iy + dy) as f64 - cy;
                if ddx * ddx + ddy * ddy <= radius * radius {
                    self.plot(ix + dx, iy + dy, rgb, alpha);
                }
            }
        }
    }

    /// Straight segment between two points, one plot per step along the major axis.
    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, rgb: Rgb, alpha: f64) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as i32;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            self.plot(x.round() as i32, y.round() as i32, rgb, alpha);
        }
    }

    /// Encode the canvas to a frame string for output
    pub fn render(&self) -> String {
        match self.render_mode {
            RenderMode::HalfBlock => super::halfblock::render(self),
            RenderMode::Ascii => super::ascii::render(self),
        }
    }

    /// Map an RGB triple to a terminal color under the current color mode and quantization.
    pub fn map_color(&self, rgb: Rgb) -> crossterm::style::Color {
        color::map(color::quantize(rgb, self.color_quant), self.color_mode)
    }
}
