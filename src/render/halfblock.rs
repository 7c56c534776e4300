use super::canvas::Canvas;
use super::color::{self, ColorMode};

/// Coverage below which a pixel counts as empty background.
const EMPTY_THRESHOLD: f64 = 0.02;

pub fn render(canvas: &Canvas) -> String {
    let (term_cols, term_rows) = canvas.term_size();
    let mut out = String::with_capacity(term_cols * term_rows * 12);

    let mut last_fg = String::new();
    let mut last_bg = String::new();
    let mut in_color = false;

    for row in 0..term_rows {
        for col in 0..term_cols {
            let top = (row * 2) * canvas.width + col;
            let bot = (row * 2 + 1) * canvas.width + col;
            let top_on = canvas.pixels[top] >= EMPTY_THRESHOLD;
            let bot_on = canvas.pixels[bot] >= EMPTY_THRESHOLD;

            if canvas.color_mode == ColorMode::Mono {
                out.push(match (top_on, bot_on) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                });
                continue;
            }

            if !top_on && !bot_on {
                if in_color {
                    out.push_str("\x1b[0m");
                    in_color = false;
                    last_fg.clear();
                    last_bg.clear();
                }
                out.push(' ');
                continue;
            }

            let fg = color::fg(canvas.map_color(canvas.colors[top]));
            let bg = color::bg(canvas.map_color(canvas.colors[bot]));
            match (fg != last_fg, bg != last_bg) {
                (true, true) => out.push_str(&format!("\x1b[{fg};{bg}m")),
                (true, false) => out.push_str(&format!("\x1b[{fg}m")),
                (false, true) => out.push_str(&format!("\x1b[{bg}m")),
                (false, false) => {}
            }
            last_fg = fg;
            last_bg = bg;
            in_color = true;
            out.push('▀');
        }
        if in_color {
            out.push_str("\x1b[0m");
            in_color = false;
            last_fg.clear();
            last_bg.clear();
        }
        // Cursor movement instead of \n avoids scrolling on the last row
        out.push_str(&format!("\x1b[{};1H", row + 2));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderMode;

    #[test]
    fn mono_uses_block_glyphs() {
        let mut c = Canvas::new(2, 1, RenderMode::HalfBlock, ColorMode::Mono);
        c.plot(0, 0, (255, 255, 255), 1.0);
        c.plot(1, 1, (255, 255, 255), 1.0);
        let out = c.render();
        assert!(out.starts_with("▀▄"));
    }

    #[test]
    fn color_emits_one_sgr_per_run() {
        let mut c = Canvas::new(3, 1, RenderMode::HalfBlock, ColorMode::TrueColor);
        c.fill((10, 20, 30));
        let out = c.render();
        assert_eq!(out.matches("38;2;10;20;30").count(), 1);
        assert_eq!(out.matches('▀').count(), 3);
    }
}
