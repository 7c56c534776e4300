use super::canvas::Canvas;
use super::color::{self, ColorMode};

const RAMP: &[u8] = b" .:-=+*#%@";

pub fn render(canvas: &Canvas) -> String {
    let (cols, rows) = canvas.term_size();
    let mut out = String::with_capacity(cols * rows * 8);
    let use_color = canvas.color_mode != ColorMode::Mono;
    let mut last_fg = String::new();

    for row in 0..rows {
        for col in 0..cols {
            let idx = row * canvas.width + col;
            let rgb = canvas.colors[idx];
            let level = canvas.pixels[idx].clamp(0.0, 1.0) * color::luminance(rgb) / 255.0;
            let ch = RAMP[((level * (RAMP.len() - 1) as f64).round() as usize).min(RAMP.len() - 1)] as char;

            if use_color {
                let fg = color::fg(canvas.map_color(rgb));
                if fg != last_fg {
                    out.push_str(&format!("\x1b[{fg}m"));
                    last_fg = fg;
                }
            }
            out.push(ch);
        }
        if use_color {
            out.push_str("\x1b[0m");
            last_fg.clear();
        }
        out.push_str(&format!("\x1b[{};1H", row + 2));
    }
    out
}
