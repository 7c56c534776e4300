use crossterm::style::Color;

pub type Rgb = (u8, u8, u8);

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// No color, monochrome
    Mono,
    /// ANSI 16 colors
    Ansi16,
    /// 256-color palette
    Ansi256,
    /// 24-bit true color (RGB)
    TrueColor,
}

#[inline]
pub fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round().clamp(0.0, 255.0) as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Pull a color toward its own grey by `amount` (0 = unchanged, 1 = fully grey).
pub fn desaturate(rgb: Rgb, amount: f64) -> Rgb {
    let grey = luminance(rgb).round() as u8;
    lerp(rgb, (grey, grey, grey), amount)
}

/// Perceptual brightness in 0..=255
pub fn luminance((r, g, b): Rgb) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

pub fn quantize(rgb: Rgb, step: u8) -> Rgb {
    if step <= 1 {
        return rgb;
    }
    let q = step as u16;
    let snap = |c: u8| ((c as u16 + q / 2) / q * q).min(255) as u8;
    (snap(rgb.0), snap(rgb.1), snap(rgb.2))
}

pub fn map((r, g, b): Rgb, mode: ColorMode) -> Color {
    match mode {
        ColorMode::Mono => Color::White,
        ColorMode::TrueColor => Color::Rgb { r, g, b },
        ColorMode::Ansi256 => {
            let idx = 16 + (36 * (r as u16 / 51)) + (6 * (g as u16 / 51)) + (b as u16 / 51);
            Color::AnsiValue(idx as u8)
        }
        ColorMode::Ansi16 => {
            let brightness = (r as u16 + g as u16 + b as u16) / 3;
            let bright = brightness > 150;
            if brightness < 40 {
                Color::Black
            } else if b >= r && g >= r && b.abs_diff(g) < 40 {
                if bright { Color::Cyan } else { Color::DarkCyan }
            } else if b > r && b > g {
                if bright { Color::Blue } else { Color::DarkBlue }
            } else if g > r && g > b {
                if bright { Color::Green } else { Color::DarkGreen }
            } else if r > g && r > b {
                if bright { Color::Red } else { Color::DarkRed }
            } else if bright {
                Color::White
            } else {
                Color::Grey
            }
        }
    }
}

fn sgr_code(color: Color, background: bool) -> String {
    let (rgb, indexed, base, bright_base) = if background {
        ("48;2", "48;5", 40, 100)
    } else {
        ("38;2", "38;5", 30, 90)
    };
    let basic = |n: u8, bright: bool| {
        if bright {
            (bright_base + n as u16).to_string()
        } else {
            (base + n as u16).to_string()
        }
    };
    match color {
        Color::Rgb { r, g, b } => format!("{rgb};{r};{g};{b}"),
        Color::AnsiValue(v) => format!("{indexed};{v}"),
        Color::Black => basic(0, false),
        Color::DarkRed => basic(1, false),
        Color::DarkGreen => basic(2, false),
        Color::DarkYellow => basic(3, false),
        Color::DarkBlue => basic(4, false),
        Color::DarkMagenta => basic(5, false),
        Color::DarkCyan => basic(6, false),
        Color::Grey => basic(7, false),
        Color::DarkGrey => basic(0, true),
        Color::Red => basic(1, true),
        Color::Green => basic(2, true),
        Color::Yellow => basic(3, true),
        Color::Blue => basic(4, true),
        Color::Magenta => basic(5, true),
        Color::Cyan => basic(6, true),
        Color::White => basic(7, true),
        _ => basic(7, false),
    }
}

pub fn fg(color: Color) -> String {
    sgr_code(color, false)
}

pub fn bg(color: Color) -> String {
    sgr_code(color, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desaturate_fully_is_grey() {
        let (r, g, b) = desaturate((255, 0, 0), 1.0);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn quantize_rounds_to_step() {
        assert_eq!(quantize((3, 13, 250), 8), (0, 16, 248));
        assert_eq!(quantize((3, 13, 250), 0), (3, 13, 250));
    }

    #[test]
    fn sgr_codes() {
        assert_eq!(fg(Color::Rgb { r: 1, g: 2, b: 3 }), "38;2;1;2;3");
        assert_eq!(bg(Color::AnsiValue(17)), "48;5;17");
        assert_eq!(fg(Color::DarkBlue), "34");
        assert_eq!(bg(Color::White), "107");
    }
}
