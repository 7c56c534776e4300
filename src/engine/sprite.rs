use std::collections::HashMap;
use std::path::Path;

/// One pixel of a sprite frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Body,
    Accent,
}

/// A single frame, stored row-major, facing right.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteFrame {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl SpriteFrame {
    fn parse(rows: &[&str]) -> Option<Self> {
        let width = rows.iter().map(|r| r.chars().count()).max()?;
        if width == 0 {
            return None;
        }
        let mut cells = Vec::with_capacity(width * rows.len());
        for row in rows {
            let mut n = 0;
            for ch in row.chars() {
                cells.push(match ch {
                    '#' => Cell::Body,
                    'o' => Cell::Accent,
                    _ => Cell::Empty,
                });
                n += 1;
            }
            cells.extend(std::iter::repeat_n(Cell::Empty, width - n));
        }
        Some(SpriteFrame {
            width,
            height: rows.len(),
            cells,
        })
    }

    /// Cell at (col, row), reading mirrored when `flip` is set.
    pub fn cell(&self, col: usize, row: usize, flip: bool) -> Cell {
        let col = if flip { self.width - 1 - col } else { col };
        self.cells[row * self.width + col]
    }
}

/// An ordered set of equally sized frames.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    pub frames: Vec<SpriteFrame>,
}

impl SpriteSheet {
    /// Parse the text sheet format: frames separated by blank lines,
    /// `#` for body pixels, `o` for accent pixels, anything else transparent.
    pub fn parse(text: &str) -> Option<Self> {
        let mut frames = Vec::new();
        let mut rows: Vec<&str> = Vec::new();
        for line in text.lines().chain(std::iter::once("")) {
            if line.trim().is_empty() {
                if !rows.is_empty() {
                    frames.push(SpriteFrame::parse(&rows)?);
                    rows.clear();
                }
            } else {
                rows.push(line);
            }
        }
        if frames.is_empty() {
            return None;
        }
        Some(SpriteSheet { frames })
    }

    pub fn frame(&self, index: usize) -> &SpriteFrame {
        &self.frames[index % self.frames.len()]
    }

    /// Half the widest frame, used to keep the fish inside the side margins.
    pub fn half_width(&self) -> f64 {
        self.frames.iter().map(|f| f.width).max().unwrap_or(0) as f64 * 0.5
    }
}

const KOI: &str = "\
#  ###
 #####o#
#  ###

   ###
######o#
   ###
";

/// Sprite sheets keyed by name.
pub struct SpriteStore {
    sheets: HashMap<String, SpriteSheet>,
}

impl SpriteStore {
    pub fn with_builtins() -> Self {
        let mut sheets = HashMap::new();
        if let Some(koi) = SpriteSheet::parse(KOI) {
            sheets.insert("koi".to_string(), koi);
        }
        SpriteStore { sheets }
    }

    /// Load every `<name>.txt` sheet in `dir`. Unreadable or malformed files
    /// are skipped with a warning.
    pub fn load_dir(&mut self, dir: &Path) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match std::fs::read_to_string(&path).ok().and_then(|t| SpriteSheet::parse(&t)) {
                Some(sheet) => {
                    log::info!("loaded sprite sheet '{}' from {}", name, path.display());
                    self.sheets.insert(name.to_string(), sheet);
                }
                None => log::warn!("skipping unreadable sprite sheet {}", path.display()),
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&SpriteSheet> {
        self.sheets.get(name)
    }
}

/// Maps elapsed time and swim speed to a frame index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClip {
    pub frames: usize,
    /// Frame rate of a fish standing still
    pub base_fps: f64,
    /// Extra frames per second for every pixel per second of speed
    pub fps_per_speed: f64,
    pub max_fps: f64,
}

impl AnimationClip {
    pub fn for_sheet(sheet: Option<&SpriteSheet>) -> Self {
        AnimationClip {
            frames: sheet.map_or(1, |s| s.frames.len()),
            base_fps: 1.5,
            fps_per_speed: 0.35,
            max_fps: 10.0,
        }
    }

    pub fn fps(&self, speed: f64) -> f64 {
        (self.base_fps + speed.abs() * self.fps_per_speed).min(self.max_fps)
    }

    pub fn frame_at(&self, time: f64, speed: f64) -> usize {
        if self.frames <= 1 {
            return 0;
        }
        (time.max(0.0) * self.fps(speed)).floor() as usize % self.frames
    }
}
