use crate::render::{ColorMode, RenderMode};
use serde::Deserialize;
use std::path::PathBuf;

/// User configuration loaded from config file.
/// All fields are optional. CLI flags override config, config overrides defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deck file to fish from (JSON)
    pub deck: Option<PathBuf>,
    /// Default render mode
    pub render: Option<RenderModeConfig>,
    /// Default color mode
    pub color: Option<ColorModeConfig>,
    /// Target FPS (1-120)
    pub fps: Option<u32>,
    /// Share of the screen above the water line (0.05-0.5)
    pub sky_ratio: Option<f64>,
    /// Number of depth bands (1-12)
    pub band_count: Option<usize>,
    /// Fish sprite id
    pub sprite: Option<String>,
    /// Particle scale factor (0.5-2.0)
    pub scale: Option<f64>,
    /// Hide status bar
    pub clean: Option<bool>,
    /// Color quantization step (0 = off, 4/8/16 = coarser colors for less output)
    pub color_quant: Option<u8>,
    /// Seed for fish, weed and particles
    pub seed: Option<u64>,
}

/// Render mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderModeConfig {
    HalfBlock,
    Ascii,
}

impl From<RenderModeConfig> for RenderMode {
    fn from(c: RenderModeConfig) -> Self {
        match c {
            RenderModeConfig::HalfBlock => RenderMode::HalfBlock,
            RenderModeConfig::Ascii => RenderMode::Ascii,
        }
    }
}

/// Color mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorModeConfig {
    Mono,
    Ansi16,
    Ansi256,
    TrueColor,
}

impl From<ColorModeConfig> for ColorMode {
    fn from(c: ColorModeConfig) -> Self {
        match c {
            ColorModeConfig::Mono => ColorMode::Mono,
            ColorModeConfig::Ansi16 => ColorMode::Ansi16,
            ColorModeConfig::Ansi256 => ColorMode::Ansi256,
            ColorModeConfig::TrueColor => ColorMode::TrueColor,
        }
    }
}

/// Base directory for config and sprites: ~/.config/termpond
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("termpond"))
}

/// Get the config file path: ~/.config/termpond/config.toml
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Directory holding user sprite sheets
pub fn sprite_dir() -> Option<PathBuf> {
    config_dir().map(|d| d.join("sprites"))
}

pub fn parse_config(contents: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(contents)
}

/// Load config from file. Returns default config if file doesn't exist.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let Ok(contents) = std::fs::read_to_string(&path) else {
        return Config::default();
    };
    match parse_config(&contents) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("failed to parse {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Generate a default config file with all options commented out
pub fn default_config_string() -> String {
    r#"# termpond configuration
# Use --show-config to see the active config file path.
# CLI flags override these settings.

# Deck to fish from; without one a small demo pond is used
# deck = "/home/me/cards/spanish.json"

# Default render mode: half-block, ascii
# render = "half-block"

# Default color mode: mono, ansi16, ansi256, true-color
# color = "true-color"

# Target FPS (1-120)
# fps = 30

# Share of the screen above the water line (0.05-0.5)
# sky_ratio = 0.12

# Number of depth bands (1-12)
# band_count = 4

# Fish sprite: "koi" or the name of a file in the sprites/ directory next to this one
# sprite = "koi"

# Particle scale factor (0.5-2.0)
# scale = 1.0

# Hide status bar
# clean = false

# Color quantization step (0 = off, 4/8/16 = coarser colors, less output)
# Useful for slow terminals or tmux
# color_quant = 0

# Seed for fish, weed and particles
# seed = 24301
"#
    .to_string()
}
