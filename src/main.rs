mod config;
mod deck;
mod engine;
mod layers;
mod overlay;
mod render;
mod review;

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use chrono::Utc;
use crossterm::{
    cursor, execute, terminal,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
};
use clap::Parser;
use config::Config;
use deck::Deck;
use engine::context::EngineEvent;
use engine::sprite::SpriteStore;
use engine::{Engine, EngineSettings};
use render::{Canvas, ColorMode, RenderMode};

#[derive(Parser)]
#[command(name = "termpond", about = "Flashcards swimming in a terminal pond")]
struct Cli {
    /// Deck file (JSON). Without one a demo pond is used
    deck: Option<PathBuf>,

    /// Render mode
    #[arg(short, long, value_enum)]
    render: Option<RenderMode>,

    /// Color mode
    #[arg(short, long, value_enum)]
    color: Option<ColorMode>,

    /// Target FPS (1-120)
    #[arg(short, long)]
    fps: Option<u32>,

    /// Share of the screen above the water line (0.05-0.5)
    #[arg(long)]
    sky_ratio: Option<f64>,

    /// Number of depth bands (1-12)
    #[arg(short, long)]
    bands: Option<usize>,

    /// Fish sprite id
    #[arg(long)]
    sprite: Option<String>,

    /// Scale factor for particle counts (0.5-2.0)
    #[arg(short, long)]
    scale: Option<f64>,

    /// Hide the status bar
    #[arg(long)]
    clean: bool,

    /// Color quantization step (0 = off)
    #[arg(long)]
    color_quant: Option<u8>,

    /// Seed for fish, weed and particles
    #[arg(long)]
    seed: Option<u64>,

    /// Write log records to this file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Print the config file path and exit
    #[arg(long)]
    show_config: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

/// CLI flags merged over the config file, clamped to sane ranges.
#[derive(Debug, PartialEq)]
struct Settings {
    deck: Option<PathBuf>,
    render: RenderMode,
    color: ColorMode,
    fps: u32,
    clean: bool,
    color_quant: u8,
    sprite: String,
    engine: EngineSettings,
}

impl Settings {
    fn resolve(cli: &Cli, config: Config) -> Self {
        let defaults = EngineSettings::default();
        Settings {
            deck: cli.deck.clone().or(config.deck),
            render: cli.render.or(config.render.map(Into::into)).unwrap_or(RenderMode::HalfBlock),
            color: cli.color.or(config.color.map(Into::into)).unwrap_or(ColorMode::TrueColor),
            fps: cli.fps.or(config.fps).unwrap_or(30).clamp(1, 120),
            clean: cli.clean || config.clean.unwrap_or(false),
            color_quant: cli.color_quant.or(config.color_quant).unwrap_or(0),
            sprite: cli.sprite.clone().or(config.sprite).unwrap_or_else(|| "koi".to_string()),
            engine: EngineSettings {
                sky_ratio: cli.sky_ratio.or(config.sky_ratio).unwrap_or(defaults.sky_ratio).clamp(0.05, 0.5),
                band_count: cli.bands.or(config.band_count).unwrap_or(defaults.band_count).clamp(1, 12),
                seed: cli.seed.or(config.seed).unwrap_or(defaults.seed),
                scale: cli.scale.or(config.scale).unwrap_or(defaults.scale).clamp(0.5, 2.0),
            },
        }
    }
}

fn init_logging(path: Option<&Path>) -> io::Result<()> {
    use env_logger::{Builder, Env, Target};
    match path {
        // The terminal is taken over by the pond, so records go to a file
        Some(path) => {
            let file = std::fs::File::create(path)?;
            Builder::from_env(Env::default().default_filter_or("info"))
                .target(Target::Pipe(Box::new(file)))
                .init();
        }
        None => Builder::from_env(Env::default().default_filter_or("warn")).init(),
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref())?;

    if cli.show_config {
        match config::config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("No config directory available on this platform"),
        }
        return Ok(());
    }

    if cli.init_config {
        let path = config::config_path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?;
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(&path, config::default_config_string())?;
            println!("Wrote default config to {}", path.display());
        }
        return Ok(());
    }

    let settings = Settings::resolve(&cli, config::load_config());
    let deck = match &settings.deck {
        Some(path) => Deck::load(path)?,
        None => Deck::demo(Utc::now()),
    };
    log::info!("pond '{}' with {} cards", deck.pond.name, deck.cards.len());

    let mut sprites = SpriteStore::with_builtins();
    if let Some(dir) = config::sprite_dir() {
        sprites.load_dir(&dir);
    }
    let sprite = sprites.get(&settings.sprite).cloned();
    if sprite.is_none() {
        log::warn!("unknown sprite '{}'", settings.sprite);
    }

    let engine = Engine::new(settings.engine.clone(), deck.pond.clone(), deck.cards.clone(), sprite);
    let reloads = settings.deck.clone().map(deck::watch);

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let mut host = Host {
        settings,
        deck,
        engine,
        reloads,
        revealed: false,
    };
    let result = host.run(&mut writer);

    // Cleanup
    execute!(writer, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

const RENDER_MODES: [RenderMode; 2] = [RenderMode::HalfBlock, RenderMode::Ascii];
const COLOR_MODES: [ColorMode; 4] = [ColorMode::TrueColor, ColorMode::Ansi256, ColorMode::Ansi16, ColorMode::Mono];
/// Terminal columns the boat moves per key press
const VESSEL_STEP: f64 = 2.0;

/// Everything the frame loop owns besides the terminal.
struct Host {
    settings: Settings,
    deck: Deck,
    engine: Engine,
    reloads: Option<Receiver<Deck>>,
    /// Whether the open dialog shows its answer
    revealed: bool,
}

impl Host {
    fn canvas(&self, cols: u16, rows: u16, hide_status: bool, render_mode: RenderMode, color_mode: ColorMode) -> Canvas {
        let display_rows = if hide_status { rows as usize } else { (rows as usize).saturating_sub(1) };
        let mut canvas = Canvas::new(cols as usize, display_rows, render_mode, color_mode);
        canvas.color_quant = self.settings.color_quant;
        canvas
    }

    fn handle_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                EngineEvent::DialogOpened(card) => {
                    log::info!("landed card {}", card.id);
                    self.revealed = false;
                }
                EngineEvent::ReviewSubmitted { card_id, quality } => self.record_review(card_id, quality),
            }
        }
    }

    fn record_review(&mut self, card_id: u64, quality: u8) {
        let Some(card) = self.deck.cards.iter().find(|c| c.id == card_id) else {
            log::warn!("review for unknown card {card_id}");
            return;
        };
        let next = review::schedule(card, quality, &self.deck.pond, Utc::now());
        log::info!(
            "card {card_id} graded {quality}: depth {} -> {}, due {}",
            card.depth_level,
            next.depth_level,
            next.next_review_date
        );
        self.deck.update(next.clone());
        self.engine.update_card(next);
        if let Some(path) = &self.settings.deck
            && let Err(e) = self.deck.save(path)
        {
            log::warn!("could not save review: {e}");
        }
    }

    fn poll_reloads(&mut self) {
        let Some(rx) = &self.reloads else {
            return;
        };
        while let Ok(deck) = rx.try_recv() {
            self.engine.set_pond(deck.pond.clone());
            self.engine.replace_cards(deck.cards.clone());
            self.deck = deck;
        }
    }

    fn run(&mut self, stdout: &mut BufWriter<io::Stdout>) -> io::Result<()> {
        let frame_dur = Duration::from_secs_f64(1.0 / self.settings.fps as f64);
        let (mut cols, mut rows) = terminal::size()?;
        let mut render_mode = self.settings.render;
        let mut color_mode = self.settings.color;
        let mut hide_status = self.settings.clean;
        let mut canvas = self.canvas(cols, rows, hide_status, render_mode, color_mode);

        let start = Instant::now();
        let mut frame_count: u64 = 0;
        let mut actual_fps: f64 = 0.0;
        let mut fps_update = Instant::now();

        // Track if we need to rebuild canvas
        let mut rebuild_canvas = false;

        loop {
            let frame_start = Instant::now();

            // Handle input (non-blocking)
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Resize(w, h) => {
                        if w >= 10 && h >= 5 {
                            cols = w;
                            rows = h;
                            rebuild_canvas = true;
                        }
                    }
                    Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) => {
                        let step = VESSEL_STEP * render_mode.pixel_ratio().0 as f64;
                        let dialog_open = self.engine.state().dialog.open;
                        match code {
                            KeyCode::Char('q') => return Ok(()),
                            KeyCode::Left | KeyCode::Char('a') => self.engine.move_vessel(-step),
                            KeyCode::Right | KeyCode::Char('d') => self.engine.move_vessel(step),
                            KeyCode::Char(' ') => {
                                if self.engine.start_fishing(None).is_none() {
                                    log::debug!("nothing to cast for");
                                }
                            }
                            KeyCode::Enter if dialog_open => self.revealed = true,
                            KeyCode::Char(c @ '0'..='5') if dialog_open && self.revealed => {
                                self.engine.submit_review(c as u8 - b'0');
                            }
                            KeyCode::Esc => {
                                self.engine.dismiss_dialog();
                            }
                            KeyCode::Char('p') => {
                                let paused = !self.engine.paused();
                                self.engine.set_paused(paused);
                            }
                            // Cycle render mode
                            KeyCode::Char('r') => {
                                let idx = RENDER_MODES.iter().position(|&m| m == render_mode).unwrap_or(0);
                                render_mode = RENDER_MODES[(idx + 1) % RENDER_MODES.len()];
                                rebuild_canvas = true;
                            }
                            // Cycle color mode
                            KeyCode::Char('c') => {
                                let idx = COLOR_MODES.iter().position(|&m| m == color_mode).unwrap_or(0);
                                color_mode = COLOR_MODES[(idx + 1) % COLOR_MODES.len()];
                                rebuild_canvas = true;
                            }
                            // Toggle status bar
                            KeyCode::Char('h') => {
                                hide_status = !hide_status;
                                rebuild_canvas = true;
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            // Rebuild canvas if mode changed or terminal resized. The engine keeps its state.
            if rebuild_canvas && cols >= 10 && rows >= 5 {
                // Re-read size to get the settled value
                let (settled_cols, settled_rows) = terminal::size()?;
                if settled_cols >= 10 && settled_rows >= 5 {
                    cols = settled_cols;
                    rows = settled_rows;
                }
                canvas = self.canvas(cols, rows, hide_status, render_mode, color_mode);
                // Reset terminal state completely
                write!(stdout, "\x1b[2J\x1b[H")?;
                stdout.flush()?;
                rebuild_canvas = false;
            }

            self.poll_reloads();

            // Update & render
            let now = Utc::now();
            self.engine.tick(&mut canvas, start.elapsed().as_secs_f64(), now);
            self.handle_events();
            let frame = canvas.render();

            // Verify terminal size hasn't changed before writing
            // If it changed, skip this frame to avoid writing wrong-sized data
            let (check_cols, check_rows) = terminal::size()?;
            if check_cols != cols || check_rows != rows {
                cols = check_cols;
                rows = check_rows;
                rebuild_canvas = true;
                // Sleep briefly to let terminal settle
                std::thread::sleep(Duration::from_millis(50));
                continue;
            }

            // Build entire frame into buffer before flushing
            stdout.write_all(b"\x1b[H")?;
            stdout.write_all(frame.as_bytes())?;

            let state = self.engine.state();
            if state.dialog.open
                && let Some(card) = state.dialog.card.and_then(|id| state.card(id))
            {
                let (_, display_rows) = canvas.term_size();
                let lines = overlay::dialog_lines(&state.pond.name, card, self.revealed, cols as usize);
                overlay::write_centered(stdout, &lines, cols as usize, display_rows)?;
            }

            // Status bar
            frame_count += 1;
            if fps_update.elapsed() >= Duration::from_secs(1) {
                actual_fps = frame_count as f64 / fps_update.elapsed().as_secs_f64();
                frame_count = 0;
                fps_update = Instant::now();
            }
            if !hide_status {
                let status = overlay::Status {
                    pond: &state.pond.name,
                    ready: self.engine.ready_count(now),
                    total: state.cards.len(),
                    phase: state.fishing.phase(),
                    paused: self.engine.paused(),
                    fps: actual_fps,
                    render: render_mode,
                    color: color_mode,
                };
                let line = overlay::status_line(&status, cols as usize);
                write!(stdout, "\x1b[{};1H\x1b[7m{}\x1b[0m", rows, line)?;
            }

            // Single flush per frame
            stdout.flush()?;

            // Sleep to target FPS
            let elapsed = frame_start.elapsed();
            if elapsed < frame_dur {
                std::thread::sleep(frame_dur - elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("termpond").chain(args.iter().copied()))
    }

    #[test]
    fn flags_override_config_and_config_overrides_defaults() {
        let config = config::parse_config(
            r#"
            fps = 12
            band_count = 6
            render = "ascii"
            sprite = "eel"
            "#,
        )
        .unwrap();
        let s = Settings::resolve(&cli(&["--fps", "50", "deck.json"]), config);
        assert_eq!(s.fps, 50);
        assert_eq!(s.engine.band_count, 6);
        assert_eq!(s.render, RenderMode::Ascii);
        assert_eq!(s.sprite, "eel");
        assert_eq!(s.deck, Some(PathBuf::from("deck.json")));
        assert_eq!(s.color, ColorMode::TrueColor);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let s = Settings::resolve(
            &cli(&["--fps", "1000", "--sky-ratio", "0.9", "--bands", "0", "--scale", "9"]),
            Config::default(),
        );
        assert_eq!(s.fps, 120);
        assert_eq!(s.engine.sky_ratio, 0.5);
        assert_eq!(s.engine.band_count, 1);
        assert_eq!(s.engine.scale, 2.0);
    }

    #[test]
    fn defaults_without_flags_or_config() {
        let s = Settings::resolve(&cli(&[]), Config::default());
        assert_eq!(s.engine, EngineSettings::default());
        assert_eq!(s.sprite, "koi");
        assert!(s.deck.is_none());
        assert!(!s.clean);
    }
}
