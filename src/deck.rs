use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::model::{Card, Pond};

/// A pond and its cards, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub pond: Pond,
    #[serde(default)]
    pub cards: Vec<Card>,
}

fn invalid(path: &Path, e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("{}: {e}", path.display()))
}

impl Deck {
    pub fn parse(text: &str, path: &Path) -> io::Result<Deck> {
        let deck: Deck = serde_json::from_str(text).map_err(|e| invalid(path, e))?;
        let mut ids: Vec<_> = deck.cards.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(invalid(path, format!("duplicate card id {}", pair[0])));
        }
        Ok(deck)
    }

    pub fn load(path: &Path) -> io::Result<Deck> {
        let text = std::fs::read_to_string(path)?;
        Deck::parse(&text, path)
    }

    /// Write as pretty JSON, replacing the file in one rename so a watcher
    /// never reads half a deck.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| invalid(path, e))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json + "\n")?;
        std::fs::rename(&tmp, path)
    }

    /// Replace one card by id. Returns false if the deck doesn't have it.
    pub fn update(&mut self, card: Card) -> bool {
        match self.cards.iter_mut().find(|c| c.id == card.id) {
            Some(slot) => {
                *slot = card;
                true
            }
            None => false,
        }
    }

    /// Small built-in deck so the pond isn't empty without a file.
    pub fn demo(now: DateTime<Utc>) -> Deck {
        let cards = [
            ("hola", "hello", 0, 0),
            ("gracias", "thank you", 0, 0),
            ("el pez", "the fish", 1, 0),
            ("el barco", "the boat", 1, 0),
            ("la caña", "the fishing rod", 2, 0),
            ("el estanque", "the pond", 2, 3),
            ("la ola", "the wave", 3, 0),
            ("profundo", "deep", 3, 7),
        ];
        Deck {
            pond: Pond {
                id: 1,
                name: "Spanish basics".into(),
                description: "Built-in demo pond".into(),
                review_intervals_days: vec![1, 3, 7, 16],
            },
            cards: cards
                .into_iter()
                .zip(1..)
                .map(|((prompt, answer, depth, due_in_days), id)| Card {
                    id,
                    prompt: prompt.into(),
                    answer: answer.into(),
                    depth_level: depth,
                    next_review_date: now + Duration::days(due_in_days),
                })
                .collect(),
        }
    }
}

/// Reload the deck whenever its file changes. Parse failures are logged and
/// skipped so a half-edited file doesn't empty the pond.
pub fn watch(path: PathBuf) -> Receiver<Deck> {
    let (tx, rx) = mpsc::channel::<Deck>();
    std::thread::spawn(move || {
        let (file_tx, file_rx) = mpsc::channel();
        let mut watcher = match notify::recommended_watcher(move |res| {
            let _ = file_tx.send(res);
        }) {
            Ok(w) => w,
            Err(e) => {
                log::warn!("deck watcher unavailable: {e}");
                return;
            }
        };
        // Watch the directory: saving replaces the file, which drops a watch on the file itself
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if let Err(e) = notify::Watcher::watch(&mut watcher, &dir, notify::RecursiveMode::NonRecursive) {
            log::warn!("cannot watch {}: {e}", dir.display());
            return;
        }
        log::info!("watching {}", path.display());

        let name = path.file_name().map(|n| n.to_os_string());
        while let Ok(res) = file_rx.recv() {
            let event: notify::Event = match res {
                Ok(ev) => ev,
                Err(e) => {
                    log::warn!("deck watch error: {e}");
                    continue;
                }
            };
            if !(event.kind.is_modify() || event.kind.is_create()) {
                continue;
            }
            if !event.paths.iter().any(|p| p.file_name().map(|n| n.to_os_string()) == name) {
                continue;
            }
            match Deck::load(&path) {
                Ok(deck) => {
                    log::info!("reloaded {} ({} cards)", path.display(), deck.cards.len());
                    if tx.send(deck).is_err() {
                        break;
                    }
                }
                Err(e) => log::warn!("ignoring deck change: {e}"),
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "pond": { "id": 2, "name": "Capitals", "review_intervals_days": [1, 2, 4] },
        "cards": [
            { "id": 1, "prompt": "France", "answer": "Paris", "depth_level": 1,
              "next_review_date": "2024-05-01T12:00:00Z" },
            { "id": 2, "prompt": "Peru", "answer": "Lima",
              "next_review_date": "2024-05-02T08:30:00+02:00" }
        ]
    }"#;

    fn path() -> &'static Path {
        Path::new("deck.json")
    }

    #[test]
    fn parses_cards_and_defaults() {
        let deck = Deck::parse(SAMPLE, path()).unwrap();
        assert_eq!(deck.pond.name, "Capitals");
        assert_eq!(deck.cards.len(), 2);
        assert_eq!(deck.cards[1].depth_level, 0);
        assert_eq!(deck.cards[1].next_review_date.to_rfc3339(), "2024-05-02T06:30:00+00:00");
    }

    #[test]
    fn bad_json_is_invalid_data() {
        let err = Deck::parse("{ not json", path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("deck.json"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let text = SAMPLE.replace(r#""id": 2, "prompt""#, r#""id": 1, "prompt""#);
        let err = Deck::parse(&text, path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("duplicate card id 1"));
    }

    #[test]
    fn save_then_load_preserves_deck() {
        let dir = std::env::temp_dir().join(format!("termpond-deck-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("deck.json");
        let mut deck = Deck::parse(SAMPLE, path()).unwrap();
        let mut card = deck.cards[0].clone();
        card.depth_level = 2;
        assert!(deck.update(card));
        deck.save(&file).unwrap();
        assert_eq!(Deck::load(&file).unwrap(), deck);
        assert!(!file.with_extension("json.tmp").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = Deck::load(Path::new("/nonexistent/termpond/deck.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn demo_has_ready_and_resting_cards() {
        let now = Utc::now();
        let deck = Deck::demo(now);
        let ready = deck.cards.iter().filter(|c| c.is_ready(now)).count();
        assert!(ready > 0 && ready < deck.cards.len());
    }
}
