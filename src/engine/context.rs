use super::fishing::{DialogState, FishingPhase, FishingProcess, Point};
use super::model::{Card, CardId, Pond, Vessel};
use super::wave::{WaveFn, WaveRegistry};

/// State shared by every layer. Layers read it directly and change it only by
/// returning [`Request`]s, which the scheduler applies before the next layer runs.
pub struct SimState {
    pub pond: Pond,
    pub cards: Vec<Card>,
    pub vessel: Vessel,
    pub fishing: FishingProcess,
    pub dialog: DialogState,
    pub waves: WaveRegistry,
}

/// A change a layer wants made to [`SimState`].
pub enum Request {
    /// Replace the current surface function
    PublishWave(WaveFn),
    /// Move the fishing process to its next phase
    Advance(FishingPhase),
    /// Record where the hook is this tick
    SetHook(Point),
    /// Open the review dialog for a landed card
    OpenDialog(CardId),
}

/// Something the host should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A card has been landed; show it for review
    DialogOpened(Card),
    /// A review outcome must be persisted
    ReviewSubmitted { card_id: CardId, quality: u8 },
}

impl SimState {
    pub fn new(pond: Pond, cards: Vec<Card>) -> Self {
        SimState {
            pond,
            cards,
            vessel: Vessel::default(),
            fishing: FishingProcess::default(),
            dialog: DialogState::default(),
            waves: WaveRegistry::default(),
        }
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn target_card(&self) -> Option<&Card> {
        self.fishing.target().and_then(|id| self.card(id))
    }

    /// Apply one request. Illegal phase changes are dropped with a warning.
    pub fn apply(&mut self, request: Request) -> Option<EngineEvent> {
        match request {
            Request::PublishWave(wave) => self.waves.publish(wave),
            Request::SetHook(point) => {
                if self.fishing.is_active() {
                    self.fishing.hook = Some(point);
                }
            }
            Request::Advance(next) => {
                let from = self.fishing.phase();
                match self.fishing.advance(next) {
                    Ok(()) => log::debug!(
                        "fishing {} -> {} (process {})",
                        from.label(),
                        next.label(),
                        self.fishing.process_id
                    ),
                    Err(e) => log::warn!("dropping request: {e}"),
                }
            }
            Request::OpenDialog(id) => {
                let card = self.card(id)?.clone();
                self.dialog.open(id, self.fishing.process_id);
                return Some(EngineEvent::DialogOpened(card));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn state() -> SimState {
        let pond = Pond {
            id: 1,
            name: "test".into(),
            description: String::new(),
            review_intervals_days: vec![1, 2],
        };
        let cards = vec![Card {
            id: 5,
            prompt: "p".into(),
            answer: "a".into(),
            depth_level: 0,
            next_review_date: Utc::now(),
        }];
        SimState::new(pond, cards)
    }

    #[test]
    fn illegal_advance_is_ignored() {
        let mut s = state();
        assert!(s.apply(Request::Advance(FishingPhase::Reeling)).is_none());
        assert_eq!(s.fishing.phase(), FishingPhase::Idle);
    }

    #[test]
    fn hook_only_recorded_while_fishing() {
        let mut s = state();
        s.apply(Request::SetHook(Point::new(1.0, 2.0)));
        assert_eq!(s.fishing.hook, None);
        s.fishing.begin(5, 10.0).unwrap();
        s.apply(Request::SetHook(Point::new(1.0, 2.0)));
        assert_eq!(s.fishing.hook, Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn open_dialog_emits_event_for_known_cards() {
        let mut s = state();
        s.fishing.begin(5, 0.0).unwrap();
        let ev = s.apply(Request::OpenDialog(5));
        assert!(matches!(ev, Some(EngineEvent::DialogOpened(ref c)) if c.id == 5));
        assert!(s.dialog.open);
        assert_eq!(s.dialog.process_id, 1);

        let mut s = state();
        assert!(s.apply(Request::OpenDialog(99)).is_none());
        assert!(!s.dialog.open);
    }
}
