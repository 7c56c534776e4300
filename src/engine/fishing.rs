use std::fmt;

use super::model::CardId;

/// A point in canvas pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Lifecycle of one cast. The only legal path is
/// idle → casting → luring → reeling → done → idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FishingPhase {
    #[default]
    Idle,
    /// Hook sinking from the boat toward the target's band
    Casting,
    /// Hook resting at depth, target swimming toward it
    Luring,
    /// Hook (and hooked card) rising back to the boat
    Reeling,
    /// Card landed, review dialog pending
    Done,
}

impl FishingPhase {
    pub fn successor(self) -> FishingPhase {
        match self {
            FishingPhase::Idle => FishingPhase::Casting,
            FishingPhase::Casting => FishingPhase::Luring,
            FishingPhase::Luring => FishingPhase::Reeling,
            FishingPhase::Reeling => FishingPhase::Done,
            FishingPhase::Done => FishingPhase::Idle,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FishingPhase::Idle => "idle",
            FishingPhase::Casting => "casting",
            FishingPhase::Luring => "luring",
            FishingPhase::Reeling => "reeling",
            FishingPhase::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: FishingPhase,
    pub to: FishingPhase,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal fishing transition {} -> {}", self.from.label(), self.to.label())
    }
}

impl std::error::Error for TransitionError {}

/// The one shared record of the current cast.
///
/// `target` is `Some` exactly when `phase != Idle`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FishingProcess {
    phase: FishingPhase,
    target: Option<CardId>,
    /// Hook position as last written by the line layer
    pub hook: Option<Point>,
    /// Boat x at the moment of the cast; the line hangs from here
    pub vessel_x: f64,
    /// Increments with every cast so layers can tell casts apart
    pub process_id: u64,
}

impl FishingProcess {
    pub fn phase(&self) -> FishingPhase {
        self.phase
    }

    pub fn target(&self) -> Option<CardId> {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.phase != FishingPhase::Idle
    }

    pub fn targets(&self, id: CardId) -> bool {
        self.target == Some(id)
    }

    /// idle → casting with a new target.
    pub fn begin(&mut self, target: CardId, vessel_x: f64) -> Result<u64, TransitionError> {
        if self.phase != FishingPhase::Idle {
            return Err(TransitionError {
                from: self.phase,
                to: FishingPhase::Casting,
            });
        }
        self.phase = FishingPhase::Casting;
        self.target = Some(target);
        self.hook = None;
        self.vessel_x = vessel_x;
        self.process_id += 1;
        Ok(self.process_id)
    }

    /// Step to `next`, which must be the current phase's successor.
    /// Entering `Casting` needs a target and goes through [`FishingProcess::begin`].
    pub fn advance(&mut self, next: FishingPhase) -> Result<(), TransitionError> {
        let err = TransitionError {
            from: self.phase,
            to: next,
        };
        if next == FishingPhase::Casting || self.phase.successor() != next {
            return Err(err);
        }
        self.phase = next;
        if next == FishingPhase::Idle {
            self.target = None;
            self.hook = None;
        }
        Ok(())
    }

    /// Drop the cast from any phase. Only used when the target card disappears
    /// from the deck, which would otherwise leave the lure waiting forever.
    pub(super) fn abandon(&mut self) {
        self.phase = FishingPhase::Idle;
        self.target = None;
        self.hook = None;
    }
}

/// Review dialog bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogState {
    pub open: bool,
    pub card: Option<CardId>,
    pub process_id: u64,
}

impl DialogState {
    pub fn open(&mut self, card: CardId, process_id: u64) {
        self.open = true;
        self.card = Some(card);
        self.process_id = process_id;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.card = None;
    }
}

pub fn ease_out_cubic(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use FishingPhase::*;

    const ALL: [FishingPhase; 5] = [Idle, Casting, Luring, Reeling, Done];

    #[test]
    fn full_cycle() {
        let mut f = FishingProcess::default();
        assert_eq!(f.begin(7, 40.0), Ok(1));
        assert_eq!(f.target(), Some(7));
        for next in [Luring, Reeling, Done, Idle] {
            f.advance(next).unwrap();
            assert_eq!(f.phase(), next);
        }
        assert_eq!(f.target(), None);
        assert_eq!(f.hook, None);
    }

    #[test]
    fn only_successor_transitions_are_legal() {
        for from in ALL {
            for to in ALL {
                let mut f = FishingProcess::default();
                // walk to `from`
                if from != Idle {
                    f.begin(1, 0.0).unwrap();
                    let mut p = Casting;
                    while p != from {
                        p = p.successor();
                        f.advance(p).unwrap();
                    }
                }
                let legal = to != Casting && from.successor() == to;
                assert_eq!(f.advance(to).is_ok(), legal, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn begin_refused_while_active() {
        let mut f = FishingProcess::default();
        f.begin(1, 0.0).unwrap();
        let err = f.begin(2, 0.0).unwrap_err();
        assert_eq!(err.from, Casting);
        assert_eq!(f.target(), Some(1));
    }

    #[test]
    fn target_present_iff_active() {
        let mut f = FishingProcess::default();
        assert_eq!(f.is_active(), f.target().is_some());
        f.begin(3, 0.0).unwrap();
        assert_eq!(f.is_active(), f.target().is_some());
        f.abandon();
        assert!(!f.is_active());
        assert_eq!(f.target(), None);
    }

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }
}
