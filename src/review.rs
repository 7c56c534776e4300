use chrono::{DateTime, Duration, Utc};

use crate::engine::model::{Card, Pond};

/// Highest grade a review can give
pub const MAX_QUALITY: u8 = 5;
/// Lowest grade that still counts as remembered
pub const PASS_QUALITY: u8 = 3;
/// A forgotten card comes back after this long
const RELEARN_MINUTES: i64 = 10;

/// Reschedule `card` after a review graded `quality` (clamped to 0..=5).
///
/// A pass moves the card one band deeper, capped by the pond's interval table,
/// and pushes its next review out by that band's interval. A fail sends it back
/// to the surface, due again shortly.
pub fn schedule(card: &Card, quality: u8, pond: &Pond, now: DateTime<Utc>) -> Card {
    let quality = quality.min(MAX_QUALITY);
    let mut next = card.clone();
    if quality < PASS_QUALITY {
        next.depth_level = 0;
        next.next_review_date = now + Duration::minutes(RELEARN_MINUTES);
        return next;
    }

    let max_depth = pond.review_intervals_days.len().saturating_sub(1) as i64;
    let depth = (card.depth_level.max(0) + 1).min(max_depth);
    let days = pond
        .review_intervals_days
        .get(depth as usize)
        .copied()
        .unwrap_or(1);
    next.depth_level = depth;
    next.next_review_date = now + Duration::days(i64::from(days));
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pond(intervals: Vec<u32>) -> Pond {
        Pond {
            id: 1,
            name: "p".into(),
            description: String::new(),
            review_intervals_days: intervals,
        }
    }

    fn card(depth: i64) -> Card {
        Card {
            id: 1,
            prompt: "q".into(),
            answer: "a".into(),
            depth_level: depth,
            next_review_date: Utc::now(),
        }
    }

    #[test]
    fn pass_goes_one_band_deeper() {
        let now = Utc::now();
        let next = schedule(&card(0), 4, &pond(vec![1, 3, 7, 16]), now);
        assert_eq!(next.depth_level, 1);
        assert_eq!(next.next_review_date, now + Duration::days(3));
    }

    #[test]
    fn depth_is_capped_by_interval_table() {
        let now = Utc::now();
        let p = pond(vec![1, 3, 7]);
        let next = schedule(&card(2), 5, &p, now);
        assert_eq!(next.depth_level, 2);
        assert_eq!(next.next_review_date, now + Duration::days(7));
        // stale depth from an older, longer table
        let next = schedule(&card(9), 3, &p, now);
        assert_eq!(next.depth_level, 2);
    }

    #[test]
    fn fail_resurfaces_soon() {
        let now = Utc::now();
        let next = schedule(&card(3), 2, &pond(vec![1, 3, 7, 16]), now);
        assert_eq!(next.depth_level, 0);
        assert_eq!(next.next_review_date, now + Duration::minutes(10));
        assert!(!next.is_ready(now));
    }

    #[test]
    fn out_of_range_quality_counts_as_best() {
        let now = Utc::now();
        let p = pond(vec![1, 3]);
        assert_eq!(schedule(&card(0), 200, &p, now), schedule(&card(0), 5, &p, now));
    }

    #[test]
    fn empty_table_keeps_cards_shallow() {
        let now = Utc::now();
        let next = schedule(&card(0), 5, &pond(vec![]), now);
        assert_eq!(next.depth_level, 0);
        assert_eq!(next.next_review_date, now + Duration::days(1));
    }
}
