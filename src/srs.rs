//! Binary SM-2 scheduler.
//!
//! Every practice mode only reports "right" or "wrong", so the quality
//! scale collapses to two outcomes:
//! - remembered: streak + 1, interval 1 -> 6 -> interval * ease, ease + 0.1
//! - forgotten: streak reset, interval 1, ease - 0.2 (floored at 1.3)
//!
//! Intervals saturate at [`MAX_INTERVAL_DAYS`] so long streaks and oversized
//! stored values still produce a representable review date.
//!
//! The next state depends only on the current state and the outcome.

use chrono::{DateTime, Duration, Utc};

use crate::models::{
    HistoryEntry, HistoryStatus, ReviewOutcome, WordRecord, INITIAL_EASE_FACTOR, MAX_INTERVAL_DAYS,
    MIN_EASE_FACTOR,
};

const EASE_BONUS: f64 = 0.1;
const EASE_PENALTY: f64 = 0.2;
const FIRST_INTERVAL: u32 = 1;
const SECOND_INTERVAL: u32 = 6;

/// Interval each outcome would produce, for labelling answer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalPreview {
    pub remembered: u32,
    pub forgotten: u32,
}

/// Computes the next state of `word` after a review at `now`.
pub fn apply_review(word: &WordRecord, outcome: ReviewOutcome, now: DateTime<Utc>) -> WordRecord {
    let mut next = word.clone();

    match outcome {
        ReviewOutcome::Remembered => {
            next.repetition = word.repetition.saturating_add(1);
            next.interval = remembered_interval(word);
            next.ease_factor = word.ease_factor + EASE_BONUS;
        }
        ReviewOutcome::Forgotten => {
            next.repetition = 0;
            next.interval = FIRST_INTERVAL;
            next.ease_factor = (word.ease_factor - EASE_PENALTY).max(MIN_EASE_FACTOR);
        }
    }

    next.next_review_date = Some(
        now.checked_add_signed(Duration::days(i64::from(next.interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
    );
    push_history(&mut next, outcome.into(), now);

    next
}

/// Puts `word` back to its initial SRS values, keeping the history.
pub fn reset_word(word: &WordRecord, now: DateTime<Utc>) -> WordRecord {
    let mut next = word.clone();
    next.repetition = 0;
    next.interval = 0;
    next.ease_factor = INITIAL_EASE_FACTOR;
    next.next_review_date = None;
    push_history(&mut next, HistoryStatus::Reset, now);
    next
}

pub fn preview_intervals(word: &WordRecord) -> IntervalPreview {
    IntervalPreview {
        remembered: remembered_interval(word),
        forgotten: FIRST_INTERVAL,
    }
}

fn remembered_interval(word: &WordRecord) -> u32 {
    match word.repetition.saturating_add(1) {
        1 => FIRST_INTERVAL,
        2 => SECOND_INTERVAL,
        _ => {
            let days = (f64::from(word.interval) * word.ease_factor).round();
            days.min(f64::from(MAX_INTERVAL_DAYS)) as u32
        }
    }
}

fn push_history(word: &mut WordRecord, outcome: HistoryStatus, now: DateTime<Utc>) {
    word.history.push(HistoryEntry {
        timestamp: now,
        outcome,
        interval_after: word.interval,
        repetition_after: word.repetition,
        ease_factor_after: word.ease_factor,
    });
}

/// Format an interval in days to a short label.
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_two_successes_use_fixed_intervals() {
        let word = WordRecord::new("rumah", "house");

        let first = apply_review(&word, ReviewOutcome::Remembered, now());
        assert_eq!(first.repetition, 1);
        assert_eq!(first.interval, 1);
        assert!(close(first.ease_factor, 2.6));
        assert_eq!(first.next_review_date, Some(now() + Duration::days(1)));

        let second = apply_review(&first, ReviewOutcome::Remembered, now());
        assert_eq!(second.repetition, 2);
        assert_eq!(second.interval, 6);
        assert!(close(second.ease_factor, 2.7));
    }

    #[test]
    fn test_third_success_multiplies_by_ease() {
        let mut word = WordRecord::new("air", "water");
        let mut intervals = Vec::new();
        let mut repetitions = Vec::new();
        for _ in 0..3 {
            word = apply_review(&word, ReviewOutcome::Remembered, now());
            intervals.push(word.interval);
            repetitions.push(word.repetition);
        }

        // 6 * 2.7 = 16.2
        assert_eq!(intervals, vec![1, 6, 16]);
        assert_eq!(repetitions, vec![1, 2, 3]);
    }

    #[test]
    fn test_forgotten_resets_streak() {
        let mut word = WordRecord::new("buku", "book");
        word.repetition = 4;
        word.interval = 40;
        word.ease_factor = 2.2;

        let result = apply_review(&word, ReviewOutcome::Forgotten, now());
        assert_eq!(result.repetition, 0);
        assert_eq!(result.interval, 1);
        assert!(close(result.ease_factor, 2.0));
        assert_eq!(result.next_review_date, Some(now() + Duration::days(1)));
    }

    #[test]
    fn test_ease_factor_minimum() {
        let mut word = WordRecord::new("kucing", "cat");
        for _ in 0..20 {
            word = apply_review(&word, ReviewOutcome::Forgotten, now());
            assert!(word.ease_factor >= MIN_EASE_FACTOR);
        }
        assert!(close(word.ease_factor, MIN_EASE_FACTOR));
    }

    #[test]
    fn test_interval_never_shrinks_on_long_success_streak() {
        let mut word = WordRecord::new("anjing", "dog");
        word.ease_factor = MIN_EASE_FACTOR;
        let mut previous = 0;
        for _ in 0..10 {
            word = apply_review(&word, ReviewOutcome::Remembered, now());
            assert!(word.interval >= previous);
            previous = word.interval;
        }
    }

    #[test]
    fn test_long_success_streak_saturates() {
        let mut word = WordRecord::new("gunung", "mountain");
        for _ in 0..100 {
            word = apply_review(&word, ReviewOutcome::Remembered, now());
            assert!(word.interval <= MAX_INTERVAL_DAYS);
            assert!(word.next_review_date.is_some());
        }
        assert_eq!(word.repetition, 100);
        assert_eq!(word.interval, MAX_INTERVAL_DAYS);
        assert_eq!(
            word.next_review_date,
            Some(now() + Duration::days(i64::from(MAX_INTERVAL_DAYS)))
        );
        assert_eq!(word.history.len(), 100);
    }

    #[test]
    fn test_oversized_stored_state_is_capped() {
        let mut word = WordRecord::new("laut", "sea");
        word.repetition = u32::MAX;
        word.interval = 100_000_000;

        let result = apply_review(&word, ReviewOutcome::Remembered, now());
        assert_eq!(result.repetition, u32::MAX);
        assert_eq!(result.interval, MAX_INTERVAL_DAYS);
        assert_eq!(preview_intervals(&word).remembered, MAX_INTERVAL_DAYS);

        let late = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        let result = apply_review(&word, ReviewOutcome::Remembered, late);
        assert_eq!(result.next_review_date, Some(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let word = WordRecord::new("meja", "table");
        let word = apply_review(&word, ReviewOutcome::Remembered, now());
        assert_eq!((word.repetition, word.interval), (1, 1));
        assert!(close(word.ease_factor, 2.6));

        let word = apply_review(&word, ReviewOutcome::Remembered, now());
        assert_eq!((word.repetition, word.interval), (2, 6));
        assert!(close(word.ease_factor, 2.7));

        let word = apply_review(&word, ReviewOutcome::Forgotten, now());
        assert_eq!((word.repetition, word.interval), (0, 1));
        assert!(close(word.ease_factor, 2.5));
        assert_eq!(word.history.len(), 3);
    }

    #[test]
    fn test_history_records_state_after_review() {
        let word = WordRecord::new("pintu", "door");
        let word = apply_review(&word, ReviewOutcome::Remembered, now());

        let entry = &word.history[0];
        assert_eq!(entry.timestamp, now());
        assert_eq!(entry.outcome, HistoryStatus::Remembered);
        assert_eq!(entry.interval_after, 1);
        assert_eq!(entry.repetition_after, 1);
        assert!(close(entry.ease_factor_after, 2.6));
    }

    #[test]
    fn test_reset_is_idempotent_except_history() {
        let mut word = WordRecord::new("kursi", "chair");
        word = apply_review(&word, ReviewOutcome::Remembered, now());
        word = apply_review(&word, ReviewOutcome::Remembered, now());

        let once = reset_word(&word, now());
        let twice = reset_word(&once, now());

        for w in [&once, &twice] {
            assert_eq!(w.repetition, 0);
            assert_eq!(w.interval, 0);
            assert!(close(w.ease_factor, 2.5));
            assert_eq!(w.next_review_date, None);
        }
        assert_eq!(once.history.len(), 3);
        assert_eq!(twice.history.len(), 4);
        assert_eq!(twice.history[3].outcome, HistoryStatus::Reset);
    }

    #[test]
    fn test_preview_intervals() {
        let mut word = WordRecord::new("jalan", "road");
        assert_eq!(preview_intervals(&word), IntervalPreview { remembered: 1, forgotten: 1 });

        word.repetition = 3;
        word.interval = 10;
        word.ease_factor = 2.5;
        assert_eq!(preview_intervals(&word).remembered, 25);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(6), "6d");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(730), "2y");
    }
}
