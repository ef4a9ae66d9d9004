use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{HistoryStatus, WordRecord};

/// Review outcomes on one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReviewCount {
    pub date: NaiveDate,
    pub remembered: usize,
    pub forgotten: usize,
}

/// Buckets every history entry by day, oldest first. Resets are not reviews
/// and are left out.
pub fn daily_review_history<'a, I>(words: I) -> Vec<DailyReviewCount>
where
    I: IntoIterator<Item = &'a WordRecord>,
{
    let mut days: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();

    for entry in words.into_iter().flat_map(|word| word.history.iter()) {
        let slot = days.entry(entry.timestamp.date_naive()).or_default();
        match entry.outcome {
            HistoryStatus::Remembered => slot.0 += 1,
            HistoryStatus::Forgotten => slot.1 += 1,
            HistoryStatus::Reset => {}
        }
    }

    days.into_iter()
        .filter(|(_, (remembered, forgotten))| remembered + forgotten > 0)
        .map(|(date, (remembered, forgotten))| DailyReviewCount {
            date,
            remembered,
            forgotten,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewOutcome;
    use crate::srs::{apply_review, reset_word};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_groups_by_day_in_order() {
        let day1 = Utc.with_ymd_and_hms(2025, 4, 1, 23, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2025, 4, 3, 1, 0, 0).unwrap();

        let mut first = WordRecord::new("a", "b");
        first = apply_review(&first, ReviewOutcome::Remembered, day2);
        first = apply_review(&first, ReviewOutcome::Forgotten, day2);

        let mut second = WordRecord::new("c", "d");
        second = apply_review(&second, ReviewOutcome::Remembered, day1);
        second = reset_word(&second, day1);

        let history = daily_review_history(&[first, second]);
        assert_eq!(
            history,
            vec![
                DailyReviewCount {
                    date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                    remembered: 1,
                    forgotten: 0,
                },
                DailyReviewCount {
                    date: NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
                    remembered: 1,
                    forgotten: 1,
                },
            ]
        );
    }

    #[test]
    fn test_reset_only_day_is_omitted() {
        let day = Utc.with_ymd_and_hms(2025, 5, 5, 5, 0, 0).unwrap();
        let word = reset_word(&WordRecord::new("a", "b"), day);
        assert!(daily_review_history(&[word]).is_empty());
    }
}
