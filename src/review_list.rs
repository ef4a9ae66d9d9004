use chrono::{DateTime, Utc};

use crate::models::{ReviewWord, WordRecord};

/// Words answered incorrectly, most-missed first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewList {
    entries: Vec<ReviewWord>,
}

impl ReviewList {
    pub fn new(entries: Vec<ReviewWord>) -> Self {
        let mut list = Self { entries };
        list.sort();
        list
    }

    pub fn entries(&self) -> &[ReviewWord] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add_incorrect_answer(&mut self, word_id: &str, now: DateTime<Utc>) {
        match self.entries.iter_mut().find(|entry| entry.word_id == word_id) {
            Some(entry) => {
                entry.incorrect_count += 1;
                entry.last_incorrect_at = now;
            }
            None => self.entries.push(ReviewWord {
                word_id: word_id.to_string(),
                incorrect_count: 1,
                last_incorrect_at: now,
            }),
        }
        self.sort();
    }

    /// Returns true if the word was on the list.
    pub fn remove(&mut self, word_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.word_id != word_id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Looks the listed ids up in `words`, in list order. Ids of words that
    /// no longer exist are skipped.
    pub fn resolve(&self, words: &[WordRecord]) -> Vec<WordRecord> {
        self.entries
            .iter()
            .filter_map(|entry| words.iter().find(|word| word.id == entry.word_id))
            .cloned()
            .collect()
    }

    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| b.incorrect_count.cmp(&a.incorrect_count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 2, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_counts_and_sorts_by_misses() {
        let mut list = ReviewList::default();
        list.add_incorrect_answer("a", now());
        list.add_incorrect_answer("b", now());
        list.add_incorrect_answer("b", now() + Duration::minutes(5));
        list.add_incorrect_answer("c", now());

        let ids: Vec<&str> = list.entries().iter().map(|e| e.word_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(list.entries()[0].incorrect_count, 2);
        assert_eq!(list.entries()[0].last_incorrect_at, now() + Duration::minutes(5));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut list = ReviewList::default();
        list.add_incorrect_answer("a", now());
        list.add_incorrect_answer("b", now());

        assert!(list.remove("a"));
        assert!(!list.remove("a"));
        assert_eq!(list.entries().len(), 1);

        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_resolve_skips_unknown_words() {
        let kept = WordRecord::new("hujan", "rain");
        let mut list = ReviewList::default();
        list.add_incorrect_answer("gone", now());
        list.add_incorrect_answer(&kept.id, now());
        list.add_incorrect_answer(&kept.id, now());

        let resolved = list.resolve(&[kept.clone()]);
        assert_eq!(resolved, vec![kept]);
    }
}
