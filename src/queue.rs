//! Review queue construction: which words a practice session shows, and in
//! what order.
//!
//! Nothing here fails. An empty or short result is how "not enough
//! vocabulary" is reported; callers decide whether that blocks a session.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::classify::SrsFilter;
use crate::models::{Collection, WordRecord};

/// Flattens the words of the requested collections, in collection order.
pub fn collect_words(collections: &[Collection], collection_ids: &[String]) -> Vec<WordRecord> {
    collections
        .iter()
        .filter(|collection| collection_ids.contains(&collection.id))
        .flat_map(|collection| collection.words.iter().cloned())
        .collect()
}

/// Uniform random permutation of `items` (Fisher-Yates).
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// Filters `words` by `filter`, then either samples `size` words at random
/// (`shuffle`) or keeps the first `size` in source order.
pub fn build_session<R: Rng + ?Sized>(
    words: &[WordRecord],
    filter: SrsFilter,
    size: Option<usize>,
    shuffle_words: bool,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<WordRecord> {
    let mut session: Vec<WordRecord> = words
        .iter()
        .filter(|word| filter.matches(word, now))
        .cloned()
        .collect();

    if shuffle_words {
        session.shuffle(rng);
    }
    if let Some(size) = size {
        session.truncate(size);
    }

    log::debug!(
        "Built session of {} words (filter: {}, source: {})",
        session.len(),
        filter,
        words.len()
    );
    session
}

/// Picks `count - 1` other words as wrong options, adds `correct`, and
/// shuffles. Returns fewer than `count` items when the pool is too small.
pub fn generate_distractors<R: Rng + ?Sized>(
    words: &[WordRecord],
    correct: &WordRecord,
    count: usize,
    rng: &mut R,
) -> Vec<WordRecord> {
    if count == 0 {
        return Vec::new();
    }

    let pool: Vec<&WordRecord> = words.iter().filter(|w| w.id != correct.id).collect();
    let mut options: Vec<WordRecord> = pool
        .choose_multiple(rng, count - 1)
        .map(|w| (*w).clone())
        .collect();
    options.push(correct.clone());
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap()
    }

    fn words(n: usize) -> Vec<WordRecord> {
        (0..n)
            .map(|i| WordRecord::new(format!("a{}", i), format!("b{}", i)))
            .collect()
    }

    fn master(word: &mut WordRecord) {
        word.repetition = 6;
        word.interval = 60;
        word.next_review_date = Some(now() + chrono::Duration::days(60));
    }

    #[test]
    fn test_collect_words_keeps_collection_order() {
        let first = Collection::new("first", words(2));
        let second = Collection::new("second", words(3));
        let third = Collection::new("third", words(1));
        let collections = vec![first.clone(), second.clone(), third];

        let ids = vec![second.id.clone(), first.id.clone()];
        let collected = collect_words(&collections, &ids);

        let expected: Vec<String> = first
            .words
            .iter()
            .chain(second.words.iter())
            .map(|w| w.id.clone())
            .collect();
        let actual: Vec<String> = collected.iter().map(|w| w.id.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_collect_words_unknown_ids() {
        let collections = vec![Collection::new("only", words(2))];
        assert!(collect_words(&collections, &["missing".to_string()]).is_empty());
    }

    #[test]
    fn test_mastered_session_without_shuffle() {
        let mut source = words(10);
        for i in [2, 5, 8] {
            master(&mut source[i]);
        }
        let mut rng = StdRng::seed_from_u64(7);

        let session = build_session(
            &source,
            Category::Mastered.into(),
            None,
            false,
            &mut rng,
            now(),
        );

        let ids: Vec<&str> = session.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                source[2].id.as_str(),
                source[5].id.as_str(),
                source[8].id.as_str()
            ]
        );
    }

    #[test]
    fn test_shuffled_session_is_permutation() {
        let source = words(12);
        let mut rng = StdRng::seed_from_u64(42);
        let session = build_session(&source, SrsFilter::All, None, true, &mut rng, now());

        assert_eq!(session.len(), source.len());
        let expected: HashSet<&str> = source.iter().map(|w| w.id.as_str()).collect();
        let actual: HashSet<&str> = session.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_session_size_truncates() {
        let source = words(8);
        let mut rng = StdRng::seed_from_u64(1);

        let ordered = build_session(&source, SrsFilter::All, Some(3), false, &mut rng, now());
        assert_eq!(ordered, source[..3].to_vec());

        let sampled = build_session(&source, SrsFilter::All, Some(3), true, &mut rng, now());
        assert_eq!(sampled.len(), 3);
        let ids: HashSet<&str> = sampled.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids.len(), 3);

        let oversized = build_session(&source, SrsFilter::All, Some(50), false, &mut rng, now());
        assert_eq!(oversized.len(), 8);
    }

    #[test]
    fn test_empty_filter_result() {
        let source = words(5);
        let mut rng = StdRng::seed_from_u64(3);
        let session = build_session(
            &source,
            Category::Forgotten.into(),
            None,
            true,
            &mut rng,
            now(),
        );
        assert!(session.is_empty());
    }

    #[test]
    fn test_distractors_contain_correct_once() {
        let source = words(10);
        let correct = source[4].clone();
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..20 {
            let options = generate_distractors(&source, &correct, 4, &mut rng);
            assert_eq!(options.len(), 4);
            assert_eq!(options.iter().filter(|w| w.id == correct.id).count(), 1);
            let ids: HashSet<&str> = options.iter().map(|w| w.id.as_str()).collect();
            assert_eq!(ids.len(), 4);
        }
    }

    #[test]
    fn test_distractors_with_small_pool() {
        let source = words(3);
        let correct = source[0].clone();
        let mut rng = StdRng::seed_from_u64(5);

        let options = generate_distractors(&source, &correct, 4, &mut rng);
        assert_eq!(options.len(), 3);
        assert!(options.iter().any(|w| w.id == correct.id));

        let alone = generate_distractors(&[], &correct, 4, &mut rng);
        assert_eq!(alone, vec![correct]);
    }

    #[test]
    fn test_shuffle_keeps_items() {
        let items: Vec<u32> = (0..20).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let mut shuffled = shuffle(&items, &mut rng);
        assert_eq!(shuffled.len(), items.len());
        shuffled.sort_unstable();
        assert_eq!(shuffled, items);
    }
}
