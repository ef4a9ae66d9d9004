//! Helpers behind the practice modes: multiple-choice quiz, matching game and
//! free-text writing checks.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::WordRecord;
use crate::queue::{generate_distractors, shuffle};

/// A multiple-choice question needs the answer plus three wrong options.
pub const MIN_QUIZ_WORDS: usize = 4;
pub const QUIZ_OPTIONS: usize = 4;

/// Which side of the pair is shown as the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizDirection {
    #[default]
    AToB,
    BToA,
}

impl QuizDirection {
    pub fn prompt(self, word: &WordRecord) -> &str {
        match self {
            QuizDirection::AToB => &word.term_a,
            QuizDirection::BToA => &word.term_b,
        }
    }

    pub fn answer(self, word: &WordRecord) -> &str {
        match self {
            QuizDirection::AToB => &word.term_b,
            QuizDirection::BToA => &word.term_a,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub word_id: String,
    pub question: String,
    pub correct_answer: String,
    pub options: Vec<String>,
}

/// Builds up to `count` questions from a random selection of `words`.
/// Returns nothing when there are fewer than [`MIN_QUIZ_WORDS`] words.
pub fn generate_quiz_questions<R: Rng + ?Sized>(
    words: &[WordRecord],
    count: usize,
    direction: QuizDirection,
    rng: &mut R,
) -> Vec<QuizQuestion> {
    if words.len() < MIN_QUIZ_WORDS {
        log::debug!("Not enough words for a quiz: {}", words.len());
        return Vec::new();
    }

    let selected = shuffle(words, rng);
    selected
        .iter()
        .take(count)
        .map(|word| {
            let options = generate_distractors(words, word, QUIZ_OPTIONS, rng)
                .iter()
                .map(|option| direction.answer(option).to_string())
                .collect();
            QuizQuestion {
                word_id: word.id.clone(),
                question: direction.prompt(word).to_string(),
                correct_answer: direction.answer(word).to_string(),
                options,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingPair {
    pub id: String,
    pub text_a: String,
    pub text_b: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingCard {
    pub id: String,
    pub pair_id: String,
    pub text: String,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingGame {
    pub pairs: Vec<MatchingPair>,
    pub left_cards: Vec<MatchingCard>,
    pub right_cards: Vec<MatchingCard>,
}

impl MatchingGame {
    /// A left and a right card match when they come from the same word.
    pub fn is_match(left: &MatchingCard, right: &MatchingCard) -> bool {
        left.side != right.side && left.pair_id == right.pair_id
    }
}

/// Lays out one card per side for every word; both columns are shuffled
/// independently.
pub fn generate_matching_game<R: Rng + ?Sized>(words: &[WordRecord], rng: &mut R) -> MatchingGame {
    let pairs: Vec<MatchingPair> = words
        .iter()
        .map(|word| MatchingPair {
            id: word.id.clone(),
            text_a: word.term_a.clone(),
            text_b: word.term_b.clone(),
        })
        .collect();

    let left: Vec<MatchingCard> = pairs
        .iter()
        .map(|pair| MatchingCard {
            id: format!("{}-A", pair.id),
            pair_id: pair.id.clone(),
            text: pair.text_a.clone(),
            side: Side::Left,
        })
        .collect();
    let right: Vec<MatchingCard> = pairs
        .iter()
        .map(|pair| MatchingCard {
            id: format!("{}-B", pair.id),
            pair_id: pair.id.clone(),
            text: pair.text_b.clone(),
            side: Side::Right,
        })
        .collect();

    MatchingGame {
        left_cards: shuffle(&left, rng),
        right_cards: shuffle(&right, rng),
        pairs,
    }
}

/// Trimmed, case-insensitive comparison. In the A to B direction any of the
/// alternatives for `term_b` is accepted as well.
pub fn check_written_answer(word: &WordRecord, input: &str, direction: QuizDirection) -> bool {
    let input = normalize(input);
    match direction {
        QuizDirection::AToB => std::iter::once(&word.term_b)
            .chain(word.term_b_alternatives.iter())
            .any(|answer| normalize(answer) == input),
        QuizDirection::BToA => normalize(&word.term_a) == input,
    }
}

pub(crate) fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
