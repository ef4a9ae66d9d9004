use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const INITIAL_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Longest interval the scheduler hands out, in days (100 years).
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Binary answer signal reported by every practice mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    Remembered,
    Forgotten,
}

/// What a history entry records. `Reset` only comes from an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Remembered,
    Forgotten,
    Reset,
}

impl From<ReviewOutcome> for HistoryStatus {
    fn from(outcome: ReviewOutcome) -> Self {
        match outcome {
            ReviewOutcome::Remembered => HistoryStatus::Remembered,
            ReviewOutcome::Forgotten => HistoryStatus::Forgotten,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub outcome: HistoryStatus,
    pub interval_after: u32,
    pub repetition_after: u32,
    pub ease_factor_after: f64,
}

/// A vocabulary pair together with its spaced repetition state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub id: String,
    pub term_a: String,
    pub term_b: String,
    /// Extra accepted answers for `term_b` in free-text recall.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub term_b_alternatives: Vec<String>,
    pub repetition: u32,
    /// Days until the next review.
    pub interval: u32,
    pub ease_factor: f64,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub next_review_date: Option<DateTime<Utc>>,
    /// Append-only. The scheduler never reads it back.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
}

impl WordRecord {
    pub fn new(term_a: impl Into<String>, term_b: impl Into<String>) -> Self {
        Self {
            id: new_id("word"),
            term_a: term_a.into(),
            term_b: term_b.into(),
            term_b_alternatives: Vec::new(),
            repetition: 0,
            interval: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            next_review_date: None,
            history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn from_new_word(word: NewWord) -> Self {
        let mut record = Self::new(word.term_a, word.term_b);
        record.term_b_alternatives = word.term_b_alternatives;
        record
    }
}

/// Input shape for creating a word; SRS fields always start at their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWord {
    pub term_a: String,
    pub term_b: String,
    #[serde(default)]
    pub term_b_alternatives: Vec<String>,
}

impl NewWord {
    pub fn new(term_a: impl Into<String>, term_b: impl Into<String>) -> Self {
        Self {
            term_a: term_a.into(),
            term_b: term_b.into(),
            term_b_alternatives: Vec::new(),
        }
    }

    pub fn has_terms(&self) -> bool {
        !(self.term_a.trim().is_empty() && self.term_b.trim().is_empty())
    }
}

/// A named vocabulary set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub words: Vec<WordRecord>,
}

impl Collection {
    pub fn new(name: impl Into<String>, words: Vec<WordRecord>) -> Self {
        Self {
            id: new_id("set"),
            name: name.into(),
            created_at: Utc::now(),
            words,
        }
    }
}

/// Scopes which collections a practice session draws from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeProject {
    pub id: String,
    pub name: String,
    pub set_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl PracticeProject {
    pub fn new(name: impl Into<String>, set_ids: Vec<String>) -> Self {
        Self {
            id: new_id("project"),
            name: name.into(),
            set_ids,
            created_at: Utc::now(),
        }
    }
}

/// An entry in the incorrect-answer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWord {
    pub word_id: String,
    pub incorrect_count: u32,
    pub last_incorrect_at: DateTime<Utc>,
}

pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}
