use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::WordRecord;

/// Study state of a word. The predicates are independent: a word may match
/// more than one of them (e.g. due and mastered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    New,
    Learning,
    Due,
    Mastered,
    Forgotten,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::New,
        Category::Learning,
        Category::Due,
        Category::Mastered,
        Category::Forgotten,
    ];

    pub fn matches(self, word: &WordRecord, now: DateTime<Utc>) -> bool {
        match self {
            Category::New => word.repetition == 0 && word.interval == 0,
            Category::Learning => {
                word.repetition > 0 && word.repetition < 3 && word.interval < 7
            }
            Category::Due => word.next_review_date.is_some_and(|due| due <= now),
            Category::Mastered => word.repetition >= 5 && word.interval >= 30,
            Category::Forgotten => word.repetition == 0 && word.interval > 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::New => "new",
            Category::Learning => "learning",
            Category::Due => "due",
            Category::Mastered => "mastered",
            Category::Forgotten => "forgotten",
        }
    }
}

/// Dominant label: the first matching category in declaration order.
/// Young review words (streak of 3+ but not yet mastered, not due) match no
/// predicate and are still reported as learning.
pub fn classify(word: &WordRecord, now: DateTime<Utc>) -> Category {
    Category::ALL
        .into_iter()
        .find(|category| category.matches(word, now))
        .unwrap_or(Category::Learning)
}

/// Every category whose predicate holds, in declaration order. Empty for the
/// young review words that [`classify`] labels as learning.
pub fn matching_categories(word: &WordRecord, now: DateTime<Utc>) -> Vec<Category> {
    Category::ALL
        .into_iter()
        .filter(|category| category.matches(word, now))
        .collect()
}

/// Filter selection coming from dashboards and practice setup screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SrsFilter {
    #[default]
    All,
    Only(Category),
}

impl SrsFilter {
    pub fn matches(self, word: &WordRecord, now: DateTime<Utc>) -> bool {
        match self {
            SrsFilter::All => true,
            SrsFilter::Only(category) => category.matches(word, now),
        }
    }
}

impl From<Category> for SrsFilter {
    fn from(category: Category) -> Self {
        SrsFilter::Only(category)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SRS filter: {0}")]
pub struct UnknownFilter(pub String);

impl FromStr for SrsFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(SrsFilter::All);
        }
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .map(SrsFilter::Only)
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}

impl TryFrom<String> for SrsFilter {
    type Error = UnknownFilter;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SrsFilter> for String {
    fn from(filter: SrsFilter) -> Self {
        filter.to_string()
    }
}

impl fmt::Display for SrsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SrsFilter::All => f.write_str("all"),
            SrsFilter::Only(category) => f.write_str(category.as_str()),
        }
    }
}

/// Returns the matching words in their original order. Inputs are untouched.
pub fn filter_by_category(
    words: &[WordRecord],
    filter: SrsFilter,
    now: DateTime<Utc>,
) -> Vec<WordRecord> {
    words
        .iter()
        .filter(|word| filter.matches(word, now))
        .cloned()
        .collect()
}

/// Per-category counts for dashboard charts. Each count is an independent
/// predicate, so they need not sum to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub new: usize,
    pub learning: usize,
    pub due: usize,
    pub mastered: usize,
    pub forgotten: usize,
    pub total: usize,
}

impl CategoryCounts {
    pub fn tally<'a, I>(words: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a WordRecord>,
    {
        let mut counts = CategoryCounts::default();
        for word in words {
            counts.total += 1;
            for category in Category::ALL {
                if category.matches(word, now) {
                    *counts.slot(category) += 1;
                }
            }
        }
        counts
    }

    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::New => self.new,
            Category::Learning => self.learning,
            Category::Due => self.due,
            Category::Mastered => self.mastered,
            Category::Forgotten => self.forgotten,
        }
    }

    fn slot(&mut self, category: Category) -> &mut usize {
        match category {
            Category::New => &mut self.new,
            Category::Learning => &mut self.learning,
            Category::Due => &mut self.due,
            Category::Mastered => &mut self.mastered,
            Category::Forgotten => &mut self.forgotten,
        }
    }
}
