use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use crate::classify::SrsFilter;
use crate::feedback::FeedbackGenerator;
use crate::models::{ReviewOutcome, WordRecord};
use crate::persistence::{JsonFileStorage, StorageError};
use crate::practice::{self, QuizDirection, QuizQuestion, MIN_QUIZ_WORDS};
use crate::queue;
use crate::store::{StoreError, VocabularyStore};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Not enough vocabulary: need at least {needed} words, found {available}")]
    InsufficientVocabulary { needed: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Where a practice session draws its words from. A project wins over an
/// explicit collection list; with neither, every word is used.
#[derive(Debug, Clone, Default)]
pub struct WordSource {
    pub collection_ids: Option<Vec<String>>,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub correct: bool,
    pub word: WordRecord,
    pub feedback: String,
}

/// The store plus its write-through storage. Every successful mutation is
/// saved before the call returns.
pub struct App {
    store: VocabularyStore,
    storage: Option<JsonFileStorage>,
}

impl App {
    pub fn load(storage: JsonFileStorage) -> Result<Self> {
        let document = storage.load()?;
        Ok(Self {
            store: VocabularyStore::from_document(document),
            storage: Some(storage),
        })
    }

    /// No file behind it; used by tests and throwaway sessions.
    pub fn in_memory(store: VocabularyStore) -> Self {
        Self {
            store,
            storage: None,
        }
    }

    pub fn store(&self) -> &VocabularyStore {
        &self.store
    }

    /// Runs `change` and persists the store if it succeeded. On any error
    /// the store is rolled back, so memory never holds unsaved changes.
    pub fn mutate<T, F>(&mut self, change: F) -> Result<T>
    where
        F: FnOnce(&mut VocabularyStore) -> std::result::Result<T, StoreError>,
    {
        let snapshot = self.store.clone();
        let result = change(&mut self.store)
            .map_err(AppError::from)
            .and_then(|value| self.persist().map(|()| value));

        if let Err(err) = &result {
            log::warn!("Rolling back store change: {}", err);
            self.store = snapshot;
        }
        result
    }

    pub fn persist(&self) -> Result<()> {
        if let Some(storage) = &self.storage {
            storage.save(&self.store.to_document())?;
        }
        Ok(())
    }

    pub fn source_words(&self, source: &WordSource) -> Result<Vec<WordRecord>> {
        if let Some(project_id) = &source.project_id {
            return Ok(self.store.project_words(project_id)?);
        }
        Ok(match &source.collection_ids {
            Some(ids) => self.store.words_in(ids),
            None => self.store.all_words(),
        })
    }

    pub fn start_session<R: Rng + ?Sized>(
        &self,
        source: &WordSource,
        filter: SrsFilter,
        size: Option<usize>,
        shuffle: bool,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Vec<WordRecord>> {
        let words = self.source_words(source)?;
        Ok(queue::build_session(&words, filter, size, shuffle, rng, now))
    }

    /// Unlike the queue builder, a quiz refuses to start without enough
    /// words to fill the answer options.
    pub fn start_quiz<R: Rng + ?Sized>(
        &self,
        source: &WordSource,
        count: usize,
        direction: QuizDirection,
        rng: &mut R,
    ) -> Result<Vec<QuizQuestion>> {
        let words = self.source_words(source)?;
        if words.len() < MIN_QUIZ_WORDS {
            return Err(AppError::InsufficientVocabulary {
                needed: MIN_QUIZ_WORDS,
                available: words.len(),
            });
        }
        Ok(practice::generate_quiz_questions(&words, count, direction, rng))
    }

    /// Checks a typed answer, schedules the word accordingly and explains
    /// the mistake if there was one.
    pub fn submit_answer(
        &mut self,
        word_id: &str,
        input: &str,
        direction: QuizDirection,
        now: DateTime<Utc>,
    ) -> Result<AnswerResult> {
        let word = self.store.word(word_id)?.clone();
        let correct = practice::check_written_answer(&word, input, direction);
        let outcome = if correct {
            ReviewOutcome::Remembered
        } else {
            ReviewOutcome::Forgotten
        };

        let updated = self.mutate(|store| store.review(word_id, outcome, now).cloned())?;
        let feedback = if correct {
            FeedbackGenerator::praise(&updated)
        } else {
            FeedbackGenerator::explain_mistake(&word, input, direction, &self.store.all_words())
        };

        Ok(AnswerResult {
            correct,
            word: updated,
            feedback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewWord;
    use std::fs;

    fn store_with_word() -> (VocabularyStore, String) {
        let mut store = VocabularyStore::new();
        let id = store
            .add_collection("Numbers", vec![NewWord::new("satu", "one")])
            .unwrap()
            .id
            .clone();
        let word_id = store.collection(&id).unwrap().words[0].id.clone();
        (store, word_id)
    }

    #[test]
    fn test_failed_save_rolls_back_review() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let (store, word_id) = store_with_word();
        let before = store.word(&word_id).unwrap().clone();
        let mut app = App {
            store,
            storage: Some(JsonFileStorage::new(blocker.join("vocab.json"))),
        };

        let result = app.mutate(|store| {
            store
                .review(&word_id, ReviewOutcome::Forgotten, Utc::now())
                .cloned()
        });
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(app.store().word(&word_id).unwrap(), &before);
        assert!(app.store().review_list().is_empty());
    }

    #[test]
    fn test_successful_change_is_kept_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.json");
        let (store, word_id) = store_with_word();
        let mut app = App {
            store,
            storage: Some(JsonFileStorage::new(&path)),
        };

        app.mutate(|store| {
            store
                .review(&word_id, ReviewOutcome::Forgotten, Utc::now())
                .map(|_| ())
        })
        .unwrap();

        assert_eq!(app.store().word(&word_id).unwrap().interval, 1);
        let reloaded = App::load(JsonFileStorage::new(&path)).unwrap();
        assert_eq!(reloaded.store().word(&word_id).unwrap().interval, 1);
    }
}
