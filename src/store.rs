//! The vocabulary store: collections, practice projects and the
//! incorrect-answer list. This is the only owner of mutable word state;
//! scheduling changes go through [`crate::srs`] and are written back here.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::classify::CategoryCounts;
use crate::models::{Collection, NewWord, PracticeProject, ReviewOutcome, WordRecord};
use crate::persistence::Document;
use crate::queue::collect_words;
use crate::review_list::ReviewList;
use crate::srs;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Word not found: {0}")]
    WordNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("A word needs at least one non-empty term")]
    EmptyTerms,
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VocabularyStore {
    collections: Vec<Collection>,
    projects: Vec<PracticeProject>,
    review_list: ReviewList,
}

impl VocabularyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: Document) -> Self {
        Self {
            collections: document.collections,
            projects: document.projects,
            review_list: ReviewList::new(document.review_list),
        }
    }

    pub fn to_document(&self) -> Document {
        Document {
            collections: self.collections.clone(),
            projects: self.projects.clone(),
            review_list: self.review_list.entries().to_vec(),
        }
    }

    // ==================== Collections ====================

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collection(&self, collection_id: &str) -> Result<&Collection> {
        self.collections
            .iter()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| StoreError::CollectionNotFound(collection_id.to_string()))
    }

    pub fn add_collection(&mut self, name: &str, words: Vec<NewWord>) -> Result<&Collection> {
        let collection = build_collection(name, words)?;
        log::debug!(
            "Adding collection {} ({} words)",
            collection.id,
            collection.words.len()
        );
        self.collections.push(collection);
        Ok(&self.collections[self.collections.len() - 1])
    }

    /// Creates several collections at once. Nothing is added if any word is
    /// invalid.
    pub fn add_collections(&mut self, sets: Vec<(String, Vec<NewWord>)>) -> Result<Vec<String>> {
        let built = sets
            .into_iter()
            .map(|(name, words)| build_collection(&name, words))
            .collect::<Result<Vec<_>>>()?;
        let ids = built.iter().map(|c| c.id.clone()).collect();
        self.collections.extend(built);
        Ok(ids)
    }

    pub fn rename_collection(&mut self, collection_id: &str, name: &str) -> Result<()> {
        self.collection_mut(collection_id)?.name = name.to_string();
        Ok(())
    }

    /// Deletes a collection together with its words.
    pub fn remove_collection(&mut self, collection_id: &str) -> Result<Collection> {
        let pos = self
            .collections
            .iter()
            .position(|c| c.id == collection_id)
            .ok_or_else(|| StoreError::CollectionNotFound(collection_id.to_string()))?;
        let removed = self.collections.remove(pos);
        for word in &removed.words {
            self.review_list.remove(&word.id);
        }
        log::debug!("Removed collection {}", collection_id);
        Ok(removed)
    }

    /// Drops every collection. Projects are kept but point at nothing.
    pub fn clear(&mut self) {
        self.collections.clear();
        self.review_list.clear();
    }

    // ==================== Words ====================

    pub fn word(&self, word_id: &str) -> Result<&WordRecord> {
        self.collections
            .iter()
            .flat_map(|c| c.words.iter())
            .find(|w| w.id == word_id)
            .ok_or_else(|| StoreError::WordNotFound(word_id.to_string()))
    }

    pub fn all_words(&self) -> Vec<WordRecord> {
        self.collections
            .iter()
            .flat_map(|c| c.words.iter().cloned())
            .collect()
    }

    pub fn words_in(&self, collection_ids: &[String]) -> Vec<WordRecord> {
        collect_words(&self.collections, collection_ids)
    }

    pub fn add_word(&mut self, collection_id: &str, word: NewWord) -> Result<&WordRecord> {
        if !word.has_terms() {
            return Err(StoreError::EmptyTerms);
        }
        let collection = self.collection_mut(collection_id)?;
        collection.words.push(WordRecord::from_new_word(word));
        let last = collection.words.len() - 1;
        Ok(&collection.words[last])
    }

    /// Replaces the two terms. SRS state is left as is.
    pub fn edit_word(&mut self, word_id: &str, term_a: &str, term_b: &str) -> Result<&WordRecord> {
        if term_a.trim().is_empty() && term_b.trim().is_empty() {
            return Err(StoreError::EmptyTerms);
        }
        let word = self.word_mut(word_id)?;
        word.term_a = term_a.to_string();
        word.term_b = term_b.to_string();
        Ok(word)
    }

    /// Removes a word. A collection left empty by the removal is dropped too;
    /// the returned flag says whether that happened.
    pub fn remove_word(&mut self, word_id: &str) -> Result<(WordRecord, bool)> {
        let (set_pos, word_pos) = self
            .collections
            .iter()
            .enumerate()
            .find_map(|(i, c)| c.words.iter().position(|w| w.id == word_id).map(|j| (i, j)))
            .ok_or_else(|| StoreError::WordNotFound(word_id.to_string()))?;

        let removed = self.collections[set_pos].words.remove(word_pos);
        self.review_list.remove(word_id);

        let dropped_collection = self.collections[set_pos].words.is_empty();
        if dropped_collection {
            let collection = self.collections.remove(set_pos);
            log::info!("Removed empty collection {}", collection.name);
        }
        Ok((removed, dropped_collection))
    }

    // ==================== Scheduling ====================

    pub fn mark_remembered(&mut self, word_id: &str, now: DateTime<Utc>) -> Result<&WordRecord> {
        self.review(word_id, ReviewOutcome::Remembered, now)
    }

    /// Also records the miss on the incorrect-answer list.
    pub fn mark_forgotten(&mut self, word_id: &str, now: DateTime<Utc>) -> Result<&WordRecord> {
        self.review(word_id, ReviewOutcome::Forgotten, now)
    }

    pub fn review(
        &mut self,
        word_id: &str,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
    ) -> Result<&WordRecord> {
        if outcome == ReviewOutcome::Forgotten {
            // Look the word up first so unknown ids never reach the list.
            self.word(word_id)?;
            self.review_list.add_incorrect_answer(word_id, now);
        }
        let word = self.word_mut(word_id)?;
        *word = srs::apply_review(word, outcome, now);
        log::debug!(
            "Reviewed {} as {:?}: interval {}d, ease {:.2}",
            word.id,
            outcome,
            word.interval,
            word.ease_factor
        );
        Ok(word)
    }

    pub fn reset_progress(&mut self, word_id: &str, now: DateTime<Utc>) -> Result<&WordRecord> {
        let word = self.word_mut(word_id)?;
        *word = srs::reset_word(word, now);
        Ok(word)
    }

    /// Resets every word; returns how many were reset.
    pub fn reset_all_progress(&mut self, now: DateTime<Utc>) -> usize {
        let mut count = 0;
        for word in self.collections.iter_mut().flat_map(|c| c.words.iter_mut()) {
            *word = srs::reset_word(word, now);
            count += 1;
        }
        log::info!("Reset SRS progress for {} words", count);
        count
    }

    pub fn category_counts(&self, now: DateTime<Utc>) -> CategoryCounts {
        CategoryCounts::tally(self.collections.iter().flat_map(|c| c.words.iter()), now)
    }

    // ==================== Review list ====================

    pub fn review_list(&self) -> &ReviewList {
        &self.review_list
    }

    pub fn review_list_mut(&mut self) -> &mut ReviewList {
        &mut self.review_list
    }

    // ==================== Projects ====================

    pub fn projects(&self) -> &[PracticeProject] {
        &self.projects
    }

    pub fn project(&self, project_id: &str) -> Result<&PracticeProject> {
        self.projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))
    }

    /// New projects go to the front of the list.
    pub fn add_project(&mut self, name: &str, set_ids: Vec<String>) -> &PracticeProject {
        self.projects
            .insert(0, PracticeProject::new(name, dedup(set_ids)));
        &self.projects[0]
    }

    pub fn remove_project(&mut self, project_id: &str) -> Result<PracticeProject> {
        let pos = self
            .projects
            .iter()
            .position(|p| p.id == project_id)
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;
        Ok(self.projects.remove(pos))
    }

    /// Union of the existing and new set ids, existing order first.
    pub fn add_sets_to_project(
        &mut self,
        project_id: &str,
        set_ids: Vec<String>,
    ) -> Result<&PracticeProject> {
        let project = self.project_mut(project_id)?;
        let mut merged = std::mem::take(&mut project.set_ids);
        merged.extend(set_ids);
        project.set_ids = dedup(merged);
        Ok(project)
    }

    pub fn edit_project(
        &mut self,
        project_id: &str,
        name: &str,
        set_ids: Vec<String>,
    ) -> Result<&PracticeProject> {
        let project = self.project_mut(project_id)?;
        project.name = name.to_string();
        project.set_ids = dedup(set_ids);
        Ok(project)
    }

    pub fn project_words(&self, project_id: &str) -> Result<Vec<WordRecord>> {
        let project = self.project(project_id)?;
        Ok(self.words_in(&project.set_ids))
    }

    fn collection_mut(&mut self, collection_id: &str) -> Result<&mut Collection> {
        self.collections
            .iter_mut()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| StoreError::CollectionNotFound(collection_id.to_string()))
    }

    fn word_mut(&mut self, word_id: &str) -> Result<&mut WordRecord> {
        self.collections
            .iter_mut()
            .flat_map(|c| c.words.iter_mut())
            .find(|w| w.id == word_id)
            .ok_or_else(|| StoreError::WordNotFound(word_id.to_string()))
    }

    fn project_mut(&mut self, project_id: &str) -> Result<&mut PracticeProject> {
        self.projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))
    }
}

fn build_collection(name: &str, words: Vec<NewWord>) -> Result<Collection> {
    if words.iter().any(|w| !w.has_terms()) {
        return Err(StoreError::EmptyTerms);
    }
    let records = words.into_iter().map(WordRecord::from_new_word).collect();
    Ok(Collection::new(name, records))
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
