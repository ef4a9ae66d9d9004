//! JSON document storage.
//!
//! File layout:
//! ```text
//! {
//!   "collections": [{ "id", "name", "createdAt", "words": [WordRecord...] }],
//!   "projects":    [{ "id", "name", "setIds", "createdAt" }],
//!   "reviewList":  [{ "wordId", "incorrectCount", "lastIncorrectAt" }]
//! }
//! ```
//!
//! Loading never rejects a document for a bad field. Each field falls back
//! to its default, and only entries that are not objects at all are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{
    new_id, Collection, HistoryEntry, HistoryStatus, PracticeProject, ReviewWord, WordRecord,
    INITIAL_EASE_FACTOR, MIN_EASE_FACTOR,
};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub projects: Vec<PracticeProject>,
    #[serde(default)]
    pub review_list: Vec<ReviewWord>,
}

/// Whole-document storage in a single JSON file.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty document. Malformed records are repaired;
    /// a file that is not JSON at all is an error so it is never overwritten.
    pub fn load(&self) -> Result<Document> {
        if !self.path.exists() {
            log::info!("No data file at {}, starting empty", self.path.display());
            return Ok(Document::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let value: Value = serde_json::from_str(&content)?;
        let document = sanitize_document(value);
        log::info!(
            "Loaded {} collections from {}",
            document.collections.len(),
            self.path.display()
        );
        Ok(document)
    }

    /// Writes to a sibling temp file and renames it over the target.
    pub fn save(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(document)?)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Saved data to {}", self.path.display());
        Ok(())
    }
}

/// Builds a document from arbitrary JSON, substituting defaults for
/// anything missing or of the wrong type.
pub fn sanitize_document(value: Value) -> Document {
    let Value::Object(root) = value else {
        log::warn!("Stored data is not an object, starting empty");
        return Document::default();
    };

    // Older files stored the sets under `vocabularySets`.
    let collections = array(&root, &["collections", "vocabularySets"])
        .iter()
        .filter_map(sanitize_collection)
        .collect();
    let projects = array(&root, &["projects"])
        .iter()
        .filter_map(sanitize_project)
        .collect();
    let review_list = array(&root, &["reviewList"])
        .iter()
        .filter_map(sanitize_review_word)
        .collect();

    Document {
        collections,
        projects,
        review_list,
    }
}

fn sanitize_collection(value: &Value) -> Option<Collection> {
    let Some(obj) = value.as_object() else {
        log::warn!("Skipping collection that is not an object");
        return None;
    };

    let words = array(obj, &["words"])
        .iter()
        .filter_map(sanitize_word)
        .collect();

    Some(Collection {
        id: string(obj, &["id"]).unwrap_or_else(|| new_id("set")),
        name: string(obj, &["name"]).unwrap_or_else(|| "Untitled set".to_string()),
        created_at: rfc3339(obj, "createdAt").unwrap_or_else(Utc::now),
        words,
    })
}

fn sanitize_word(value: &Value) -> Option<WordRecord> {
    let Some(obj) = value.as_object() else {
        log::warn!("Skipping word that is not an object");
        return None;
    };

    let term_a = string(obj, &["termA", "bahasaA"]).unwrap_or_default();
    let term_b = string(obj, &["termB", "bahasaB"]).unwrap_or_default();
    if term_a.trim().is_empty() && term_b.trim().is_empty() {
        log::warn!("Loaded word without terms: {:?}", obj.get("id"));
    }

    let ease_factor = obj
        .get("easeFactor")
        .and_then(Value::as_f64)
        .filter(|ef| ef.is_finite())
        .map(|ef| ef.max(MIN_EASE_FACTOR))
        .unwrap_or(INITIAL_EASE_FACTOR);

    Some(WordRecord {
        id: string(obj, &["id"]).unwrap_or_else(|| new_id("word")),
        term_a,
        term_b,
        term_b_alternatives: array(obj, &["termBAlternatives", "bahasaBAlternatives"])
            .iter()
            .filter_map(|alt| alt.as_str().map(str::to_string))
            .collect(),
        repetition: count(obj, "repetition"),
        interval: count(obj, "interval"),
        ease_factor,
        next_review_date: obj.get("nextReviewDate").and_then(millis),
        history: array(obj, &["history"])
            .iter()
            .filter_map(sanitize_history_entry)
            .collect(),
        created_at: rfc3339(obj, "createdAt").unwrap_or_else(Utc::now),
    })
}

/// Entries without a readable time or outcome carry no information and are
/// dropped. Older entries only had `{date, status}`; their after-values
/// default to the initial SRS state.
fn sanitize_history_entry(value: &Value) -> Option<HistoryEntry> {
    let obj = value.as_object()?;
    let timestamp = ["timestamp", "date"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(millis))?;
    let outcome = ["outcome", "status"].iter().find_map(|key| {
        obj.get(*key)
            .and_then(|v| HistoryStatus::deserialize(v).ok())
    })?;

    Some(HistoryEntry {
        timestamp,
        outcome,
        interval_after: count(obj, "intervalAfter"),
        repetition_after: count(obj, "repetitionAfter"),
        ease_factor_after: obj
            .get("easeFactorAfter")
            .and_then(Value::as_f64)
            .unwrap_or(INITIAL_EASE_FACTOR),
    })
}

fn sanitize_project(value: &Value) -> Option<PracticeProject> {
    let obj = value.as_object()?;
    Some(PracticeProject {
        id: string(obj, &["id"]).unwrap_or_else(|| new_id("project")),
        name: string(obj, &["name"]).unwrap_or_else(|| "Untitled project".to_string()),
        set_ids: array(obj, &["setIds"])
            .iter()
            .filter_map(|id| id.as_str().map(str::to_string))
            .collect(),
        created_at: rfc3339(obj, "createdAt").unwrap_or_else(Utc::now),
    })
}

fn sanitize_review_word(value: &Value) -> Option<ReviewWord> {
    let obj = value.as_object()?;
    Some(ReviewWord {
        word_id: string(obj, &["wordId"])?,
        incorrect_count: count(obj, "incorrectCount").max(1),
        last_incorrect_at: rfc3339(obj, "lastIncorrectAt").unwrap_or_else(Utc::now),
    })
}

fn array<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-negative integer field; floats are rounded, anything else is 0.
fn count(obj: &Map<String, Value>, key: &str) -> u32 {
    obj.get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.round().min(f64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

fn millis(value: &Value) -> Option<DateTime<Utc>> {
    let ms = value.as_f64().filter(|n| n.is_finite())?;
    Utc.timestamp_millis_opt(ms as i64).single()
}

fn rfc3339(obj: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let raw = obj.get(key)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
