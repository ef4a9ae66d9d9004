//! Spaced repetition scheduling for a personal vocabulary trainer.
//!
//! - [`srs`] updates a word's memory parameters after each answer
//! - [`classify`] buckets words into new / learning / due / mastered / forgotten
//! - [`queue`] selects and orders the words of a practice session
//! - [`store`] owns the collections and is the only place words are mutated
//! - [`api`] exposes all of the above over HTTP

pub mod api;
pub mod app;
pub mod classify;
pub mod config;
pub mod feedback;
pub mod models;
pub mod persistence;
pub mod practice;
pub mod queue;
pub mod review_list;
pub mod srs;
pub mod stats;
pub mod store;

pub use classify::{Category, CategoryCounts, SrsFilter};
pub use models::{Collection, NewWord, PracticeProject, ReviewOutcome, WordRecord};
pub use store::{StoreError, VocabularyStore};
