//! # Translation Records
//!
//! The language-state collaborator owns translation completeness. Atlas only
//! reads the records it produces: a language tag, a completion status and
//! the localized slug.

use serde::{Deserialize, Serialize};

/// Canonical language assumed when neither the candidate nor the stored
/// record names one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Completion status assigned by the language-state collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    /// No translation exists yet.
    #[default]
    Missing,
    /// Translation started but not signed off.
    Draft,
    /// Translation is complete and may back public URLs.
    Complete,
}

/// One per-language translation of a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Language tag (e.g. `en`, `de`, `zh-cn`).
    pub language: String,
    /// Completion status.
    #[serde(default)]
    pub status: TranslationStatus,
    /// Localized slug, if the translator supplied one.
    #[serde(default)]
    pub slug: Option<String>,
}

impl TranslationRecord {
    /// Whether this record is complete and carries a non-blank slug.
    pub fn is_complete_with_slug(&self) -> bool {
        self.status == TranslationStatus::Complete
            && self.slug.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}
