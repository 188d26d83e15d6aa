//! # Slug and place_id Identity
//!
//! `place_id` and `slug` are write-once. A record without a slug gets one
//! from its canonical-language translation once that translation is
//! complete.

use atlas_core::{Slug, TranslationRecord};

use crate::error::WriteError;
use crate::model::{Place, PlaceWrite};

/// Enforces write-once identifiers and derives canonical slugs.
#[derive(Debug, Clone)]
pub struct SlugIdentityGuard<'a> {
    default_language: &'a str,
}

impl<'a> SlugIdentityGuard<'a> {
    pub fn new(default_language: &'a str) -> Self {
        Self { default_language }
    }

    /// Reject an update that changes a stored `place_id`.
    pub fn enforce_place_id(&self, candidate: &PlaceWrite, existing: &Place) -> Result<(), WriteError> {
        match candidate.place_id.as_deref().map(str::trim) {
            Some(attempted) if !attempted.is_empty() && attempted != existing.place_id.as_str() => {
                Err(WriteError::PlaceIdImmutable {
                    stored: existing.place_id.clone(),
                    attempted: attempted.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// The slug the record will carry after this write.
    ///
    /// A stored slug is kept, and any different incoming slug is rejected.
    /// Without a stored slug, the incoming slug is used, else one derived
    /// from the canonical-language translation.
    pub fn enforce_slug(
        &self,
        candidate: &PlaceWrite,
        existing: Option<&Place>,
    ) -> Result<Option<Slug>, WriteError> {
        let incoming = candidate.slug.as_deref().and_then(Slug::normalize);

        if let Some(stored) = existing.and_then(|p| p.slug.as_ref()) {
            return match incoming {
                Some(attempted) if attempted != *stored => Err(WriteError::SlugImmutable {
                    stored: stored.clone(),
                    attempted,
                }),
                _ => Ok(Some(stored.clone())),
            };
        }

        Ok(incoming.or_else(|| self.canonical_slug(candidate, existing)))
    }

    /// Slug of the complete canonical-language translation, if any.
    pub fn canonical_slug(&self, candidate: &PlaceWrite, existing: Option<&Place>) -> Option<Slug> {
        let language = candidate
            .canonical_language
            .as_deref()
            .or(existing.and_then(|p| p.canonical_language.as_deref()))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.default_language);
        let translations: &[TranslationRecord] = match &candidate.translations {
            Some(list) => list,
            None => existing.map(|p| p.translations.as_slice()).unwrap_or_default(),
        };

        translations
            .iter()
            .find(|t| t.language == language)
            .filter(|t| t.is_complete_with_slug())
            .and_then(|t| t.slug.as_deref())
            .and_then(Slug::normalize)
    }
}
