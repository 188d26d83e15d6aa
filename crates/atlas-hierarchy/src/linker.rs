//! # Relation Linker
//!
//! Resolves human-readable references to stored records. Every reference is
//! re-read from the store; nothing the client claims about a relation is
//! trusted.
//!
//! Parent precedence, first present wins:
//!
//! 1. candidate `parent_place_id`
//! 2. candidate `parent` reference
//! 3. the stored record's parent relation
//! 4. the stored record's `parent_place_id`
//!
//! Explicit references (1, 2) that do not resolve fail the write. Stale
//! stored references (3, 4) are logged and skipped.

use std::collections::BTreeSet;

use atlas_core::{PlaceId, RecordId};

use crate::error::WriteError;
use crate::model::{ParentRef, Place, PlaceWrite};
use crate::store::PlaceStore;

/// Resolves parent and region-group relations against a [`PlaceStore`].
pub struct RelationLinker<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: PlaceStore + ?Sized> RelationLinker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolve the parent of a write.
    ///
    /// # Errors
    ///
    /// [`WriteError::ParentNotFound`] when an explicit reference does not
    /// match a stored place, or a [`ParentRef::Resolved`] pair no longer
    /// agrees with the store.
    pub fn link_parent(
        &self,
        candidate: &PlaceWrite,
        existing: Option<&Place>,
    ) -> Result<Option<Place>, WriteError> {
        if let Some(raw) = candidate.parent_place_id.as_deref().filter(|s| !s.trim().is_empty()) {
            let place_id = PlaceId::new(raw)?;
            return self
                .resolve(&ParentRef::ByPlaceId(place_id))?
                .map(Some)
                .ok_or_else(|| WriteError::ParentNotFound {
                    reference: format!("parent_place_id ({})", raw.trim()),
                });
        }

        if let Some(reference) = &candidate.parent {
            return self
                .resolve(reference)?
                .map(Some)
                .ok_or_else(|| WriteError::ParentNotFound {
                    reference: reference.to_string(),
                });
        }

        let Some(existing) = existing else {
            return Ok(None);
        };
        if let Some(id) = existing.parent {
            if let Some(parent) = self.store.place_by_id(id)? {
                return Ok(Some(parent));
            }
            tracing::warn!(
                place_id = %existing.place_id,
                parent = %id,
                "stored parent relation is dangling"
            );
        }
        if let Some(place_id) = &existing.parent_place_id {
            if let Some(parent) = self.store.place_by_place_id(place_id)? {
                return Ok(Some(parent));
            }
            tracing::warn!(
                place_id = %existing.place_id,
                parent_place_id = %place_id,
                "stored parent_place_id is dangling"
            );
        }
        Ok(None)
    }

    /// Look up the place a reference names, or `None`.
    pub fn resolve(&self, reference: &ParentRef) -> Result<Option<Place>, WriteError> {
        let found = match reference {
            ParentRef::ById(id) => self.store.place_by_id(*id)?,
            ParentRef::ByPlaceId(place_id) => self.store.place_by_place_id(place_id)?,
            ParentRef::Resolved { id, place_id } => self
                .store
                .place_by_id(*id)?
                .filter(|p| p.place_id == *place_id),
        };
        Ok(found)
    }

    /// Merge incoming region-group ids and the derived group into the
    /// existing memberships.
    ///
    /// # Errors
    ///
    /// [`WriteError::RegionGroupNotFound`] for an incoming id with no stored
    /// group.
    pub fn link_region_groups(
        &self,
        existing: &BTreeSet<RecordId>,
        incoming: &[RecordId],
        derived: Option<RecordId>,
    ) -> Result<BTreeSet<RecordId>, WriteError> {
        for id in incoming {
            if self.store.region_group_by_id(*id)?.is_none() {
                return Err(WriteError::RegionGroupNotFound(*id));
            }
        }
        Ok(union_region_groups(existing, incoming, derived))
    }
}

/// Additive union of region-group memberships. Memberships are never
/// removed, and duplicates collapse by id.
pub fn union_region_groups(
    existing: &BTreeSet<RecordId>,
    incoming: &[RecordId],
    derived: Option<RecordId>,
) -> BTreeSet<RecordId> {
    existing
        .iter()
        .chain(incoming)
        .chain(derived.as_ref())
        .copied()
        .collect()
}
