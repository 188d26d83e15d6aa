//! # Hierarchy Validator
//!
//! Structural checks for one place write, run against the country's
//! effective profile. The validator reads ancestors from the store but
//! never writes.
//!
//! ## Checks, in order
//!
//! 1. Type legality: the type is enabled for the country.
//! 2. Self-parent: the place is not its own parent.
//! 3. Root rule: `country` has no parent; configured types must have one.
//! 4. Parent type: the parent's type is allowed for the child's type.
//! 5. Country consistency: parent and child share a country.
//! 6. Acyclicity: the parent's ancestor chain never reaches the place and
//!    ends within `max_ancestor_depth`.
//! 7. Coordinates: finite numbers, from canonical or legacy field names.

use std::collections::BTreeSet;

use atlas_core::{CountryCode, PlaceId, PlaceType, RecordId};
use atlas_profile::EffectiveProfile;

use crate::config::EngineConfig;
use crate::error::WriteError;
use crate::linker::RelationLinker;
use crate::model::{Place, PlaceWrite, RawCoordinate};
use crate::store::PlaceStore;

/// The identity fields of a write, merged from candidate and stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceIdentity {
    pub place_id: PlaceId,
    pub place_type: PlaceType,
    pub country_code: CountryCode,
}

impl PlaceIdentity {
    /// Take each identity field from the candidate, else the stored record.
    /// Blank candidate strings count as absent.
    ///
    /// # Errors
    ///
    /// [`WriteError::MissingField`] when a field is in neither, and
    /// [`WriteError::Invalid`] for a malformed `place_id` or country code.
    pub fn resolve(candidate: &PlaceWrite, existing: Option<&Place>) -> Result<Self, WriteError> {
        let place_id = match non_blank(candidate.place_id.as_deref()) {
            Some(raw) => PlaceId::new(raw)?,
            None => existing
                .map(|p| p.place_id.clone())
                .ok_or(WriteError::MissingField("place_id"))?,
        };
        let place_type = candidate
            .place_type
            .or(existing.map(|p| p.place_type))
            .ok_or(WriteError::MissingField("place_type"))?;
        let country_code = match non_blank(candidate.country_code.as_deref()) {
            Some(raw) => CountryCode::new(raw)?,
            None => existing
                .map(|p| p.country_code.clone())
                .ok_or(WriteError::MissingField("country_code"))?,
        };
        Ok(Self {
            place_id,
            place_type,
            country_code,
        })
    }
}

/// A write that passed every structural check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPlace {
    pub identity: PlaceIdentity,
    pub parent: Option<Place>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Runs the structural checks against a [`PlaceStore`].
pub struct HierarchyValidator<'a, S: ?Sized> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: PlaceStore + ?Sized> HierarchyValidator<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Reject a write whose raw parent reference names the place itself.
    /// Runs before linking so a self-reference never reaches the store.
    pub fn check_self_parent(
        &self,
        identity: &PlaceIdentity,
        self_id: Option<RecordId>,
        candidate: &PlaceWrite,
    ) -> Result<(), WriteError> {
        let by_place_id = non_blank(candidate.parent_place_id.as_deref())
            .is_some_and(|raw| raw == identity.place_id.as_str());
        let by_ref = candidate.parent.as_ref().is_some_and(|r| {
            r.place_id() == Some(&identity.place_id)
                || (self_id.is_some() && r.record_id() == self_id)
        });
        if by_place_id || by_ref {
            return Err(WriteError::SelfParent {
                place_id: identity.place_id.clone(),
            });
        }
        Ok(())
    }

    /// Run the structural checks.
    pub fn validate(
        &self,
        identity: PlaceIdentity,
        self_id: Option<RecordId>,
        candidate: &PlaceWrite,
        existing: Option<&Place>,
        parent: Option<Place>,
        profile: &EffectiveProfile,
    ) -> Result<ValidatedPlace, WriteError> {
        let place_type = identity.place_type;

        if !profile.is_level_enabled(place_type) {
            return Err(WriteError::LevelDisabled {
                place_type,
                country: identity.country_code.clone(),
            });
        }

        if let Some(parent) = &parent {
            if parent.place_id == identity.place_id || Some(parent.id) == self_id {
                return Err(WriteError::SelfParent {
                    place_id: identity.place_id.clone(),
                });
            }
        }

        match (&parent, place_type.is_root()) {
            (Some(_), true) => {
                return Err(WriteError::CountryCannotHaveParent {
                    place_id: identity.place_id.clone(),
                });
            }
            (None, false) if self.config.requires_parent(place_type) => {
                return Err(WriteError::ParentRequired { place_type });
            }
            _ => {}
        }

        if let Some(parent) = &parent {
            if !profile.is_parent_allowed(place_type, Some(parent.place_type), self.config.unruled_parent) {
                let allowed = profile
                    .allowed_parents(place_type)
                    .map(|set| set.iter().map(PlaceType::as_str).collect::<Vec<_>>().join(", "))
                    .unwrap_or_else(|| "none".to_string());
                return Err(WriteError::ParentTypeNotAllowed {
                    child: place_type,
                    parent: parent.place_type,
                    allowed,
                });
            }

            if parent.country_code != identity.country_code {
                return Err(WriteError::CountryMismatch {
                    parent_country: parent.country_code.clone(),
                    received: identity.country_code.clone(),
                });
            }

            self.check_acyclic(&identity, self_id, parent)?;
        }

        let lat = coordinate(
            "lat",
            candidate.lat.as_ref().or(candidate.latitude.as_ref()),
        )?
        .or(existing.and_then(|p| p.lat));
        let lng = coordinate(
            "lng",
            candidate.lng.as_ref().or(candidate.longitude.as_ref()),
        )?
        .or(existing.and_then(|p| p.lng));

        tracing::debug!(
            place_id = %identity.place_id,
            place_type = %place_type,
            parent = ?parent.as_ref().map(|p| &p.place_id),
            "hierarchy checks passed"
        );

        Ok(ValidatedPlace {
            identity,
            parent,
            lat,
            lng,
        })
    }

    /// Walk up from `parent`, failing if the walk reaches the place being
    /// written, revisits a node, or runs past the depth bound.
    fn check_acyclic(
        &self,
        identity: &PlaceIdentity,
        self_id: Option<RecordId>,
        parent: &Place,
    ) -> Result<(), WriteError> {
        let cycle = || WriteError::CycleDetected {
            place_id: identity.place_id.clone(),
            limit: self.config.max_ancestor_depth,
        };
        let linker = RelationLinker::new(self.store);
        let mut visited = BTreeSet::new();
        let mut current = parent.clone();

        for _ in 0..self.config.max_ancestor_depth {
            if Some(current.id) == self_id || current.place_id == identity.place_id {
                return Err(cycle());
            }
            if !visited.insert(current.id) {
                return Err(cycle());
            }
            let Some(pointer) = current.parent_pointer() else {
                return Ok(());
            };
            match linker.resolve(&pointer)? {
                Some(next) => current = next,
                None => {
                    tracing::warn!(
                        place_id = %current.place_id,
                        pointer = %pointer,
                        "ancestor chain ends at a dangling parent"
                    );
                    return Ok(());
                }
            }
        }
        Err(cycle())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a submitted coordinate. Blank strings are absent.
fn coordinate(field: &'static str, raw: Option<&RawCoordinate>) -> Result<Option<f64>, WriteError> {
    let invalid = |value: String| WriteError::InvalidCoordinate { field, value };
    match raw {
        None => Ok(None),
        Some(RawCoordinate::Number(n)) if n.is_finite() => Ok(Some(*n)),
        Some(RawCoordinate::Number(n)) => Err(invalid(n.to_string())),
        Some(RawCoordinate::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(invalid(text.clone())),
            }
        }
    }
}
