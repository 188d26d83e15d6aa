//! # Place Write Engine
//!
//! Entry point for place writes. [`PlaceWriteEngine::on_create`] and
//! [`PlaceWriteEngine::on_update`] run the full pipeline and return the
//! record to persist, or the first failure. The engine performs reads only;
//! persisting the result is the caller's job.

use atlas_core::{RecordId, Slug};
use atlas_profile::CountryProfileResolver;

use crate::config::EngineConfig;
use crate::error::WriteError;
use crate::linker::RelationLinker;
use crate::model::{NormalizedPlace, Place, PlaceWrite};
use crate::region::{effective_override, RegionAssignmentResolver, RegionInput};
use crate::slug::SlugIdentityGuard;
use crate::store::PlaceStore;
use crate::validator::{HierarchyValidator, PlaceIdentity};

/// Runs place writes against a [`PlaceStore`].
pub struct PlaceWriteEngine<'a, S: ?Sized> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: PlaceStore + ?Sized> PlaceWriteEngine<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Validate and normalize a new place.
    pub fn on_create(&self, candidate: &PlaceWrite) -> Result<NormalizedPlace, WriteError> {
        self.write(candidate, None)
    }

    /// Validate and normalize an update of a stored place. Fields absent
    /// from `candidate` keep their stored values.
    pub fn on_update(&self, candidate: &PlaceWrite, existing: &Place) -> Result<NormalizedPlace, WriteError> {
        self.write(candidate, Some(existing))
    }

    fn write(&self, candidate: &PlaceWrite, existing: Option<&Place>) -> Result<NormalizedPlace, WriteError> {
        let self_id = existing.map(|p| p.id);
        let guard = SlugIdentityGuard::new(&self.config.default_language);
        if let Some(existing) = existing {
            guard.enforce_place_id(candidate, existing)?;
        }

        let identity = PlaceIdentity::resolve(candidate, existing)?;
        // A stored link only carries over while the country stays the same.
        let inherited = existing
            .filter(|p| p.country_code == identity.country_code)
            .and_then(|p| p.country_profile);
        if inherited.is_none() {
            if let Some(stale) = existing.and_then(|p| p.country_profile) {
                tracing::debug!(
                    place_id = %identity.place_id,
                    profile_id = %stale,
                    country = %identity.country_code,
                    "country changed; dropping stored profile link"
                );
            }
        }
        let explicit_profile = candidate.country_profile.or(inherited);
        let profile = CountryProfileResolver::new(self.store).resolve(&identity.country_code, explicit_profile)?;

        let validator = HierarchyValidator::new(self.store, self.config);
        validator.check_self_parent(&identity, self_id, candidate)?;
        let linker = RelationLinker::new(self.store);
        let parent = linker.link_parent(candidate, existing)?;
        let validated = validator.validate(identity, self_id, candidate, existing, parent, &profile)?;

        let slug = guard.enforce_slug(candidate, existing)?;
        let region_override = effective_override(candidate.region_override.as_deref(), existing);
        let region = RegionAssignmentResolver::new(self.store, self.config).resolve(
            RegionInput {
                place_id: &validated.identity.place_id,
                place_type: validated.identity.place_type,
                country_code: &validated.identity.country_code,
                slug: slug.as_ref(),
                region_override: region_override.as_ref(),
                parent: validated.parent.as_ref(),
            },
            &profile,
        )?;

        let region_groups = linker.link_region_groups(
            &existing.map(|p| p.region_groups.clone()).unwrap_or_default(),
            candidate.region_groups.as_deref().unwrap_or_default(),
            region.group,
        )?;

        self.check_unique(&validated.identity, slug.as_ref(), self_id)?;

        let identity = validated.identity;
        tracing::debug!(
            place_id = %identity.place_id,
            place_type = %identity.place_type,
            country = %identity.country_code,
            update = existing.is_some(),
            "place write accepted"
        );

        Ok(NormalizedPlace {
            parent: validated.parent.as_ref().map(|p| p.id),
            parent_place_id: validated.parent.map(|p| p.place_id),
            place_id: identity.place_id,
            place_type: identity.place_type,
            country_code: identity.country_code,
            slug,
            region_override,
            region: region.key,
            region_source: region.source,
            lat: validated.lat,
            lng: validated.lng,
            latitude: validated.lat,
            longitude: validated.lng,
            country_profile: profile.profile_id,
            region_groups,
            canonical_language: candidate
                .canonical_language
                .clone()
                .or(existing.and_then(|p| p.canonical_language.clone())),
            translations: candidate
                .translations
                .clone()
                .or(existing.map(|p| p.translations.clone()))
                .unwrap_or_default(),
        })
    }

    fn check_unique(
        &self,
        identity: &PlaceIdentity,
        slug: Option<&Slug>,
        self_id: Option<RecordId>,
    ) -> Result<(), WriteError> {
        if let Some(holder) = self.store.place_by_place_id(&identity.place_id)? {
            if Some(holder.id) != self_id {
                return Err(WriteError::DuplicatePlaceId {
                    place_id: identity.place_id.clone(),
                    holder: holder.id,
                });
            }
        }
        if let Some(slug) = slug {
            if let Some(holder) = self.store.place_by_slug(&identity.country_code, slug)? {
                if Some(holder.id) != self_id {
                    return Err(WriteError::DuplicateSlug {
                        slug: slug.clone(),
                        country: identity.country_code.clone(),
                        holder: holder.id,
                    });
                }
            }
        }
        Ok(())
    }
}
