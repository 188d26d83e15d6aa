//! # Region Group Normalization
//!
//! Normalizes a region-group record on create or update and links it to
//! its country's profile.

use serde::{Deserialize, Serialize};

use atlas_core::{CountryCode, RecordId, RegionKey};
use atlas_profile::{CountryProfile, ProfileError};

use crate::error::WriteError;
use crate::model::RegionGroup;
use crate::store::PlaceStore;

/// A region group as submitted for create or update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionGroupDraft {
    pub region_key: Option<String>,
    pub country_code: Option<String>,
    pub country_profile: Option<RecordId>,
}

/// Normalize a region group to store under `id`.
///
/// The owning profile is the draft's explicit profile, else the one the
/// stored record links, else the profile stored for the country. Having no
/// profile at all is fine.
///
/// # Errors
///
/// - [`WriteError::MissingField`] / [`WriteError::Invalid`] for a missing or
///   malformed key or country code.
/// - [`ProfileError::CountryConflict`] (wrapped) when the owning profile
///   belongs to another country.
/// - [`WriteError::DuplicateRegionKey`] when another group in the country
///   already uses the key.
pub fn normalize_region_group<S: PlaceStore + ?Sized>(
    store: &S,
    id: RecordId,
    draft: &RegionGroupDraft,
    existing: Option<&RegionGroup>,
) -> Result<RegionGroup, WriteError> {
    let region_key = match draft.region_key.as_deref() {
        Some(raw) => RegionKey::new(raw)?,
        None => existing
            .map(|g| g.region_key.clone())
            .ok_or(WriteError::MissingField("region_key"))?,
    };
    let country_code = match draft.country_code.as_deref() {
        Some(raw) => CountryCode::new(raw)?,
        None => existing
            .map(|g| g.country_code.clone())
            .ok_or(WriteError::MissingField("country_code"))?,
    };

    let profile = owning_profile(store, draft, existing, &country_code)?;
    if let Some(profile) = &profile {
        if profile.country_code != country_code {
            return Err(ProfileError::CountryConflict {
                profile_id: profile.id,
                profile_country: profile.country_code.clone(),
                requested: country_code,
            }
            .into());
        }
    }

    if let Some(holder) = store.region_group(&region_key, &country_code)? {
        if holder.id != id {
            return Err(WriteError::DuplicateRegionKey {
                region_key,
                country: country_code,
                holder: holder.id,
            });
        }
    }

    tracing::debug!(
        region_group = %id,
        region_key = %region_key,
        country = %country_code,
        "normalized region group"
    );
    Ok(RegionGroup {
        id,
        region_key,
        country_code,
        country_profile: profile.map(|p| p.id),
    })
}

fn owning_profile<S: PlaceStore + ?Sized>(
    store: &S,
    draft: &RegionGroupDraft,
    existing: Option<&RegionGroup>,
    country: &CountryCode,
) -> Result<Option<CountryProfile>, WriteError> {
    let linked = [draft.country_profile, existing.and_then(|g| g.country_profile)];
    for id in linked.into_iter().flatten() {
        if let Some(profile) = store.profile_by_id(id)? {
            return Ok(Some(profile));
        }
        tracing::warn!(profile_id = %id, "linked country profile not found");
    }
    Ok(store.profile_by_country(country)?)
}
