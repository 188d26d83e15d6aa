//! # Store Audit
//!
//! Offline consistency report over a whole store. Write-time validation
//! guards each record as it changes; the audit catches what drifted since:
//! profiles edited after places were written, records imported around the
//! engine, region groups deleted out from under auto-assign tables.
//!
//! ## Profile checks
//!
//! - `enabled_levels` includes `country`; city-like levels are enabled.
//! - Auto-assign keys are unique case-insensitively and every target region
//!   group exists in the country.
//! - `by_place_id` / `by_admin1_place_id` keys are places of the country
//!   (admin1 for the latter); `by_slug` / `by_admin1_slug` keys match a
//!   place slug in the country (admin1 for the latter).
//! - A profiled country without region groups is a warning.
//!
//! ## Graph checks, per place
//!
//! Type containment, parent presence and legality, country propagation,
//! acyclicity within the depth bound, region existence, and uniqueness of
//! `place_id` and per-country slug.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atlas_core::{CountryCode, PlaceId, PlaceType, StoreError};
use atlas_profile::{merge_layers, CountryProfile, CountryProfileResolver, ProfileError};

use crate::config::EngineConfig;
use crate::linker::RelationLinker;
use crate::model::Place;
use crate::store::{MemoryStore, PlaceStore};

/// The rule an audit finding violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditCheck {
    ProfileLevels,
    DuplicateAutoAssignKey,
    AutoAssignRegionMissing,
    AutoAssignTargetMissing,
    NoRegionGroups,
    ProfileLink,
    TypeContainment,
    ParentMissing,
    ParentLegality,
    CountryPropagation,
    Acyclicity,
    RegionExistence,
    Uniqueness,
}

/// One audit finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub check: AuditCheck,
    /// The record the finding is about, e.g. `country_profile #3 (TR)`.
    pub subject: String,
    pub message: String,
}

impl std::fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCounts {
    pub country_profiles: usize,
    pub region_groups: usize,
    pub atlas_places: usize,
}

/// Result of [`audit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// `true` when there are no errors. Warnings do not fail the audit.
    pub ok: bool,
    pub checked_at: DateTime<Utc>,
    pub counts: AuditCounts,
    pub errors: Vec<AuditFinding>,
    pub warnings: Vec<AuditFinding>,
}

#[derive(Default)]
struct Findings {
    errors: Vec<AuditFinding>,
    warnings: Vec<AuditFinding>,
}

impl Findings {
    fn error(&mut self, check: AuditCheck, subject: &str, message: impl Into<String>) {
        self.errors.push(AuditFinding {
            check,
            subject: subject.to_string(),
            message: message.into(),
        });
    }

    fn warning(&mut self, check: AuditCheck, subject: &str, message: impl Into<String>) {
        self.warnings.push(AuditFinding {
            check,
            subject: subject.to_string(),
            message: message.into(),
        });
    }
}

/// Audit every profile and place in `store`.
pub fn audit(store: &MemoryStore, config: &EngineConfig) -> Result<AuditReport, StoreError> {
    let mut findings = Findings::default();

    for profile in store.profiles() {
        audit_profile(store, profile, &mut findings)?;
    }
    for place in store.places() {
        audit_place(store, config, place, &mut findings)?;
    }
    audit_uniqueness(store, &mut findings);

    let counts = AuditCounts {
        country_profiles: store.profiles().count(),
        region_groups: store.region_groups().count(),
        atlas_places: store.places().count(),
    };
    tracing::info!(
        errors = findings.errors.len(),
        warnings = findings.warnings.len(),
        places = counts.atlas_places,
        "store audit finished"
    );
    Ok(AuditReport {
        ok: findings.errors.is_empty(),
        checked_at: Utc::now(),
        counts,
        errors: findings.errors,
        warnings: findings.warnings,
    })
}

fn audit_profile(
    store: &MemoryStore,
    profile: &CountryProfile,
    findings: &mut Findings,
) -> Result<(), StoreError> {
    let country = &profile.country_code;
    let subject = format!("country_profile {} ({country})", profile.id);
    let policy = &profile.policy;

    if !policy.enabled_levels.contains(&PlaceType::Country) {
        findings.error(AuditCheck::ProfileLevels, &subject, "enabled_levels must include country");
    }
    for level in &policy.city_like_levels {
        if !policy.enabled_levels.contains(level) {
            findings.error(
                AuditCheck::ProfileLevels,
                &subject,
                format!("city_like_levels contains {level} which is not in enabled_levels"),
            );
        }
    }

    let country_places: Vec<&Place> = store.places().filter(|p| p.country_code == *country).collect();
    let has_slug = |slug: &str, admin1_only: bool| {
        let wanted = slug.trim().to_ascii_lowercase();
        country_places.iter().any(|p| {
            p.slug.as_ref().is_some_and(|s| s.as_str() == wanted)
                && (!admin1_only || p.place_type == PlaceType::Admin1)
        })
    };

    if let Some(tables) = &policy.region_auto_assign {
        let named = [
            ("by_place_id", &tables.by_place_id),
            ("by_slug", &tables.by_slug),
            ("by_admin1_place_id", &tables.by_admin1_place_id),
            ("by_admin1_slug", &tables.by_admin1_slug),
        ];
        for (name, table) in named {
            let Some(table) = table else { continue };

            let mut seen: BTreeMap<String, &str> = BTreeMap::new();
            for key in table.keys() {
                let folded = key.trim().to_ascii_lowercase();
                if let Some(first) = seen.insert(folded, key.as_str()) {
                    findings.error(
                        AuditCheck::DuplicateAutoAssignKey,
                        &subject,
                        format!("{name}: duplicate key after normalization ({key} vs {first})"),
                    );
                }
            }

            for (key, region) in table {
                if store.region_group(region, country)?.is_none() {
                    findings.error(
                        AuditCheck::AutoAssignRegionMissing,
                        &subject,
                        format!("{name}.{key}: region_group '{region}' does not exist"),
                    );
                }

                let target_problem = match name {
                    "by_place_id" | "by_admin1_place_id" => {
                        place_target_problem(store, key, country, name == "by_admin1_place_id")?
                    }
                    "by_slug" => (!has_slug(key, false)).then(|| "no place found for slug".to_string()),
                    _ => (!has_slug(key, true)).then(|| "admin1 slug not found".to_string()),
                };
                if let Some(problem) = target_problem {
                    findings.error(AuditCheck::AutoAssignTargetMissing, &subject, format!("{name}.{key}: {problem}"));
                }
            }
        }
    }

    if !store.region_groups().any(|g| g.country_code == *country) {
        findings.warning(
            AuditCheck::NoRegionGroups,
            &subject,
            "country has no region_group records (auto-region mappings cannot resolve)",
        );
    }
    Ok(())
}

fn place_target_problem(
    store: &MemoryStore,
    key: &str,
    country: &CountryCode,
    admin1_only: bool,
) -> Result<Option<String>, StoreError> {
    let place = match PlaceId::new(key) {
        Ok(place_id) => store.place_by_place_id(&place_id)?,
        Err(_) => None,
    };
    let Some(place) = place else {
        return Ok(Some("place_id not found".to_string()));
    };
    if place.country_code != *country {
        return Ok(Some(format!("place belongs to {}", place.country_code)));
    }
    if admin1_only && place.place_type != PlaceType::Admin1 {
        return Ok(Some("place_type must be admin1".to_string()));
    }
    Ok(None)
}

fn audit_place(
    store: &MemoryStore,
    config: &EngineConfig,
    place: &Place,
    findings: &mut Findings,
) -> Result<(), StoreError> {
    let subject = format!("place {} ({})", place.place_id, place.id);
    let country = &place.country_code;

    let profile = match CountryProfileResolver::new(store).resolve(country, place.country_profile) {
        Ok(profile) => profile,
        Err(ProfileError::Store(e)) => return Err(e),
        Err(e) => {
            findings.error(AuditCheck::ProfileLink, &subject, e.to_string());
            merge_layers(country, None)
        }
    };

    if !profile.is_level_enabled(place.place_type) {
        findings.error(
            AuditCheck::TypeContainment,
            &subject,
            format!("place_type {} is not enabled for {country}", place.place_type),
        );
    }

    let linker = RelationLinker::new(store);
    let parent = match place.parent_pointer() {
        Some(pointer) => match linker.resolve(&pointer) {
            Ok(Some(parent)) => Some(parent),
            Ok(None) => {
                findings.error(AuditCheck::ParentMissing, &subject, format!("{pointer} does not resolve"));
                None
            }
            Err(crate::WriteError::Store(e)) => return Err(e),
            Err(e) => {
                findings.error(AuditCheck::ParentMissing, &subject, e.to_string());
                None
            }
        },
        None => {
            if config.requires_parent(place.place_type) {
                findings.error(AuditCheck::ParentMissing, &subject, format!("{} requires a parent", place.place_type));
            }
            None
        }
    };

    if let Some(parent) = &parent {
        if !profile.is_parent_allowed(place.place_type, Some(parent.place_type), config.unruled_parent) {
            findings.error(
                AuditCheck::ParentLegality,
                &subject,
                format!("{} cannot be placed under {} ({})", place.place_type, parent.place_type, parent.place_id),
            );
        }
        if parent.country_code != *country {
            findings.error(
                AuditCheck::CountryPropagation,
                &subject,
                format!("parent {} belongs to {}", parent.place_id, parent.country_code),
            );
        }
        if !chain_terminates(store, config, place, parent)? {
            findings.error(
                AuditCheck::Acyclicity,
                &subject,
                format!("parent chain loops or exceeds {} levels", config.max_ancestor_depth),
            );
        }
    }

    if let Some(region) = &place.region {
        if store.region_group(region, country)?.is_none() {
            findings.error(
                AuditCheck::RegionExistence,
                &subject,
                format!("region_group '{region}' does not exist for {country}"),
            );
        }
    }
    Ok(())
}

/// Whether walking up from `parent` ends at a root without revisiting a
/// node or returning to `place`.
fn chain_terminates(
    store: &MemoryStore,
    config: &EngineConfig,
    place: &Place,
    parent: &Place,
) -> Result<bool, StoreError> {
    let linker = RelationLinker::new(store);
    let mut visited = BTreeSet::from([place.id]);
    let mut current = parent.clone();
    for _ in 0..config.max_ancestor_depth {
        if !visited.insert(current.id) {
            return Ok(false);
        }
        let Some(pointer) = current.parent_pointer() else {
            return Ok(true);
        };
        match linker.resolve(&pointer) {
            Ok(Some(next)) => current = next,
            Ok(None) => return Ok(true),
            Err(crate::WriteError::Store(e)) => return Err(e),
            Err(_) => return Ok(true),
        }
    }
    Ok(false)
}

fn audit_uniqueness(store: &MemoryStore, findings: &mut Findings) {
    let mut place_ids: BTreeMap<&PlaceId, &Place> = BTreeMap::new();
    let mut slugs: BTreeMap<(&CountryCode, &str), &Place> = BTreeMap::new();
    for place in store.places() {
        if let Some(first) = place_ids.insert(&place.place_id, place) {
            findings.error(
                AuditCheck::Uniqueness,
                &format!("place {} ({})", place.place_id, place.id),
                format!("place_id also used by {}", first.id),
            );
        }
        if let Some(slug) = &place.slug {
            if let Some(first) = slugs.insert((&place.country_code, slug.as_str()), place) {
                findings.error(
                    AuditCheck::Uniqueness,
                    &format!("place {} ({})", place.place_id, place.id),
                    format!("slug {slug} also used by {}", first.place_id),
                );
            }
        }
    }
}
