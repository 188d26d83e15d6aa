//! # atlas-hierarchy: Place Hierarchy Validation
//!
//! Enforces the structural invariants of the place graph on every write.
//! A write runs as a pipeline of stages, each taking immutable inputs and
//! returning a typed result; any failure aborts the write with no partial
//! effect.
//!
//! ```text
//! PlaceWrite ─▶ identity ─▶ CountryProfileResolver ─▶ RelationLinker (parent)
//!            ─▶ HierarchyValidator ─▶ SlugIdentityGuard
//!            ─▶ RegionAssignmentResolver ─▶ RelationLinker (region groups)
//!            ─▶ uniqueness reads ─▶ NormalizedPlace
//! ```
//!
//! ## Modules
//!
//! - **Model** (`model.rs`): stored records and write candidates.
//! - **Store** (`store.rs`): the [`PlaceStore`] port and the snapshot-backed
//!   [`MemoryStore`].
//! - **Linker** (`linker.rs`): parent and region-group relation resolution.
//! - **Validator** (`validator.rs`): type, parent, country, cycle and
//!   coordinate checks.
//! - **Region** (`region.rs`): region-key derivation and the region-group
//!   existence gate.
//! - **Slug** (`slug.rs`): write-once `place_id` and slug.
//! - **Lifecycle** (`lifecycle.rs`): [`PlaceWriteEngine`], the entry point.
//! - **Region groups** (`region_group.rs`): region-group write normalization.
//! - **Audit** (`audit.rs`): offline consistency report over a snapshot.
//!
//! ## Crate Policy
//!
//! - Store access goes through [`PlaceStore`]; nothing here owns persistence.
//! - Purely synchronous. Ancestor walks are bounded by
//!   [`EngineConfig::max_ancestor_depth`].

pub mod audit;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod linker;
pub mod model;
pub mod region;
pub mod region_group;
pub mod slug;
pub mod store;
pub mod validator;

pub use audit::{audit, AuditCheck, AuditCounts, AuditFinding, AuditReport};
pub use config::{ConfigError, EngineConfig};
pub use error::WriteError;
pub use lifecycle::PlaceWriteEngine;
pub use linker::{union_region_groups, RelationLinker};
pub use model::{NormalizedPlace, ParentRef, Place, PlaceWrite, RawCoordinate, RegionGroup};
pub use region::{RegionAssignment, RegionAssignmentResolver, RegionSource};
pub use region_group::{normalize_region_group, RegionGroupDraft};
pub use slug::SlugIdentityGuard;
pub use store::{MemoryStore, PlaceStore, Snapshot};
pub use validator::{HierarchyValidator, PlaceIdentity, ValidatedPlace};
