//! # atlas-profile: Country-Profile Policy Engine
//!
//! Encodes the structural rules of the gazetteer as layered, per-country
//! policy documents:
//!
//! - **Defaults** (`defaults.rs`): the compiled-in baseline every country
//!   starts from; all levels enabled, the generic parent-rule table,
//!   English labels, and the default city-like levels.
//!
//! - **Built-in tables** (`builtin/`): compiled-in overrides for countries
//!   with well-known administrative structures (TR, US, DE).
//!
//! - **Stored records** (`document.rs`): administrator-maintained
//!   `CountryProfile` records, the most specific layer.
//!
//! - **Resolver** (`resolver.rs`): merges the three layers into an
//!   [`EffectiveProfile`] on every write. Nothing is cached, because defaults
//!   can change independently of stored records.
//!
//! - **Normalizer** (`normalize.rs`): validates profile records when an
//!   administrator writes them.
//!
//! ## Merge Semantics
//!
//! Later layers extend, never replace: level sets and parent rules are
//! unions, labels are overridden per key, and each region auto-assign table
//! is taken whole from the most specific layer that supplies it.
//!
//! ## Crate Policy
//!
//! - Depends only on `atlas-core` internally.
//! - Store access goes through the [`ProfileSource`] trait.

pub mod builtin;
pub mod defaults;
pub mod document;
pub mod effective;
pub mod error;
pub mod normalize;
pub mod resolver;

pub use document::{CountryProfile, ProfileOverlay, RegionAutoAssign, RegionAutoAssignOverlay};
pub use effective::{EffectiveProfile, ProfileLayer, UnruledParentPolicy};
pub use error::ProfileError;
pub use normalize::{normalize_profile, ProfileDraft, RawAutoAssign};
pub use resolver::{merge_layers, CountryProfileResolver, ProfileSource};
