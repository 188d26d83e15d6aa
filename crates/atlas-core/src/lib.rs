//! # atlas-core: Foundational Types for the Atlas Gazetteer
//!
//! This crate is the leaf of the Atlas workspace. It defines the type-system
//! primitives every other crate builds on; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Single `PlaceType` enum.** One definition, 11 variants, exhaustive
//!    `match` everywhere. Adding a level forces every consumer (profile
//!    defaults, validators, audits) to handle it at compile time.
//!
//! 2. **Newtype wrappers for identifiers.** `CountryCode`, `PlaceId`, `Slug`,
//!    `RegionKey` and `RecordId` are distinct types with validating
//!    constructors. No bare strings cross a crate boundary.
//!
//! 3. **One error-kind vocabulary.** Every crate-level error maps to an
//!    [`ErrorKind`] so callers can branch on failures without parsing
//!    messages.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `atlas-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod language;
pub mod place_type;
pub mod text;

pub use error::{ErrorKind, StoreError, ValidationError};
pub use identity::{CountryCode, PlaceId, RecordId, RegionKey, Slug};
pub use language::{TranslationRecord, TranslationStatus, DEFAULT_LANGUAGE};
pub use place_type::{PlaceType, PLACE_TYPE_COUNT};
pub use text::normalize_slug;
