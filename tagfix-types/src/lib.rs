//! Shared types for the tagfix workspace.
//!
//! # Design constraints
//! - `Patch` and `PatchSet` are the only way a `TagDatabase` is mutated, so the forward
//!   (package -> tags) and reverse (tag -> packages) indexes never drift apart.
//! - Every collection is ordered (`BTreeMap`/`BTreeSet`) so iteration, merging and the
//!   text formats are deterministic across runs.
//! - The patch-file writer output is a persisted format: keep it byte-stable.

pub mod db;
pub mod error;
pub mod patch;
pub mod patchset;
pub mod rule;
pub mod tag;

pub use db::TagDatabase;
pub use error::{DatabaseParseError, PatchParseError};
pub use patch::Patch;
pub use patchset::PatchSet;
pub use rule::Rule;
pub use tag::{Tag, TagSet, tag_set, tags_to_facets};

/// Schema identifiers.
pub mod schema {
    pub const TAGFIX_CHECK_V1: &str = "tagfix.check.v1";
}
