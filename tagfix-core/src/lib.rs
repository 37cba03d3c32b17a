//! Embeddable core library for tagfix.
//!
//! Provides clap-free entry points over the patch algebra, the autotag engine and the check
//! engine, suitable for linking into another host process.
//!
//! # Port traits
//!
//! I/O that a host may want to replace sits behind the traits in [`ports`]:
//! - [`SourcePort`](ports::SourcePort) loads the metadata sources
//! - [`WritePort`](ports::WritePort) writes output files
//!
//! The [`adapters`] module provides filesystem-backed and in-memory implementations.
//!
//! # Entry points
//!
//! - [`run_autotag`](pipeline::run_autotag) proposes tag changes
//! - [`run_check`](pipeline::run_check) checks a tag database and builds a report
//! - [`run_simplify`](pipeline::run_simplify), [`run_diff`](pipeline::run_diff) and
//!   [`run_apply`](pipeline::run_apply) work on patch files
//! - [`run_mine`](pipeline::run_mine) refreshes the association rule cache

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pipeline::ToolError;

// Re-export the building blocks so embedders don't need every crate directly.
pub use tagfix_checks::{CheckRegistry, CheckReport};
pub use tagfix_sources::SourceSet;
pub use tagfix_types::{Patch, PatchSet, TagDatabase};
