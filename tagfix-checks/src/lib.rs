//! Consistency checks over a package's resolved tag set.
//!
//! Checks are pure functions of a [`TagSet`](tagfix_types::TagSet). They are collected in an
//! explicit [`CheckRegistry`] built once at startup, and run through a [`CheckEngine`] that can
//! also turn violations back into a [`PatchSet`](tagfix_types::PatchSet) of suggested fixes.

mod check;
mod checks;
mod engine;
mod registry;
mod report;

pub use check::{Check, CheckMeta, Level, Violation, ViolationData};
pub use checks::builtin_checks;
pub use engine::CheckEngine;
pub use registry::{CheckRegistry, RegistryError};
pub use report::{CheckCount, CheckReport, ReportRunInfo, ReportToolInfo, ViolationRecord};
