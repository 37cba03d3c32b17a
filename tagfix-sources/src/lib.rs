//! Metadata source ingestion.
//!
//! tagfix reads a handful of named, read-only data files from one directory. Any of them may
//! be missing for a given run: a missing file simply means the source is unavailable, and rule
//! producers that need it are skipped. A file that is present but unreadable is an error.

mod binpackages;
mod desc;
mod error;
mod popcon;
mod set;
mod srcpackages;
mod vocabulary;

pub use binpackages::{BinPackage, BinPackages};
pub use desc::split_description;
pub use error::SourceLoadError;
pub use popcon::Popcon;
pub use set::{SourceKind, SourceSet};
pub use srcpackages::{Maintainer, SrcPackage, SrcPackages};
pub use vocabulary::{FacetInfo, TagInfo, Vocabulary};
