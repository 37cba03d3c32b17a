//! Port traits abstracting I/O away from the pipelines.

use camino::Utf8Path;
use tagfix_sources::SourceSet;

/// Source of package metadata for a run.
pub trait SourcePort {
    fn load_sources(&self) -> anyhow::Result<SourceSet>;
}

/// File-system writes. Implementations create missing parent directories.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
}
