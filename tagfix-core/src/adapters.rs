//! Default filesystem-backed port implementations.

use crate::ports::{SourcePort, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::io::Write;
use tagfix_sources::SourceSet;

/// Loads every source present in a data directory.
#[derive(Debug, Clone)]
pub struct FsSourcePort {
    pub data_dir: Utf8PathBuf,
}

impl FsSourcePort {
    pub fn new(data_dir: Utf8PathBuf) -> Self {
        Self { data_dir }
    }
}

impl SourcePort for FsSourcePort {
    fn load_sources(&self) -> anyhow::Result<SourceSet> {
        SourceSet::load(&self.data_dir)
            .with_context(|| format!("load sources from {}", self.data_dir))
    }
}

/// Pre-built sources for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemorySourcePort {
    sources: SourceSet,
}

impl InMemorySourcePort {
    pub fn new(sources: SourceSet) -> Self {
        Self { sources }
    }
}

impl SourcePort for InMemorySourcePort {
    fn load_sources(&self) -> anyhow::Result<SourceSet> {
        Ok(self.sources.clone())
    }
}

/// Filesystem writes. Files are replaced atomically through a sibling temporary file.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_str().is_empty() => p,
            _ => Utf8Path::new("."),
        };
        fs::create_dir_all(dir).with_context(|| format!("create parent dir for {}", path))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("create temporary file for {}", path))?;
        tmp.write_all(contents)
            .with_context(|| format!("write {}", path))?;
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("sync {}", path))?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("rename into {}", path))?;
        Ok(())
    }
}
