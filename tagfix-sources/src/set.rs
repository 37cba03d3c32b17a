use crate::binpackages::BinPackages;
use crate::error::SourceLoadError;
use crate::popcon::Popcon;
use crate::srcpackages::SrcPackages;
use crate::vocabulary::Vocabulary;
use camino::Utf8Path;
use std::fmt;
use tagfix_types::TagDatabase;
use tracing::debug;

/// The named metadata sources a rule producer can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    BinPackages,
    SrcPackages,
    Vocabulary,
    Popcon,
    StableTags,
    UnstableTags,
}

impl SourceKind {
    pub const ALL: [SourceKind; 6] = [
        SourceKind::BinPackages,
        SourceKind::SrcPackages,
        SourceKind::Vocabulary,
        SourceKind::Popcon,
        SourceKind::StableTags,
        SourceKind::UnstableTags,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SourceKind::BinPackages => "binpackages",
            SourceKind::SrcPackages => "srcpackages",
            SourceKind::Vocabulary => "vocabulary",
            SourceKind::Popcon => "popcon",
            SourceKind::StableTags => "stabletags",
            SourceKind::UnstableTags => "unstabletags",
        }
    }

    /// File name inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SourceKind::BinPackages => "binpackages.json",
            SourceKind::SrcPackages => "srcpackages.json",
            SourceKind::Vocabulary => "vocabulary.json",
            SourceKind::Popcon => "popcon",
            SourceKind::StableTags => "tags-stable",
            SourceKind::UnstableTags => "tags-unstable",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All metadata sources available for a run. Each one is optional.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    pub binpackages: Option<BinPackages>,
    pub srcpackages: Option<SrcPackages>,
    pub vocabulary: Option<Vocabulary>,
    pub popcon: Option<Popcon>,
    pub stable_tags: Option<TagDatabase>,
    pub unstable_tags: Option<TagDatabase>,
}

impl SourceSet {
    /// Load every source whose file exists in `data_dir`.
    pub fn load(data_dir: &Utf8Path) -> Result<Self, SourceLoadError> {
        let mut set = Self::default();
        for kind in SourceKind::ALL {
            let path = data_dir.join(kind.file_name());
            if !path.exists() {
                debug!(source = %kind, path = %path, "source not available");
                continue;
            }
            match kind {
                SourceKind::BinPackages => set.binpackages = Some(BinPackages::load(&path)?),
                SourceKind::SrcPackages => set.srcpackages = Some(SrcPackages::load(&path)?),
                SourceKind::Vocabulary => set.vocabulary = Some(Vocabulary::load(&path)?),
                SourceKind::Popcon => set.popcon = Some(Popcon::load(&path)?),
                SourceKind::StableTags => set.stable_tags = Some(load_tags(&path)?),
                SourceKind::UnstableTags => set.unstable_tags = Some(load_tags(&path)?),
            }
        }
        Ok(set)
    }

    pub fn has(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::BinPackages => self.binpackages.is_some(),
            SourceKind::SrcPackages => self.srcpackages.is_some(),
            SourceKind::Vocabulary => self.vocabulary.is_some(),
            SourceKind::Popcon => self.popcon.is_some(),
            SourceKind::StableTags => self.stable_tags.is_some(),
            SourceKind::UnstableTags => self.unstable_tags.is_some(),
        }
    }

    pub fn available(&self) -> Vec<SourceKind> {
        SourceKind::ALL.into_iter().filter(|k| self.has(*k)).collect()
    }

    /// The sources in `needs` that are not available.
    pub fn missing(&self, needs: &[SourceKind]) -> Vec<SourceKind> {
        needs.iter().copied().filter(|k| !self.has(*k)).collect()
    }

    pub fn with_binpackages(mut self, src: BinPackages) -> Self {
        self.binpackages = Some(src);
        self
    }

    pub fn with_srcpackages(mut self, src: SrcPackages) -> Self {
        self.srcpackages = Some(src);
        self
    }

    pub fn with_vocabulary(mut self, src: Vocabulary) -> Self {
        self.vocabulary = Some(src);
        self
    }

    pub fn with_popcon(mut self, src: Popcon) -> Self {
        self.popcon = Some(src);
        self
    }

    pub fn with_stable_tags(mut self, db: TagDatabase) -> Self {
        self.stable_tags = Some(db);
        self
    }

    pub fn with_unstable_tags(mut self, db: TagDatabase) -> Self {
        self.unstable_tags = Some(db);
        self
    }
}

fn load_tags(path: &Utf8Path) -> Result<TagDatabase, SourceLoadError> {
    tracing::info!(path = %path, "loading tag database");
    TagDatabase::load(path).map_err(|source| SourceLoadError::TagDatabase {
        path: path.to_path_buf(),
        source,
    })
}
