use crate::desc::split_description;
use crate::error::SourceLoadError;
use camino::Utf8Path;
use fs_err as fs;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One binary package record, as stored in `binpackages.json`.
///
/// Unknown fields are ignored and every list field may be absent.
#[derive(Debug, Clone, Deserialize)]
struct BinPackageRecord {
    package: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    architecture: Vec<String>,
    #[serde(default)]
    pre_depends: Vec<String>,
    #[serde(default)]
    depends: Vec<String>,
    #[serde(default)]
    recommends: Vec<String>,
    #[serde(default)]
    suggests: Vec<String>,
    #[serde(default)]
    enhances: Vec<String>,
    #[serde(default)]
    distribution: Vec<String>,
}

/// A cooked binary package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinPackage {
    pub name: String,
    pub version: String,
    pub source: String,
    /// Section without its archive area prefix (`contrib/libs` -> `libs`).
    pub section: String,
    pub short_description: String,
    pub long_description: String,
    pub architectures: Vec<String>,
    pub pre_depends: Vec<String>,
    pub depends: Vec<String>,
    pub recommends: Vec<String>,
    pub suggests: Vec<String>,
    pub enhances: Vec<String>,
    pub distribution: Vec<String>,
}

impl BinPackage {
    pub fn is_arch_all(&self) -> bool {
        self.architectures.iter().any(|a| a == "all")
    }

    /// Pre-depends followed by depends.
    pub fn hard_dependencies(&self) -> impl Iterator<Item = &str> {
        self.pre_depends
            .iter()
            .chain(self.depends.iter())
            .map(String::as_str)
    }
}

impl BinPackageRecord {
    /// Records without a description are not real packages and yield `None`.
    fn cook(self) -> Option<BinPackage> {
        let description = self.description?;
        let (short_description, long_description) = split_description(&description);
        let source = self
            .source
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.package.clone());
        let section = self
            .section
            .as_deref()
            .and_then(|s| s.rsplit('/').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown")
            .to_string();
        Some(BinPackage {
            name: self.package,
            version: self.version,
            source,
            section,
            short_description,
            long_description,
            architectures: self.architecture,
            pre_depends: self.pre_depends,
            depends: self.depends,
            recommends: self.recommends,
            suggests: self.suggests,
            enhances: self.enhances,
            distribution: self.distribution,
        })
    }
}

/// Binary package information indexed by name and by section.
#[derive(Debug, Clone, Default)]
pub struct BinPackages {
    by_name: BTreeMap<String, BinPackage>,
    by_section: BTreeMap<String, Vec<BinPackage>>,
}

impl BinPackages {
    pub fn load(path: &Utf8Path) -> Result<Self, SourceLoadError> {
        info!(path = %path, "loading binary packages");
        let contents = fs::read_to_string(path).map_err(|e| SourceLoadError::io(path, e))?;
        let records: Vec<BinPackageRecord> =
            serde_json::from_str(&contents).map_err(|e| SourceLoadError::json(path, e))?;
        let total = records.len();
        let pkgs = Self::from_packages(records.into_iter().filter_map(BinPackageRecord::cook));
        debug!(
            loaded = pkgs.len(),
            skipped = total - pkgs.len(),
            "binary packages without a description are skipped"
        );
        Ok(pkgs)
    }

    pub fn from_packages(pkgs: impl IntoIterator<Item = BinPackage>) -> Self {
        let mut res = Self::default();
        for pkg in pkgs {
            res.by_section
                .entry(pkg.section.clone())
                .or_default()
                .push(pkg.clone());
            res.by_name.insert(pkg.name.clone(), pkg);
        }
        res
    }

    pub fn get(&self, name: &str) -> Option<&BinPackage> {
        self.by_name.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BinPackage> {
        self.by_name.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Packages of `section`, in load order.
    pub fn in_section(&self, section: &str) -> &[BinPackage] {
        self.by_section.get(section).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
