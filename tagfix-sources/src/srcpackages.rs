use crate::error::SourceLoadError;
use camino::Utf8Path;
use fs_err as fs;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Maintainer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// One source package, as stored in `srcpackages.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SrcPackage {
    #[serde(rename = "package")]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub maintainer: Maintainer,
    #[serde(default)]
    pub uploaders: Vec<Maintainer>,
    #[serde(default)]
    pub build_depends: Vec<String>,
    #[serde(default)]
    pub build_depends_indep: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SrcPackages {
    by_name: BTreeMap<String, SrcPackage>,
}

impl SrcPackages {
    pub fn load(path: &Utf8Path) -> Result<Self, SourceLoadError> {
        info!(path = %path, "loading source packages");
        let contents = fs::read_to_string(path).map_err(|e| SourceLoadError::io(path, e))?;
        let records: Vec<SrcPackage> =
            serde_json::from_str(&contents).map_err(|e| SourceLoadError::json(path, e))?;
        Ok(Self::from_packages(records))
    }

    pub fn from_packages(pkgs: impl IntoIterator<Item = SrcPackage>) -> Self {
        Self {
            by_name: pkgs.into_iter().map(|p| (p.name.clone(), p)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SrcPackage> {
        self.by_name.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SrcPackage> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
