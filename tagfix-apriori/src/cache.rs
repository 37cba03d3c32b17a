use crate::error::AprioriError;
use crate::runner::Apriori;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tagfix_types::{Rule, TagDatabase, tags_to_facets};
use tracing::{debug, info};

/// Mined rules kept between runs.
///
/// `t` holds tag rules, `f` holds facet rules mined over the facet projection of the corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleCache {
    #[serde(default)]
    pub t: Vec<Rule>,
    #[serde(default)]
    pub f: Vec<Rule>,
}

impl RuleCache {
    /// Load a cache file. A missing file is not an error.
    pub fn load(path: &Utf8Path) -> Result<Option<Self>, AprioriError> {
        if !path.exists() {
            debug!(path = %path, "rule cache not found");
            return Ok(None);
        }
        let contents = fs::read_to_string(path).map_err(|e| cache_err(path, e))?;
        let cache: Self = serde_json::from_str(&contents).map_err(|e| cache_err(path, e))?;
        Ok(Some(cache))
    }

    /// Write the cache as JSON through a temporary file in the same directory.
    pub fn save(&self, path: &Utf8Path) -> Result<(), AprioriError> {
        let dir = match path.parent() {
            Some(p) if !p.as_str().is_empty() => p,
            _ => Utf8Path::new("."),
        };
        let json = serde_json::to_vec_pretty(self).map_err(|e| cache_err(path, e))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| cache_err(path, e))?;
        tmp.write_all(&json).map_err(|e| cache_err(path, e))?;
        tmp.as_file().sync_all().map_err(|e| cache_err(path, e))?;
        tmp.persist(path).map_err(|e| cache_err(path, e.error))?;
        Ok(())
    }
}

fn cache_err(path: &Utf8Path, e: impl std::fmt::Display) -> AprioriError {
    AprioriError::Cache {
        path: Utf8PathBuf::from(path),
        message: e.to_string(),
    }
}

/// Mine tag rules and facet rules from `db`.
pub fn mine_rule_cache(apriori: &Apriori, db: &TagDatabase) -> Result<RuleCache, AprioriError> {
    let t = apriori.run(db)?;

    let mut facets = TagDatabase::new();
    for (pkg, tags) in db.iter_packages_tags() {
        facets.insert(pkg, tags_to_facets(tags));
    }
    let f = apriori.run(&facets)?;

    info!(tag_rules = t.len(), facet_rules = f.len(), "mined rule cache");
    Ok(RuleCache { t, f })
}
