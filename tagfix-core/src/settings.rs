//! Clap-free settings for the pipelines.

use camino::Utf8PathBuf;
use tagfix_apriori::AprioriConfig;

/// Settings for the autotag pipeline.
#[derive(Debug, Clone)]
pub struct AutotagSettings {
    /// Association rule cache; a missing file disables the rule producer.
    pub rule_cache: Option<Utf8PathBuf>,
    /// File with one package name per line. Default: every known binary package.
    pub whitelist: Option<Utf8PathBuf>,
    /// Drop proposals the stable tags already satisfy.
    pub simplify: bool,
    /// When simplifying, also drop tags unknown to the vocabulary.
    pub restrict_to_vocabulary: bool,
}

impl Default for AutotagSettings {
    fn default() -> Self {
        Self {
            rule_cache: None,
            whitelist: None,
            simplify: true,
            restrict_to_vocabulary: false,
        }
    }
}

/// Settings for the check pipeline.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    /// Tag database to check.
    pub tags: Utf8PathBuf,
    /// Patch applied to the database before checking.
    pub patch: Option<Utf8PathBuf>,
    /// Report check-level violations as a failed run.
    pub fail_on_violations: bool,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            tags: Utf8PathBuf::from("data/tags-stable"),
            patch: None,
            fail_on_violations: false,
        }
    }
}

/// Settings for refreshing the rule cache.
#[derive(Debug, Clone)]
pub struct MineSettings {
    /// Tag database used as the mining corpus.
    pub tags: Utf8PathBuf,
    pub cache: Utf8PathBuf,
    pub apriori: AprioriConfig,
}

impl Default for MineSettings {
    fn default() -> Self {
        Self {
            tags: Utf8PathBuf::from("data/tags-stable"),
            cache: Utf8PathBuf::from("data/rules.json"),
            apriori: AprioriConfig::default(),
        }
    }
}
