//! Configuration file loading for tagfix.
//!
//! Discovers and loads `tagfix.toml` from the working directory.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tagfix_apriori::AprioriConfig;
use tagfix_core::settings::{AutotagSettings, CheckSettings, MineSettings};
use tagfix_sources::SourceKind;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "tagfix.toml";

/// Rule cache file name inside the data directory, used when none is configured.
pub const DEFAULT_RULE_CACHE: &str = "rules.json";

/// Top-level configuration from tagfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagfixConfig {
    pub sources: SourcesConfig,
    pub apriori: AprioriSection,
    pub autotag: AutotagConfig,
    pub check: CheckConfig,
}

/// Sources section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Directory holding the metadata source files.
    pub data_dir: Utf8PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            data_dir: Utf8PathBuf::from("data"),
        }
    }
}

/// Apriori section: the miner invocation plus where its rules are cached.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AprioriSection {
    #[serde(flatten)]
    pub miner: AprioriConfig,

    /// Rule cache path (default: `<data_dir>/rules.json`).
    pub cache: Option<Utf8PathBuf>,
}

/// Autotag section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutotagConfig {
    /// File listing the packages to propose tags for, one per line.
    pub whitelist: Option<Utf8PathBuf>,

    /// Drop proposals the stable tags already satisfy.
    pub simplify: bool,

    /// When simplifying, also drop tags missing from the vocabulary.
    pub restrict_to_vocabulary: bool,
}

impl Default for AutotagConfig {
    fn default() -> Self {
        Self {
            whitelist: None,
            simplify: true,
            restrict_to_vocabulary: false,
        }
    }
}

/// Check section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Exit with code 2 when check-level violations are found.
    pub fail_on_violations: bool,
}

/// Discover the tagfix.toml config file in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a tagfix.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<TagfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<TagfixConfig> {
    let config: TagfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load the explicit config file if given, else discover one in `dir`, else defaults.
pub fn load_or_default(explicit: Option<&Utf8Path>, dir: &Utf8Path) -> anyhow::Result<TagfixConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(TagfixConfig::default()),
    }
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: TagfixConfig,
}

impl ConfigMerger {
    pub fn new(config: TagfixConfig) -> Self {
        Self { config }
    }

    /// Replace the configured data directory when the CLI gives one.
    pub fn with_data_dir(mut self, cli_data_dir: Option<Utf8PathBuf>) -> Self {
        if let Some(dir) = cli_data_dir {
            self.config.sources.data_dir = dir;
        }
        self
    }

    pub fn data_dir(&self) -> &Utf8Path {
        &self.config.sources.data_dir
    }

    /// Path of a source file inside the data directory.
    pub fn source_path(&self, kind: SourceKind) -> Utf8PathBuf {
        self.data_dir().join(kind.file_name())
    }

    pub fn rule_cache(&self, cli_cache: Option<Utf8PathBuf>) -> Utf8PathBuf {
        cli_cache
            .or_else(|| self.config.apriori.cache.clone())
            .unwrap_or_else(|| self.data_dir().join(DEFAULT_RULE_CACHE))
    }

    /// Merge with autotag command CLI arguments.
    ///
    /// `--no-simplify` wins over the config file; `--whitelist` replaces the configured file.
    pub fn merge_autotag_args(
        &self,
        cli_rule_cache: Option<Utf8PathBuf>,
        cli_whitelist: Option<Utf8PathBuf>,
        no_simplify: bool,
    ) -> AutotagSettings {
        AutotagSettings {
            rule_cache: Some(self.rule_cache(cli_rule_cache)),
            whitelist: cli_whitelist.or_else(|| self.config.autotag.whitelist.clone()),
            simplify: self.config.autotag.simplify && !no_simplify,
            restrict_to_vocabulary: self.config.autotag.restrict_to_vocabulary,
        }
    }

    /// Merge with check command CLI arguments.
    ///
    /// `--fail-on-violations` overrides the config file when set.
    pub fn merge_check_args(
        &self,
        cli_tags: Option<Utf8PathBuf>,
        cli_patch: Option<Utf8PathBuf>,
        cli_fail_on_violations: bool,
    ) -> CheckSettings {
        CheckSettings {
            tags: cli_tags.unwrap_or_else(|| self.source_path(SourceKind::StableTags)),
            patch: cli_patch,
            fail_on_violations: cli_fail_on_violations || self.config.check.fail_on_violations,
        }
    }

    /// Merge with mine-rules command CLI arguments.
    pub fn merge_mine_args(&self, args: MineOverrides) -> MineSettings {
        let mut apriori = self.config.apriori.miner.clone();
        if let Some(program) = args.program {
            apriori.program = program;
        }
        if let Some(preset) = args.preset {
            apriori.preset = preset;
        }
        if let Some(threshold) = args.card_threshold {
            apriori.card_threshold = threshold;
        }
        apriori.quiet = apriori.quiet || args.quiet;

        MineSettings {
            tags: args
                .tags
                .unwrap_or_else(|| self.source_path(SourceKind::StableTags)),
            cache: self.rule_cache(args.cache),
            apriori,
        }
    }
}

/// CLI values for `mine-rules` that override the `[apriori]` section.
#[derive(Debug, Clone, Default)]
pub struct MineOverrides {
    pub tags: Option<Utf8PathBuf>,
    pub cache: Option<Utf8PathBuf>,
    pub program: Option<Utf8PathBuf>,
    pub preset: Option<tagfix_apriori::MiningPreset>,
    pub card_threshold: Option<usize>,
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tagfix_apriori::MiningPreset;
    use tempfile::TempDir;

    #[test]
    fn test_parse_example_config() {
        let contents = r#"
[sources]
data_dir = "/srv/tags"

[apriori]
program = "/usr/bin/apriori"
quiet = true
card_threshold = 10
preset = "negative-association"
cache = "/var/cache/tagfix/rules.json"

[autotag]
whitelist = "packages.txt"
simplify = false

[check]
fail_on_violations = true
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(config.sources.data_dir, "/srv/tags");
        assert_eq!(config.apriori.miner.program, "/usr/bin/apriori");
        assert!(config.apriori.miner.quiet);
        assert_eq!(config.apriori.miner.card_threshold, 10);
        assert_eq!(config.apriori.miner.preset, MiningPreset::NegativeAssociation);
        assert_eq!(
            config.apriori.cache.as_deref(),
            Some(Utf8Path::new("/var/cache/tagfix/rules.json"))
        );
        assert_eq!(
            config.autotag.whitelist.as_deref(),
            Some(Utf8Path::new("packages.txt"))
        );
        assert!(!config.autotag.simplify);
        assert!(config.check.fail_on_violations);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.sources.data_dir, "data");
        assert_eq!(config.apriori.miner, AprioriConfig::default());
        assert!(config.apriori.cache.is_none());
        assert!(config.autotag.simplify);
        assert!(!config.check.fail_on_violations);
    }

    #[test]
    fn test_parse_rejects_bad_preset() {
        let err = parse_config("[apriori]\npreset = \"fastest\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid TOML"));
    }

    #[test]
    fn test_paths_follow_data_dir_override() {
        let merger = ConfigMerger::new(TagfixConfig::default())
            .with_data_dir(Some(Utf8PathBuf::from("/tmp/d")));
        assert_eq!(merger.source_path(SourceKind::StableTags), "/tmp/d/tags-stable");
        assert_eq!(merger.rule_cache(None), "/tmp/d/rules.json");
        assert_eq!(merger.rule_cache(Some("x.json".into())), "x.json");
    }

    #[test]
    fn test_merge_autotag_args_cli_overrides() {
        let config = TagfixConfig {
            autotag: AutotagConfig {
                whitelist: Some("from-config".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let merger = ConfigMerger::new(config);

        let settings = merger.merge_autotag_args(None, None, false);
        assert_eq!(settings.whitelist.as_deref(), Some(Utf8Path::new("from-config")));
        assert!(settings.simplify);

        let settings = merger.merge_autotag_args(None, Some("from-cli".into()), true);
        assert_eq!(settings.whitelist.as_deref(), Some(Utf8Path::new("from-cli")));
        assert!(!settings.simplify);
    }

    #[test]
    fn test_merge_check_args_config_used_when_cli_false() {
        let config = TagfixConfig {
            check: CheckConfig {
                fail_on_violations: true,
            },
            ..Default::default()
        };
        let settings = ConfigMerger::new(config).merge_check_args(None, None, false);
        assert!(settings.fail_on_violations);
        assert_eq!(settings.tags, "data/tags-stable");
    }

    #[test]
    fn test_merge_mine_args() {
        let merger = ConfigMerger::new(TagfixConfig::default());
        let settings = merger.merge_mine_args(MineOverrides {
            program: Some("/opt/apriori".into()),
            preset: Some(MiningPreset::NegativeAssociation),
            quiet: true,
            ..Default::default()
        });
        assert_eq!(settings.apriori.program, "/opt/apriori");
        assert_eq!(settings.apriori.preset, MiningPreset::NegativeAssociation);
        assert!(settings.apriori.quiet);
        assert_eq!(settings.apriori.card_threshold, 30);
        assert_eq!(settings.cache, "data/rules.json");
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
    }

    #[test]
    fn test_load_or_default_prefers_explicit_path() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let explicit = root.join("other.toml");
        std::fs::write(&explicit, "[sources]\ndata_dir = \"elsewhere\"\n").expect("write config");

        let cfg = load_or_default(Some(&explicit), &root).expect("load explicit");
        assert_eq!(cfg.sources.data_dir, "elsewhere");

        let cfg = load_or_default(None, &root).expect("load default");
        assert_eq!(cfg.sources.data_dir, "data");
    }
}
