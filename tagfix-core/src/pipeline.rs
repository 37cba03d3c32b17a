//! Core pipelines, extracted from the CLI.
//!
//! Sources come in through [`SourcePort`] and database output goes out through
//! [`WritePort`]; everything else is read from the paths in the settings.

use crate::ports::{SourcePort, WritePort};
use crate::settings::{AutotagSettings, CheckSettings, MineSettings};
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use fs_err as fs;
use std::collections::BTreeSet;
use tagfix_apriori::{Apriori, RuleCache, mine_rule_cache, read_mining_corpus};
use tagfix_checks::{CheckEngine, CheckRegistry, CheckReport, ReportRunInfo, ReportToolInfo, Violation};
use tagfix_domain::RuleEngine;
use tagfix_sources::SourceSet;
use tagfix_types::{PatchSet, TagDatabase};
use tracing::{debug, info, warn};

/// Error type for pipeline results. Exit code 2 = violations found, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{count} violation(s) found")]
    Violations { count: u64 },
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Violations { .. } => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of [`run_autotag`].
#[derive(Debug)]
pub struct AutotagOutcome {
    pub patches: PatchSet,
    /// Producers that ran, in pipeline order.
    pub producers: Vec<&'static str>,
}

/// Run every producer whose sources are available and merge their proposals.
pub fn run_autotag(
    settings: &AutotagSettings,
    sources_port: &dyn SourcePort,
) -> Result<AutotagOutcome, ToolError> {
    let sources = sources_port.load_sources()?;

    let tag_rules = match &settings.rule_cache {
        Some(path) => RuleCache::load(path)
            .with_context(|| format!("load rule cache {}", path))?
            .map(|cache| cache.t)
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let whitelist = match &settings.whitelist {
        Some(path) => read_package_list(path)?,
        None => default_whitelist(&sources),
    };
    debug!(packages = whitelist.len(), "package whitelist");

    let engine = RuleEngine::new(&sources, &tag_rules);
    let producers = engine.producer_names();
    let mut patches = engine.make_patches(&whitelist);

    if settings.simplify {
        match &sources.stable_tags {
            Some(stable) => {
                let known = if settings.restrict_to_vocabulary {
                    sources.vocabulary.as_ref().map(|v| v.tag_set())
                } else {
                    None
                };
                let before = patches.len();
                patches = patches.simplify(stable, known.as_ref());
                debug!(before, after = patches.len(), "simplified against stable tags");
            }
            None => warn!("no stable tags available, proposals left unsimplified"),
        }
    }

    info!(
        producers = producers.len(),
        packages = patches.len(),
        "autotag finished"
    );
    Ok(AutotagOutcome { patches, producers })
}

/// Packages to consider when no whitelist file is given: every binary package, or the
/// packages of the stable snapshot when binary package metadata is missing.
fn default_whitelist(sources: &SourceSet) -> BTreeSet<String> {
    if let Some(bin) = &sources.binpackages {
        return bin.names().map(str::to_string).collect();
    }
    if let Some(stable) = &sources.stable_tags {
        return stable.packages().map(str::to_string).collect();
    }
    warn!("neither binary packages nor stable tags available, nothing to tag");
    BTreeSet::new()
}

/// One package name per line; blank lines and `#` comments are skipped.
pub fn read_package_list(path: &Utf8Path) -> anyhow::Result<BTreeSet<String>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read package list {}", path))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Outcome of [`run_check`].
#[derive(Debug)]
pub struct CheckOutcome {
    pub report: CheckReport,
    pub violations: Vec<Violation>,
    /// Every suggested fix, as a patch set that can be applied to the checked database.
    pub fixes: PatchSet,
}

impl CheckOutcome {
    /// `Err(Violations)` when failing on violations is requested and check-level violations exist.
    pub fn verdict(&self, settings: &CheckSettings) -> Result<(), ToolError> {
        let count = self.report.failures();
        if settings.fail_on_violations && count > 0 {
            return Err(ToolError::Violations { count });
        }
        Ok(())
    }
}

/// Check every package of the tag database, optionally after applying a patch.
pub fn run_check(
    settings: &CheckSettings,
    registry: &CheckRegistry,
    tool: ReportToolInfo,
) -> Result<CheckOutcome, ToolError> {
    let started_at = Utc::now();

    let mut db = load_database(&settings.tags)?;
    if let Some(patch_path) = &settings.patch {
        let patches = load_patches(patch_path)?;
        debug!(packages = patches.len(), "applying patch before checking");
        patches.apply_to(&mut db);
    }

    let engine = CheckEngine::new(registry);
    let violations = engine.check_database(&db);
    let fixes = engine.fixes(&violations);

    let run = ReportRunInfo {
        started_at,
        ended_at: Utc::now(),
    };
    let report = CheckReport::new(tool, run, &engine, db.package_count() as u64, &violations);
    info!(
        packages = db.package_count(),
        violations = violations.len(),
        failures = report.failures(),
        "check finished"
    );

    Ok(CheckOutcome {
        report,
        violations,
        fixes,
    })
}

/// Drop the entries of a patch file that the tag database already satisfies.
pub fn run_simplify(patch: &Utf8Path, tags: &Utf8Path) -> Result<PatchSet, ToolError> {
    let patches = load_patches(patch)?;
    let db = load_database(tags)?;
    let simplified = patches.simplify(&db, None);
    debug!(before = patches.len(), after = simplified.len(), "simplified patch file");
    Ok(simplified)
}

/// The patch set that turns the effect of `from` into the effect of `to`.
pub fn run_diff(from: &Utf8Path, to: &Utf8Path) -> Result<PatchSet, ToolError> {
    let from = load_patches(from)?;
    let to = load_patches(to)?;
    Ok(from.diff(&to))
}

/// Apply a patch file to a tag database and write the result to `out`.
pub fn run_apply(
    patch: &Utf8Path,
    tags: &Utf8Path,
    out: &Utf8Path,
    write: &dyn WritePort,
) -> Result<TagDatabase, ToolError> {
    let patches = load_patches(patch)?;
    let mut db = load_database(tags)?;
    patches.apply_to(&mut db);
    write
        .write_file(out, db.to_string().as_bytes())
        .with_context(|| format!("write tag database {}", out))?;
    info!(packages = patches.len(), out = %out, "applied patch");
    Ok(db)
}

/// Mine tag and facet rules from the corpus and save them as the rule cache.
pub fn run_mine(settings: &MineSettings) -> Result<RuleCache, ToolError> {
    let corpus = read_mining_corpus(&settings.tags)
        .with_context(|| format!("read mining corpus {}", settings.tags))?;
    let apriori = Apriori::new(settings.apriori.clone());
    let cache = mine_rule_cache(&apriori, &corpus).context("mine association rules")?;
    cache
        .save(&settings.cache)
        .with_context(|| format!("save rule cache {}", settings.cache))?;
    Ok(cache)
}

fn load_patches(path: &Utf8Path) -> anyhow::Result<PatchSet> {
    PatchSet::load(path).with_context(|| format!("read patch file {}", path))
}

fn load_database(path: &Utf8Path) -> anyhow::Result<TagDatabase> {
    TagDatabase::load(path).with_context(|| format!("read tag database {}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySourcePort;
    use camino::Utf8PathBuf;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingWritePort {
        writes: RefCell<Vec<(Utf8PathBuf, String)>>,
    }

    impl WritePort for RecordingWritePort {
        fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
            self.writes.borrow_mut().push((
                path.to_path_buf(),
                String::from_utf8_lossy(contents).into_owned(),
            ));
            Ok(())
        }
    }

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let td = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
        (td, root)
    }

    fn tool() -> ReportToolInfo {
        ReportToolInfo {
            name: "tagfix".to_string(),
            version: "0.0.0".to_string(),
        }
    }

    #[test]
    fn exit_codes() {
        assert_eq!(ToolError::Violations { count: 3 }.exit_code(), 2);
        assert_eq!(ToolError::Internal(anyhow::anyhow!("boom")).exit_code(), 1);
    }

    #[test]
    fn autotag_with_no_sources_is_empty() {
        let outcome =
            run_autotag(&AutotagSettings::default(), &InMemorySourcePort::default()).unwrap();
        assert!(outcome.patches.is_empty());
        assert!(outcome.producers.is_empty());
    }

    #[test]
    fn autotag_simplifies_against_stable_tags() {
        let stable = TagDatabase::parse_str("linux-image-6.1: admin::kernel\n").unwrap();
        let binpackages = tagfix_sources::BinPackages::from_packages([tagfix_sources::BinPackage {
            name: "linux-image-6.1".to_string(),
            version: "6.1".to_string(),
            source: "linux".to_string(),
            section: "admin".to_string(),
            short_description: "Linux kernel".to_string(),
            ..Default::default()
        }]);
        let sources = SourceSet::default()
            .with_binpackages(binpackages)
            .with_stable_tags(stable);
        let port = InMemorySourcePort::new(sources);

        let outcome = run_autotag(&AutotagSettings::default(), &port).unwrap();
        assert_eq!(outcome.patches.to_string(), "linux-image-6.1: +implemented-in::c\n");

        let raw = AutotagSettings {
            simplify: false,
            ..AutotagSettings::default()
        };
        let outcome = run_autotag(&raw, &port).unwrap();
        assert_eq!(
            outcome.patches.to_string(),
            "linux-image-6.1: +admin::kernel, +implemented-in::c\n"
        );
    }

    #[test]
    fn package_list_skips_comments_and_blanks() {
        let (_td, root) = temp_root();
        let path = root.join("whitelist");
        fs::write(&path, "# header\nfoo\n\n  bar  \n").unwrap();
        let list = read_package_list(&path).unwrap();
        assert_eq!(list.into_iter().collect::<Vec<_>>(), vec!["bar", "foo"]);
    }

    #[test]
    fn missing_whitelist_file_is_a_tool_error() {
        let settings = AutotagSettings {
            whitelist: Some(Utf8PathBuf::from("/nonexistent/whitelist")),
            ..AutotagSettings::default()
        };
        let err = run_autotag(&settings, &InMemorySourcePort::default()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("/nonexistent/whitelist"));
    }

    #[test]
    fn check_applies_patch_and_reports_fixes() {
        let (_td, root) = temp_root();
        let tags = root.join("tags");
        let patch = root.join("patch");
        fs::write(&tags, "libfoo1: role::shared-lib, admin::kernel\n").unwrap();
        fs::write(&patch, "libfoo-dev: +role::devel-lib\n").unwrap();

        let settings = CheckSettings {
            tags,
            patch: Some(patch),
            fail_on_violations: true,
        };
        let registry = CheckRegistry::builtin().unwrap();
        let outcome = run_check(&settings, &registry, tool()).unwrap();

        assert_eq!(outcome.report.packages_checked, 2);
        assert!(outcome.fixes.contains("libfoo1"));
        assert!(outcome.fixes.contains("libfoo-dev"));
        assert!(matches!(
            outcome.verdict(&settings),
            Err(ToolError::Violations { .. })
        ));

        let lenient = CheckSettings {
            fail_on_violations: false,
            ..settings
        };
        assert!(outcome.verdict(&lenient).is_ok());
    }

    #[test]
    fn diff_then_apply_reaches_the_target() {
        let (_td, root) = temp_root();
        let old = root.join("old");
        let new = root.join("new");
        fs::write(&old, "foo: +a, -b\nbar: +c\n").unwrap();
        fs::write(&new, "foo: +a, +d\nbaz: -e\n").unwrap();

        let delta = run_diff(&old, &new).unwrap();
        let mut combined = PatchSet::load(&old).unwrap();
        combined.merge_set(&delta);

        let mut via_delta = TagDatabase::parse_str("foo: b\nbar: x\nbaz: e\n").unwrap();
        combined.apply_to(&mut via_delta);
        let mut direct = TagDatabase::parse_str("foo: b\nbar: x\nbaz: e\n").unwrap();
        PatchSet::load(&new).unwrap().apply_to(&mut direct);
        assert_eq!(via_delta, direct);
    }

    #[test]
    fn simplify_drops_satisfied_entries() {
        let (_td, root) = temp_root();
        let patch = root.join("patch");
        let tags = root.join("tags");
        fs::write(&patch, "foo: +a, -b\nbar: +c\n").unwrap();
        fs::write(&tags, "foo: a\nbar: d\n").unwrap();
        assert_eq!(run_simplify(&patch, &tags).unwrap().to_string(), "bar: +c\n");
    }

    #[test]
    fn apply_writes_through_the_port() {
        let (_td, root) = temp_root();
        let patch = root.join("patch");
        let tags = root.join("tags");
        fs::write(&patch, "foo: +b, -a\n").unwrap();
        fs::write(&tags, "foo: a\n").unwrap();

        let port = RecordingWritePort::default();
        let out = root.join("out");
        let db = run_apply(&patch, &tags, &out, &port).unwrap();
        assert_eq!(db.to_string(), "foo: b\n");
        assert_eq!(port.writes.borrow().clone(), vec![(out, "foo: b\n".to_string())]);
    }

    #[test]
    fn bad_patch_file_names_the_path() {
        let (_td, root) = temp_root();
        let patch = root.join("patch");
        fs::write(&patch, "not a patch line\n").unwrap();
        let err = run_diff(&patch, &patch).unwrap_err();
        assert!(err.to_string().contains(patch.as_str()));
    }
}
