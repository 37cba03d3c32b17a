use crate::db::TagDatabase;
use crate::error::PatchParseError;
use crate::patch::Patch;
use crate::tag::{Tag, TagSet};
use camino::Utf8Path;
use fs_err as fs;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::str::FromStr;
use tracing::debug;

/// package -> Patch. Empty patches are never stored.
///
/// Iteration is sorted by package name, which is also the order used by
/// [`PatchSet::merge_set`] and by the writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSet {
    patches: BTreeMap<String, Patch>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn get(&self, pkg: &str) -> Option<&Patch> {
        self.patches.get(pkg)
    }

    pub fn contains(&self, pkg: &str) -> bool {
        self.patches.contains_key(pkg)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Patch)> {
        self.patches.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge a change into the patch for `pkg`, dropping the entry if it ends up empty.
    pub fn add_entry(
        &mut self,
        pkg: &str,
        added: impl IntoIterator<Item = Tag>,
        removed: impl IntoIterator<Item = Tag>,
    ) {
        let patch = self.patches.entry(pkg.to_string()).or_default();
        patch.merge(added, removed);
        if patch.is_empty() {
            self.patches.remove(pkg);
        }
    }

    /// Store `patch` for `pkg` as-is, replacing any previous entry.
    fn insert_patch(&mut self, pkg: &str, patch: Patch) {
        if patch.is_empty() {
            self.patches.remove(pkg);
        } else {
            self.patches.insert(pkg.to_string(), patch);
        }
    }

    /// Merge `other` on top of this set, package by package in sorted order.
    pub fn merge_set(&mut self, other: &PatchSet) {
        for (pkg, patch) in other.iter() {
            self.add_entry(pkg, patch.added().iter().cloned(), patch.removed().iter().cloned());
        }
    }

    /// Keep only the changes that would alter `db`.
    ///
    /// Packages missing from `db` are dropped: they were removed upstream since the
    /// patch was proposed.
    pub fn simplify(&self, db: &TagDatabase, whitelist: Option<&TagSet>) -> PatchSet {
        let mut res = PatchSet::new();
        for (pkg, patch) in self.iter() {
            let Some(tags) = db.tags_of_package(pkg) else {
                debug!(package = pkg, "dropping patch for package missing from database");
                continue;
            };
            if let Some(reduced) = patch.restrict(tags, whitelist) {
                res.insert_patch(pkg, reduced.into_owned());
            }
        }
        res
    }

    /// The patch set to apply after this one so that the combined effect equals
    /// applying `other` alone.
    pub fn diff(&self, other: &PatchSet) -> PatchSet {
        let mut res = PatchSet::new();
        for (pkg, patch) in self.iter() {
            match other.get(pkg) {
                Some(theirs) => res.insert_patch(pkg, patch.difference(theirs)),
                None => res.insert_patch(pkg, patch.reversed()),
            }
        }
        for (pkg, patch) in other.iter() {
            if !self.contains(pkg) {
                res.insert_patch(pkg, patch.clone());
            }
        }
        res
    }

    /// Apply every entry to `db`.
    pub fn apply_to(&self, db: &mut TagDatabase) {
        for (pkg, patch) in self.iter() {
            db.apply_patch(pkg, patch);
        }
    }

    /// Drop every package not in `allowed`.
    pub fn retain_packages(&mut self, allowed: &BTreeSet<String>) {
        self.patches.retain(|pkg, _| allowed.contains(pkg));
    }

    /// Sorted names of the packages touched by this set.
    pub fn summary_packages(&self) -> Vec<&str> {
        self.patches.keys().map(String::as_str).collect()
    }

    /// Sorted union of all tags added or removed by this set.
    pub fn summary_tags(&self) -> Vec<&Tag> {
        self.patches
            .values()
            .flat_map(|p| p.added().iter().chain(p.removed().iter()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn affects<'a>(&self, pkgs: impl IntoIterator<Item = &'a str>) -> bool {
        pkgs.into_iter().any(|p| self.contains(p))
    }

    /// Parse the `package: -tag, +tag` line format.
    pub fn read(reader: impl BufRead) -> Result<Self, PatchParseError> {
        Self::read_filtered(reader, &TagSet::new())
    }

    /// Parse the line format, silently dropping tags found in `blacklist`.
    ///
    /// Blank lines are skipped, and so are bare package names (`pkg` or `pkg:`) left
    /// behind by older writers for empty patches.
    pub fn read_filtered(reader: impl BufRead, blacklist: &TagSet) -> Result<Self, PatchParseError> {
        let mut res = PatchSet::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((pkg, body)) = line.split_once(": ") else {
                if is_bare_package(line) {
                    continue;
                }
                return Err(PatchParseError::InvalidLine {
                    line_no: idx + 1,
                    line: line.to_string(),
                });
            };
            let mut patch = res.patches.remove(pkg).unwrap_or_default();
            patch
                .merge_text(body, blacklist)
                .map_err(|e| PatchParseError::InvalidLineToken {
                    line_no: idx + 1,
                    source: Box::new(e),
                })?;
            res.insert_patch(pkg, patch);
        }
        Ok(res)
    }

    pub fn parse_str(text: &str) -> Result<Self, PatchParseError> {
        Self::read(text.as_bytes())
    }

    pub fn load(path: &Utf8Path) -> Result<Self, PatchParseError> {
        let file = fs::File::open(path)?;
        Self::read(BufReader::new(file))
    }

    pub fn write(&self, mut out: impl Write) -> std::io::Result<()> {
        for (pkg, patch) in self.iter() {
            writeln!(out, "{pkg}: {patch}")?;
        }
        Ok(())
    }

    /// Write to a temporary file next to `path`, then rename it into place.
    pub fn write_atomically(&self, path: &Utf8Path) -> std::io::Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_str().is_empty() => p,
            _ => Utf8Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        self.write(&mut tmp)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn is_bare_package(line: &str) -> bool {
    let name = line.strip_suffix(':').unwrap_or(line);
    !name.is_empty() && !name.contains([':', ' ', ','])
}

impl fmt::Display for PatchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pkg, patch) in self.iter() {
            writeln!(f, "{pkg}: {patch}")?;
        }
        Ok(())
    }
}

impl FromStr for PatchSet {
    type Err = PatchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatchSet::parse_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::tag_set;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_entry_never_stores_empty_patch() {
        let mut ps = PatchSet::new();
        ps.add_entry("vim", tag_set(["a"]), TagSet::new());
        assert_eq!(ps.len(), 1);

        // Removing a tag the patch was adding leaves "-a", which is not empty.
        ps.add_entry("vim", TagSet::new(), tag_set(["a"]));
        assert_eq!(ps.get("vim").unwrap().to_string(), "-a");

        ps.add_entry("emacs", TagSet::new(), TagSet::new());
        assert!(!ps.contains("emacs"));
    }

    #[test]
    fn merge_set_applies_last_write_wins() {
        let mut base = PatchSet::parse_str("vim: +role::program, -use::editing\n").unwrap();
        let other = PatchSet::parse_str("vim: -role::program\nemacs: +use::editing\n").unwrap();
        base.merge_set(&other);
        assert_eq!(
            base.to_string(),
            "emacs: +use::editing\nvim: -role::program, -use::editing\n"
        );
    }

    #[test]
    fn simplify_drops_already_present_additions() {
        let ps = PatchSet::parse_str("pkgA: +role::program\n").unwrap();
        let db = TagDatabase::parse_str("pkgA: role::program\n").unwrap();
        assert!(ps.simplify(&db, None).is_empty());
    }

    #[test]
    fn simplify_drops_packages_missing_from_database() {
        let ps = PatchSet::parse_str("gone: +role::program\nvim: +use::editing\n").unwrap();
        let db = TagDatabase::parse_str("vim: role::program\n").unwrap();
        let simplified = ps.simplify(&db, None);
        assert_eq!(simplified.summary_packages(), vec!["vim"]);
    }

    #[test]
    fn simplify_matches_backup_tool_scenario() {
        let mut ps = PatchSet::new();
        ps.add_entry(
            "vzdump",
            tag_set(["admin::backup", "interface::commandline"]),
            TagSet::new(),
        );
        let db = TagDatabase::parse_str(
            "vzdump: admin::backup, interface::commandline, role::program\n",
        )
        .unwrap();
        assert_eq!(ps.simplify(&db, None), PatchSet::new());
    }

    #[test]
    fn diff_handles_one_sided_packages() {
        let a = PatchSet::parse_str("only-a: +x, -y\nboth: +x\n").unwrap();
        let b = PatchSet::parse_str("only-b: +z\nboth: +x, +w\n").unwrap();
        let d = a.diff(&b);
        assert_eq!(
            d.to_string(),
            "both: +w\nonly-a: -x, +y\nonly-b: +z\n"
        );
    }

    #[test]
    fn self_diff_is_empty() {
        let a = PatchSet::parse_str("vim: +x, -y\nemacs: -z\n").unwrap();
        assert!(a.diff(&a).is_empty());
    }

    #[test]
    fn reader_tolerates_blank_lines_and_bare_packages() {
        let ps = PatchSet::parse_str("\nfoo\nbar:\nvim: +a\n\n").unwrap();
        assert_eq!(ps.summary_packages(), vec!["vim"]);
    }

    #[test]
    fn reader_rejects_garbage_lines() {
        let err = PatchSet::parse_str("vim: +a\nthis is not a patch\n").unwrap_err();
        assert_eq!(
            err,
            PatchParseError::InvalidLine {
                line_no: 2,
                line: "this is not a patch".to_string()
            }
        );
    }

    #[test]
    fn reader_merges_repeated_packages() {
        let ps = PatchSet::parse_str("vim: +a\nvim: -a, +b\n").unwrap();
        assert_eq!(ps.get("vim").unwrap().to_string(), "-a, +b");
    }

    #[test]
    fn reader_reports_bad_token_with_line() {
        let err = PatchSet::parse_str("vim: +a, ?b\n").unwrap_err();
        assert!(matches!(err, PatchParseError::InvalidLineToken { line_no: 1, .. }));
    }

    #[test]
    fn apply_to_updates_database() {
        let ps = PatchSet::parse_str("vim: -use::editing, +role::program\n").unwrap();
        let mut db = TagDatabase::parse_str("vim: use::editing\n").unwrap();
        ps.apply_to(&mut db);
        assert_eq!(db.tags_of_package("vim"), Some(&tag_set(["role::program"])));
        assert!(db.packages_of_tag("use::editing").is_none());
    }

    #[test]
    fn summaries_are_sorted() {
        let ps = PatchSet::parse_str("zsh: +b, -a\nbash: +c, +a\n").unwrap();
        assert_eq!(ps.summary_packages(), vec!["bash", "zsh"]);
        let tags: Vec<&str> = ps.summary_tags().into_iter().map(Tag::as_str).collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
        assert!(ps.affects(["fish", "zsh"]));
        assert!(!ps.affects(["fish"]));
    }

    #[test]
    fn retain_packages_drops_unlisted() {
        let mut ps = PatchSet::parse_str("a: +x\nb: +y\n").unwrap();
        let allowed: BTreeSet<String> = ["b".to_string()].into_iter().collect();
        ps.retain_packages(&allowed);
        assert_eq!(ps.summary_packages(), vec!["b"]);
    }
}
