//! The mutable baseline: package -> tags, plus the reverse tag -> packages index.

use crate::error::DatabaseParseError;
use crate::patch::Patch;
use crate::tag::{Tag, TagSet};
use camino::Utf8Path;
use fs_err as fs;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{BufRead, BufReader};

/// Package tag database with a consistent reverse index.
///
/// The fields are private: every mutation is routed through [`TagDatabase::apply_patch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDatabase {
    packages: BTreeMap<String, TagSet>,
    tags: BTreeMap<Tag, BTreeSet<String>>,
}

impl TagDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `package: tag1, tag2` text format.
    pub fn read(reader: impl BufRead) -> Result<Self, DatabaseParseError> {
        Self::read_filtered(reader, |_| true)
    }

    /// Parse the text format keeping only the tags accepted by `keep`.
    pub fn read_filtered(
        reader: impl BufRead,
        keep: impl Fn(&str) -> bool,
    ) -> Result<Self, DatabaseParseError> {
        let mut db = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            // `pkg: tags`, or a bare `pkg:` for a package without tags
            let split = match line.strip_suffix(':') {
                Some(pkg) => Some((pkg, "")),
                None => line.split_once(": "),
            };
            let Some((pkg, tags)) = split.filter(|(pkg, _)| is_package_name(pkg)) else {
                return Err(DatabaseParseError::InvalidLine {
                    line_no: idx + 1,
                    line: line.to_string(),
                });
            };
            let tags: TagSet = tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty() && keep(t))
                .map(Tag::new)
                .collect();
            db.apply_patch(pkg, &Patch::from_parts(tags, TagSet::new()));
        }
        Ok(db)
    }

    pub fn parse_str(text: &str) -> Result<Self, DatabaseParseError> {
        Self::read(text.as_bytes())
    }

    pub fn load(path: &Utf8Path) -> Result<Self, DatabaseParseError> {
        Self::load_filtered(path, |_| true)
    }

    pub fn load_filtered(
        path: &Utf8Path,
        keep: impl Fn(&str) -> bool,
    ) -> Result<Self, DatabaseParseError> {
        let file = fs::File::open(path)?;
        Self::read_filtered(BufReader::new(file), keep)
    }

    pub fn has_package(&self, pkg: &str) -> bool {
        self.packages.contains_key(pkg)
    }

    pub fn tags_of_package(&self, pkg: &str) -> Option<&TagSet> {
        self.packages.get(pkg)
    }

    pub fn packages_of_tag(&self, tag: &str) -> Option<&BTreeSet<String>> {
        self.tags.get(tag)
    }

    pub fn iter_packages_tags(&self) -> impl Iterator<Item = (&str, &TagSet)> {
        self.packages.iter().map(|(p, t)| (p.as_str(), t))
    }

    pub fn iter_tags_packages(&self) -> impl Iterator<Item = (&Tag, &BTreeSet<String>)> {
        self.tags.iter()
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Replace the tags of `pkg` with `tags`, creating the package if needed.
    pub fn insert(&mut self, pkg: &str, tags: TagSet) {
        let current = self.packages.get(pkg).cloned().unwrap_or_default();
        let removed: TagSet = current.difference(&tags).cloned().collect();
        let added: TagSet = tags.difference(&current).cloned().collect();
        self.apply_patch(pkg, &Patch::from_parts(added, removed));
    }

    /// Apply one patch to one package, keeping the reverse index in step.
    pub fn apply_patch(&mut self, pkg: &str, patch: &Patch) {
        let entry = self.packages.entry(pkg.to_string()).or_default();
        *entry = patch.apply_to(entry);

        for tag in patch.removed() {
            if let Some(pkgs) = self.tags.get_mut(tag) {
                pkgs.remove(pkg);
                if pkgs.is_empty() {
                    self.tags.remove(tag);
                }
            }
        }
        for tag in patch.added() {
            self.tags
                .entry(tag.clone())
                .or_default()
                .insert(pkg.to_string());
        }
    }
}

fn is_package_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(|c: char| c == ':' || c == ',' || c.is_whitespace())
}

impl fmt::Display for TagDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pkg, tags) in &self.packages {
            let joined = tags.iter().map(Tag::as_str).collect::<Vec<_>>().join(", ");
            writeln!(f, "{pkg}: {joined}")?;
        }
        Ok(())
    }
}
