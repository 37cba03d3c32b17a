use crate::error::PatchParseError;
use crate::tag::{Tag, TagSet};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// An add/remove delta for the tags of one package.
///
/// Invariant: `added` and `removed` are disjoint. Every mutation goes through
/// [`Patch::merge`], which keeps the most recent instruction for a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    added: TagSet,
    removed: TagSet,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch from raw sets. A tag present in both ends up removed.
    pub fn from_parts(added: TagSet, removed: TagSet) -> Self {
        let mut patch = Self::new();
        patch.merge(added, removed);
        patch
    }

    /// Parse `+tag, -tag, ...`.
    pub fn parse(text: &str) -> Result<Self, PatchParseError> {
        Self::parse_filtered(text, &TagSet::new())
    }

    /// Parse `+tag, -tag, ...`, silently dropping tags found in `blacklist`.
    pub fn parse_filtered(text: &str, blacklist: &TagSet) -> Result<Self, PatchParseError> {
        let mut patch = Self::new();
        patch.merge_text(text, blacklist)?;
        Ok(patch)
    }

    /// Merge the tokens of `text` into this patch, in order.
    pub(crate) fn merge_text(
        &mut self,
        text: &str,
        blacklist: &TagSet,
    ) -> Result<(), PatchParseError> {
        for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let mut chars = token.chars();
            let adding = match chars.next() {
                Some('+') => true,
                Some('-') => false,
                _ => {
                    return Err(PatchParseError::InvalidToken {
                        token: token.to_string(),
                    });
                }
            };
            let name = chars.as_str();
            if name.is_empty() || blacklist.contains(name) {
                continue;
            }
            if adding {
                self.add_tag(Tag::new(name));
            } else {
                self.remove_tag(Tag::new(name));
            }
        }
        Ok(())
    }

    pub fn added(&self) -> &TagSet {
        &self.added
    }

    pub fn removed(&self) -> &TagSet {
        &self.removed
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    fn add_tag(&mut self, tag: Tag) {
        self.removed.remove(&tag);
        self.added.insert(tag);
    }

    fn remove_tag(&mut self, tag: Tag) {
        self.added.remove(&tag);
        self.removed.insert(tag);
    }

    /// Merge changes into this patch. Incoming additions are processed before incoming
    /// removals; for any tag, the last instruction wins.
    pub fn merge(
        &mut self,
        added: impl IntoIterator<Item = Tag>,
        removed: impl IntoIterator<Item = Tag>,
    ) {
        for tag in added {
            self.add_tag(tag);
        }
        for tag in removed {
            self.remove_tag(tag);
        }
    }

    /// Keep only the changes that would alter `current`.
    ///
    /// Returns `None` when nothing applies, the borrowed patch itself when every change
    /// applies, and an owned, reduced patch otherwise. A `whitelist`, when given, further
    /// limits the changes to the listed tags.
    pub fn restrict(&self, current: &TagSet, whitelist: Option<&TagSet>) -> Option<Cow<'_, Patch>> {
        let keep = |t: &Tag| whitelist.is_none_or(|w| w.contains(t));
        let added: TagSet = self
            .added
            .iter()
            .filter(|t| !current.contains(*t) && keep(t))
            .cloned()
            .collect();
        let removed: TagSet = self
            .removed
            .iter()
            .filter(|t| current.contains(*t) && keep(t))
            .cloned()
            .collect();

        if added.is_empty() && removed.is_empty() {
            return None;
        }
        if added.len() == self.added.len() && removed.len() == self.removed.len() {
            return Some(Cow::Borrowed(self));
        }
        Some(Cow::Owned(Patch { added, removed }))
    }

    /// The patch to apply after `self` so that the combined effect equals applying
    /// `other` alone to the same starting state.
    pub fn difference(&self, other: &Patch) -> Patch {
        let added = self
            .removed
            .difference(&other.removed)
            .chain(other.added.difference(&self.added))
            .cloned()
            .collect();
        let removed = self
            .added
            .difference(&other.added)
            .chain(other.removed.difference(&self.removed))
            .cloned()
            .collect();
        Patch { added, removed }
    }

    /// The patch that undoes this one.
    pub fn reversed(&self) -> Patch {
        Patch {
            added: self.removed.clone(),
            removed: self.added.clone(),
        }
    }

    /// `(tags - removed) | added`
    pub fn apply_to(&self, tags: &TagSet) -> TagSet {
        tags.iter()
            .filter(|t| !self.removed.contains(*t))
            .chain(self.added.iter())
            .cloned()
            .collect()
    }
}

/// Canonical form: removals sorted, then additions sorted, joined by `", "`.
impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let removed = self.removed.iter().map(|t| ('-', t));
        let added = self.added.iter().map(|t| ('+', t));
        for (sign, tag) in removed.chain(added) {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{sign}{tag}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Patch {
    type Err = PatchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Patch::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::tag_set;
    use pretty_assertions::assert_eq;

    fn patch(added: &[&str], removed: &[&str]) -> Patch {
        Patch::from_parts(tag_set(added), tag_set(removed))
    }

    #[test]
    fn serializes_removals_then_additions_sorted() {
        let p = patch(&["b", "a"], &["z"]);
        assert_eq!(p.to_string(), "-z, +a, +b");
    }

    #[test]
    fn empty_patch_serializes_to_empty_string() {
        assert_eq!(Patch::new().to_string(), "");
    }

    #[test]
    fn parse_reads_both_signs() {
        let p = Patch::parse("-role::dummy, +role::program, +use::editing").unwrap();
        assert_eq!(p.added(), &tag_set(["role::program", "use::editing"]));
        assert_eq!(p.removed(), &tag_set(["role::dummy"]));
    }

    #[test]
    fn parse_rejects_unknown_leading_character() {
        let err = Patch::parse("+a, *b").unwrap_err();
        assert_eq!(
            err,
            PatchParseError::InvalidToken {
                token: "*b".to_string()
            }
        );
    }

    #[test]
    fn parse_drops_blacklisted_tags() {
        let p = Patch::parse_filtered("+a, +special::x, -b", &tag_set(["special::x"])).unwrap();
        assert_eq!(p, patch(&["a"], &["b"]));
    }

    #[test]
    fn parse_tolerates_missing_space_after_comma() {
        let p = Patch::parse("+a,-b").unwrap();
        assert_eq!(p, patch(&["a"], &["b"]));
    }

    #[test]
    fn merge_last_write_wins() {
        let mut p = Patch::new();
        p.merge(tag_set(["x"]), TagSet::new());
        p.merge(TagSet::new(), tag_set(["x"]));
        assert!(p.added().is_empty());
        assert_eq!(p.removed(), &tag_set(["x"]));

        p.merge(tag_set(["x"]), TagSet::new());
        assert_eq!(p.added(), &tag_set(["x"]));
        assert!(p.removed().is_empty());
    }

    #[test]
    fn restrict_returns_none_when_nothing_applies() {
        let p = patch(&["role::program"], &["role::dummy"]);
        let current = tag_set(["role::program"]);
        assert!(p.restrict(&current, None).is_none());
    }

    #[test]
    fn restrict_returns_same_instance_when_nothing_dropped() {
        let p = patch(&["a"], &["b"]);
        let current = tag_set(["b"]);
        match p.restrict(&current, None) {
            Some(Cow::Borrowed(same)) => assert!(std::ptr::eq(same, &p)),
            other => panic!("expected borrowed patch, got {other:?}"),
        }
    }

    #[test]
    fn restrict_drops_noop_changes_and_applies_whitelist() {
        let p = patch(&["a", "b", "c"], &["d", "e"]);
        let current = tag_set(["a", "d"]);
        let reduced = p.restrict(&current, None).unwrap().into_owned();
        assert_eq!(reduced, patch(&["b", "c"], &["d"]));

        let whitelist = tag_set(["c", "d"]);
        let reduced = p.restrict(&current, Some(&whitelist)).unwrap().into_owned();
        assert_eq!(reduced, patch(&["c"], &["d"]));
    }

    #[test]
    fn difference_follows_formula() {
        let a = patch(&["x", "y"], &["z"]);
        let b = patch(&["y", "w"], &["v"]);
        let d = a.difference(&b);
        assert_eq!(d, patch(&["z", "w"], &["x", "v"]));
    }

    #[test]
    fn apply_to_removes_then_adds() {
        let p = patch(&["c"], &["a"]);
        let out = p.apply_to(&tag_set(["a", "b"]));
        assert_eq!(out, tag_set(["b", "c"]));
    }

    #[test]
    fn reversed_swaps_sides() {
        let p = patch(&["a"], &["b"]);
        assert_eq!(p.reversed(), patch(&["b"], &["a"]));
    }
}
