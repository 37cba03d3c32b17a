use super::{Proposal, ProducerMeta, RuleProducer};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tagfix_sources::{BinPackages, SourceKind, SourceSet};
use tagfix_types::{TagDatabase, TagSet};

const NOT_YET_TAGGED: &str = "special::not-yet-tagged";

static STEMS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // shared libraries
        r"^lib(.+?)[0-9.]+$",
        // kernel modules
        r"^(.+)-modules-[0-9.-]+",
    ]
    .into_iter()
    .map(|re| Regex::new(re).expect("static regex"))
    .collect()
});

/// The name with its version suffix stripped, for the naming schemes we know.
pub(crate) fn stem(name: &str) -> Option<&str> {
    STEMS
        .iter()
        .find_map(|re| re.captures(name))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Carries tags across versions of the same library or module package.
///
/// Packages sharing a stem form a group. The non-`special::` tags of every member are merged
/// and the merge is offered to the members still marked `special::not-yet-tagged`. The merge
/// includes untagged members too, so tags can flow between two unreviewed packages.
pub struct NewVersionsProducer<'a> {
    binpackages: &'a BinPackages,
    unstable_tags: &'a TagDatabase,
}

impl<'a> NewVersionsProducer<'a> {
    pub const META: ProducerMeta = ProducerMeta {
        name: "new-versions",
        description: "Tags propagated between versions of the same package stem",
        needs: &[SourceKind::BinPackages, SourceKind::UnstableTags],
    };

    pub fn create(sources: &'a SourceSet) -> Option<Self> {
        Some(Self {
            binpackages: sources.binpackages.as_ref()?,
            unstable_tags: sources.unstable_tags.as_ref()?,
        })
    }

    fn groups(&self) -> BTreeMap<&'a str, Vec<&'a str>> {
        let mut by_stem: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for name in self.binpackages.names() {
            if let Some(s) = stem(name) {
                by_stem.entry(s).or_default().push(name);
            }
        }
        by_stem
    }

    fn tags_of(&self, pkg: &str) -> TagSet {
        self.unstable_tags
            .tags_of_package(pkg)
            .cloned()
            .unwrap_or_default()
    }

    fn group_proposals(&self, group: &[&str]) -> Vec<Proposal> {
        let merged: TagSet = group
            .iter()
            .flat_map(|pkg| self.tags_of(pkg))
            .filter(|t| !t.starts_with("special::"))
            .collect();
        if merged.is_empty() {
            return Vec::new();
        }
        group
            .iter()
            .filter_map(|pkg| {
                let tags = self.tags_of(pkg);
                if !tags.contains(NOT_YET_TAGGED) {
                    return None;
                }
                let added: TagSet = merged.difference(&tags).cloned().collect();
                (!added.is_empty()).then(|| Proposal::add(*pkg, added))
            })
            .collect()
    }
}

impl RuleProducer for NewVersionsProducer<'_> {
    fn meta(&self) -> ProducerMeta {
        Self::META
    }

    fn produce(&self) -> Box<dyn Iterator<Item = Proposal> + '_> {
        Box::new(
            self.groups()
                .into_values()
                .filter(|group| group.len() > 1)
                .flat_map(|group| self.group_proposals(&group)),
        )
    }
}
