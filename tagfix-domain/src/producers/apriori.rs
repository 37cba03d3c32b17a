use super::{Proposal, ProducerMeta, RuleProducer};
use tagfix_sources::{SourceKind, SourceSet};
use tagfix_types::{Rule, TagDatabase, TagSet};

/// Applies cached association rules to the stable tags.
///
/// Only tag rules are used: facet rules suggest facets, not tags that could be added.
pub struct AprioriProducer<'a> {
    stable_tags: &'a TagDatabase,
    rules: &'a [Rule],
}

impl<'a> AprioriProducer<'a> {
    pub const META: ProducerMeta = ProducerMeta {
        name: "apriori",
        description: "Consequents of cached association rules whose antecedents hold",
        needs: &[SourceKind::StableTags],
    };

    pub fn create(sources: &'a SourceSet, rules: &'a [Rule]) -> Option<Self> {
        Some(Self {
            stable_tags: sources.stable_tags.as_ref()?,
            rules,
        })
    }
}

impl RuleProducer for AprioriProducer<'_> {
    fn meta(&self) -> ProducerMeta {
        Self::META
    }

    fn produce(&self) -> Box<dyn Iterator<Item = Proposal> + '_> {
        if self.rules.is_empty() {
            return Box::new(std::iter::empty());
        }
        Box::new(
            self.stable_tags
                .iter_packages_tags()
                .filter_map(|(pkg, tags)| {
                    let added: TagSet = self
                        .rules
                        .iter()
                        .filter(|r| r.suggests_for(tags))
                        .map(|r| r.consequent.clone())
                        .collect();
                    (!added.is_empty()).then(|| Proposal::add(pkg, added))
                }),
        )
    }
}
