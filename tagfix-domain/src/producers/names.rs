use super::{Proposal, ProducerMeta, RuleProducer, bundle};
use regex::Regex;
use std::sync::LazyLock;
use tagfix_sources::{BinPackages, SourceKind, SourceSet};
use tagfix_types::TagSet;

static NAME_RULES: LazyLock<Vec<(Regex, TagSet)>> = LazyLock::new(|| {
    vec![(
        Regex::new(r"^libmono[0-9-].+-cil$").expect("static regex"),
        bundle(&["devel::library", "role::devel-lib", "devel::ecma-cli"]),
    )]
});

/// Tags implied by package naming conventions.
pub struct NamesProducer<'a> {
    binpackages: &'a BinPackages,
}

impl<'a> NamesProducer<'a> {
    pub const META: ProducerMeta = ProducerMeta {
        name: "names",
        description: "Tags from package naming conventions",
        needs: &[SourceKind::BinPackages],
    };

    pub fn create(sources: &'a SourceSet) -> Option<Self> {
        Some(Self {
            binpackages: sources.binpackages.as_ref()?,
        })
    }
}

impl RuleProducer for NamesProducer<'_> {
    fn meta(&self) -> ProducerMeta {
        Self::META
    }

    fn produce(&self) -> Box<dyn Iterator<Item = Proposal> + '_> {
        Box::new(self.binpackages.names().filter_map(|name| {
            NAME_RULES
                .iter()
                .find(|(re, _)| re.is_match(name))
                .map(|(_, tags)| Proposal::add(name, tags.clone()))
        }))
    }
}
