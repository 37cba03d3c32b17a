use super::{Proposal, ProducerMeta, RuleProducer, bundle};
use regex::Regex;
use std::sync::LazyLock;
use tagfix_sources::{BinPackages, SourceKind, SourceSet};
use tagfix_types::Tag;

static PERL_LIB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^lib.+-perl$").expect("static regex"));

/// Perl modules: pure perl when built for `all`, XS otherwise.
pub struct PerlProducer<'a> {
    binpackages: &'a BinPackages,
}

impl<'a> PerlProducer<'a> {
    pub const META: ProducerMeta = ProducerMeta {
        name: "perl",
        description: "Language tags for lib*-perl packages in the perl section",
        needs: &[SourceKind::BinPackages],
    };

    pub fn create(sources: &'a SourceSet) -> Option<Self> {
        Some(Self {
            binpackages: sources.binpackages.as_ref()?,
        })
    }
}

impl RuleProducer for PerlProducer<'_> {
    fn meta(&self) -> ProducerMeta {
        Self::META
    }

    fn produce(&self) -> Box<dyn Iterator<Item = Proposal> + '_> {
        Box::new(
            self.binpackages
                .in_section("perl")
                .iter()
                .filter(|p| PERL_LIB.is_match(&p.name))
                .map(|p| {
                    let mut added = bundle(&["devel::lang:perl", "devel::library"]);
                    added.insert(Tag::new(if p.is_arch_all() {
                        "implemented-in::perl"
                    } else {
                        "implemented-in::c"
                    }));
                    Proposal::add(&p.name, added)
                }),
        )
    }
}
