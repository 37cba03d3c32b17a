use super::{Proposal, ProducerMeta, RuleProducer, bundle, single};
use regex::Regex;
use std::sync::LazyLock;
use tagfix_sources::{BinPackages, SourceKind, SourceSet};

static SHARED_LIB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^lib.+[0-9]$").expect("static regex"));

/// Role tags implied by the archive section.
pub struct SectionsProducer<'a> {
    binpackages: &'a BinPackages,
}

impl<'a> SectionsProducer<'a> {
    pub const META: ProducerMeta = ProducerMeta {
        name: "sections",
        description: "Role tags from the libdevel, debug and libs sections",
        needs: &[SourceKind::BinPackages],
    };

    pub fn create(sources: &'a SourceSet) -> Option<Self> {
        Some(Self {
            binpackages: sources.binpackages.as_ref()?,
        })
    }
}

impl RuleProducer for SectionsProducer<'_> {
    fn meta(&self) -> ProducerMeta {
        Self::META
    }

    fn produce(&self) -> Box<dyn Iterator<Item = Proposal> + '_> {
        let bin = self.binpackages;
        let devel = bin
            .in_section("libdevel")
            .iter()
            .map(|p| Proposal::add(&p.name, bundle(&["role::devel-lib", "devel::library"])));
        let debug = bin
            .in_section("debug")
            .iter()
            // `-dbg` must end the name; a match anchored at the start never fires.
            .filter(|p| p.name.ends_with("-dbg"))
            .map(|p| Proposal::add(&p.name, single("role::debug-symbols")));
        let libs = bin
            .in_section("libs")
            .iter()
            .filter(|p| SHARED_LIB.is_match(&p.name))
            .map(|p| Proposal::add(&p.name, single("role::shared-lib")));
        Box::new(devel.chain(debug).chain(libs))
    }
}
