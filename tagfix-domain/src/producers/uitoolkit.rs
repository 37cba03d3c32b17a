use super::{Proposal, ProducerMeta, RuleProducer};
use regex::Regex;
use std::sync::LazyLock;
use tagfix_sources::{BinPackage, BinPackages, SourceKind, SourceSet};
use tagfix_types::{Tag, TagSet};

static TOOLKITS: LazyLock<Vec<(Regex, Tag)>> = LazyLock::new(|| {
    [
        (r"^libgtk", "uitoolkit::gtk"),
        (r"^libqt[34]", "uitoolkit::qt"),
        (r"^libsdl[0-9]", "uitoolkit::sdl"),
        (r"^lesstif[12]", "uitoolkit::motif"),
        (r"^libncurses", "uitoolkit::ncurses"),
        (r"^libwxgtk", "uitoolkit::wxwidgets"),
    ]
    .into_iter()
    .map(|(re, tag)| (Regex::new(re).expect("static regex"), Tag::new(tag)))
    .collect()
});

/// `uitoolkit::*` from the libraries a program depends on.
pub struct UiToolkitProducer<'a> {
    binpackages: &'a BinPackages,
}

impl<'a> UiToolkitProducer<'a> {
    pub const META: ProducerMeta = ProducerMeta {
        name: "uitoolkit",
        description: "UI toolkit tags inferred from pre-depends and depends",
        needs: &[SourceKind::BinPackages],
    };

    pub fn create(sources: &'a SourceSet) -> Option<Self> {
        Some(Self {
            binpackages: sources.binpackages.as_ref()?,
        })
    }
}

/// The first toolkit matching each dependency.
fn toolkits_of(pkg: &BinPackage) -> TagSet {
    pkg.hard_dependencies()
        .filter_map(|dep| {
            TOOLKITS
                .iter()
                .find(|(re, _)| re.is_match(dep))
                .map(|(_, tag)| tag.clone())
        })
        .collect()
}

impl RuleProducer for UiToolkitProducer<'_> {
    fn meta(&self) -> ProducerMeta {
        Self::META
    }

    fn produce(&self) -> Box<dyn Iterator<Item = Proposal> + '_> {
        Box::new(
            self.binpackages
                .iter()
                // libraries are not themselves user interfaces
                .filter(|p| !p.section.starts_with("lib"))
                .filter_map(|p| {
                    let added = toolkits_of(p);
                    (!added.is_empty()).then(|| Proposal::add(&p.name, added))
                }),
        )
    }
}
