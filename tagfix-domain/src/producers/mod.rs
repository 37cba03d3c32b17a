use tagfix_sources::{SourceKind, SourceSet};
use tagfix_types::{Rule, Tag, TagSet, tag_set};
use tracing::debug;

mod apriori;
mod kernel;
mod names;
mod new_versions;
mod perl;
mod sections;
mod uitoolkit;

pub use apriori::AprioriProducer;
pub use kernel::KernelProducer;
pub use names::NamesProducer;
pub use new_versions::NewVersionsProducer;
pub use perl::PerlProducer;
pub use sections::SectionsProducer;
pub use uitoolkit::UiToolkitProducer;

/// One raw change proposed by a producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub package: String,
    pub added: TagSet,
    pub removed: TagSet,
}

impl Proposal {
    pub fn add(package: impl Into<String>, added: TagSet) -> Self {
        Self {
            package: package.into(),
            added,
            removed: TagSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Static description of a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub needs: &'static [SourceKind],
}

/// A heuristic that proposes tag changes from read-only metadata.
///
/// Implementations hold typed references to the sources they declared in their
/// [`ProducerMeta::needs`], resolved once when the engine is built.
pub trait RuleProducer {
    fn meta(&self) -> ProducerMeta;

    fn produce(&self) -> Box<dyn Iterator<Item = Proposal> + '_>;
}

/// Metadata of every builtin producer, in engine order.
pub fn builtin_producer_metas() -> Vec<ProducerMeta> {
    vec![
        SectionsProducer::META,
        UiToolkitProducer::META,
        KernelProducer::META,
        NamesProducer::META,
        PerlProducer::META,
        AprioriProducer::META,
        NewVersionsProducer::META,
    ]
}

/// Instantiate the builtin producers whose sources are available, in engine order.
pub(crate) fn builtin_producers<'a>(
    sources: &'a SourceSet,
    tag_rules: &'a [Rule],
) -> Vec<Box<dyn RuleProducer + 'a>> {
    let mut out: Vec<Box<dyn RuleProducer + 'a>> = Vec::new();
    register(&mut out, sources, SectionsProducer::META, SectionsProducer::create(sources));
    register(&mut out, sources, UiToolkitProducer::META, UiToolkitProducer::create(sources));
    register(&mut out, sources, KernelProducer::META, KernelProducer::create(sources));
    register(&mut out, sources, NamesProducer::META, NamesProducer::create(sources));
    register(&mut out, sources, PerlProducer::META, PerlProducer::create(sources));
    register(
        &mut out,
        sources,
        AprioriProducer::META,
        AprioriProducer::create(sources, tag_rules),
    );
    register(
        &mut out,
        sources,
        NewVersionsProducer::META,
        NewVersionsProducer::create(sources),
    );
    out
}

fn register<'a, P: RuleProducer + 'a>(
    out: &mut Vec<Box<dyn RuleProducer + 'a>>,
    sources: &SourceSet,
    meta: ProducerMeta,
    created: Option<P>,
) {
    match created {
        Some(p) => out.push(Box::new(p)),
        None => debug!(
            producer = meta.name,
            missing = ?sources.missing(meta.needs),
            "skipping producer with unavailable sources"
        ),
    }
}

/// Tags for a fixed bundle of names.
pub(crate) fn bundle(tags: &[&str]) -> TagSet {
    tag_set(tags.iter().copied())
}

pub(crate) fn single(tag: &str) -> TagSet {
    TagSet::from([Tag::new(tag)])
}
