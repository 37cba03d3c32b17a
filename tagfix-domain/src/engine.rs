use crate::producers::{self, RuleProducer};
use std::collections::BTreeSet;
use tagfix_sources::SourceSet;
use tagfix_types::{PatchSet, Rule};
use tracing::debug;

/// Runs a fixed pipeline of rule producers and merges what they propose.
pub struct RuleEngine<'a> {
    producers: Vec<Box<dyn RuleProducer + 'a>>,
}

impl<'a> RuleEngine<'a> {
    /// Build the builtin pipeline over `sources`.
    ///
    /// Producers whose sources are missing are left out. `tag_rules` feeds the
    /// association-rule producer; an empty slice makes it a no-op.
    pub fn new(sources: &'a SourceSet, tag_rules: &'a [Rule]) -> Self {
        Self {
            producers: producers::builtin_producers(sources, tag_rules),
        }
    }

    pub fn with_producers(producers: Vec<Box<dyn RuleProducer + 'a>>) -> Self {
        Self { producers }
    }

    /// Names of the producers that will run, in order.
    pub fn producer_names(&self) -> Vec<&'static str> {
        self.producers.iter().map(|p| p.meta().name).collect()
    }

    /// Merge every producer's proposals, in pipeline order, keeping only packages in
    /// `whitelist`. A later producer overrides an earlier one tag by tag.
    pub fn make_patches(&self, whitelist: &BTreeSet<String>) -> PatchSet {
        let mut patches = PatchSet::new();
        for producer in &self.producers {
            let mut proposed = 0usize;
            let mut kept = 0usize;
            for proposal in producer.produce() {
                proposed += 1;
                if proposal.is_empty() || !whitelist.contains(&proposal.package) {
                    continue;
                }
                kept += 1;
                patches.add_entry(&proposal.package, proposal.added, proposal.removed);
            }
            debug!(
                producer = producer.meta().name,
                proposed, kept, "producer finished"
            );
        }
        patches
    }
}
