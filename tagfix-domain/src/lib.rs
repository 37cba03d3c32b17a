//! Domain logic: turn package metadata into a deterministic set of proposed tag changes.
//!
//! This crate owns *what* should be tagged and why. It does not own loading the sources or
//! writing the result; that's `tagfix-sources` and `tagfix-core`.

mod engine;
mod producers;

pub use engine::RuleEngine;
pub use producers::{
    AprioriProducer, KernelProducer, NamesProducer, NewVersionsProducer, PerlProducer,
    ProducerMeta, Proposal, RuleProducer, SectionsProducer, UiToolkitProducer,
    builtin_producer_metas,
};
