//! Association-rule mining over a tag corpus.
//!
//! The miner itself is an external batch program. This crate feeds it the corpus (one line of
//! space-separated tags per package), parses the rules it prints, and keeps the results in a
//! JSON rule cache that the `apriori` rule producer reads later.

mod cache;
mod error;
mod parse;
mod preset;
mod runner;

pub use cache::{RuleCache, mine_rule_cache};
pub use error::AprioriError;
pub use parse::parse_rule_line;
pub use preset::{MiningParams, MiningPreset, RuleFilter};
pub use runner::{ACCEPTED_EXIT_CODES, Apriori, AprioriConfig, read_mining_corpus};
