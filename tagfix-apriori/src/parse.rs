use regex::Regex;
use std::sync::LazyLock;
use tagfix_types::{Rule, Tag, TagSet};

// "<consequent> <- <antecedent ...> (<support>, <confidence>)"
static RULE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+<-\s+(.+?)\s+\(([0-9.]+), ([0-9.]+)\)\s*$").expect("static regex")
});

/// Parse one line of miner output. Lines that are not rules yield `None`.
pub fn parse_rule_line(line: &str) -> Option<Rule> {
    let caps = RULE_LINE.captures(line)?;
    let support = caps[3].parse().ok()?;
    let confidence = caps[4].parse().ok()?;
    let antecedent: TagSet = caps[2]
        .split(' ')
        .filter(|s| !s.is_empty())
        .map(Tag::new)
        .collect();
    Some(Rule {
        antecedent,
        consequent: Tag::new(&caps[1]),
        support,
        confidence,
    })
}
