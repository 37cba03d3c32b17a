use crate::tag::{Tag, TagSet};
use serde::{Deserialize, Serialize};

/// A mined association rule: `antecedent -> consequent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub antecedent: TagSet,
    pub consequent: Tag,
    pub support: f64,
    pub confidence: f64,
}

impl Rule {
    /// True when the rule fires on `tags` and would add something new.
    pub fn suggests_for(&self, tags: &TagSet) -> bool {
        !tags.contains(&self.consequent) && self.antecedent.is_subset(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::tag_set;

    fn rule() -> Rule {
        Rule {
            antecedent: tag_set(["devel::library", "role::devel-lib"]),
            consequent: Tag::new("devel::lang:c"),
            support: 12.5,
            confidence: 95.0,
        }
    }

    #[test]
    fn fires_when_antecedent_is_subset_and_consequent_missing() {
        let tags = tag_set(["devel::library", "role::devel-lib", "use::editing"]);
        assert!(rule().suggests_for(&tags));
    }

    #[test]
    fn does_not_fire_when_consequent_present() {
        let tags = tag_set(["devel::library", "role::devel-lib", "devel::lang:c"]);
        assert!(!rule().suggests_for(&tags));
    }

    #[test]
    fn does_not_fire_on_partial_antecedent() {
        let tags = tag_set(["devel::library"]);
        assert!(!rule().suggests_for(&tags));
    }

    #[test]
    fn serializes_with_plain_field_names() {
        let json = serde_json::to_value(rule()).unwrap();
        assert_eq!(json["consequent"], "devel::lang:c");
        assert_eq!(json["antecedent"][0], "devel::library");
    }
}
