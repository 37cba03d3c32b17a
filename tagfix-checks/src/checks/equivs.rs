use crate::check::{Check, CheckMeta, Level, ViolationData};
use tagfix_types::{Patch, Tag, TagSet};

const ROLE: &str = "role::devel-lib";
const LIBRARY: &str = "devel::library";

/// `role::devel-lib` and `devel::library` mean the same thing and must go together.
pub struct HasEquivsCheck;

impl Check for HasEquivsCheck {
    fn meta(&self) -> CheckMeta {
        CheckMeta {
            id: 6,
            name: "HasEquivs",
            short_description: "role::devel-lib and devel::library should always be together",
            long_description: None,
            level: Level::Check,
        }
    }

    fn check_tags(&self, tags: &TagSet) -> Vec<ViolationData> {
        let violation = |has: &str, miss: &str| ViolationData::MissingEquivalent {
            has: Tag::new(has),
            miss: Tag::new(miss),
        };
        match (tags.contains(ROLE), tags.contains(LIBRARY)) {
            (true, false) => vec![violation(ROLE, LIBRARY)],
            (false, true) => vec![violation(LIBRARY, ROLE)],
            _ => vec![],
        }
    }

    fn format(&self, data: &ViolationData) -> String {
        match data {
            ViolationData::MissingEquivalent { has, miss } => format!(
                "A {miss} tag seems to be missing, since the package has tag {has}."
            ),
            _ => "A (undefined) tag seems to be missing.".to_string(),
        }
    }

    fn suggested_fix(&self, data: &ViolationData) -> Option<Patch> {
        match data {
            ViolationData::MissingEquivalent { miss, .. } => Some(Patch::from_parts(
                TagSet::from([miss.clone()]),
                TagSet::new(),
            )),
            _ => None,
        }
    }
}
