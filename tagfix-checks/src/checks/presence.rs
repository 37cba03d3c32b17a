//! Checks that require some tag to be present.

use super::has_prefix;
use crate::check::{Check, CheckMeta, Level, ViolationData};
use tagfix_types::{Tag, TagSet};

const SOFTWARE_ROLES: [&str; 5] = [
    "role::program",
    "role::devel-lib",
    "role::plugin",
    "role::shared-lib",
    "role::source",
];

fn found_or_undefined(data: &ViolationData) -> &str {
    match data {
        ViolationData::Found { found } => found.as_str(),
        _ => "(undefined)",
    }
}

/// The first of `candidates` present in `tags`.
fn first_present(tags: &TagSet, candidates: &[&str]) -> Option<Tag> {
    candidates
        .iter()
        .find(|c| tags.contains(**c))
        .map(|c| Tag::new(c))
}

pub struct HasRoleCheck;

impl Check for HasRoleCheck {
    fn meta(&self) -> CheckMeta {
        CheckMeta {
            id: 1,
            name: "HasRole",
            short_description: "Every package should have a role::* tag",
            long_description: None,
            level: Level::Check,
        }
    }

    fn check_tags(&self, tags: &TagSet) -> Vec<ViolationData> {
        if has_prefix(tags, "role::") {
            vec![]
        } else {
            vec![ViolationData::Missing]
        }
    }

    fn format(&self, _data: &ViolationData) -> String {
        "A role::* tag is still missing.".to_string()
    }
}

pub struct HasUiToolkitCheck;

impl Check for HasUiToolkitCheck {
    fn meta(&self) -> CheckMeta {
        CheckMeta {
            id: 2,
            name: "HasUIToolkit",
            short_description:
                "Every package with an X11 or 3D interface should have a uitoolkit::* tag",
            long_description: None,
            level: Level::Check,
        }
    }

    fn check_tags(&self, tags: &TagSet) -> Vec<ViolationData> {
        if has_prefix(tags, "uitoolkit::") {
            return vec![];
        }
        first_present(tags, &["interface::x11", "interface::3d"])
            .map(|found| ViolationData::Found { found })
            .into_iter()
            .collect()
    }

    fn format(&self, data: &ViolationData) -> String {
        format!(
            "A uitoolkit::* tag seems to be missing, since the package has interface {}.",
            found_or_undefined(data)
        )
    }
}

pub struct IsReviewedCheck;

impl Check for IsReviewedCheck {
    fn meta(&self) -> CheckMeta {
        CheckMeta {
            id: 3,
            name: "IsReviewed",
            short_description: "Package tags should be reviewed by humans",
            long_description: None,
            level: Level::Check,
        }
    }

    fn check_tags(&self, tags: &TagSet) -> Vec<ViolationData> {
        if tags.contains("special::not-yet-tagged") {
            vec![ViolationData::Missing]
        } else {
            vec![]
        }
    }

    fn format(&self, _data: &ViolationData) -> String {
        "The not-yet-tagged tag is still present.".to_string()
    }
}

pub struct HasImplementedInCheck;

impl Check for HasImplementedInCheck {
    fn meta(&self) -> CheckMeta {
        CheckMeta {
            id: 4,
            name: "HasImplementedIn",
            short_description: "Every package with a program, devel-lib, plugin, shared-lib, \
                                or source role, should have an implemented-in::* tag",
            long_description: None,
            level: Level::Check,
        }
    }

    fn check_tags(&self, tags: &TagSet) -> Vec<ViolationData> {
        if has_prefix(tags, "implemented-in::") {
            return vec![];
        }
        // report the role the way it reads: program, not role::program
        tags.iter()
            .find(|t| SOFTWARE_ROLES.contains(&t.as_str()))
            .and_then(|t| t.as_str().strip_prefix("role::"))
            .map(|role| ViolationData::Found {
                found: Tag::new(role),
            })
            .into_iter()
            .collect()
    }

    fn format(&self, data: &ViolationData) -> String {
        format!(
            "An implemented-in::* tag seems to be missing, since the package has role {}.",
            found_or_undefined(data)
        )
    }
}

pub struct HasDevelLangCheck;

impl Check for HasDevelLangCheck {
    fn meta(&self) -> CheckMeta {
        CheckMeta {
            id: 5,
            name: "HasDevelLang",
            short_description: "Every development library should have a devel::lang:* tag",
            long_description: None,
            level: Level::Check,
        }
    }

    fn check_tags(&self, tags: &TagSet) -> Vec<ViolationData> {
        let Some(found) = first_present(tags, &["role::devel-lib", "devel::library"]) else {
            return vec![];
        };
        if has_prefix(tags, "devel::lang:") {
            return vec![];
        }
        vec![ViolationData::Found { found }]
    }

    fn format(&self, data: &ViolationData) -> String {
        format!(
            "A devel::lang:* tag seems to be missing, since the package has tag {}.",
            found_or_undefined(data)
        )
    }
}

pub struct HasGameCheck;

impl Check for HasGameCheck {
    fn meta(&self) -> CheckMeta {
        CheckMeta {
            id: 7,
            name: "HasGame",
            short_description: "Every package with use::gameplaying should have a game::* tags",
            long_description: None,
            level: Level::Check,
        }
    }

    fn check_tags(&self, tags: &TagSet) -> Vec<ViolationData> {
        if tags.contains("use::gameplaying") && !has_prefix(tags, "game::") {
            vec![ViolationData::Missing]
        } else {
            vec![]
        }
    }

    fn format(&self, _data: &ViolationData) -> String {
        "A game::* tag seems to be missing, since the package has tag use::gameplaying."
            .to_string()
    }
}
