//! Roles that leave no room for other tags.

use super::{join, removal};
use crate::check::{Check, CheckMeta, Level, ViolationData};
use tagfix_types::{Patch, Tag, TagSet};

fn extra_tags(tags: &TagSet, allowed: impl Fn(&Tag) -> bool) -> Vec<ViolationData> {
    // TagSet iteration is sorted, so the extras and the fix are too
    let extras: Vec<Tag> = tags.iter().filter(|t| !allowed(t)).cloned().collect();
    if extras.is_empty() {
        vec![]
    } else {
        vec![ViolationData::ExtraTags { tags: extras }]
    }
}

fn removal_fix(data: &ViolationData) -> Option<Patch> {
    match data {
        ViolationData::ExtraTags { tags } => removal(tags),
        _ => None,
    }
}

pub struct DebugSymbolsCheck;

impl Check for DebugSymbolsCheck {
    fn meta(&self) -> CheckMeta {
        CheckMeta {
            id: 9,
            name: "DebugSymbols",
            short_description: "Debugging symbols should not have other tags except \
                                role::debug-symbols or role::dummy",
            long_description: None,
            level: Level::Check,
        }
    }

    fn check_tags(&self, tags: &TagSet) -> Vec<ViolationData> {
        if !tags.contains("role::debug-symbols") {
            return vec![];
        }
        extra_tags(tags, |t| {
            matches!(t.as_str(), "role::debug-symbols" | "role::dummy")
        })
    }

    fn format(&self, _data: &ViolationData) -> String {
        "Packages with debugging symbols should have no tags except role::debug-symbols"
            .to_string()
    }

    fn suggested_fix(&self, data: &ViolationData) -> Option<Patch> {
        removal_fix(data)
    }
}

pub struct ShlibsCheck;

impl Check for ShlibsCheck {
    fn meta(&self) -> CheckMeta {
        CheckMeta {
            id: 10,
            name: "Shlibs",
            short_description:
                "Shared libraries should not normally have other tags except implemented-in",
            long_description: None,
            level: Level::Hint,
        }
    }

    fn check_tags(&self, tags: &TagSet) -> Vec<ViolationData> {
        if !tags.contains("role::shared-lib") {
            return vec![];
        }
        extra_tags(tags, |t| {
            matches!(
                t.as_str(),
                "role::shared-lib" | "role::dummy" | "x11::library"
            ) || t.starts_with("implemented-in::")
        })
    }

    fn format(&self, data: &ViolationData) -> String {
        match data {
            ViolationData::ExtraTags { tags } => format!(
                "Shared libraries should have no tags except implemented-in::* (found {}).",
                join(tags)
            ),
            _ => "Shared libraries should have no tags except implemented-in::*".to_string(),
        }
    }

    fn suggested_fix(&self, data: &ViolationData) -> Option<Patch> {
        removal_fix(data)
    }
}
