use serde::{Deserialize, Serialize};
use std::fmt;
use tagfix_types::{Patch, Tag, TagSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Something is wrong.
    Check,
    /// Something is unusual and worth a look.
    Hint,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Check => "check",
            Level::Hint => "hint",
        })
    }
}

/// Check-specific details of one violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationData {
    /// Something required is absent; the check says what.
    Missing,
    /// The tag that made the requirement apply.
    Found { found: Tag },
    /// One of two tags that must go together is missing.
    MissingEquivalent { has: Tag, miss: Tag },
    /// Tags that should not be there.
    ExtraTags { tags: Vec<Tag> },
}

/// A violation found on one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub check_id: u32,
    pub package: String,
    pub data: ViolationData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckMeta {
    pub id: u32,
    pub name: &'static str,
    pub short_description: &'static str,
    pub long_description: Option<&'static str>,
    pub level: Level,
}

/// One consistency check. `check_tags` must be a pure function of its input.
pub trait Check: Send + Sync {
    fn meta(&self) -> CheckMeta;

    fn check_tags(&self, tags: &TagSet) -> Vec<ViolationData>;

    /// Human readable message for `data`.
    fn format(&self, data: &ViolationData) -> String;

    fn suggested_fix(&self, _data: &ViolationData) -> Option<Patch> {
        None
    }
}
