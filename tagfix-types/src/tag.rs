use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A classification label, usually of the form `facet::value`.
///
/// Cheap to clone: the text is shared. Equality, ordering and hashing are by value.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(Arc<str>);

/// The tags of one package.
pub type TagSet = BTreeSet<Tag>;

impl Tag {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace prefix before the first `::`, or the whole tag for legacy tags.
    pub fn facet(&self) -> &str {
        match self.0.find("::") {
            Some(idx) => &self.0[..idx],
            None => &self.0,
        }
    }

    pub fn has_facet(&self, facet: &str) -> bool {
        self.0
            .strip_prefix(facet)
            .is_some_and(|rest| rest.starts_with("::"))
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

/// Build a tag set from string literals.
pub fn tag_set<I, S>(tags: I) -> TagSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter().map(Tag::new).collect()
}

/// Project tags onto their facets. Duplicates are collapsed.
pub fn tags_to_facets<'a>(tags: impl IntoIterator<Item = &'a Tag>) -> TagSet {
    tags.into_iter().map(|t| Tag::new(t.facet())).collect()
}
