use crate::desc::split_description;
use crate::error::SourceLoadError;
use camino::Utf8Path;
use fs_err as fs;
use serde::Deserialize;
use std::collections::BTreeMap;
use tagfix_types::{Tag, TagSet};
use tracing::{info, warn};

/// A vocabulary record: either a facet or a tag, never both.
#[derive(Debug, Clone, Deserialize)]
struct VocabularyRecord {
    #[serde(default)]
    facet: Option<String>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetInfo {
    pub name: String,
    pub short_description: String,
    pub long_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub name: Tag,
    pub facet: String,
    pub short_description: String,
    pub long_description: String,
}

/// Facets and tags with their descriptions.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    facets: BTreeMap<String, FacetInfo>,
    tags: BTreeMap<Tag, TagInfo>,
}

impl Vocabulary {
    pub fn load(path: &Utf8Path) -> Result<Self, SourceLoadError> {
        info!(path = %path, "loading vocabulary");
        let contents = fs::read_to_string(path).map_err(|e| SourceLoadError::io(path, e))?;
        Self::parse_json(path, &contents)
    }

    fn parse_json(path: &Utf8Path, contents: &str) -> Result<Self, SourceLoadError> {
        let records: Vec<VocabularyRecord> =
            serde_json::from_str(contents).map_err(|e| SourceLoadError::json(path, e))?;
        Self::from_records(records)
    }

    fn from_records(records: Vec<VocabularyRecord>) -> Result<Self, SourceLoadError> {
        let mut voc = Self::default();
        for rec in records {
            let (short_description, long_description) =
                split_description(rec.description.as_deref().unwrap_or_default());
            if let Some(name) = rec.facet {
                voc.facets.insert(
                    name.clone(),
                    FacetInfo {
                        name,
                        short_description,
                        long_description,
                    },
                );
            } else if let Some(name) = rec.tag {
                let Some((facet, _)) = name.split_once("::") else {
                    // Legacy tag without a facet.
                    continue;
                };
                if !voc.facets.contains_key(facet) {
                    return Err(SourceLoadError::UnknownFacet {
                        facet: facet.to_string(),
                        tag: name,
                    });
                }
                let tag = Tag::new(&name);
                voc.tags.insert(
                    tag.clone(),
                    TagInfo {
                        name: tag,
                        facet: facet.to_string(),
                        short_description,
                        long_description,
                    },
                );
            } else {
                warn!("found a vocabulary record that is neither a facet nor a tag");
            }
        }
        Ok(voc)
    }

    pub fn facet(&self, name: &str) -> Option<&FacetInfo> {
        self.facets.get(name)
    }

    pub fn tag(&self, name: &str) -> Option<&TagInfo> {
        self.tags.get(name)
    }

    pub fn facets(&self) -> impl Iterator<Item = &FacetInfo> {
        self.facets.values()
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// All known tags, usable as a tag whitelist.
    pub fn tag_set(&self) -> TagSet {
        self.tags.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facets_must_precede_their_tags() {
        let voc = Vocabulary::parse_json(
            Utf8Path::new("vocabulary.json"),
            r#"[
                {"facet": "role", "description": "Role\n What the package is."},
                {"tag": "role::program", "description": "Program"},
                {"tag": "legacy-tag"},
                {"comment": "neither"}
            ]"#,
        )
        .unwrap();
        assert_eq!(voc.facet("role").unwrap().long_description, "What the package is.");
        assert_eq!(voc.tag("role::program").unwrap().facet, "role");
        assert!(!voc.has_tag("legacy-tag"));
        assert_eq!(voc.tag_set().len(), 1);
    }

    #[test]
    fn tag_with_unknown_facet_is_an_error() {
        let err = Vocabulary::parse_json(
            Utf8Path::new("vocabulary.json"),
            r#"[{"tag": "game::toys"}]"#,
        );
        assert!(matches!(err, Err(SourceLoadError::UnknownFacet { .. })));
    }
}
