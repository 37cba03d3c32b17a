use crate::check::Check;
use tagfix_types::{Patch, Tag, TagSet};

mod equivs;
mod exclusive;
mod presence;

pub use equivs::HasEquivsCheck;
pub use exclusive::{DebugSymbolsCheck, ShlibsCheck};
pub use presence::{
    HasDevelLangCheck, HasGameCheck, HasImplementedInCheck, HasRoleCheck, HasUiToolkitCheck,
    IsReviewedCheck,
};

/// Every builtin check. Ids are unique; the registry enforces it.
pub fn builtin_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(HasRoleCheck),
        Box::new(HasUiToolkitCheck),
        Box::new(IsReviewedCheck),
        Box::new(HasImplementedInCheck),
        Box::new(HasDevelLangCheck),
        Box::new(HasEquivsCheck),
        Box::new(HasGameCheck),
        Box::new(DebugSymbolsCheck),
        Box::new(ShlibsCheck),
    ]
}

fn has_prefix(tags: &TagSet, prefix: &str) -> bool {
    tags.iter().any(|t| t.starts_with(prefix))
}

/// A patch removing every tag in `tags`.
fn removal(tags: &[Tag]) -> Option<Patch> {
    if tags.is_empty() {
        return None;
    }
    Some(Patch::from_parts(
        TagSet::new(),
        tags.iter().cloned().collect(),
    ))
}

/// `a, b, c` listing for messages.
fn join(tags: &[Tag]) -> String {
    tags.iter()
        .map(Tag::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
