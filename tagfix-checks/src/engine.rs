use crate::check::{Check, Violation, ViolationData};
use crate::registry::CheckRegistry;
use tagfix_types::{PatchSet, TagDatabase, TagSet};
use tracing::debug;

/// Runs every registered check.
pub struct CheckEngine<'r> {
    registry: &'r CheckRegistry,
}

impl<'r> CheckEngine<'r> {
    pub fn new(registry: &'r CheckRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r CheckRegistry {
        self.registry
    }

    /// `(check, data)` for every violation on `tags`, in check id order.
    pub fn run(&self, tags: &TagSet) -> Vec<(&'r dyn Check, ViolationData)> {
        self.registry
            .iter()
            .flat_map(|check| {
                check
                    .check_tags(tags)
                    .into_iter()
                    .map(move |data| (check, data))
            })
            .collect()
    }

    pub fn check_package(&self, package: &str, tags: &TagSet) -> Vec<Violation> {
        self.run(tags)
            .into_iter()
            .map(|(check, data)| Violation {
                check_id: check.meta().id,
                package: package.to_string(),
                data,
            })
            .collect()
    }

    /// Violations for every package of `db`, in package order.
    pub fn check_database(&self, db: &TagDatabase) -> Vec<Violation> {
        let violations: Vec<Violation> = db
            .iter_packages_tags()
            .flat_map(|(pkg, tags)| self.check_package(pkg, tags))
            .collect();
        debug!(
            packages = db.package_count(),
            violations = violations.len(),
            "checked database"
        );
        violations
    }

    /// Human readable message for `violation`, if its check is registered.
    pub fn format(&self, violation: &Violation) -> Option<String> {
        self.registry
            .get(violation.check_id)
            .map(|c| c.format(&violation.data))
    }

    pub fn suggested_fix(&self, violation: &Violation) -> Option<tagfix_types::Patch> {
        self.registry
            .get(violation.check_id)
            .and_then(|c| c.suggested_fix(&violation.data))
    }

    /// Gather the suggested fixes into one patch set, in the order given.
    pub fn fixes(&self, violations: &[Violation]) -> PatchSet {
        let mut out = PatchSet::new();
        for v in violations {
            if let Some(fix) = self.suggested_fix(v) {
                out.add_entry(
                    &v.package,
                    fix.added().iter().cloned(),
                    fix.removed().iter().cloned(),
                );
            }
        }
        out
    }
}
