use crate::check::Check;
use crate::checks::builtin_checks;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("check id {id} already in use by {existing}, cannot register {name}")]
    DuplicateCheckId {
        id: u32,
        existing: &'static str,
        name: &'static str,
    },
}

/// Checks indexed by id. Built once and handed to whoever runs checks.
pub struct CheckRegistry {
    checks: BTreeMap<u32, Box<dyn Check>>,
}

impl CheckRegistry {
    pub fn new(checks: Vec<Box<dyn Check>>) -> Result<Self, RegistryError> {
        let mut map: BTreeMap<u32, Box<dyn Check>> = BTreeMap::new();
        for check in checks {
            let meta = check.meta();
            if let Some(existing) = map.get(&meta.id) {
                return Err(RegistryError::DuplicateCheckId {
                    id: meta.id,
                    existing: existing.meta().name,
                    name: meta.name,
                });
            }
            map.insert(meta.id, check);
        }
        Ok(Self { checks: map })
    }

    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(builtin_checks())
    }

    pub fn get(&self, id: u32) -> Option<&dyn Check> {
        self.checks.get(&id).map(|c| c.as_ref())
    }

    /// Checks in id order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Check> {
        self.checks.values().map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{CheckMeta, Level, ViolationData};
    use tagfix_types::TagSet;

    struct Dummy(u32, &'static str);

    impl Check for Dummy {
        fn meta(&self) -> CheckMeta {
            CheckMeta {
                id: self.0,
                name: self.1,
                short_description: "dummy",
                long_description: None,
                level: Level::Check,
            }
        }

        fn check_tags(&self, _tags: &TagSet) -> Vec<ViolationData> {
            vec![]
        }

        fn format(&self, _data: &ViolationData) -> String {
            String::new()
        }
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let err = CheckRegistry::new(vec![Box::new(Dummy(1, "a")), Box::new(Dummy(1, "b"))])
            .err()
            .unwrap();
        assert_eq!(
            err,
            RegistryError::DuplicateCheckId {
                id: 1,
                existing: "a",
                name: "b"
            }
        );
    }

    #[test]
    fn iterates_in_id_order() {
        let reg = CheckRegistry::new(vec![Box::new(Dummy(7, "late")), Box::new(Dummy(2, "early"))])
            .unwrap();
        let ids: Vec<u32> = reg.iter().map(|c| c.meta().id).collect();
        assert_eq!(ids, vec![2, 7]);
        assert!(reg.get(7).is_some());
        assert!(reg.get(3).is_none());
    }

    #[test]
    fn builtin_ids() {
        let reg = CheckRegistry::builtin().unwrap();
        let ids: Vec<u32> = reg.iter().map(|c| c.meta().id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 9, 10]);
    }
}
