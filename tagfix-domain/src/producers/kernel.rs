use super::{Proposal, ProducerMeta, RuleProducer, bundle};
use tagfix_sources::{BinPackages, SourceKind, SourceSet};

/// Per section, the first matching name prefix picks the tag bundle.
const KERNEL_RULES: &[(&str, &[(&str, &[&str])])] = &[
    (
        "devel",
        &[
            (
                "linux-headers-",
                &[
                    "admin::kernel",
                    "devel::lang:c",
                    "devel::library",
                    "implemented-in::c",
                    "role::devel-lib",
                ],
            ),
            (
                "linux-kbuild-",
                &[
                    "admin::kernel",
                    "implemented-in::c",
                    "implemented-in::perl",
                    "implemented-in::shell",
                ],
            ),
            (
                "linux-source-",
                &["admin::kernel", "implemented-in::c", "role::source"],
            ),
            (
                "linux-support-",
                &[
                    "admin::kernel",
                    "devel::lang:c",
                    "devel::library",
                    "implemented-in::c",
                    "role::devel-lib",
                ],
            ),
            (
                "linux-tree-",
                &["admin::kernel", "role::dummy", "special::meta"],
            ),
        ],
    ),
    (
        "doc",
        &[
            (
                "linux-doc-",
                &["admin::kernel", "made-of::html", "role::documentation"],
            ),
            (
                "linux-manual-",
                &["admin::kernel", "made-of::man", "role::documentation"],
            ),
        ],
    ),
    (
        "admin",
        &[
            ("linux-image-", &["admin::kernel", "implemented-in::c"]),
            ("linux-patch-", &["admin::kernel", "role::source"]),
        ],
    ),
];

/// Fixed tag bundles for kernel packages.
pub struct KernelProducer<'a> {
    binpackages: &'a BinPackages,
}

impl<'a> KernelProducer<'a> {
    pub const META: ProducerMeta = ProducerMeta {
        name: "kernel",
        description: "Tag bundles for linux-* packages in the devel, doc and admin sections",
        needs: &[SourceKind::BinPackages],
    };

    pub fn create(sources: &'a SourceSet) -> Option<Self> {
        Some(Self {
            binpackages: sources.binpackages.as_ref()?,
        })
    }
}

impl RuleProducer for KernelProducer<'_> {
    fn meta(&self) -> ProducerMeta {
        Self::META
    }

    fn produce(&self) -> Box<dyn Iterator<Item = Proposal> + '_> {
        let bin = self.binpackages;
        Box::new(KERNEL_RULES.iter().flat_map(move |(section, rules)| {
            bin.in_section(section)
                .iter()
                .filter_map(move |p| {
                    rules
                        .iter()
                        .find(|(prefix, _)| p.name.starts_with(*prefix))
                        .map(|(_, tags)| Proposal::add(&p.name, bundle(tags)))
                })
        }))
    }
}
