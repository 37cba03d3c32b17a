use crate::check::{Level, Violation, ViolationData};
use crate::engine::CheckEngine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tagfix_types::schema::TAGFIX_CHECK_V1;

/// Machine readable outcome of a check run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub schema: String,
    pub tool: ReportToolInfo,
    pub run: ReportRunInfo,
    pub packages_checked: u64,
    /// Per check id, only for checks that fired.
    pub counts: BTreeMap<u32, CheckCount>,
    #[serde(default)]
    pub violations: Vec<ViolationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRunInfo {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckCount {
    pub name: String,
    pub level: Level,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub check_id: u32,
    pub package: String,
    pub level: Level,
    pub message: String,
    pub data: ViolationData,
    /// Suggested fix in patch syntax.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl CheckReport {
    pub fn new(
        tool: ReportToolInfo,
        run: ReportRunInfo,
        engine: &CheckEngine<'_>,
        packages_checked: u64,
        violations: &[Violation],
    ) -> Self {
        let mut counts: BTreeMap<u32, CheckCount> = BTreeMap::new();
        let mut records = Vec::with_capacity(violations.len());
        for v in violations {
            let Some(check) = engine.registry().get(v.check_id) else {
                continue;
            };
            let meta = check.meta();
            counts
                .entry(meta.id)
                .or_insert_with(|| CheckCount {
                    name: meta.name.to_string(),
                    level: meta.level,
                    count: 0,
                })
                .count += 1;
            records.push(ViolationRecord {
                check_id: meta.id,
                package: v.package.clone(),
                level: meta.level,
                message: check.format(&v.data),
                data: v.data.clone(),
                fix: check.suggested_fix(&v.data).map(|p| p.to_string()),
            });
        }
        Self {
            schema: TAGFIX_CHECK_V1.to_string(),
            tool,
            run,
            packages_checked,
            counts,
            violations: records,
        }
    }

    /// Violations at [`Level::Check`]; hints do not count.
    pub fn failures(&self) -> u64 {
        self.counts
            .values()
            .filter(|c| c.level == Level::Check)
            .map(|c| c.count)
            .sum()
    }
}
