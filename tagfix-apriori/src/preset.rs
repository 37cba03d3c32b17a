use serde::{Deserialize, Serialize};
use tagfix_types::Rule;

/// Post-filter applied to every parsed rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFilter {
    AcceptAll,
    /// Keep rules whose confidence is strictly below the bound.
    ConfidenceBelow(f64),
}

impl RuleFilter {
    pub fn accepts(&self, rule: &Rule) -> bool {
        match self {
            RuleFilter::AcceptAll => true,
            RuleFilter::ConfidenceBelow(bound) => rule.confidence < *bound,
        }
    }
}

/// Parameters passed to the miner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningParams {
    /// Positive: percentage of transactions. Negative: absolute transaction count.
    pub min_support: f64,
    /// Minimum rule confidence, in percent.
    pub min_confidence: f64,
    /// Maximum rule size, antecedents and consequent together.
    pub max_rule_size: u32,
    #[serde(default)]
    pub extra_args: Vec<String>,
    pub filter: RuleFilter,
}

impl MiningParams {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            format!("-s{}", self.min_support),
            format!("-c{}", self.min_confidence),
            format!("-n{}", self.max_rule_size),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Named parameter sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MiningPreset {
    /// Frequent, high-confidence positive associations.
    #[default]
    Standard,
    /// Rare co-occurrences: "this almost never happens".
    NegativeAssociation,
}

impl MiningPreset {
    pub fn params(self) -> MiningParams {
        match self {
            MiningPreset::Standard => MiningParams {
                min_support: -30.0,
                min_confidence: 90.0,
                max_rule_size: 3,
                extra_args: vec![],
                filter: RuleFilter::AcceptAll,
            },
            MiningPreset::NegativeAssociation => MiningParams {
                min_support: -20.0,
                min_confidence: 0.0,
                max_rule_size: 3,
                extra_args: vec!["-en".to_string(), "-d0.7".to_string()],
                filter: RuleFilter::ConfidenceBelow(1.0),
            },
        }
    }
}
