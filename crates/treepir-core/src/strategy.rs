//! Workload partitioning strategies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// How retrieval work over the tree is split across workers
///
/// Every strategy launches one worker per tree layer (the size exponent);
/// they differ in how many items each worker's database holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Every worker queries a database holding the whole tree, O(2n)
    WholeTree,
    /// Worker i queries layer i of the tree only; the slowest layer dominates, O(n)
    PerLayer,
    /// Tree nodes split evenly across workers, O(n / log n)
    #[serde(rename = "balanced")]
    BalancedPartition,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::WholeTree,
        Strategy::PerLayer,
        Strategy::BalancedPartition,
    ];

    /// Menu selector for this strategy
    pub fn selector(&self) -> u32 {
        match self {
            Strategy::WholeTree => 1,
            Strategy::PerLayer => 2,
            Strategy::BalancedPartition => 3,
        }
    }

    /// Strategy for a menu selector, `None` for anything outside 1..=3
    pub fn from_selector(selector: u32) -> Option<Self> {
        Strategy::ALL.into_iter().find(|s| s.selector() == selector)
    }

    /// Menu line describing this strategy
    pub fn description(&self) -> &'static str {
        match self {
            Strategy::WholeTree => "Call PIR on the whole tree - O(2n)",
            Strategy::PerLayer => "Call PIR on each layer and wait for the slowest - O(n)",
            Strategy::BalancedPartition => "Call PIR on balanced partition - O(n/logn)",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::WholeTree => write!(f, "whole-tree"),
            Strategy::PerLayer => write!(f, "per-layer"),
            Strategy::BalancedPartition => write!(f, "balanced"),
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whole-tree" | "whole" | "1" => Ok(Strategy::WholeTree),
            "per-layer" | "layer" | "2" => Ok(Strategy::PerLayer),
            "balanced" | "balanced-partition" | "3" => Ok(Strategy::BalancedPartition),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_serialization() {
        assert_eq!(
            serde_json::to_string(&Strategy::WholeTree).unwrap(),
            "\"whole-tree\""
        );
        assert_eq!(
            serde_json::to_string(&Strategy::PerLayer).unwrap(),
            "\"per-layer\""
        );
        assert_eq!(
            serde_json::to_string(&Strategy::BalancedPartition).unwrap(),
            "\"balanced\""
        );
    }

    #[test]
    fn test_strategy_deserialization() {
        assert_eq!(
            serde_json::from_str::<Strategy>("\"per-layer\"").unwrap(),
            Strategy::PerLayer
        );
        assert_eq!(
            serde_json::from_str::<Strategy>("\"balanced\"").unwrap(),
            Strategy::BalancedPartition
        );
    }

    #[test]
    fn test_strategy_display_parses_back() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_selectors() {
        assert_eq!(Strategy::from_selector(1), Some(Strategy::WholeTree));
        assert_eq!(Strategy::from_selector(2), Some(Strategy::PerLayer));
        assert_eq!(
            Strategy::from_selector(3),
            Some(Strategy::BalancedPartition)
        );
        assert_eq!(Strategy::from_selector(0), None);
        assert_eq!(Strategy::from_selector(4), None);
    }

    #[test]
    fn test_unknown_strategy() {
        assert!(matches!(
            "diagonal".parse::<Strategy>(),
            Err(Error::UnknownStrategy(s)) if s == "diagonal"
        ));
    }
}
