//! Partition planning: how many workers a round launches and how large each
//! worker's database is

use serde::{Deserialize, Serialize};

use crate::constants::MAX_SIZE_EXPONENT;
use crate::{Error, Result, Strategy};

/// Reject size exponents the planner formulas are not defined for
///
/// `0` would launch no workers (and divides by zero for the balanced split);
/// anything above [`MAX_SIZE_EXPONENT`] overflows the node count.
pub fn validate_size_exponent(exponent: u32) -> Result<()> {
    if exponent == 0 || exponent > MAX_SIZE_EXPONENT {
        return Err(Error::InvalidSizeExponent {
            exponent,
            max: MAX_SIZE_EXPONENT,
        });
    }
    Ok(())
}

/// Per-worker item counts for one benchmark round
///
/// The plan is fully determined by the strategy and the size exponent, and
/// every count is positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionPlan {
    pub strategy: Strategy,
    pub size_exponent: u32,
    item_counts: Vec<u64>,
}

impl PartitionPlan {
    /// Plan a round, validating the size exponent first
    pub fn new(strategy: Strategy, size_exponent: u32) -> Result<Self> {
        validate_size_exponent(size_exponent)?;

        let k = u64::from(size_exponent);
        let leaves = 1u64 << k;
        let item_counts = match strategy {
            Strategy::WholeTree => vec![2 * leaves - 1; size_exponent as usize],
            Strategy::PerLayer => (1..=size_exponent)
                .rev()
                .map(|i| 1u64 << i)
                .collect(),
            Strategy::BalancedPartition => {
                vec![(2 * leaves - 2).div_ceil(k); size_exponent as usize]
            }
        };

        Ok(Self {
            strategy,
            size_exponent,
            item_counts,
        })
    }

    /// Number of workers the round launches
    pub fn worker_count(&self) -> usize {
        self.item_counts.len()
    }

    /// Item count of each worker, in spawn order
    pub fn item_counts(&self) -> &[u64] {
        &self.item_counts
    }

    /// Items summed over all workers
    pub fn total_items(&self) -> u64 {
        self.item_counts.iter().sum()
    }

    /// Largest single worker database, which bounds the round's latency
    pub fn max_items(&self) -> u64 {
        self.item_counts.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Strategy;
    use proptest::prelude::*;

    #[test]
    fn test_whole_tree_example() {
        let plan = PartitionPlan::new(Strategy::WholeTree, 3).unwrap();
        assert_eq!(plan.worker_count(), 3);
        assert_eq!(plan.item_counts(), &[15, 15, 15]);
    }

    #[test]
    fn test_per_layer_example() {
        let plan = PartitionPlan::new(Strategy::PerLayer, 4).unwrap();
        assert_eq!(plan.item_counts(), &[16, 8, 4, 2]);
        assert_eq!(plan.total_items(), 30);
        assert_eq!(plan.max_items(), 16);
    }

    #[test]
    fn test_balanced_example() {
        let plan = PartitionPlan::new(Strategy::BalancedPartition, 4).unwrap();
        assert_eq!(plan.item_counts(), &[8, 8, 8, 8]);
    }

    #[test]
    fn test_smallest_tree() {
        assert_eq!(
            PartitionPlan::new(Strategy::WholeTree, 1)
                .unwrap()
                .item_counts(),
            &[3]
        );
        assert_eq!(
            PartitionPlan::new(Strategy::PerLayer, 1)
                .unwrap()
                .item_counts(),
            &[2]
        );
        assert_eq!(
            PartitionPlan::new(Strategy::BalancedPartition, 1)
                .unwrap()
                .item_counts(),
            &[2]
        );
    }

    #[test]
    fn test_zero_exponent_rejected() {
        for strategy in Strategy::ALL {
            assert!(matches!(
                PartitionPlan::new(strategy, 0),
                Err(Error::InvalidSizeExponent { exponent: 0, .. })
            ));
        }
    }

    #[test]
    fn test_oversized_exponent_rejected() {
        assert!(validate_size_exponent(MAX_SIZE_EXPONENT).is_ok());
        assert!(validate_size_exponent(MAX_SIZE_EXPONENT + 1).is_err());
    }

    proptest! {
        #[test]
        fn worker_count_is_exponent(k in 1u32..=MAX_SIZE_EXPONENT) {
            for strategy in Strategy::ALL {
                let plan = PartitionPlan::new(strategy, k).unwrap();
                prop_assert_eq!(plan.worker_count(), k as usize);
                prop_assert!(plan.item_counts().iter().all(|&c| c > 0));
            }
        }

        #[test]
        fn per_layer_descends_by_powers_of_two(k in 1u32..=MAX_SIZE_EXPONENT) {
            let plan = PartitionPlan::new(Strategy::PerLayer, k).unwrap();
            let expected: Vec<u64> = (1..=k).rev().map(|i| 2u64.pow(i)).collect();
            prop_assert_eq!(plan.item_counts(), expected.as_slice());
        }

        #[test]
        fn balanced_covers_every_layer(k in 1u32..=MAX_SIZE_EXPONENT) {
            let plan = PartitionPlan::new(Strategy::BalancedPartition, k).unwrap();
            let nodes_below_root = 2 * 2u64.pow(k) - 2;
            let share = plan.item_counts()[0];
            prop_assert!(plan.item_counts().iter().all(|&c| c == share));
            prop_assert!(share * u64::from(k) >= nodes_below_root);
            prop_assert!((share - 1) * u64::from(k) < nodes_below_root);
        }

        #[test]
        fn whole_tree_holds_every_node(k in 1u32..=MAX_SIZE_EXPONENT) {
            let plan = PartitionPlan::new(Strategy::WholeTree, k).unwrap();
            prop_assert!(plan.item_counts().iter().all(|&c| c == 2u64.pow(k + 1) - 1));
        }
    }
}
