//! Property-based tests for the rollup engine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use motortrack_shared::types::MotorcycleId;

use crate::entity::{Motorcycle, MotorcycleStatus};
use crate::rollup::allocation::AllocationUtil;
use crate::rollup::engine::{LiquidationStatus, RollupEngine};
use crate::testing::{cash_advance, motorcycle};

/// Strategy for generating any motorcycle status.
fn arb_status() -> impl Strategy<Value = MotorcycleStatus> {
    proptest::sample::select(MotorcycleStatus::ALL.to_vec())
}

/// Strategy for generating centavo amounts up to 10 million pesos.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn fleet(statuses: &[MotorcycleStatus]) -> Vec<Motorcycle> {
    statuses.iter().map(|s| motorcycle(*s)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Splitting never loses or creates a centavo.
    #[test]
    fn prop_split_sums_to_total(total in arb_amount(), count in 1usize..50) {
        let shares = AllocationUtil::split_evenly(total, count);
        prop_assert_eq!(shares.len(), count);
        prop_assert_eq!(shares.iter().copied().sum::<Decimal>(), total);
    }

    /// Shares differ by at most one centavo.
    #[test]
    fn prop_split_is_even(total in arb_amount(), count in 1usize..50) {
        let shares = AllocationUtil::split_evenly(total, count);
        let max = shares.iter().copied().max().unwrap_or_default();
        let min = shares.iter().copied().min().unwrap_or_default();
        prop_assert!(max - min <= Decimal::new(1, 2));
    }

    /// allocate_amount summed over the funded units equals the advance.
    #[test]
    fn prop_allocations_sum_to_amount(total in arb_amount(), count in 1usize..30) {
        let ids: Vec<MotorcycleId> = (0..count).map(|_| MotorcycleId::new()).collect();
        let ca = cash_advance(total, &ids);
        let sum: Decimal = ids
            .iter()
            .filter_map(|id| RollupEngine::allocate_amount(&ca, *id))
            .sum();
        prop_assert_eq!(sum, total);
    }

    /// Recomputing without mutation yields the same status.
    #[test]
    fn prop_liquidation_status_idempotent(
        statuses in proptest::collection::vec(arb_status(), 0..12)
    ) {
        let units = fleet(&statuses);
        let ids: Vec<MotorcycleId> = units.iter().map(|m| m.id).collect();
        let ca = cash_advance(Decimal::new(250_000, 2), &ids);

        let first = RollupEngine::compute_liquidation_status(&ca, &units);
        let second = RollupEngine::compute_liquidation_status(&ca, &units);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, RollupEngine::rollup(&ca, &units).liquidation_status);
    }

    /// The derived status matches the liquidated count.
    #[test]
    fn prop_liquidation_status_matches_counts(
        statuses in proptest::collection::vec(arb_status(), 0..12)
    ) {
        let units = fleet(&statuses);
        let ids: Vec<MotorcycleId> = units.iter().map(|m| m.id).collect();
        let ca = cash_advance(Decimal::new(250_000, 2), &ids);

        let liquidated = statuses.iter().filter(|s| s.is_liquidated()).count();
        let expected = if liquidated == 0 {
            LiquidationStatus::Pending
        } else if liquidated == statuses.len() {
            LiquidationStatus::FullyLiquidated
        } else {
            LiquidationStatus::PartiallyLiquidated
        };
        prop_assert_eq!(RollupEngine::compute_liquidation_status(&ca, &units), expected);
    }
}
