//! Even allocation of an advance across its motorcycles.
//!
//! Uses the largest remainder method so that the allocations always sum to
//! exactly the advanced amount: every unit gets the rounded-down share and
//! the leftover centavos go one each to the first units in request order.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Money is allocated to the centavo.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Allocation utility for splitting advances.
pub struct AllocationUtil;

impl AllocationUtil {
    /// Split `total` evenly across `count` units at centavo precision.
    ///
    /// Returns an empty vector when `count` is zero. The sum of the result
    /// equals `total` rounded to two decimal places.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use motortrack_core::rollup::AllocationUtil;
    ///
    /// // 100 / 3 = [33.34, 33.33, 33.33]
    /// let shares = AllocationUtil::split_evenly(dec!(100), 3);
    /// assert_eq!(shares.iter().sum::<rust_decimal::Decimal>(), dec!(100));
    /// ```
    #[must_use]
    pub fn split_evenly(total: Decimal, count: usize) -> Vec<Decimal> {
        if count == 0 {
            return vec![];
        }

        let total_rounded = total
            .round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven);
        if count == 1 {
            return vec![total_rounded];
        }

        let count_dec = Decimal::from(count as u64);
        let unit = Decimal::new(1, MONEY_DECIMAL_PLACES);

        let base = (total_rounded / count_dec)
            .round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::ToZero);
        let remainder = total_rounded - base * count_dec;

        let extra_count = (remainder / unit)
            .round_dp_with_strategy(0, RoundingStrategy::ToZero)
            .to_u64()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);

        (0..count)
            .map(|i| if i < extra_count { base + unit } else { base })
            .collect()
    }

    /// Returns the share at position `index` without materialising every share.
    #[must_use]
    pub fn share_at(total: Decimal, count: usize, index: usize) -> Option<Decimal> {
        if index >= count {
            return None;
        }
        Self::split_evenly(total, count).get(index).copied()
    }
}
