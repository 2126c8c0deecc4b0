//! Liquidation status and allocation rollups.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use motortrack_shared::types::{CashAdvanceId, MotorcycleId};

use crate::entity::{CashAdvance, Motorcycle};
use crate::rollup::allocation::AllocationUtil;
use crate::rollup::fees::FeeSchedule;

/// Liquidation progress of a cash advance, derived from its motorcycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiquidationStatus {
    /// No funded unit has been liquidated.
    Pending,
    /// Some, but not all, funded units have been liquidated.
    #[serde(rename = "Partially Liquidated")]
    PartiallyLiquidated,
    /// Every funded unit has been liquidated.
    #[serde(rename = "Fully Liquidated")]
    FullyLiquidated,
}

impl LiquidationStatus {
    /// Returns the display label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::PartiallyLiquidated => "Partially Liquidated",
            Self::FullyLiquidated => "Fully Liquidated",
        }
    }
}

impl fmt::Display for LiquidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Share of an advance allocated to one motorcycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    /// Funded motorcycle.
    pub motorcycle_id: MotorcycleId,
    /// Allocated amount.
    pub amount: Decimal,
}

/// Read-time aggregate of a cash advance over its motorcycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashAdvanceRollup {
    /// The cash advance summarised.
    pub cash_advance_id: CashAdvanceId,
    /// Derived liquidation status.
    pub liquidation_status: LiquidationStatus,
    /// Number of ids in `motorcycle_ids`.
    pub referenced_count: usize,
    /// Number of those ids found in the store.
    pub resolved_count: usize,
    /// Resolved units whose liquidation has been submitted.
    pub liquidated_count: usize,
    /// Resolved units whose liquidation has been verified.
    pub verified_count: usize,
    /// Referenced ids that did not resolve.
    pub missing_motorcycle_ids: Vec<MotorcycleId>,
    /// Even split of the advance, in request order.
    pub allocations: Vec<Allocation>,
    /// Sum of liquidation totals over liquidated units.
    pub total_liquidation: Decimal,
    /// Sum of shortage/overage over liquidated units.
    pub total_shortage_overage: Decimal,
    /// Set when the advance references units but none of them resolve.
    pub aggregation_inconsistency: bool,
}

/// Stateless engine for cash advance rollups.
pub struct RollupEngine;

impl RollupEngine {
    /// Derive the liquidation status of `ca` from `motorcycles`.
    ///
    /// `motorcycles` may be any superset of the funded units; only units
    /// referenced by `ca.motorcycle_ids` are counted. Pure and idempotent.
    #[must_use]
    pub fn compute_liquidation_status(
        ca: &CashAdvance,
        motorcycles: &[Motorcycle],
    ) -> LiquidationStatus {
        let funded: Vec<&Motorcycle> = Self::resolve(ca, motorcycles).into_values().collect();
        let resolved = funded.len();
        let liquidated = funded.iter().filter(|m| m.status.is_liquidated()).count();

        Self::status_from_counts(resolved, liquidated)
    }

    fn status_from_counts(resolved: usize, liquidated: usize) -> LiquidationStatus {
        if liquidated == 0 {
            LiquidationStatus::Pending
        } else if liquidated == resolved {
            LiquidationStatus::FullyLiquidated
        } else {
            LiquidationStatus::PartiallyLiquidated
        }
    }

    /// Even split of `ca.amount` over `ca.motorcycle_ids`.
    #[must_use]
    pub fn allocations(ca: &CashAdvance) -> Vec<Allocation> {
        AllocationUtil::split_evenly(ca.amount, ca.motorcycle_ids.len())
            .into_iter()
            .zip(&ca.motorcycle_ids)
            .map(|(amount, id)| Allocation {
                motorcycle_id: *id,
                amount,
            })
            .collect()
    }

    /// Share of `ca` allocated to `motorcycle_id`.
    ///
    /// Returns `None` when the unit is not funded by `ca`, which includes
    /// every unit when `ca.motorcycle_ids` is empty.
    #[must_use]
    pub fn allocate_amount(ca: &CashAdvance, motorcycle_id: MotorcycleId) -> Option<Decimal> {
        let index = ca.motorcycle_ids.iter().position(|id| *id == motorcycle_id)?;
        AllocationUtil::share_at(ca.amount, ca.motorcycle_ids.len(), index)
    }

    /// Advance attributed to a unit: its share of `parent`, or the fee
    /// schedule default when no cash advance funds it.
    #[must_use]
    pub fn allocated_advance(
        parent: Option<&CashAdvance>,
        motorcycle_id: MotorcycleId,
        fees: &FeeSchedule,
    ) -> Decimal {
        parent
            .and_then(|ca| Self::allocate_amount(ca, motorcycle_id))
            .unwrap_or_else(|| fees.default_advance())
    }

    /// Full rollup of `ca` over `motorcycles`.
    #[must_use]
    pub fn rollup(ca: &CashAdvance, motorcycles: &[Motorcycle]) -> CashAdvanceRollup {
        let resolved = Self::resolve(ca, motorcycles);

        let missing_motorcycle_ids: Vec<MotorcycleId> = ca
            .motorcycle_ids
            .iter()
            .filter(|id| !resolved.contains_key(*id))
            .copied()
            .collect();

        let liquidated_count = resolved.values().filter(|m| m.status.is_liquidated()).count();
        let verified_count = resolved.values().filter(|m| m.status.is_verified()).count();

        let (total_liquidation, total_shortage_overage) = resolved
            .values()
            .filter(|m| m.status.is_liquidated())
            .filter_map(|m| m.liquidation.as_ref())
            .fold((Decimal::ZERO, Decimal::ZERO), |(total, diff), l| {
                (total + l.total_liquidation, diff + l.shortage_overage)
            });

        let aggregation_inconsistency = !ca.motorcycle_ids.is_empty() && resolved.is_empty();
        if aggregation_inconsistency {
            warn!(
                cash_advance_id = %ca.id,
                referenced = ca.motorcycle_ids.len(),
                "Cash advance references no existing motorcycles"
            );
        }

        CashAdvanceRollup {
            cash_advance_id: ca.id,
            liquidation_status: Self::status_from_counts(resolved.len(), liquidated_count),
            referenced_count: ca.motorcycle_ids.len(),
            resolved_count: resolved.len(),
            liquidated_count,
            verified_count,
            missing_motorcycle_ids,
            allocations: Self::allocations(ca),
            total_liquidation,
            total_shortage_overage,
            aggregation_inconsistency,
        }
    }

    fn resolve<'a>(
        ca: &CashAdvance,
        motorcycles: &'a [Motorcycle],
    ) -> HashMap<MotorcycleId, &'a Motorcycle> {
        motorcycles
            .iter()
            .filter(|m| ca.funds(m.id))
            .map(|m| (m.id, m))
            .collect()
    }
}
