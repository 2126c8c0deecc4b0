//! Dashboard metrics.
//!
//! The summary is a read-time aggregate like the cash advance rollup: it is
//! computed from the current entities and never stored.

pub mod types;

pub use types::*;

use rust_decimal::Decimal;

use crate::entity::{CashAdvance, CashAdvanceStatus, Motorcycle, MotorcycleStatus};

impl DashboardSummary {
    /// Summarise the given entities.
    #[must_use]
    pub fn compute(motorcycles: &[Motorcycle], cash_advances: &[CashAdvance]) -> Self {
        let motorcycles_by_status = MotorcycleStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: motorcycles.iter().filter(|m| m.status == status).count(),
            })
            .collect();

        let cash_advances_by_status = CashAdvanceStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: cash_advances.iter().filter(|ca| ca.status == status).count(),
            })
            .collect();

        let total_advanced = cash_advances
            .iter()
            .filter(|ca| ca.status != CashAdvanceStatus::Rejected)
            .map(|ca| ca.amount)
            .sum::<Decimal>();

        let total_outstanding = cash_advances
            .iter()
            .filter(|ca| ca.status.is_outstanding())
            .map(|ca| ca.amount)
            .sum::<Decimal>();

        Self {
            motorcycles_by_status,
            cash_advances_by_status,
            total_motorcycles: motorcycles.len(),
            total_cash_advances: cash_advances.len(),
            total_advanced,
            total_outstanding,
            pending_approvals: cash_advances
                .iter()
                .filter(|ca| ca.status == CashAdvanceStatus::Pending)
                .count(),
            awaiting_verification: motorcycles
                .iter()
                .filter(|m| m.status == MotorcycleStatus::ForVerification)
                .count(),
        }
    }

    /// Count of motorcycles in `status`.
    #[must_use]
    pub fn motorcycles_in(&self, status: MotorcycleStatus) -> usize {
        self.motorcycles_by_status
            .iter()
            .find(|c| c.status == status)
            .map_or(0, |c| c.count)
    }
}
