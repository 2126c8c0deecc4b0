//! Dashboard data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::{CashAdvanceStatus, MotorcycleStatus};

/// Dashboard summary response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Motorcycle counts per status, in lifecycle order.
    pub motorcycles_by_status: Vec<StatusCount<MotorcycleStatus>>,
    /// Cash advance counts per status.
    pub cash_advances_by_status: Vec<StatusCount<CashAdvanceStatus>>,
    /// Number of motorcycles tracked.
    pub total_motorcycles: usize,
    /// Number of cash advances tracked.
    pub total_cash_advances: usize,
    /// Amount advanced, excluding rejected requests.
    pub total_advanced: Decimal,
    /// Amount advanced but not yet liquidated.
    pub total_outstanding: Decimal,
    /// Cash advances waiting for approval.
    pub pending_approvals: usize,
    /// Liquidations waiting for verification.
    pub awaiting_verification: usize,
}

/// Number of entities in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount<S> {
    /// The status.
    pub status: S,
    /// Entities currently in it.
    pub count: usize,
}
