//! Aggregation and rollup of cash advances over their motorcycles.
//!
//! Everything here is derived on read from the current motorcycle
//! statuses. Nothing computed by this module is ever persisted.
//!
//! # Modules
//!
//! - `allocation` - Even split of an advance with exact-sum rounding
//! - `fees` - Static per-unit fee schedule used as the fallback advance
//! - `engine` - Liquidation status and per-unit allocation rollups

pub mod allocation;
pub mod engine;
pub mod fees;

#[cfg(test)]
mod props;

pub use allocation::AllocationUtil;
pub use engine::{Allocation, CashAdvanceRollup, LiquidationStatus, RollupEngine};
pub use fees::FeeSchedule;
