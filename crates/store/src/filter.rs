//! Query filters for entity listings.

use serde::Deserialize;

use motortrack_core::entity::{CashAdvance, CashAdvanceStatus, Motorcycle, MotorcycleStatus};
use motortrack_shared::types::{EndorsementId, MotorcycleId};

/// Filter over motorcycles. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotorcycleFilter {
    /// Match any of these statuses.
    pub statuses: Vec<MotorcycleStatus>,
    /// Match units in this endorsement.
    pub endorsement_id: Option<EndorsementId>,
    /// Case-insensitive substring over make, model, plate, engine, chassis and customer.
    pub search: Option<String>,
}

impl MotorcycleFilter {
    /// Filter on a single status.
    #[must_use]
    pub fn status(status: MotorcycleStatus) -> Self {
        Self {
            statuses: vec![status],
            ..Self::default()
        }
    }

    /// Returns true if `unit` passes the filter.
    #[must_use]
    pub fn matches(&self, unit: &Motorcycle) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&unit.status) {
            return false;
        }
        if self.endorsement_id.is_some() && unit.endorsement_id != self.endorsement_id {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                [
                    Some(unit.make.as_str()),
                    Some(unit.model.as_str()),
                    unit.plate_number.as_deref(),
                    Some(unit.engine_number.as_str()),
                    Some(unit.chassis_number.as_str()),
                    Some(unit.customer.name.as_str()),
                ]
                .into_iter()
                .flatten()
                .any(|haystack| haystack.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Filter over cash advances. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CashAdvanceFilter {
    /// Match any of these statuses.
    pub statuses: Vec<CashAdvanceStatus>,
    /// Match advances funding this motorcycle.
    pub motorcycle_id: Option<MotorcycleId>,
    /// Case-insensitive match on personnel.
    pub personnel: Option<String>,
}

impl CashAdvanceFilter {
    /// Returns true if `ca` passes the filter.
    #[must_use]
    pub fn matches(&self, ca: &CashAdvance) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&ca.status) {
            return false;
        }
        if let Some(id) = self.motorcycle_id
            && !ca.funds(id)
        {
            return false;
        }
        self.personnel
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .is_none_or(|p| ca.personnel.eq_ignore_ascii_case(p))
    }
}
