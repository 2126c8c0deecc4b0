//! Static fee schedule.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use motortrack_shared::config::WorkflowSettings;

/// Per-unit LTO fees advanced to a liaison.
///
/// Used as the advance of a unit that no cash advance funds, and by the
/// offline draft generator to size a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// LTO processing fee.
    pub processing_fee: Decimal,
    /// Official receipt fee.
    pub or_fee: Decimal,
}

impl FeeSchedule {
    /// Creates a fee schedule.
    #[must_use]
    pub const fn new(processing_fee: Decimal, or_fee: Decimal) -> Self {
        Self {
            processing_fee,
            or_fee,
        }
    }

    /// Default advance for one unit: `processing_fee + or_fee`.
    #[must_use]
    pub fn default_advance(&self) -> Decimal {
        self.processing_fee + self.or_fee
    }

    /// Advance needed for `units` motorcycles.
    #[must_use]
    pub fn advance_for(&self, units: usize) -> Decimal {
        self.default_advance() * Decimal::from(units as u64)
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::from(&WorkflowSettings::default())
    }
}

impl From<&WorkflowSettings> for FeeSchedule {
    fn from(settings: &WorkflowSettings) -> Self {
        Self::new(settings.processing_fee, settings.or_fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_advance() {
        let fees = FeeSchedule::new(dec!(1500), dec!(1000));
        assert_eq!(fees.default_advance(), dec!(2500));
        assert_eq!(fees.advance_for(3), dec!(7500));
        assert_eq!(fees.advance_for(0), dec!(0));
    }

    #[test]
    fn test_from_settings() {
        assert_eq!(FeeSchedule::default().default_advance(), dec!(2500));
    }
}
