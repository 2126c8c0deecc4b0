//! Cash advances funding LTO processing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use motortrack_shared::types::{CashAdvanceId, MotorcycleId};

/// Cash advance status.
///
/// - Pending → Approved (approve) | Rejected (reject)
/// - Approved → CV Issued (issueCV)
/// - CV Issued → Check Voucher Released (releaseCV)
/// - Check Voucher Released → Liquidated (liquidate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CashAdvanceStatus {
    /// Requested by the liaison.
    Pending,
    /// Approved by accounting.
    Approved,
    /// Check voucher prepared by the cashier.
    #[serde(rename = "CV Issued")]
    CvIssued,
    /// Check voucher handed to the liaison.
    #[serde(rename = "Check Voucher Released")]
    CvReleased,
    /// Every funded unit liquidated and verified.
    Liquidated,
    /// Refused by accounting.
    Rejected,
}

impl CashAdvanceStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Approved,
        Self::CvIssued,
        Self::CvReleased,
        Self::Liquidated,
        Self::Rejected,
    ];

    /// Returns the display label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::CvIssued => "CV Issued",
            Self::CvReleased => "Check Voucher Released",
            Self::Liquidated => "Liquidated",
            Self::Rejected => "Rejected",
        }
    }

    /// Parses a status label, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(needle))
    }

    /// True while money is out with the liaison and not yet accounted for.
    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        !matches!(self, Self::Liquidated | Self::Rejected)
    }
}

impl fmt::Display for CashAdvanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Funds advanced to a liaison for the LTO fees of a set of motorcycles.
///
/// The funded units are referenced by id only; their statuses drive the
/// derived liquidation status, which is never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashAdvance {
    /// Unique identifier.
    pub id: CashAdvanceId,
    /// Personnel receiving the advance.
    pub personnel: String,
    /// Purpose of the advance.
    pub purpose: String,
    /// Requested amount.
    pub amount: Decimal,
    /// Date of the request.
    pub date: NaiveDate,
    /// Current status.
    pub status: CashAdvanceStatus,
    /// Funded motorcycles, in request order.
    pub motorcycle_ids: Vec<MotorcycleId>,
    /// Check voucher number once issued.
    pub check_voucher_number: Option<String>,
    /// Date the check voucher was released.
    pub check_voucher_release_date: Option<NaiveDate>,
    /// Accounting staff who approved the request.
    pub approved_by: Option<String>,
    /// When the request was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// Reason given on rejection.
    pub rejection_reason: Option<String>,
    /// When the advance was closed as liquidated.
    pub liquidated_at: Option<DateTime<Utc>>,
    /// Who created the request.
    pub created_by: String,
    /// Optimistic concurrency stamp, bumped on every commit.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl CashAdvance {
    /// Returns true if `motorcycle_id` is funded by this advance.
    #[must_use]
    pub fn funds(&self, motorcycle_id: MotorcycleId) -> bool {
        self.motorcycle_ids.contains(&motorcycle_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_parse_back() {
        for status in CashAdvanceStatus::ALL {
            assert_eq!(CashAdvanceStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(
            CashAdvanceStatus::parse("check voucher released"),
            Some(CashAdvanceStatus::CvReleased)
        );
        assert_eq!(CashAdvanceStatus::parse("Encashed"), None);
    }

    #[test]
    fn test_outstanding() {
        assert!(CashAdvanceStatus::Pending.is_outstanding());
        assert!(CashAdvanceStatus::CvReleased.is_outstanding());
        assert!(!CashAdvanceStatus::Liquidated.is_outstanding());
        assert!(!CashAdvanceStatus::Rejected.is_outstanding());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&CashAdvanceStatus::CvIssued).unwrap();
        assert_eq!(json, "\"CV Issued\"");
    }
}
