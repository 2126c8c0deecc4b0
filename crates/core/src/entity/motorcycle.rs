//! Motorcycle units and their lifecycle status.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use motortrack_shared::types::{CashAdvanceId, EndorsementId, MotorcycleId};

use super::document::{Document, DocumentType, REGISTRATION_REQUIREMENTS};

/// Motorcycle status in the registration workflow.
///
/// Declared in lifecycle order. The order is not a strict chain: documents
/// branch between `LackingRequirements` and `ReadyToRegister`, endorsement
/// branches between the two endorsed states, and a returned liquidation
/// goes back from `ForVerification` to `ForLiquidation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MotorcycleStatus {
    /// Sold, no registration documents received yet.
    Incomplete,
    /// Some registration documents received, others missing.
    #[serde(rename = "Lacking Requirements")]
    LackingRequirements,
    /// All registration documents on file.
    #[serde(rename = "Ready to Register")]
    ReadyToRegister,
    /// Handed to a liaison while documents are still missing.
    #[serde(rename = "Endorsed - Incomplete")]
    EndorsedIncomplete,
    /// Handed to a liaison with complete documents.
    #[serde(rename = "Endorsed - Ready")]
    EndorsedReady,
    /// Included in a cash advance request.
    Processing,
    /// Forwarded by the liaison for cash advance approval.
    #[serde(rename = "For CA Approval")]
    ForCaApproval,
    /// Cash advance approved, waiting for a check voucher.
    #[serde(rename = "For CV Issuance")]
    ForCvIssuance,
    /// Check voucher released to the liaison.
    #[serde(rename = "Released CVs")]
    ReleasedCvs,
    /// LTO processing done, receipts to be liquidated.
    #[serde(rename = "For Liquidation")]
    ForLiquidation,
    /// Liquidation submitted, waiting for accounting.
    #[serde(rename = "For Verification")]
    ForVerification,
    /// Liquidation verified by accounting.
    Completed,
    /// OR/CR and plate released to the customer.
    Registered,
    /// A registration document has expired.
    #[serde(rename = "For Renewal")]
    ForRenewal,
}

impl MotorcycleStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 14] = [
        Self::Incomplete,
        Self::LackingRequirements,
        Self::ReadyToRegister,
        Self::EndorsedIncomplete,
        Self::EndorsedReady,
        Self::Processing,
        Self::ForCaApproval,
        Self::ForCvIssuance,
        Self::ReleasedCvs,
        Self::ForLiquidation,
        Self::ForVerification,
        Self::Completed,
        Self::Registered,
        Self::ForRenewal,
    ];

    /// Returns the display label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incomplete => "Incomplete",
            Self::LackingRequirements => "Lacking Requirements",
            Self::ReadyToRegister => "Ready to Register",
            Self::EndorsedIncomplete => "Endorsed - Incomplete",
            Self::EndorsedReady => "Endorsed - Ready",
            Self::Processing => "Processing",
            Self::ForCaApproval => "For CA Approval",
            Self::ForCvIssuance => "For CV Issuance",
            Self::ReleasedCvs => "Released CVs",
            Self::ForLiquidation => "For Liquidation",
            Self::ForVerification => "For Verification",
            Self::Completed => "Completed",
            Self::Registered => "Registered",
            Self::ForRenewal => "For Renewal",
        }
    }

    /// Parses a status label, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(needle))
    }

    /// True once the unit's liquidation has been submitted.
    ///
    /// This is the single liquidation-complete marker used by every rollup.
    #[must_use]
    pub fn is_liquidated(&self) -> bool {
        matches!(
            self,
            Self::ForVerification | Self::Completed | Self::Registered | Self::ForRenewal
        )
    }

    /// True once accounting has verified the liquidation.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Completed | Self::Registered | Self::ForRenewal)
    }

    /// True while the unit is still with the store (not yet endorsed).
    #[must_use]
    pub fn is_in_store(&self) -> bool {
        matches!(
            self,
            Self::Incomplete | Self::LackingRequirements | Self::ReadyToRegister
        )
    }
}

impl fmt::Display for MotorcycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Buyer of the unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Full name.
    pub name: String,
    /// Home address.
    #[serde(default)]
    pub address: Option<String>,
    /// Contact number.
    #[serde(default)]
    pub contact_number: Option<String>,
}

/// Liquidation of the advance spent on one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidationDetails {
    /// Cash advance that funded the unit, if any.
    pub parent_ca_id: Option<CashAdvanceId>,
    /// Portion of the advance allocated to the unit.
    pub allocated_advance: Decimal,
    /// LTO official receipt number.
    pub lto_or_number: String,
    /// Amount on the LTO official receipt.
    pub lto_or_amount: Decimal,
    /// LTO processing fee paid.
    pub lto_process_fee: Decimal,
    /// `lto_or_amount + lto_process_fee`.
    pub total_liquidation: Decimal,
    /// `allocated_advance - total_liquidation`; negative means a shortage.
    pub shortage_overage: Decimal,
    /// Free-form remarks from the liaison.
    pub remarks: Option<String>,
    /// Liaison who submitted the liquidation.
    pub submitted_by: String,
    /// When the liquidation was submitted.
    pub submitted_at: DateTime<Utc>,
    /// Accounting staff who verified it.
    pub verified_by: Option<String>,
    /// When it was verified.
    pub verified_at: Option<DateTime<Utc>>,
    /// Why accounting sent it back, if it was returned.
    pub returned_reason: Option<String>,
}

/// A motorcycle unit moving through registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Motorcycle {
    /// Unique identifier.
    pub id: MotorcycleId,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: u16,
    /// Body color.
    pub color: String,
    /// Plate number, assigned at registration.
    pub plate_number: Option<String>,
    /// Engine number (unique).
    pub engine_number: String,
    /// Chassis number (unique).
    pub chassis_number: String,
    /// Buyer of the unit.
    pub customer: Customer,
    /// Date of sale.
    pub date_sold: Option<NaiveDate>,
    /// Current workflow status.
    pub status: MotorcycleStatus,
    /// Attached documents, oldest first.
    pub documents: Vec<Document>,
    /// Endorsement that handed the unit to a liaison.
    pub endorsement_id: Option<EndorsementId>,
    /// Present once liquidation has been submitted.
    pub liquidation: Option<LiquidationDetails>,
    /// Optimistic concurrency stamp, bumped on every commit.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Motorcycle {
    /// Returns true if a document of `doc_type` is on file.
    #[must_use]
    pub fn has_document(&self, doc_type: DocumentType) -> bool {
        self.documents.iter().any(|d| d.doc_type == doc_type)
    }

    /// Registration documents still missing, in requirement order.
    #[must_use]
    pub fn missing_requirements(&self) -> Vec<DocumentType> {
        REGISTRATION_REQUIREMENTS
            .into_iter()
            .filter(|required| !self.has_document(*required))
            .collect()
    }

    /// Returns true if every registration document is on file.
    #[must_use]
    pub fn has_complete_requirements(&self) -> bool {
        self.missing_requirements().is_empty()
    }

    /// Documents expired at `as_of`, ignoring types renewed by a later valid document.
    #[must_use]
    pub fn expired_documents(&self, as_of: DateTime<Utc>) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|d| d.is_expired(as_of))
            .filter(|expired| {
                !self.documents.iter().any(|other| {
                    other.doc_type == expired.doc_type
                        && other.uploaded_at > expired.uploaded_at
                        && !other.is_expired(as_of)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(status: MotorcycleStatus) -> Motorcycle {
        let now = Utc::now();
        Motorcycle {
            id: MotorcycleId::new(),
            make: "Honda".to_string(),
            model: "Click 125i".to_string(),
            year: 2024,
            color: "Red".to_string(),
            plate_number: None,
            engine_number: "KZR-100".to_string(),
            chassis_number: "MH1-100".to_string(),
            customer: Customer {
                name: "Ana Santos".to_string(),
                ..Customer::default()
            },
            date_sold: None,
            status,
            documents: vec![],
            endorsement_id: None,
            liquidation: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_labels_parse_back() {
        for status in MotorcycleStatus::ALL {
            assert_eq!(MotorcycleStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(
            MotorcycleStatus::parse("endorsed - ready"),
            Some(MotorcycleStatus::EndorsedReady)
        );
        assert_eq!(MotorcycleStatus::parse("For Review"), None);
    }

    #[test]
    fn test_status_serde_matches_label() {
        for status in MotorcycleStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_liquidated_marker() {
        let liquidated: Vec<_> = MotorcycleStatus::ALL
            .into_iter()
            .filter(MotorcycleStatus::is_liquidated)
            .collect();
        assert_eq!(
            liquidated,
            vec![
                MotorcycleStatus::ForVerification,
                MotorcycleStatus::Completed,
                MotorcycleStatus::Registered,
                MotorcycleStatus::ForRenewal,
            ]
        );
        assert!(!MotorcycleStatus::ForVerification.is_verified());
        assert!(MotorcycleStatus::Completed.is_verified());
    }

    #[test]
    fn test_missing_requirements() {
        let now = Utc::now();
        let mut unit = sample(MotorcycleStatus::Incomplete);
        assert_eq!(unit.missing_requirements().len(), 5);

        unit.documents.push(Document::new(DocumentType::Csr, None, now, None));
        unit.documents.push(Document::new(DocumentType::Coc, None, now, None));
        assert_eq!(
            unit.missing_requirements(),
            vec![
                DocumentType::Insurance,
                DocumentType::HpgControlForm,
                DocumentType::SalesInvoice
            ]
        );
        assert!(!unit.has_complete_requirements());
    }

    #[test]
    fn test_expired_documents_ignore_renewed() {
        let now = Utc::now();
        let mut unit = sample(MotorcycleStatus::Registered);
        unit.documents.push(Document::new(
            DocumentType::Insurance,
            None,
            now - Duration::days(400),
            Some(now - Duration::days(35)),
        ));
        assert_eq!(unit.expired_documents(now).len(), 1);

        unit.documents.push(Document::new(
            DocumentType::Insurance,
            None,
            now - Duration::days(30),
            Some(now + Duration::days(335)),
        ));
        assert!(unit.expired_documents(now).is_empty());
    }
}
