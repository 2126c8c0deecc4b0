//! Renewal scan over registered motorcycles.
//!
//! Produces the list consumed by the renewal notification flow: every
//! current document of a registered unit that has expired or will expire
//! within the window. A document superseded by a newer one of the same type
//! is not reported.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use motortrack_shared::types::MotorcycleId;

use crate::entity::{Document, DocumentType, Motorcycle, MotorcycleStatus};

/// Default look-ahead of the renewal scan.
pub const DEFAULT_RENEWAL_WINDOW_DAYS: i64 = 30;

/// Longest look-ahead of the renewal scan.
pub const MAX_RENEWAL_WINDOW_DAYS: i64 = 3650;

/// Look-ahead for `days`, clamped to `0..=MAX_RENEWAL_WINDOW_DAYS`.
#[must_use]
pub fn renewal_window(days: i64) -> Duration {
    Duration::days(days.clamp(0, MAX_RENEWAL_WINDOW_DAYS))
}

/// A document needing renewal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalNotice {
    /// Unit the document belongs to.
    pub motorcycle_id: MotorcycleId,
    /// Plate number of the unit.
    pub plate_number: Option<String>,
    /// Registered owner.
    pub customer_name: String,
    /// Current unit status.
    pub status: MotorcycleStatus,
    /// Document type.
    pub document_type: DocumentType,
    /// Expiry of the document.
    pub expires_at: DateTime<Utc>,
    /// True when already expired at scan time.
    pub expired: bool,
}

/// List documents of registered units expiring within `window` of `as_of`.
///
/// Notices are ordered by expiry, soonest first.
#[must_use]
pub fn scan_renewals(
    motorcycles: &[Motorcycle],
    as_of: DateTime<Utc>,
    window: Duration,
) -> Vec<RenewalNotice> {
    let mut notices: Vec<RenewalNotice> = motorcycles
        .iter()
        .filter(|m| matches!(m.status, MotorcycleStatus::Registered | MotorcycleStatus::ForRenewal))
        .flat_map(move |unit| {
            unit.documents
                .iter()
                .filter(move |doc| doc.expires_within(as_of, window))
                .filter(move |doc| !is_superseded(unit, doc))
                .filter_map(move |doc| {
                    doc.expires_at.map(|expires_at| RenewalNotice {
                        motorcycle_id: unit.id,
                        plate_number: unit.plate_number.clone(),
                        customer_name: unit.customer.name.clone(),
                        status: unit.status,
                        document_type: doc.doc_type,
                        expires_at,
                        expired: doc.is_expired(as_of),
                    })
                })
        })
        .collect();

    notices.sort_by_key(|n| n.expires_at);
    notices
}

fn is_superseded(unit: &Motorcycle, doc: &Document) -> bool {
    unit.documents
        .iter()
        .any(|other| other.doc_type == doc.doc_type && other.uploaded_at > doc.uploaded_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::motorcycle;

    #[test]
    fn test_scan_reports_expiring_and_expired() {
        let now = Utc::now();
        let mut soon = motorcycle(MotorcycleStatus::Registered);
        soon.documents.push(Document::new(
            DocumentType::Insurance,
            None,
            now - Duration::days(355),
            Some(now + Duration::days(10)),
        ));
        let mut lapsed = motorcycle(MotorcycleStatus::ForRenewal);
        lapsed.documents.push(Document::new(
            DocumentType::OrCr,
            None,
            now - Duration::days(400),
            Some(now - Duration::days(35)),
        ));
        let mut far = motorcycle(MotorcycleStatus::Registered);
        far.documents.push(Document::new(
            DocumentType::Insurance,
            None,
            now,
            Some(now + Duration::days(200)),
        ));

        let notices = scan_renewals(&[soon.clone(), lapsed.clone(), far], now, Duration::days(30));

        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].motorcycle_id, lapsed.id);
        assert!(notices[0].expired);
        assert_eq!(notices[1].motorcycle_id, soon.id);
        assert!(!notices[1].expired);
    }

    #[test]
    fn test_scan_skips_superseded_and_unregistered() {
        let now = Utc::now();
        let mut renewed = motorcycle(MotorcycleStatus::Registered);
        renewed.documents.push(Document::new(
            DocumentType::Insurance,
            None,
            now - Duration::days(400),
            Some(now - Duration::days(30)),
        ));
        renewed.documents.push(Document::new(
            DocumentType::Insurance,
            None,
            now - Duration::days(29),
            Some(now + Duration::days(336)),
        ));
        let mut in_process = motorcycle(MotorcycleStatus::Processing);
        in_process.documents.push(Document::new(
            DocumentType::Insurance,
            None,
            now - Duration::days(400),
            Some(now - Duration::days(1)),
        ));

        assert!(scan_renewals(&[renewed, in_process], now, Duration::days(30)).is_empty());
    }
}
