//! Document attachments.
//!
//! Documents are append-only: once attached to a motorcycle they are never
//! edited. A renewal attaches a fresh document next to the expired one.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use motortrack_shared::types::DocumentId;

/// Kind of document attached to a motorcycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentType {
    /// Official Receipt / Certificate of Registration issued by the LTO.
    #[serde(rename = "OR/CR")]
    OrCr,
    /// Certificate of Conformity.
    #[serde(rename = "COC")]
    Coc,
    /// Compulsory third-party insurance.
    Insurance,
    /// Certificate of Stock Reported.
    #[serde(rename = "CSR")]
    Csr,
    /// PNP-HPG motor vehicle clearance form.
    #[serde(rename = "HPG Control Form")]
    HpgControlForm,
    /// Dealer sales invoice.
    #[serde(rename = "Sales Invoice")]
    SalesInvoice,
    /// Anything else.
    Other,
}

/// Documents that must be on file before a unit can be registered.
pub const REGISTRATION_REQUIREMENTS: [DocumentType; 5] = [
    DocumentType::Csr,
    DocumentType::Coc,
    DocumentType::Insurance,
    DocumentType::HpgControlForm,
    DocumentType::SalesInvoice,
];

impl DocumentType {
    /// Returns the display label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrCr => "OR/CR",
            Self::Coc => "COC",
            Self::Insurance => "Insurance",
            Self::Csr => "CSR",
            Self::HpgControlForm => "HPG Control Form",
            Self::SalesInvoice => "Sales Invoice",
            Self::Other => "Other",
        }
    }

    /// Parses a label, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "or/cr" | "orcr" => Some(Self::OrCr),
            "coc" => Some(Self::Coc),
            "insurance" => Some(Self::Insurance),
            "csr" => Some(Self::Csr),
            "hpg control form" | "hpg" => Some(Self::HpgControlForm),
            "sales invoice" => Some(Self::SalesInvoice),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed attachment with an optional expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier.
    pub id: DocumentId,
    /// Document kind.
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Reference number or file name.
    pub reference: Option<String>,
    /// When the document was received.
    pub uploaded_at: DateTime<Utc>,
    /// When the document stops being valid, if ever.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Creates a document received at `uploaded_at`.
    #[must_use]
    pub fn new(
        doc_type: DocumentType,
        reference: Option<String>,
        uploaded_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            doc_type,
            reference,
            uploaded_at,
            expires_at,
        }
    }

    /// True when the document has expired at `as_of`.
    #[must_use]
    pub fn is_expired(&self, as_of: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= as_of)
    }

    /// True when the document expires within `window` after `as_of` (or already has).
    #[must_use]
    pub fn expires_within(&self, as_of: DateTime<Utc>, window: Duration) -> bool {
        let Some(at) = self.expires_at else {
            return false;
        };
        // A horizon past the calendar covers every expiry.
        as_of.checked_add_signed(window).is_none_or(|horizon| at <= horizon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_round_trip_labels() {
        for doc_type in [
            DocumentType::OrCr,
            DocumentType::Coc,
            DocumentType::Insurance,
            DocumentType::Csr,
            DocumentType::HpgControlForm,
            DocumentType::SalesInvoice,
            DocumentType::Other,
        ] {
            assert_eq!(DocumentType::parse(doc_type.as_str()), Some(doc_type));
        }
        assert_eq!(DocumentType::parse("passport"), None);
    }

    #[test]
    fn test_document_type_serde_uses_labels() {
        let json = serde_json::to_string(&DocumentType::HpgControlForm).unwrap();
        assert_eq!(json, "\"HPG Control Form\"");
        let parsed: DocumentType = serde_json::from_str("\"OR/CR\"").unwrap();
        assert_eq!(parsed, DocumentType::OrCr);
    }

    #[test]
    fn test_expiry_checks() {
        let now = Utc::now();
        let doc = Document::new(
            DocumentType::Insurance,
            None,
            now - Duration::days(365),
            Some(now + Duration::days(10)),
        );
        assert!(!doc.is_expired(now));
        assert!(doc.is_expired(now + Duration::days(10)));
        assert!(doc.expires_within(now, Duration::days(30)));
        assert!(!doc.expires_within(now, Duration::days(5)));

        let permanent = Document::new(DocumentType::Csr, None, now, None);
        assert!(!permanent.is_expired(now + Duration::days(10_000)));
    }

    #[test]
    fn test_expires_within_past_the_calendar() {
        let now = Utc::now();
        let doc = Document::new(DocumentType::Insurance, None, now, Some(now + Duration::days(10)));
        assert!(doc.expires_within(DateTime::<Utc>::MAX_UTC, Duration::days(1)));
        assert!(doc.expires_within(now, Duration::MAX));

        let permanent = Document::new(DocumentType::Csr, None, now, None);
        assert!(!permanent.expires_within(now, Duration::MAX));
    }
}
