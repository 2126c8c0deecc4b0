//! Endorsements: custody transfers of motorcycles from a store to a liaison.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use motortrack_shared::types::{EndorsementId, MotorcycleId};

/// A batch of motorcycles handed over to a liaison.
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endorsement {
    /// Unique identifier.
    pub id: EndorsementId,
    /// Date of the hand-over.
    pub transaction_date: NaiveDate,
    /// Liaison receiving the units.
    pub liaison_name: String,
    /// Store supervisor who created the endorsement.
    pub created_by: String,
    /// Free-form remarks.
    pub remarks: Option<String>,
    /// Endorsed motorcycles, in hand-over order.
    pub motorcycle_ids: Vec<MotorcycleId>,
    /// Optimistic concurrency stamp.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
