//! Entity store abstraction.

use async_trait::async_trait;

use motortrack_core::entity::{CashAdvance, Endorsement, Motorcycle};
use motortrack_shared::types::{CashAdvanceId, EndorsementId, MotorcycleId};

use crate::error::StoreError;
use crate::filter::{CashAdvanceFilter, MotorcycleFilter};

/// Records written together in one commit.
///
/// A record with `version == 0` is inserted; any other version must match
/// the stored one and is bumped on commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Motorcycles to insert or replace.
    pub motorcycles: Vec<Motorcycle>,
    /// Cash advances to insert or replace.
    pub cash_advances: Vec<CashAdvance>,
    /// Endorsements to insert.
    pub endorsements: Vec<Endorsement>,
}

impl ChangeSet {
    /// A change set holding one motorcycle.
    #[must_use]
    pub fn motorcycle(unit: Motorcycle) -> Self {
        Self {
            motorcycles: vec![unit],
            ..Self::default()
        }
    }

    /// Returns true if nothing would be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.motorcycles.is_empty() && self.cash_advances.is_empty() && self.endorsements.is_empty()
    }
}

/// Canonical storage of motorcycles, cash advances and endorsements.
///
/// Reads return snapshots. `commit` is all-or-nothing: either every record in
/// the change set is written or none is.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch a motorcycle.
    async fn get_motorcycle(&self, id: MotorcycleId) -> Result<Option<Motorcycle>, StoreError>;

    /// Fetch the motorcycles among `ids` that exist, in the order of `ids`.
    async fn get_motorcycles(&self, ids: &[MotorcycleId]) -> Result<Vec<Motorcycle>, StoreError>;

    /// List motorcycles matching `filter`, oldest first.
    async fn list_motorcycles(
        &self,
        filter: &MotorcycleFilter,
    ) -> Result<Vec<Motorcycle>, StoreError>;

    /// Fetch a cash advance.
    async fn get_cash_advance(&self, id: CashAdvanceId)
    -> Result<Option<CashAdvance>, StoreError>;

    /// List cash advances matching `filter`, oldest first.
    async fn list_cash_advances(
        &self,
        filter: &CashAdvanceFilter,
    ) -> Result<Vec<CashAdvance>, StoreError>;

    /// The newest non-rejected cash advance funding `motorcycle_id`.
    async fn find_cash_advance_for(
        &self,
        motorcycle_id: MotorcycleId,
    ) -> Result<Option<CashAdvance>, StoreError>;

    /// Fetch an endorsement.
    async fn get_endorsement(&self, id: EndorsementId)
    -> Result<Option<Endorsement>, StoreError>;

    /// List every endorsement, oldest first.
    async fn list_endorsements(&self) -> Result<Vec<Endorsement>, StoreError>;

    /// Write `changes` atomically, returning the records as stored.
    async fn commit(&self, changes: ChangeSet) -> Result<ChangeSet, StoreError>;
}
