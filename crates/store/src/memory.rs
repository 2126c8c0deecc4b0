//! In-memory entity store.
//!
//! Records live in ordered maps keyed by their time-ordered ids, behind a
//! single `RwLock`. A commit validates the whole change set under the write
//! lock before writing anything, which makes it all-or-nothing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Display;
use tokio::sync::RwLock;
use tracing::debug;

use motortrack_core::entity::{CashAdvance, CashAdvanceStatus, Endorsement, Motorcycle};
use motortrack_core::workflow::EntityKind;
use motortrack_shared::types::{CashAdvanceId, EndorsementId, MotorcycleId};

use crate::error::StoreError;
use crate::filter::{CashAdvanceFilter, MotorcycleFilter};
use crate::repository::{ChangeSet, EntityStore};

#[derive(Debug, Clone, Default)]
struct Tables {
    motorcycles: BTreeMap<MotorcycleId, Motorcycle>,
    cash_advances: BTreeMap<CashAdvanceId, CashAdvance>,
    endorsements: BTreeMap<EndorsementId, Endorsement>,
}

impl Tables {
    fn apply(&mut self, mut changes: ChangeSet) -> Result<ChangeSet, StoreError> {
        self.validate(&changes)?;

        for unit in &mut changes.motorcycles {
            unit.version += 1;
            self.motorcycles.insert(unit.id, unit.clone());
        }
        for ca in &mut changes.cash_advances {
            ca.version += 1;
            self.cash_advances.insert(ca.id, ca.clone());
        }
        for endorsement in &mut changes.endorsements {
            endorsement.version += 1;
            self.endorsements.insert(endorsement.id, endorsement.clone());
        }

        Ok(changes)
    }

    fn validate(&self, changes: &ChangeSet) -> Result<(), StoreError> {
        let mut ids = HashSet::new();
        for unit in &changes.motorcycles {
            if !ids.insert(unit.id.into_inner()) {
                return Err(duplicate_in_change_set(EntityKind::Motorcycle, unit.id));
            }
            check_version(
                EntityKind::Motorcycle,
                unit.id,
                unit.version,
                self.motorcycles.get(&unit.id).map(|m| m.version),
            )?;
        }
        for ca in &changes.cash_advances {
            if !ids.insert(ca.id.into_inner()) {
                return Err(duplicate_in_change_set(EntityKind::CashAdvance, ca.id));
            }
            check_version(
                EntityKind::CashAdvance,
                ca.id,
                ca.version,
                self.cash_advances.get(&ca.id).map(|c| c.version),
            )?;
        }
        for endorsement in &changes.endorsements {
            if !ids.insert(endorsement.id.into_inner()) {
                return Err(duplicate_in_change_set(EntityKind::Endorsement, endorsement.id));
            }
            check_version(
                EntityKind::Endorsement,
                endorsement.id,
                endorsement.version,
                self.endorsements.get(&endorsement.id).map(|e| e.version),
            )?;
        }

        self.check_unique_identifiers(&changes.motorcycles)?;
        self.check_parent_references(changes)
    }

    fn check_unique_identifiers(&self, changed: &[Motorcycle]) -> Result<(), StoreError> {
        if changed.is_empty() {
            return Ok(());
        }

        let changed_ids: HashSet<MotorcycleId> = changed.iter().map(|m| m.id).collect();
        let after_commit = self
            .motorcycles
            .values()
            .filter(|m| !changed_ids.contains(&m.id))
            .chain(changed);

        let mut seen: HashMap<(&'static str, String), MotorcycleId> = HashMap::new();
        for unit in after_commit {
            for (field, value) in registration_identifiers(unit) {
                if let Some(owner) = seen.insert((field, normalize(value)), unit.id)
                    && owner != unit.id
                {
                    return Err(StoreError::UniqueViolation {
                        field,
                        value: value.trim().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_parent_references(&self, changes: &ChangeSet) -> Result<(), StoreError> {
        for unit in &changes.motorcycles {
            let Some(parent_id) = unit.liquidation.as_ref().and_then(|l| l.parent_ca_id) else {
                continue;
            };
            let parent = changes
                .cash_advances
                .iter()
                .find(|ca| ca.id == parent_id)
                .or_else(|| self.cash_advances.get(&parent_id));

            if !parent.is_some_and(|ca| ca.funds(unit.id)) {
                return Err(StoreError::ReferentialViolation(format!(
                    "motorcycle {} names cash advance {parent_id} which does not fund it",
                    unit.id
                )));
            }
        }
        Ok(())
    }
}

fn check_version(
    entity: EntityKind,
    id: impl Display,
    version: u64,
    stored: Option<u64>,
) -> Result<(), StoreError> {
    match (version, stored) {
        (0, None) => Ok(()),
        (_, None) => Err(StoreError::NotFound {
            entity,
            id: id.to_string(),
        }),
        (expected, Some(found)) if expected == found => Ok(()),
        (expected, Some(found)) => Err(StoreError::VersionConflict {
            entity,
            id: id.to_string(),
            expected,
            found,
        }),
    }
}

fn duplicate_in_change_set(entity: EntityKind, id: impl Display) -> StoreError {
    StoreError::ReferentialViolation(format!("{entity} {id} appears twice in one commit"))
}

fn registration_identifiers(unit: &Motorcycle) -> impl Iterator<Item = (&'static str, &str)> {
    [
        Some(("engineNumber", unit.engine_number.as_str())),
        Some(("chassisNumber", unit.chassis_number.as_str())),
        unit.plate_number.as_deref().map(|p| ("plateNumber", p)),
    ]
    .into_iter()
    .flatten()
    .filter(|(_, value)| !value.trim().is_empty())
}

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Entity store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `seed`.
    ///
    /// The seed goes through the same validation as any commit.
    pub fn seeded(seed: ChangeSet) -> Result<Self, StoreError> {
        let mut tables = Tables::default();
        tables.apply(seed)?;
        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    /// Replace the whole contents with `seed`.
    pub async fn reset(&self, seed: ChangeSet) -> Result<(), StoreError> {
        let mut fresh = Tables::default();
        fresh.apply(seed)?;
        *self.tables.write().await = fresh;
        Ok(())
    }

    /// Remove every record.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn get_motorcycle(&self, id: MotorcycleId) -> Result<Option<Motorcycle>, StoreError> {
        Ok(self.tables.read().await.motorcycles.get(&id).cloned())
    }

    async fn get_motorcycles(&self, ids: &[MotorcycleId]) -> Result<Vec<Motorcycle>, StoreError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.motorcycles.get(id).cloned())
            .collect())
    }

    async fn list_motorcycles(
        &self,
        filter: &MotorcycleFilter,
    ) -> Result<Vec<Motorcycle>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .motorcycles
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    async fn get_cash_advance(
        &self,
        id: CashAdvanceId,
    ) -> Result<Option<CashAdvance>, StoreError> {
        Ok(self.tables.read().await.cash_advances.get(&id).cloned())
    }

    async fn list_cash_advances(
        &self,
        filter: &CashAdvanceFilter,
    ) -> Result<Vec<CashAdvance>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .cash_advances
            .values()
            .filter(|ca| filter.matches(ca))
            .cloned()
            .collect())
    }

    async fn find_cash_advance_for(
        &self,
        motorcycle_id: MotorcycleId,
    ) -> Result<Option<CashAdvance>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .cash_advances
            .values()
            .rev()
            .find(|ca| ca.status != CashAdvanceStatus::Rejected && ca.funds(motorcycle_id))
            .cloned())
    }

    async fn get_endorsement(
        &self,
        id: EndorsementId,
    ) -> Result<Option<Endorsement>, StoreError> {
        Ok(self.tables.read().await.endorsements.get(&id).cloned())
    }

    async fn list_endorsements(&self) -> Result<Vec<Endorsement>, StoreError> {
        Ok(self.tables.read().await.endorsements.values().cloned().collect())
    }

    async fn commit(&self, changes: ChangeSet) -> Result<ChangeSet, StoreError> {
        let mut tables = self.tables.write().await;
        let committed = tables.apply(changes)?;
        debug!(
            motorcycles = committed.motorcycles.len(),
            cash_advances = committed.cash_advances.len(),
            endorsements = committed.endorsements.len(),
            "Committed change set"
        );
        Ok(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use motortrack_core::entity::{Customer, MotorcycleStatus};

    fn unit(engine: &str, chassis: &str) -> Motorcycle {
        let now = Utc::now();
        Motorcycle {
            id: MotorcycleId::new(),
            make: "Suzuki".to_string(),
            model: "Raider 150".to_string(),
            year: 2023,
            color: "Blue".to_string(),
            plate_number: None,
            engine_number: engine.to_string(),
            chassis_number: chassis.to_string(),
            customer: Customer {
                name: "Ben Cruz".to_string(),
                ..Customer::default()
            },
            date_sold: None,
            status: MotorcycleStatus::Incomplete,
            documents: vec![],
            endorsement_id: None,
            liquidation: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_then_update_bumps_version() {
        let store = InMemoryStore::new();
        let committed = store
            .commit(ChangeSet::motorcycle(unit("E-1", "C-1")))
            .await
            .unwrap();
        let mut stored = committed.motorcycles[0].clone();
        assert_eq!(stored.version, 1);

        stored.status = MotorcycleStatus::LackingRequirements;
        let committed = store.commit(ChangeSet::motorcycle(stored.clone())).await.unwrap();
        assert_eq!(committed.motorcycles[0].version, 2);

        let err = store.commit(ChangeSet::motorcycle(stored)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionConflict { expected: 1, found: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_update_of_missing_record_is_not_found() {
        let store = InMemoryStore::new();
        let mut ghost = unit("E-1", "C-1");
        ghost.version = 3;
        let err = store.commit(ChangeSet::motorcycle(ghost)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_registration_identifiers_are_unique() {
        let store = InMemoryStore::new();
        store.commit(ChangeSet::motorcycle(unit("E-1", "C-1"))).await.unwrap();

        let err = store
            .commit(ChangeSet::motorcycle(unit(" e-1 ", "C-2")))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::UniqueViolation {
                field: "engineNumber",
                value: "e-1".to_string(),
            }
        );
        assert_eq!(store.list_motorcycles(&MotorcycleFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let mut stale = unit("E-9", "C-9");
        stale.version = 5;
        let changes = ChangeSet {
            motorcycles: vec![unit("E-1", "C-1"), stale],
            ..ChangeSet::default()
        };

        assert!(store.commit(changes).await.is_err());
        assert!(store.list_motorcycles(&MotorcycleFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filters() {
        let mut a = unit("E-1", "C-1");
        a.plate_number = Some("NCR 1234".to_string());
        let mut b = unit("E-2", "C-2");
        b.status = MotorcycleStatus::ReadyToRegister;
        let store = InMemoryStore::seeded(ChangeSet {
            motorcycles: vec![a, b],
            ..ChangeSet::default()
        })
        .unwrap();

        let ready = store
            .list_motorcycles(&MotorcycleFilter::status(MotorcycleStatus::ReadyToRegister))
            .await
            .unwrap();
        assert_eq!(ready.len(), 1);

        let by_plate = store
            .list_motorcycles(&MotorcycleFilter {
                search: Some("ncr".to_string()),
                ..MotorcycleFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_plate.len(), 1);
        assert_eq!(by_plate[0].plate_number.as_deref(), Some("NCR 1234"));
    }

    #[tokio::test]
    async fn test_reset_and_clear() {
        let store = InMemoryStore::new();
        store
            .reset(ChangeSet::motorcycle(unit("E-1", "C-1")))
            .await
            .unwrap();
        assert_eq!(store.list_motorcycles(&MotorcycleFilter::default()).await.unwrap().len(), 1);

        store.clear().await;
        assert!(store.list_motorcycles(&MotorcycleFilter::default()).await.unwrap().is_empty());
    }
}
