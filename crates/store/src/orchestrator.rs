//! Workflow orchestrator: the only writer of the entity store.
//!
//! Every state-changing intent follows the same sequence:
//! 1. Consult the authorization gate.
//! 2. Take the per-entity locks the intent touches, in a fixed order.
//! 3. Re-read the entities and propose the transition.
//! 4. Commit the proposal as one change set.
//! 5. Recompute the rollup of the affected cash advance for the response.
//!
//! A failure at any step returns before the commit, so the store is never
//! partially mutated.

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, instrument, warn};

use motortrack_core::dashboard::DashboardSummary;
use motortrack_core::entity::{CashAdvance, Endorsement, Motorcycle, MotorcycleStatus};
use motortrack_core::generation::{
    CashAdvanceGenerator, GenerationError, GenerationRequest, parse_generated_draft,
};
use motortrack_core::renewal::{RenewalNotice, renewal_window, scan_renewals};
use motortrack_core::rollup::{CashAdvanceRollup, FeeSchedule, RollupEngine};
use motortrack_core::workflow::{
    AccessPolicy, Action, Actor, CashAdvanceDraft, DraftService, EndorsementDraft, EntityKind,
    EntityRef, MotorcycleIntake, TransitionContext, TransitionPayload, TransitionTable, View,
    WorkflowError,
};
use motortrack_shared::types::{
    CashAdvanceId, EndorsementId, MotorcycleId, PageRequest, PageResponse,
};

use crate::filter::{CashAdvanceFilter, MotorcycleFilter};
use crate::repository::{ChangeSet, EntityStore};

/// A cash advance together with its read-time rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashAdvanceView {
    /// The stored advance.
    #[serde(flatten)]
    pub cash_advance: CashAdvance,
    /// Derived liquidation status and allocations.
    pub rollup: CashAdvanceRollup,
}

/// Snapshot of the entity a transition targeted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entityType", content = "entity", rename_all = "camelCase")]
pub enum EntitySnapshot {
    /// A motorcycle.
    Motorcycle(Motorcycle),
    /// A cash advance.
    CashAdvance(CashAdvance),
}

/// Result of a committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    /// The targeted entity as committed.
    pub entity: EntitySnapshot,
    /// Other motorcycles changed in the same commit.
    pub cascaded: Vec<Motorcycle>,
    /// Rollup of the cash advance involved, if any.
    pub rollup: Option<CashAdvanceRollup>,
}

/// An endorsement with the units it transferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndorsementView {
    /// The stored endorsement.
    #[serde(flatten)]
    pub endorsement: Endorsement,
    /// Its units as currently stored.
    pub motorcycles: Vec<Motorcycle>,
}

/// Failure of a generated cash advance request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// The generator failed or answered with a malformed draft.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// The draft was well-formed but failed the creation guards.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum LockKey {
    CashAdvance(CashAdvanceId),
    Motorcycle(MotorcycleId),
}

/// State reported when a transition targets an endorsement.
const ENDORSEMENT_STATE: &str = "Created";

type LockRegistry = DashMap<LockKey, Arc<Mutex<()>>>;

/// Entity locks held by one intent.
///
/// Dropping the set releases the locks and prunes registry entries nobody
/// else is holding or waiting on, so the registry only tracks entities
/// with an intent in flight.
struct LockSet<'a> {
    registry: &'a LockRegistry,
    keys: Vec<LockKey>,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl Drop for LockSet<'_> {
    fn drop(&mut self) {
        self.guards.clear();
        for key in &self.keys {
            self.registry.remove_if(key, |_, mutex| Arc::strong_count(mutex) == 1);
        }
    }
}

/// Façade over the workflow for every read and write.
pub struct WorkflowOrchestrator {
    store: Arc<dyn EntityStore>,
    policy: AccessPolicy,
    fees: FeeSchedule,
    locks: LockRegistry,
}

impl WorkflowOrchestrator {
    /// Creates an orchestrator with the standard access policy.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, fees: FeeSchedule) -> Self {
        Self::with_policy(store, fees, AccessPolicy::standard())
    }

    /// Creates an orchestrator with a custom access policy.
    #[must_use]
    pub fn with_policy(
        store: Arc<dyn EntityStore>,
        fees: FeeSchedule,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            store,
            policy,
            fees,
            locks: DashMap::new(),
        }
    }

    /// The fee schedule in use.
    #[must_use]
    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Attempt `action` on an existing entity.
    ///
    /// # Returns
    /// * `Ok(TransitionOutcome)` with the committed entity and the rollup of its cash advance
    /// * `Err(WorkflowError::Unauthorized)` if the actor's role may not attempt the action
    /// * `Err(WorkflowError::NotFound)` if the entity does not exist
    /// * `Err(WorkflowError::InvalidTransition)` if the action is not legal from the current status
    /// * `Err(WorkflowError::GuardViolation)` if the payload fails the action's guards
    /// * `Err(WorkflowError::Conflict)` if a concurrent write won the race
    #[instrument(skip(self, payload), fields(actor = %actor.name, role = %actor.role))]
    pub async fn attempt_transition(
        &self,
        actor: &Actor,
        target: EntityRef,
        action: Action,
        payload: TransitionPayload,
    ) -> Result<TransitionOutcome, WorkflowError> {
        self.authorize(actor, action)?;

        match target {
            EntityRef::Motorcycle(id) => {
                self.transition_motorcycle(actor, id, action, &payload).await
            }
            EntityRef::CashAdvance(id) => {
                self.transition_cash_advance(actor, id, action, &payload).await
            }
            EntityRef::Endorsement(id) => {
                if self.store.get_endorsement(id).await?.is_none() {
                    return Err(WorkflowError::not_found(EntityKind::Endorsement, id));
                }
                // Endorsements carry no status and take no transitions.
                Err(WorkflowError::invalid_transition(
                    EntityKind::Endorsement,
                    ENDORSEMENT_STATE,
                    action,
                ))
            }
        }
    }

    /// Register a motorcycle received at the store.
    #[instrument(skip(self, intake), fields(actor = %actor.name))]
    pub async fn register_motorcycle(
        &self,
        actor: &Actor,
        intake: MotorcycleIntake,
    ) -> Result<Motorcycle, WorkflowError> {
        self.authorize(actor, Action::RegisterMotorcycle)?;

        let ctx = self.context(actor);
        let unit = DraftService::propose_motorcycle(&intake, &ctx)?;
        let mut committed = self.store.commit(ChangeSet::motorcycle(unit)).await?;

        let unit = committed
            .motorcycles
            .pop()
            .ok_or_else(|| WorkflowError::Store("commit returned no motorcycle".to_string()))?;
        info!(motorcycle_id = %unit.id, engine = %unit.engine_number, "Motorcycle registered");
        Ok(unit)
    }

    /// Endorse a batch of store units to a liaison.
    #[instrument(skip(self, draft), fields(actor = %actor.name))]
    pub async fn create_endorsement(
        &self,
        actor: &Actor,
        draft: EndorsementDraft,
    ) -> Result<EndorsementView, WorkflowError> {
        self.authorize(actor, Action::CreateEndorsement)?;

        let keys = draft.motorcycle_ids.iter().map(|id| LockKey::Motorcycle(*id)).collect();
        let _guards = self.lock(keys).await;

        let units = self.store.get_motorcycles(&draft.motorcycle_ids).await?;
        let proposal = DraftService::propose_endorsement(&draft, &units, &self.context(actor))?;

        let committed = self
            .store
            .commit(ChangeSet {
                motorcycles: proposal.motorcycles,
                endorsements: vec![proposal.endorsement],
                ..ChangeSet::default()
            })
            .await?;

        let endorsement = committed
            .endorsements
            .into_iter()
            .next()
            .ok_or_else(|| WorkflowError::Store("commit returned no endorsement".to_string()))?;

        info!(
            endorsement_id = %endorsement.id,
            liaison = %endorsement.liaison_name,
            units = endorsement.motorcycle_ids.len(),
            "Endorsement created"
        );

        Ok(EndorsementView {
            endorsement,
            motorcycles: committed.motorcycles,
        })
    }

    /// Create a cash advance from a draft.
    ///
    /// Manual and generated drafts go through the same guards.
    #[instrument(skip(self, draft), fields(actor = %actor.name, source = ?draft.source))]
    pub async fn create_cash_advance(
        &self,
        actor: &Actor,
        draft: CashAdvanceDraft,
    ) -> Result<CashAdvanceView, WorkflowError> {
        self.authorize(actor, Action::CreateCashAdvance)?;

        let keys = draft.motorcycle_ids.iter().map(|id| LockKey::Motorcycle(*id)).collect();
        let _guards = self.lock(keys).await;

        let units = self.store.get_motorcycles(&draft.motorcycle_ids).await?;
        let proposal = DraftService::propose_cash_advance(&draft, &units, &self.context(actor))?;

        let committed = self
            .store
            .commit(ChangeSet {
                motorcycles: proposal.motorcycles,
                cash_advances: vec![proposal.cash_advance],
                ..ChangeSet::default()
            })
            .await?;

        let cash_advance = committed
            .cash_advances
            .into_iter()
            .next()
            .ok_or_else(|| WorkflowError::Store("commit returned no cash advance".to_string()))?;

        info!(
            cash_advance_id = %cash_advance.id,
            amount = %cash_advance.amount,
            units = cash_advance.motorcycle_ids.len(),
            "Cash advance created"
        );

        let rollup = RollupEngine::rollup(&cash_advance, &committed.motorcycles);
        Ok(CashAdvanceView {
            cash_advance,
            rollup,
        })
    }

    /// Ask `generator` for a cash advance and create it.
    ///
    /// When `motorcycle_ids` is empty every `Endorsed - Ready` unit is
    /// included. The generated record is parsed as an untrusted draft and
    /// then created through [`Self::create_cash_advance`].
    #[instrument(skip(self, generator), fields(actor = %actor.name))]
    pub async fn generate_cash_advance(
        &self,
        actor: &Actor,
        generator: &dyn CashAdvanceGenerator,
        motorcycle_ids: Vec<MotorcycleId>,
        date: Option<NaiveDate>,
    ) -> Result<CashAdvanceView, DraftError> {
        self.authorize(actor, Action::CreateCashAdvance)?;

        let motorcycles = if motorcycle_ids.is_empty() {
            self.store
                .list_motorcycles(&MotorcycleFilter::status(MotorcycleStatus::EndorsedReady))
                .await
                .map_err(WorkflowError::from)?
        } else {
            self.store
                .get_motorcycles(&motorcycle_ids)
                .await
                .map_err(WorkflowError::from)?
        };

        let request = GenerationRequest {
            motorcycles,
            personnel: actor.name.clone(),
            date: date.unwrap_or_else(|| Utc::now().date_naive()),
        };

        let raw = generator.generate(&request).await.inspect_err(|e| {
            warn!(error = %e, "Cash advance generation failed");
        })?;
        let draft = parse_generated_draft(&raw).inspect_err(|e| {
            warn!(error = %e, "Generated cash advance rejected");
        })?;

        Ok(self.create_cash_advance(actor, draft).await?)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Fetch a motorcycle.
    pub async fn get_motorcycle(
        &self,
        actor: &Actor,
        id: MotorcycleId,
    ) -> Result<Motorcycle, WorkflowError> {
        self.authorize_view(actor, View::Motorcycles)?;
        self.store
            .get_motorcycle(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Motorcycle, id))
    }

    /// List motorcycles matching `filter`.
    pub async fn list_motorcycles(
        &self,
        actor: &Actor,
        filter: &MotorcycleFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Motorcycle>, WorkflowError> {
        self.authorize_view(actor, View::Motorcycles)?;
        let units = self.store.list_motorcycles(filter).await?;
        Ok(page.paginate(units))
    }

    /// Fetch a cash advance with its rollup.
    pub async fn get_cash_advance(
        &self,
        actor: &Actor,
        id: CashAdvanceId,
    ) -> Result<CashAdvanceView, WorkflowError> {
        self.authorize_view(actor, View::CashAdvances)?;
        let cash_advance = self
            .store
            .get_cash_advance(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::CashAdvance, id))?;
        let units = self.store.get_motorcycles(&cash_advance.motorcycle_ids).await?;
        let rollup = RollupEngine::rollup(&cash_advance, &units);
        Ok(CashAdvanceView {
            cash_advance,
            rollup,
        })
    }

    /// List cash advances matching `filter`, each with its rollup.
    pub async fn list_cash_advances(
        &self,
        actor: &Actor,
        filter: &CashAdvanceFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<CashAdvanceView>, WorkflowError> {
        self.authorize_view(actor, View::CashAdvances)?;
        let advances = self.store.list_cash_advances(filter).await?;
        let units = self.store.list_motorcycles(&MotorcycleFilter::default()).await?;

        let views = advances
            .into_iter()
            .map(|cash_advance| {
                let rollup = RollupEngine::rollup(&cash_advance, &units);
                CashAdvanceView {
                    cash_advance,
                    rollup,
                }
            })
            .collect();
        Ok(page.paginate(views))
    }

    /// Fetch an endorsement with its units.
    pub async fn get_endorsement(
        &self,
        actor: &Actor,
        id: EndorsementId,
    ) -> Result<EndorsementView, WorkflowError> {
        self.authorize_view(actor, View::Endorsements)?;
        let endorsement = self
            .store
            .get_endorsement(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Endorsement, id))?;
        let motorcycles = self.store.get_motorcycles(&endorsement.motorcycle_ids).await?;
        Ok(EndorsementView {
            endorsement,
            motorcycles,
        })
    }

    /// List endorsements.
    pub async fn list_endorsements(
        &self,
        actor: &Actor,
        page: &PageRequest,
    ) -> Result<PageResponse<Endorsement>, WorkflowError> {
        self.authorize_view(actor, View::Endorsements)?;
        Ok(page.paginate(self.store.list_endorsements().await?))
    }

    /// Dashboard summary over every entity.
    pub async fn dashboard(&self, actor: &Actor) -> Result<DashboardSummary, WorkflowError> {
        self.authorize_view(actor, View::Dashboard)?;
        let units = self.store.list_motorcycles(&MotorcycleFilter::default()).await?;
        let advances = self.store.list_cash_advances(&CashAdvanceFilter::default()).await?;
        Ok(DashboardSummary::compute(&units, &advances))
    }

    /// Documents of registered units expiring within `window_days` of `as_of`.
    pub async fn renewals(
        &self,
        actor: &Actor,
        as_of: DateTime<Utc>,
        window_days: i64,
    ) -> Result<Vec<RenewalNotice>, WorkflowError> {
        self.authorize_view(actor, View::Renewals)?;
        let filter = MotorcycleFilter {
            statuses: vec![MotorcycleStatus::Registered, MotorcycleStatus::ForRenewal],
            ..MotorcycleFilter::default()
        };
        let units = self.store.list_motorcycles(&filter).await?;
        Ok(scan_renewals(&units, as_of, renewal_window(window_days)))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn transition_motorcycle(
        &self,
        actor: &Actor,
        id: MotorcycleId,
        action: Action,
        payload: &TransitionPayload,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let parent_hint = self.store.find_cash_advance_for(id).await?;

        let mut keys = vec![LockKey::Motorcycle(id)];
        if let Some(ca) = &parent_hint {
            keys.push(LockKey::CashAdvance(ca.id));
        }
        let _guards = self.lock(keys).await;

        let current = self
            .store
            .get_motorcycle(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Motorcycle, id))?;
        if !action.is_direct() {
            return Err(WorkflowError::invalid_transition(
                EntityKind::Motorcycle,
                current.status,
                action,
            ));
        }
        let parent = match parent_hint {
            Some(ca) => self.store.get_cash_advance(ca.id).await?,
            None => None,
        };

        let ctx = self.context(actor);
        let proposed =
            TransitionTable::propose_motorcycle(&current, action, payload, parent.as_ref(), &ctx)?;

        let committed = self
            .store
            .commit(ChangeSet::motorcycle(proposed))
            .await
            .inspect_err(|e| warn!(motorcycle_id = %id, error = %e, "Commit rejected"))?;
        let unit = committed
            .motorcycles
            .into_iter()
            .next()
            .ok_or_else(|| WorkflowError::Store("commit returned no motorcycle".to_string()))?;

        info!(
            motorcycle_id = %unit.id,
            action = %action,
            from = %current.status,
            to = %unit.status,
            "Motorcycle transitioned"
        );

        let rollup = match &parent {
            Some(ca) => {
                let siblings = self.store.get_motorcycles(&ca.motorcycle_ids).await?;
                Some(RollupEngine::rollup(ca, &siblings))
            }
            None => None,
        };

        Ok(TransitionOutcome {
            entity: EntitySnapshot::Motorcycle(unit),
            cascaded: vec![],
            rollup,
        })
    }

    async fn transition_cash_advance(
        &self,
        actor: &Actor,
        id: CashAdvanceId,
        action: Action,
        payload: &TransitionPayload,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let hint = self
            .store
            .get_cash_advance(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::CashAdvance, id))?;

        let mut keys: Vec<LockKey> =
            hint.motorcycle_ids.iter().map(|m| LockKey::Motorcycle(*m)).collect();
        keys.push(LockKey::CashAdvance(id));
        let _guards = self.lock(keys).await;

        let current = self
            .store
            .get_cash_advance(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::CashAdvance, id))?;
        if !action.is_direct() {
            return Err(WorkflowError::invalid_transition(
                EntityKind::CashAdvance,
                current.status,
                action,
            ));
        }
        let units = self.store.get_motorcycles(&current.motorcycle_ids).await?;

        let ctx = self.context(actor);
        let proposal =
            TransitionTable::propose_cash_advance(&current, action, payload, &units, &ctx)?;

        let committed = self
            .store
            .commit(ChangeSet {
                motorcycles: proposal.motorcycles,
                cash_advances: vec![proposal.cash_advance],
                ..ChangeSet::default()
            })
            .await
            .inspect_err(|e| warn!(cash_advance_id = %id, error = %e, "Commit rejected"))?;

        let cash_advance = committed
            .cash_advances
            .into_iter()
            .next()
            .ok_or_else(|| WorkflowError::Store("commit returned no cash advance".to_string()))?;

        info!(
            cash_advance_id = %cash_advance.id,
            action = %action,
            from = %current.status,
            to = %cash_advance.status,
            cascaded = committed.motorcycles.len(),
            "Cash advance transitioned"
        );

        let fresh = self.store.get_motorcycles(&cash_advance.motorcycle_ids).await?;
        let rollup = RollupEngine::rollup(&cash_advance, &fresh);

        Ok(TransitionOutcome {
            entity: EntitySnapshot::CashAdvance(cash_advance),
            cascaded: committed.motorcycles,
            rollup: Some(rollup),
        })
    }

    fn authorize(&self, actor: &Actor, action: Action) -> Result<(), WorkflowError> {
        self.policy.authorize(actor, action).inspect_err(|_| {
            warn!(actor = %actor.name, role = %actor.role, action = %action, "Action denied");
        })
    }

    fn authorize_view(&self, actor: &Actor, view: View) -> Result<(), WorkflowError> {
        self.policy.authorize_view(actor, view).inspect_err(|_| {
            warn!(actor = %actor.name, role = %actor.role, view = view.as_str(), "View denied");
        })
    }

    fn context<'a>(&'a self, actor: &'a Actor) -> TransitionContext<'a> {
        TransitionContext {
            actor,
            now: Utc::now(),
            fees: &self.fees,
        }
    }

    /// Acquire the locks for `keys` in sorted order.
    async fn lock(&self, mut keys: Vec<LockKey>) -> LockSet<'_> {
        keys.sort_unstable();
        keys.dedup();

        let mut set = LockSet {
            registry: &self.locks,
            guards: Vec::with_capacity(keys.len()),
            keys,
        };
        for key in &set.keys {
            let mutex = self.locks.entry(*key).or_default().clone();
            set.guards.push(mutex.lock_owned().await);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::seed;
    use futures::future::join_all;
    use motortrack_core::entity::CashAdvanceStatus;
    use motortrack_core::workflow::Role;

    fn seeded() -> Arc<WorkflowOrchestrator> {
        let store = InMemoryStore::seeded(seed::demo(Utc::now())).unwrap();
        Arc::new(WorkflowOrchestrator::new(Arc::new(store), FeeSchedule::default()))
    }

    async fn pending_advance(orchestrator: &WorkflowOrchestrator) -> CashAdvanceId {
        let filter = CashAdvanceFilter {
            statuses: vec![CashAdvanceStatus::Pending],
            ..CashAdvanceFilter::default()
        };
        let advances = orchestrator
            .store
            .list_cash_advances(&filter)
            .await
            .unwrap();
        advances[0].id
    }

    #[tokio::test]
    async fn test_locks_released_after_commit_and_failure() {
        let orchestrator = seeded();
        let accounting = Actor::new("Anton Lim", Role::Accounting);
        let id = pending_advance(&orchestrator).await;

        let err = orchestrator
            .attempt_transition(
                &accounting,
                EntityRef::CashAdvance(id),
                Action::Reject,
                TransitionPayload::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::GuardViolation { .. }));
        assert!(orchestrator.locks.is_empty());

        orchestrator
            .attempt_transition(
                &accounting,
                EntityRef::CashAdvance(id),
                Action::Approve,
                TransitionPayload::default(),
            )
            .await
            .unwrap();
        assert!(orchestrator.locks.is_empty());
    }

    #[tokio::test]
    async fn test_locks_pruned_after_contention() {
        let orchestrator = seeded();
        let accounting = Actor::new("Anton Lim", Role::Accounting);
        let id = pending_advance(&orchestrator).await;

        let attempts = (0..8).map(|_| {
            let orchestrator = orchestrator.clone();
            let accounting = accounting.clone();
            tokio::spawn(async move {
                orchestrator
                    .attempt_transition(
                        &accounting,
                        EntityRef::CashAdvance(id),
                        Action::Approve,
                        TransitionPayload::default(),
                    )
                    .await
            })
        });
        let results = join_all(attempts).await;

        let approved = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();
        assert_eq!(approved, 1);
        assert!(orchestrator.locks.is_empty());
    }
}
