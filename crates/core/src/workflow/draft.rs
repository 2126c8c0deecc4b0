//! Creation drafts: new motorcycles, endorsements and cash advances.
//!
//! A draft is untrusted input. It becomes an entity only through the
//! proposals below, which apply the same guards whether the draft was typed
//! in by a user or produced by a generator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use motortrack_shared::types::{CashAdvanceId, EndorsementId, MotorcycleId};

use crate::entity::{
    CashAdvance, CashAdvanceStatus, Customer, Document, Endorsement, Motorcycle, MotorcycleStatus,
};
use crate::rollup::allocation::MONEY_DECIMAL_PLACES;
use crate::workflow::error::WorkflowError;
use crate::workflow::transition::{
    CREATION_CASCADE, CashAdvanceProposal, TransitionContext, TransitionTable,
};
use crate::workflow::types::{Action, DocumentUpload, EntityKind, TransitionPayload};

/// Where a draft came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftSource {
    /// Entered by a user.
    #[default]
    Manual,
    /// Proposed by a cash advance generator.
    Generated,
}

/// A cash advance request that has not been validated yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashAdvanceDraft {
    /// Personnel receiving the advance.
    pub personnel: String,
    /// Purpose of the advance.
    pub purpose: String,
    /// Requested amount.
    pub amount: Decimal,
    /// Issue date.
    pub date: NaiveDate,
    /// Units the advance funds, in order.
    pub motorcycle_ids: Vec<MotorcycleId>,
    /// Origin of the draft.
    #[serde(default)]
    pub source: DraftSource,
}

/// An endorsement batch that has not been validated yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndorsementDraft {
    /// Date custody is transferred.
    pub transaction_date: NaiveDate,
    /// Liaison receiving the units.
    pub liaison_name: String,
    /// Free-form remarks.
    #[serde(default)]
    pub remarks: Option<String>,
    /// Units transferred, in order.
    pub motorcycle_ids: Vec<MotorcycleId>,
}

/// A new motorcycle received at the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorcycleIntake {
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: u16,
    /// Body color.
    pub color: String,
    /// Plate number, if already issued.
    #[serde(default)]
    pub plate_number: Option<String>,
    /// Engine number.
    pub engine_number: String,
    /// Chassis number.
    pub chassis_number: String,
    /// Buyer.
    pub customer: Customer,
    /// Date of sale.
    #[serde(default)]
    pub date_sold: Option<NaiveDate>,
    /// Documents received with the unit.
    #[serde(default)]
    pub documents: Vec<DocumentUpload>,
}

/// Proposed endorsement and the units it transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndorsementProposal {
    /// New endorsement.
    pub endorsement: Endorsement,
    /// Endorsed units.
    pub motorcycles: Vec<Motorcycle>,
}

/// Stateless validation of creation drafts.
pub struct DraftService;

impl DraftService {
    /// Validate a cash advance draft and propose the new advance.
    ///
    /// # Arguments
    /// * `draft` - The request, manual or generated
    /// * `units` - Candidate motorcycles; must contain every id in the draft
    /// * `ctx` - Actor, timestamp and fee defaults
    ///
    /// # Returns
    /// * `Ok(CashAdvanceProposal)` with a `Pending` advance and its units moved to `Processing`
    /// * `Err(WorkflowError::GuardViolation)` for missing fields, a non-positive amount,
    ///   more than two decimal places, or an empty or repeated motorcycle list
    /// * `Err(WorkflowError::NotFound)` if a motorcycle id does not resolve
    /// * `Err(WorkflowError::InvalidTransition)` if a unit is not `Endorsed - Ready`
    pub fn propose_cash_advance(
        draft: &CashAdvanceDraft,
        units: &[Motorcycle],
        ctx: &TransitionContext<'_>,
    ) -> Result<CashAdvanceProposal, WorkflowError> {
        let personnel = required("personnel", &draft.personnel)?;
        let purpose = required("purpose", &draft.purpose)?;

        if draft.amount <= Decimal::ZERO {
            return Err(WorkflowError::guard("amount", "must be greater than zero"));
        }
        if draft.amount.normalize().scale() > MONEY_DECIMAL_PLACES {
            return Err(WorkflowError::guard(
                "amount",
                format!("must have at most {MONEY_DECIMAL_PLACES} decimal places"),
            ));
        }

        let funded = resolve_units(&draft.motorcycle_ids, units)?;
        if let Some(blocked) = funded.iter().find(|m| !CREATION_CASCADE.from.contains(&m.status)) {
            return Err(WorkflowError::invalid_transition(
                EntityKind::Motorcycle,
                blocked.status,
                Action::CreateCashAdvance,
            ));
        }

        let cash_advance = CashAdvance {
            id: CashAdvanceId::new(),
            personnel,
            purpose,
            amount: draft.amount,
            date: draft.date,
            status: CashAdvanceStatus::Pending,
            motorcycle_ids: draft.motorcycle_ids.clone(),
            check_voucher_number: None,
            check_voucher_release_date: None,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            liquidated_at: None,
            created_by: ctx.actor.name.clone(),
            version: 0,
            created_at: ctx.now,
            updated_at: ctx.now,
        };

        let motorcycles = TransitionTable::cascade(&CREATION_CASCADE, funded.into_iter(), ctx.now);

        Ok(CashAdvanceProposal {
            cash_advance,
            motorcycles,
        })
    }

    /// Validate an endorsement draft and endorse its units.
    ///
    /// Each unit goes through the `endorse` rule, so units outside the store
    /// statuses are rejected with `InvalidTransition`.
    pub fn propose_endorsement(
        draft: &EndorsementDraft,
        units: &[Motorcycle],
        ctx: &TransitionContext<'_>,
    ) -> Result<EndorsementProposal, WorkflowError> {
        let liaison_name = required("liaisonName", &draft.liaison_name)?;
        let endorsed = resolve_units(&draft.motorcycle_ids, units)?;

        let endorsement_id = EndorsementId::new();
        let payload = TransitionPayload {
            endorsement_id: Some(endorsement_id),
            ..TransitionPayload::default()
        };

        let motorcycles = endorsed
            .into_iter()
            .map(|unit| {
                TransitionTable::propose_motorcycle(unit, Action::Endorse, &payload, None, ctx)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let endorsement = Endorsement {
            id: endorsement_id,
            transaction_date: draft.transaction_date,
            liaison_name,
            created_by: ctx.actor.name.clone(),
            remarks: draft
                .remarks
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            motorcycle_ids: draft.motorcycle_ids.clone(),
            version: 0,
            created_at: ctx.now,
        };

        Ok(EndorsementProposal {
            endorsement,
            motorcycles,
        })
    }

    /// Validate an intake and propose a new `Incomplete` motorcycle.
    ///
    /// Uniqueness of engine, chassis and plate numbers is enforced by the store.
    pub fn propose_motorcycle(
        intake: &MotorcycleIntake,
        ctx: &TransitionContext<'_>,
    ) -> Result<Motorcycle, WorkflowError> {
        let make = required("make", &intake.make)?;
        let model = required("model", &intake.model)?;
        let engine_number = required("engineNumber", &intake.engine_number)?;
        let chassis_number = required("chassisNumber", &intake.chassis_number)?;
        let customer_name = required("customer.name", &intake.customer.name)?;

        let documents = intake
            .documents
            .iter()
            .map(|upload| {
                Document::new(upload.doc_type, upload.reference.clone(), ctx.now, upload.expires_at)
            })
            .collect();

        Ok(Motorcycle {
            id: MotorcycleId::new(),
            make,
            model,
            year: intake.year,
            color: intake.color.trim().to_string(),
            plate_number: intake
                .plate_number
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            engine_number,
            chassis_number,
            customer: Customer {
                name: customer_name,
                ..intake.customer.clone()
            },
            date_sold: intake.date_sold,
            status: MotorcycleStatus::Incomplete,
            documents,
            endorsement_id: None,
            liquidation: None,
            version: 0,
            created_at: ctx.now,
            updated_at: ctx.now,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, WorkflowError> {
    let value = value.trim();
    if value.is_empty() {
        Err(WorkflowError::guard(field, "is required"))
    } else {
        Ok(value.to_string())
    }
}

/// Resolve `ids` against `units`, preserving the order of `ids`.
fn resolve_units<'a>(
    ids: &[MotorcycleId],
    units: &'a [Motorcycle],
) -> Result<Vec<&'a Motorcycle>, WorkflowError> {
    if ids.is_empty() {
        return Err(WorkflowError::guard("motorcycleIds", "at least one motorcycle is required"));
    }

    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .map(|id| {
            if !seen.insert(*id) {
                return Err(WorkflowError::guard(
                    "motorcycleIds",
                    format!("motorcycle {id} is listed twice"),
                ));
            }
            units
                .iter()
                .find(|m| m.id == *id)
                .ok_or_else(|| WorkflowError::not_found(EntityKind::Motorcycle, id))
        })
        .collect()
}
