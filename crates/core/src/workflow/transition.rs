//! Status transition table for motorcycles and cash advances.
//!
//! The table is declarative: each rule names an action, the statuses it may
//! be attempted from, the resulting status and the guards that must hold.
//! Proposing a transition never mutates anything. It returns the entity
//! state the orchestrator should commit.
//!
//! When several rules share an action and a source status they are tried in
//! order. `submitDocuments` uses this to land on `Ready to Register` when the
//! requirements are complete and on `Lacking Requirements` otherwise.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::entity::{
    CashAdvance, CashAdvanceStatus, Document, DocumentType, LiquidationDetails, Motorcycle,
    MotorcycleStatus,
};
use crate::rollup::{FeeSchedule, RollupEngine};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{Action, Actor, EntityKind, TransitionPayload};

use MotorcycleStatus as M;

/// Precondition of a motorcycle rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// The payload carries at least one document.
    DocumentsSupplied,
    /// Every registration requirement is on file.
    RequirementsComplete,
    /// The unit has been assigned to an endorsement.
    EndorsementAssigned,
    /// The unit is funded by a cash advance.
    FundedByCashAdvance,
    /// OR number, OR amount and process fee are present and positive.
    LiquidationFields,
    /// Liquidation details have been submitted.
    LiquidationRecorded,
    /// The payload carries a non-empty reason.
    ReasonProvided,
    /// A plate number and an OR/CR are on file.
    RegistrationReleased,
    /// At least one document has expired.
    DocumentExpired,
    /// The payload carries a document that has not expired.
    ValidReplacementDocument,
}

/// Precondition of a cash advance rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashAdvanceGuard {
    /// The payload carries a non-empty reason.
    ReasonProvided,
    /// The payload carries a check voucher number.
    CheckVoucherNumber,
    /// Every funded unit exists and has been verified.
    AllUnitsVerified,
}

/// A motorcycle status change.
#[derive(Debug, Clone, Copy)]
pub struct MotorcycleRule {
    /// Action that triggers the rule.
    pub action: Action,
    /// Statuses the action may be attempted from.
    pub from: &'static [MotorcycleStatus],
    /// Resulting status.
    pub to: MotorcycleStatus,
    /// Guards that must all hold.
    pub guards: &'static [Guard],
}

/// Status change applied to the units of a cash advance.
#[derive(Debug, Clone, Copy)]
pub struct Cascade {
    /// Unit statuses affected.
    pub from: &'static [MotorcycleStatus],
    /// Resulting unit status.
    pub to: MotorcycleStatus,
}

/// A cash advance status change.
#[derive(Debug, Clone, Copy)]
pub struct CashAdvanceRule {
    /// Action that triggers the rule.
    pub action: Action,
    /// Status the action may be attempted from.
    pub from: CashAdvanceStatus,
    /// Resulting status.
    pub to: CashAdvanceStatus,
    /// Guards that must all hold.
    pub guards: &'static [CashAdvanceGuard],
    /// Change applied to the funded units in the same commit.
    pub cascade: Option<Cascade>,
}

/// Cascade applied when a cash advance is created.
pub const CREATION_CASCADE: Cascade = Cascade {
    from: &[M::EndorsedReady],
    to: M::Processing,
};

/// Every motorcycle rule, in evaluation order.
pub static MOTORCYCLE_RULES: &[MotorcycleRule] = &[
    MotorcycleRule {
        action: Action::SubmitDocuments,
        from: &[M::Incomplete, M::LackingRequirements],
        to: M::ReadyToRegister,
        guards: &[Guard::DocumentsSupplied, Guard::RequirementsComplete],
    },
    MotorcycleRule {
        action: Action::SubmitDocuments,
        from: &[M::Incomplete, M::LackingRequirements],
        to: M::LackingRequirements,
        guards: &[Guard::DocumentsSupplied],
    },
    MotorcycleRule {
        action: Action::Endorse,
        from: &[M::ReadyToRegister],
        to: M::EndorsedReady,
        guards: &[Guard::EndorsementAssigned],
    },
    MotorcycleRule {
        action: Action::Endorse,
        from: &[M::Incomplete, M::LackingRequirements],
        to: M::EndorsedIncomplete,
        guards: &[Guard::EndorsementAssigned],
    },
    MotorcycleRule {
        action: Action::CompleteDocuments,
        from: &[M::EndorsedIncomplete],
        to: M::EndorsedReady,
        guards: &[Guard::RequirementsComplete],
    },
    MotorcycleRule {
        action: Action::ForwardForApproval,
        from: &[M::Processing],
        to: M::ForCaApproval,
        guards: &[Guard::FundedByCashAdvance],
    },
    MotorcycleRule {
        action: Action::MarkForLiquidation,
        from: &[M::ReleasedCvs],
        to: M::ForLiquidation,
        guards: &[],
    },
    MotorcycleRule {
        action: Action::SubmitLiquidation,
        from: &[M::ForLiquidation],
        to: M::ForVerification,
        guards: &[Guard::LiquidationFields],
    },
    MotorcycleRule {
        action: Action::Verify,
        from: &[M::ForVerification],
        to: M::Completed,
        guards: &[Guard::LiquidationRecorded],
    },
    MotorcycleRule {
        action: Action::ReturnLiquidation,
        from: &[M::ForVerification],
        to: M::ForLiquidation,
        guards: &[Guard::ReasonProvided],
    },
    MotorcycleRule {
        action: Action::MarkRegistered,
        from: &[M::Completed],
        to: M::Registered,
        guards: &[Guard::RegistrationReleased],
    },
    MotorcycleRule {
        action: Action::FlagRenewal,
        from: &[M::Registered],
        to: M::ForRenewal,
        guards: &[Guard::DocumentExpired],
    },
    MotorcycleRule {
        action: Action::Renew,
        from: &[M::ForRenewal],
        to: M::Registered,
        guards: &[Guard::ValidReplacementDocument],
    },
];

/// Every cash advance rule.
pub static CASH_ADVANCE_RULES: &[CashAdvanceRule] = &[
    CashAdvanceRule {
        action: Action::Approve,
        from: CashAdvanceStatus::Pending,
        to: CashAdvanceStatus::Approved,
        guards: &[],
        cascade: Some(Cascade {
            from: &[M::Processing, M::ForCaApproval],
            to: M::ForCvIssuance,
        }),
    },
    CashAdvanceRule {
        action: Action::Reject,
        from: CashAdvanceStatus::Pending,
        to: CashAdvanceStatus::Rejected,
        guards: &[CashAdvanceGuard::ReasonProvided],
        cascade: Some(Cascade {
            from: &[M::Processing, M::ForCaApproval],
            to: M::EndorsedReady,
        }),
    },
    CashAdvanceRule {
        action: Action::IssueCv,
        from: CashAdvanceStatus::Approved,
        to: CashAdvanceStatus::CvIssued,
        guards: &[CashAdvanceGuard::CheckVoucherNumber],
        cascade: None,
    },
    CashAdvanceRule {
        action: Action::ReleaseCv,
        from: CashAdvanceStatus::CvIssued,
        to: CashAdvanceStatus::CvReleased,
        guards: &[],
        cascade: Some(Cascade {
            from: &[M::ForCvIssuance],
            to: M::ReleasedCvs,
        }),
    },
    CashAdvanceRule {
        action: Action::Liquidate,
        from: CashAdvanceStatus::CvReleased,
        to: CashAdvanceStatus::Liquidated,
        guards: &[CashAdvanceGuard::AllUnitsVerified],
        cascade: None,
    },
];

/// Who is transitioning, when, and with which fee defaults.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    /// The acting user.
    pub actor: &'a Actor,
    /// Transition timestamp.
    pub now: DateTime<Utc>,
    /// Fee defaults for units without a cash advance.
    pub fees: &'a FeeSchedule,
}

/// Proposed state of a cash advance and the units it cascaded onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashAdvanceProposal {
    /// New cash advance state.
    pub cash_advance: CashAdvance,
    /// Units whose status changed with it.
    pub motorcycles: Vec<Motorcycle>,
}

/// Stateless evaluator of the transition table.
pub struct TransitionTable;

impl TransitionTable {
    /// Actions that have a rule from `status`.
    #[must_use]
    pub fn motorcycle_actions_from(status: MotorcycleStatus) -> Vec<Action> {
        let mut actions: Vec<Action> = MOTORCYCLE_RULES
            .iter()
            .filter(|rule| rule.from.contains(&status))
            .map(|rule| rule.action)
            .collect();
        actions.dedup();
        actions
    }

    /// Actions that have a rule from `status`.
    #[must_use]
    pub fn cash_advance_actions_from(status: CashAdvanceStatus) -> Vec<Action> {
        CASH_ADVANCE_RULES
            .iter()
            .filter(|rule| rule.from == status)
            .map(|rule| rule.action)
            .collect()
    }

    /// Propose the result of `action` on a motorcycle.
    ///
    /// # Arguments
    /// * `current` - The unit as stored
    /// * `action` - The attempted action
    /// * `payload` - Action-specific input
    /// * `parent` - The cash advance funding the unit, if any
    /// * `ctx` - Actor, timestamp and fee defaults
    ///
    /// # Returns
    /// * `Ok(Motorcycle)` with the new status and derived fields
    /// * `Err(WorkflowError::InvalidTransition)` if no rule matches the current status
    /// * `Err(WorkflowError::GuardViolation)` if every matching rule's guards fail
    pub fn propose_motorcycle(
        current: &Motorcycle,
        action: Action,
        payload: &TransitionPayload,
        parent: Option<&CashAdvance>,
        ctx: &TransitionContext<'_>,
    ) -> Result<Motorcycle, WorkflowError> {
        let candidates: Vec<&MotorcycleRule> = MOTORCYCLE_RULES
            .iter()
            .filter(|rule| rule.action == action && rule.from.contains(&current.status))
            .collect();

        if candidates.is_empty() {
            return Err(WorkflowError::invalid_transition(
                EntityKind::Motorcycle,
                current.status,
                action,
            ));
        }

        let staged = Self::stage(current, action, payload, ctx.now);
        let mut last_violation = None;

        for rule in candidates {
            let checked = rule
                .guards
                .iter()
                .try_for_each(|guard| Self::check(*guard, &staged, payload, parent, ctx));

            match checked {
                Ok(()) => return Ok(Self::apply(staged, rule, payload, parent, ctx)),
                Err(violation) => last_violation = Some(violation),
            }
        }

        Err(last_violation.unwrap_or_else(|| {
            WorkflowError::invalid_transition(EntityKind::Motorcycle, current.status, action)
        }))
    }

    /// Propose the result of `action` on a cash advance.
    ///
    /// `attached` may hold any superset of the funded units; only units the
    /// advance funds are cascaded onto.
    pub fn propose_cash_advance(
        current: &CashAdvance,
        action: Action,
        payload: &TransitionPayload,
        attached: &[Motorcycle],
        ctx: &TransitionContext<'_>,
    ) -> Result<CashAdvanceProposal, WorkflowError> {
        let rule = CASH_ADVANCE_RULES
            .iter()
            .find(|rule| rule.action == action && rule.from == current.status)
            .ok_or_else(|| {
                WorkflowError::invalid_transition(EntityKind::CashAdvance, current.status, action)
            })?;

        let funded: Vec<&Motorcycle> = attached.iter().filter(|m| current.funds(m.id)).collect();

        for guard in rule.guards {
            Self::check_cash_advance(*guard, current, payload, &funded)?;
        }

        let mut next = current.clone();
        next.status = rule.to;
        next.updated_at = ctx.now;

        match action {
            Action::Approve => {
                next.approved_by = Some(ctx.actor.name.clone());
                next.approved_at = Some(ctx.now);
            }
            Action::Reject => next.rejection_reason = trimmed(payload.reason.as_ref()),
            Action::IssueCv => {
                next.check_voucher_number = trimmed(payload.check_voucher_number.as_ref());
            }
            Action::ReleaseCv => {
                next.check_voucher_release_date =
                    Some(payload.release_date.unwrap_or_else(|| ctx.now.date_naive()));
            }
            Action::Liquidate => next.liquidated_at = Some(ctx.now),
            _ => {}
        }

        let motorcycles = rule
            .cascade
            .map(|cascade| Self::cascade(&cascade, funded.into_iter(), ctx.now))
            .unwrap_or_default();

        Ok(CashAdvanceProposal {
            cash_advance: next,
            motorcycles,
        })
    }

    /// Apply `cascade` to `units`, returning only the units that changed.
    pub fn cascade<'a>(
        cascade: &Cascade,
        units: impl Iterator<Item = &'a Motorcycle>,
        now: DateTime<Utc>,
    ) -> Vec<Motorcycle> {
        units
            .filter(|unit| cascade.from.contains(&unit.status))
            .map(|unit| {
                let mut next = unit.clone();
                next.status = cascade.to;
                next.updated_at = now;
                next
            })
            .collect()
    }

    fn stage(
        current: &Motorcycle,
        action: Action,
        payload: &TransitionPayload,
        now: DateTime<Utc>,
    ) -> Motorcycle {
        let mut staged = current.clone();

        if matches!(
            action,
            Action::SubmitDocuments
                | Action::CompleteDocuments
                | Action::MarkRegistered
                | Action::Renew
        ) {
            staged.documents.extend(payload.documents.iter().map(|upload| {
                Document::new(upload.doc_type, upload.reference.clone(), now, upload.expires_at)
            }));
        }

        if action == Action::MarkRegistered
            && let Some(plate) = trimmed(payload.plate_number.as_ref())
        {
            staged.plate_number = Some(plate);
        }

        if action == Action::Endorse && payload.endorsement_id.is_some() {
            staged.endorsement_id = payload.endorsement_id;
        }

        staged
    }

    fn check(
        guard: Guard,
        unit: &Motorcycle,
        payload: &TransitionPayload,
        parent: Option<&CashAdvance>,
        ctx: &TransitionContext<'_>,
    ) -> Result<(), WorkflowError> {
        match guard {
            Guard::DocumentsSupplied => {
                if payload.documents.is_empty() {
                    return Err(WorkflowError::guard(
                        "documents",
                        "at least one document is required",
                    ));
                }
            }
            Guard::RequirementsComplete => {
                let missing = unit.missing_requirements();
                if !missing.is_empty() {
                    let names: Vec<&str> = missing.iter().map(DocumentType::as_str).collect();
                    return Err(WorkflowError::guard(
                        "documents",
                        format!("missing {}", names.join(", ")),
                    ));
                }
            }
            Guard::EndorsementAssigned => {
                if unit.endorsement_id.is_none() {
                    return Err(WorkflowError::guard("endorsementId", "unit is not endorsed"));
                }
            }
            Guard::FundedByCashAdvance => {
                if !parent.is_some_and(|ca| ca.funds(unit.id)) {
                    return Err(WorkflowError::guard(
                        "cashAdvance",
                        "unit is not funded by a cash advance",
                    ));
                }
            }
            Guard::LiquidationFields => {
                if trimmed(payload.lto_or_number.as_ref()).is_none() {
                    return Err(WorkflowError::guard("ltoOrNumber", "is required"));
                }
                positive("ltoOrAmount", payload.lto_or_amount)?;
                positive("ltoProcessFee", payload.lto_process_fee)?;
            }
            Guard::LiquidationRecorded => {
                if unit.liquidation.is_none() {
                    return Err(WorkflowError::guard("liquidation", "no liquidation submitted"));
                }
            }
            Guard::ReasonProvided => {
                if trimmed(payload.reason.as_ref()).is_none() {
                    return Err(WorkflowError::guard("reason", "is required"));
                }
            }
            Guard::RegistrationReleased => {
                if unit.plate_number.as_deref().is_none_or(|p| p.trim().is_empty()) {
                    return Err(WorkflowError::guard("plateNumber", "is required"));
                }
                if !unit.has_document(DocumentType::OrCr) {
                    return Err(WorkflowError::guard("documents", "OR/CR is required"));
                }
            }
            Guard::DocumentExpired => {
                if unit.expired_documents(ctx.now).is_empty() {
                    return Err(WorkflowError::guard("documents", "no document has expired"));
                }
            }
            Guard::ValidReplacementDocument => {
                let renewed = payload
                    .documents
                    .iter()
                    .any(|d| d.expires_at.is_some_and(|at| at > ctx.now));
                if !renewed {
                    return Err(WorkflowError::guard(
                        "documents",
                        "a replacement document with a future expiry is required",
                    ));
                }
                // `unit` is staged with the uploads appended.
                let still_expired = unit.expired_documents(ctx.now);
                if !still_expired.is_empty() {
                    let names: Vec<&str> =
                        still_expired.iter().map(|d| d.doc_type.as_str()).collect();
                    return Err(WorkflowError::guard(
                        "documents",
                        format!("no valid replacement for {}", names.join(", ")),
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_cash_advance(
        guard: CashAdvanceGuard,
        ca: &CashAdvance,
        payload: &TransitionPayload,
        funded: &[&Motorcycle],
    ) -> Result<(), WorkflowError> {
        match guard {
            CashAdvanceGuard::ReasonProvided => {
                if trimmed(payload.reason.as_ref()).is_none() {
                    return Err(WorkflowError::guard("reason", "is required"));
                }
            }
            CashAdvanceGuard::CheckVoucherNumber => {
                if trimmed(payload.check_voucher_number.as_ref()).is_none() {
                    return Err(WorkflowError::guard("checkVoucherNumber", "is required"));
                }
            }
            CashAdvanceGuard::AllUnitsVerified => {
                if ca.motorcycle_ids.is_empty() || funded.len() < ca.motorcycle_ids.len() {
                    return Err(WorkflowError::guard(
                        "motorcycleIds",
                        "every funded motorcycle must exist",
                    ));
                }
                if let Some(pending) = funded.iter().find(|m| !m.status.is_verified()) {
                    return Err(WorkflowError::guard(
                        "motorcycleIds",
                        format!("motorcycle {} is still '{}'", pending.id, pending.status),
                    ));
                }
            }
        }
        Ok(())
    }

    fn apply(
        mut staged: Motorcycle,
        rule: &MotorcycleRule,
        payload: &TransitionPayload,
        parent: Option<&CashAdvance>,
        ctx: &TransitionContext<'_>,
    ) -> Motorcycle {
        match rule.action {
            Action::SubmitLiquidation => {
                let lto_or_amount = payload.lto_or_amount.unwrap_or_default();
                let lto_process_fee = payload.lto_process_fee.unwrap_or_default();
                let allocated_advance =
                    RollupEngine::allocated_advance(parent, staged.id, ctx.fees);
                let total_liquidation = lto_or_amount + lto_process_fee;

                staged.liquidation = Some(LiquidationDetails {
                    parent_ca_id: parent.filter(|ca| ca.funds(staged.id)).map(|ca| ca.id),
                    allocated_advance,
                    lto_or_number: trimmed(payload.lto_or_number.as_ref()).unwrap_or_default(),
                    lto_or_amount,
                    lto_process_fee,
                    total_liquidation,
                    shortage_overage: allocated_advance - total_liquidation,
                    remarks: trimmed(payload.remarks.as_ref()),
                    submitted_by: ctx.actor.name.clone(),
                    submitted_at: ctx.now,
                    verified_by: None,
                    verified_at: None,
                    returned_reason: None,
                });
            }
            Action::Verify => {
                if let Some(liquidation) = staged.liquidation.as_mut() {
                    liquidation.verified_by = Some(ctx.actor.name.clone());
                    liquidation.verified_at = Some(ctx.now);
                }
            }
            Action::ReturnLiquidation => {
                if let Some(liquidation) = staged.liquidation.as_mut() {
                    liquidation.returned_reason = trimmed(payload.reason.as_ref());
                }
            }
            _ => {}
        }

        staged.status = rule.to;
        staged.updated_at = ctx.now;
        staged
    }
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn positive(field: &'static str, value: Option<Decimal>) -> Result<(), WorkflowError> {
    match value {
        None => Err(WorkflowError::guard(field, "is required")),
        Some(amount) if amount <= Decimal::ZERO => {
            Err(WorkflowError::guard(field, "must be greater than zero"))
        }
        Some(_) => Ok(()),
    }
}
