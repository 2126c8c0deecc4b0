//! Property-based tests for the transition table and authorization gate.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use motortrack_shared::types::EndorsementId;

use crate::entity::{CashAdvanceStatus, DocumentType, MotorcycleStatus, REGISTRATION_REQUIREMENTS};
use crate::rollup::FeeSchedule;
use crate::testing::{cash_advance, motorcycle, upload};
use crate::workflow::authorization::{AccessPolicy, Role};
use crate::workflow::error::WorkflowError;
use crate::workflow::transition::{
    CASH_ADVANCE_RULES, MOTORCYCLE_RULES, TransitionContext, TransitionTable,
};
use crate::workflow::types::{Action, Actor, DocumentUpload, TransitionPayload};

/// Strategy for generating random motorcycle statuses.
fn arb_status() -> impl Strategy<Value = MotorcycleStatus> {
    proptest::sample::select(MotorcycleStatus::ALL.to_vec())
}

/// Strategy for generating random cash advance statuses.
fn arb_ca_status() -> impl Strategy<Value = CashAdvanceStatus> {
    proptest::sample::select(CashAdvanceStatus::ALL.to_vec())
}

/// Strategy for generating random actions.
fn arb_action() -> impl Strategy<Value = Action> {
    proptest::sample::select(Action::ALL.to_vec())
}

/// Strategy for generating random roles.
fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::StoreSupervisor),
        Just(Role::Liaison),
        Just(Role::Cashier),
        Just(Role::Accounting),
    ]
}

/// Strategy for generating non-positive amounts.
fn arb_non_positive() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..=0i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Payload that satisfies every motorcycle guard at once.
fn generous_payload() -> TransitionPayload {
    let mut documents: Vec<DocumentUpload> =
        REGISTRATION_REQUIREMENTS.into_iter().map(upload).collect();
    documents.push(upload(DocumentType::OrCr));
    if let Some(first) = documents.first_mut() {
        first.expires_at = Some(Utc::now() + chrono::Duration::days(365));
    }

    TransitionPayload {
        documents,
        lto_or_number: Some("OR-1".to_string()),
        lto_or_amount: Some(Decimal::new(180_000, 2)),
        lto_process_fee: Some(Decimal::new(50_000, 2)),
        reason: Some("Mismatch".to_string()),
        check_voucher_number: Some("CV-1".to_string()),
        plate_number: Some("ABC 123".to_string()),
        endorsement_id: Some(EndorsementId::new()),
        ..TransitionPayload::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A motorcycle transition either fails or lands on a target of a matching rule.
    #[test]
    fn prop_motorcycle_transition_lands_on_rule_target(
        status in arb_status(),
        action in arb_action(),
    ) {
        let actor = Actor::new("Tester", Role::Liaison);
        let fees = FeeSchedule::default();
        let ctx = TransitionContext { actor: &actor, now: Utc::now(), fees: &fees };
        let mut unit = motorcycle(status);
        if status == MotorcycleStatus::ForVerification {
            unit.liquidation = Some(crate::testing::liquidation(
                None,
                Decimal::new(250_000, 2),
                Decimal::new(180_000, 2),
                Decimal::new(50_000, 2),
            ));
        }
        if status == MotorcycleStatus::Registered {
            unit.documents.push(crate::entity::Document::new(
                DocumentType::Insurance,
                None,
                Utc::now() - chrono::Duration::days(366),
                Some(Utc::now() - chrono::Duration::days(1)),
            ));
        }
        let ca = cash_advance(Decimal::new(250_000, 2), &[unit.id]);

        let targets: Vec<MotorcycleStatus> = MOTORCYCLE_RULES
            .iter()
            .filter(|r| r.action == action && r.from.contains(&status))
            .map(|r| r.to)
            .collect();

        match TransitionTable::propose_motorcycle(
            &unit,
            action,
            &generous_payload(),
            Some(&ca),
            &ctx,
        ) {
            Ok(next) => {
                prop_assert!(targets.contains(&next.status));
                prop_assert_eq!(next.id, unit.id);
            }
            Err(WorkflowError::InvalidTransition { .. }) => prop_assert!(targets.is_empty()),
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    /// Cash advance transitions are legal exactly where a rule exists.
    #[test]
    fn prop_cash_advance_transition_matches_table(
        status in arb_ca_status(),
        action in arb_action(),
    ) {
        let actor = Actor::new("Tester", Role::Accounting);
        let fees = FeeSchedule::default();
        let ctx = TransitionContext { actor: &actor, now: Utc::now(), fees: &fees };
        let unit = motorcycle(MotorcycleStatus::Completed);
        let mut ca = cash_advance(Decimal::new(250_000, 2), &[unit.id]);
        ca.status = status;

        let rule = CASH_ADVANCE_RULES
            .iter()
            .find(|r| r.action == action && r.from == status);

        match TransitionTable::propose_cash_advance(
            &ca,
            action,
            &generous_payload(),
            &[unit],
            &ctx,
        ) {
            Ok(proposal) => {
                prop_assert!(rule.is_some());
                prop_assert_eq!(Some(proposal.cash_advance.status), rule.map(|r| r.to));
            }
            Err(WorkflowError::InvalidTransition { .. }) => prop_assert!(rule.is_none()),
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    /// A non-positive OR amount is always a guard violation.
    #[test]
    fn prop_liquidation_rejects_non_positive_amount(amount in arb_non_positive()) {
        let actor = Actor::new("Tester", Role::Liaison);
        let fees = FeeSchedule::default();
        let ctx = TransitionContext { actor: &actor, now: Utc::now(), fees: &fees };
        let unit = motorcycle(MotorcycleStatus::ForLiquidation);
        let payload = TransitionPayload {
            lto_or_amount: Some(amount),
            ..generous_payload()
        };

        let result = TransitionTable::propose_motorcycle(
            &unit,
            Action::SubmitLiquidation,
            &payload,
            None,
            &ctx,
        );
        let is_guard_violation =
            matches!(result, Err(WorkflowError::GuardViolation { field: "ltoOrAmount", .. }));
        prop_assert!(is_guard_violation);
    }

    /// Shortage/overage always equals allocated advance minus total spend.
    #[test]
    fn prop_liquidation_balances(
        or_cents in 1i64..1_000_000i64,
        fee_cents in 1i64..1_000_000i64,
    ) {
        let actor = Actor::new("Tester", Role::Liaison);
        let fees = FeeSchedule::default();
        let ctx = TransitionContext { actor: &actor, now: Utc::now(), fees: &fees };
        let unit = motorcycle(MotorcycleStatus::ForLiquidation);
        let payload = TransitionPayload {
            lto_or_amount: Some(Decimal::new(or_cents, 2)),
            lto_process_fee: Some(Decimal::new(fee_cents, 2)),
            ..generous_payload()
        };

        let next = TransitionTable::propose_motorcycle(
            &unit,
            Action::SubmitLiquidation,
            &payload,
            None,
            &ctx,
        );
        prop_assert!(next.is_ok());
        let details = next.ok().and_then(|m| m.liquidation);
        prop_assert!(details.is_some());
        if let Some(d) = details {
            prop_assert_eq!(d.total_liquidation, d.lto_or_amount + d.lto_process_fee);
            prop_assert_eq!(d.shortage_overage, d.allocated_advance - d.total_liquidation);
        }
    }

    /// The gate allows exactly the roles on the allow-list.
    #[test]
    fn prop_gate_matches_allow_list(role in arb_role(), action in arb_action()) {
        let policy = AccessPolicy::standard();
        let actor = Actor::new("Tester", role);
        let allowed = policy.allowed_roles(action).contains(&role);

        match policy.authorize(&actor, action) {
            Ok(()) => prop_assert!(allowed),
            Err(WorkflowError::Unauthorized { role: denied, .. }) => {
                prop_assert!(!allowed);
                prop_assert_eq!(denied, role);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
