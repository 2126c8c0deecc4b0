//! Workflow domain types: actions, actors and transition payloads.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use motortrack_shared::types::{CashAdvanceId, EndorsementId, MotorcycleId};

use crate::entity::DocumentType;
use crate::workflow::authorization::Role;

/// Kind of entity a workflow action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    /// A motorcycle unit.
    Motorcycle,
    /// A cash advance.
    CashAdvance,
    /// An endorsement batch.
    Endorsement,
}

impl EntityKind {
    /// Returns the display name of the entity kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motorcycle => "Motorcycle",
            Self::CashAdvance => "CashAdvance",
            Self::Endorsement => "Endorsement",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to a stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entityType", content = "id", rename_all = "camelCase")]
pub enum EntityRef {
    /// A motorcycle.
    Motorcycle(MotorcycleId),
    /// A cash advance.
    CashAdvance(CashAdvanceId),
    /// An endorsement.
    Endorsement(EndorsementId),
}

impl EntityRef {
    /// Returns the kind of the referenced entity.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Motorcycle(_) => EntityKind::Motorcycle,
            Self::CashAdvance(_) => EntityKind::CashAdvance,
            Self::Endorsement(_) => EntityKind::Endorsement,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Motorcycle(id) => write!(f, "{id}"),
            Self::CashAdvance(id) => write!(f, "{id}"),
            Self::Endorsement(id) => write!(f, "{id}"),
        }
    }
}

/// A workflow action an actor may attempt.
///
/// Most actions are issued directly against one entity. Creation actions and
/// `Endorse` are issued through their dedicated creation paths instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Create a motorcycle record.
    RegisterMotorcycle,
    /// Append documents to a unit still in the store.
    SubmitDocuments,
    /// Hand a unit over to a liaison (issued by endorsement creation).
    Endorse,
    /// Complete the requirements of an endorsed unit.
    CompleteDocuments,
    /// Forward a processing unit for cash advance approval.
    ForwardForApproval,
    /// Mark a unit whose check voucher was released as ready for liquidation.
    MarkForLiquidation,
    /// Submit the LTO receipts for a unit.
    SubmitLiquidation,
    /// Accept a submitted liquidation.
    Verify,
    /// Send a submitted liquidation back to the liaison.
    ReturnLiquidation,
    /// Record the issued plate and OR/CR.
    MarkRegistered,
    /// Flag a registered unit whose documents expired.
    FlagRenewal,
    /// Record a renewal document.
    Renew,
    /// Create a cash advance request.
    CreateCashAdvance,
    /// Approve a pending cash advance.
    Approve,
    /// Reject a pending cash advance.
    Reject,
    /// Issue the check voucher of an approved cash advance.
    #[serde(rename = "issueCV")]
    IssueCv,
    /// Release the check voucher to the liaison.
    #[serde(rename = "releaseCV")]
    ReleaseCv,
    /// Close a cash advance whose units are all verified.
    Liquidate,
    /// Create an endorsement batch.
    CreateEndorsement,
}

impl Action {
    /// Every action, in lifecycle order.
    pub const ALL: [Self; 19] = [
        Self::RegisterMotorcycle,
        Self::SubmitDocuments,
        Self::Endorse,
        Self::CompleteDocuments,
        Self::ForwardForApproval,
        Self::MarkForLiquidation,
        Self::SubmitLiquidation,
        Self::Verify,
        Self::ReturnLiquidation,
        Self::MarkRegistered,
        Self::FlagRenewal,
        Self::Renew,
        Self::CreateCashAdvance,
        Self::Approve,
        Self::Reject,
        Self::IssueCv,
        Self::ReleaseCv,
        Self::Liquidate,
        Self::CreateEndorsement,
    ];

    /// Returns the wire name of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisterMotorcycle => "registerMotorcycle",
            Self::SubmitDocuments => "submitDocuments",
            Self::Endorse => "endorse",
            Self::CompleteDocuments => "completeDocuments",
            Self::ForwardForApproval => "forwardForApproval",
            Self::MarkForLiquidation => "markForLiquidation",
            Self::SubmitLiquidation => "submitLiquidation",
            Self::Verify => "verify",
            Self::ReturnLiquidation => "returnLiquidation",
            Self::MarkRegistered => "markRegistered",
            Self::FlagRenewal => "flagRenewal",
            Self::Renew => "renew",
            Self::CreateCashAdvance => "createCashAdvance",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::IssueCv => "issueCV",
            Self::ReleaseCv => "releaseCV",
            Self::Liquidate => "liquidate",
            Self::CreateEndorsement => "createEndorsement",
        }
    }

    /// Parses an action from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == s)
    }

    /// Returns the entity kind this action targets.
    #[must_use]
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Self::CreateCashAdvance
            | Self::Approve
            | Self::Reject
            | Self::IssueCv
            | Self::ReleaseCv
            | Self::Liquidate => EntityKind::CashAdvance,
            Self::CreateEndorsement => EntityKind::Endorsement,
            _ => EntityKind::Motorcycle,
        }
    }

    /// Returns true if the action may be attempted directly on an existing entity.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        !matches!(
            self,
            Self::RegisterMotorcycle
                | Self::Endorse
                | Self::CreateCashAdvance
                | Self::CreateEndorsement
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The person attempting an action, as supplied by the session collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Display name, recorded in audit fields.
    pub name: String,
    /// Business role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// A document supplied with a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    /// Document type.
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Free-form reference such as a policy or receipt number.
    #[serde(default)]
    pub reference: Option<String>,
    /// Expiry, for documents that lapse.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Action-specific input of a transition.
///
/// Every field is optional; each action's guard decides which ones it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionPayload {
    /// Documents to append.
    pub documents: Vec<DocumentUpload>,
    /// LTO official receipt number.
    pub lto_or_number: Option<String>,
    /// LTO official receipt amount.
    pub lto_or_amount: Option<Decimal>,
    /// LTO processing fee paid.
    pub lto_process_fee: Option<Decimal>,
    /// Remarks recorded with a liquidation.
    pub remarks: Option<String>,
    /// Reason for a rejection or return.
    pub reason: Option<String>,
    /// Check voucher number.
    pub check_voucher_number: Option<String>,
    /// Check voucher release date; defaults to the transition date.
    pub release_date: Option<NaiveDate>,
    /// Issued plate number.
    pub plate_number: Option<String>,
    /// Endorsement carrying the unit, set by endorsement creation.
    #[serde(skip)]
    pub endorsement_id: Option<EndorsementId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names_parse_back() {
        for action in Action::ALL {
            assert_eq!(Action::parse(action.as_str()), Some(action));
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
        assert_eq!(Action::parse("encash"), None);
    }

    #[test]
    fn test_action_entity_kind() {
        assert_eq!(Action::IssueCv.entity_kind(), EntityKind::CashAdvance);
        assert_eq!(Action::SubmitLiquidation.entity_kind(), EntityKind::Motorcycle);
        assert_eq!(Action::CreateEndorsement.entity_kind(), EntityKind::Endorsement);
        assert!(!Action::Endorse.is_direct());
        assert!(Action::Verify.is_direct());
    }

    #[test]
    fn test_payload_deserializes_camel_case() {
        let payload: TransitionPayload = serde_json::from_str(
            r#"{"ltoOrNumber":"OR-1","ltoOrAmount":"1800.00","ltoProcessFee":"500"}"#,
        )
        .unwrap();
        assert_eq!(payload.lto_or_number.as_deref(), Some("OR-1"));
        assert_eq!(payload.lto_or_amount, Some(Decimal::new(180_000, 2)));
        assert!(payload.documents.is_empty());
    }
}
