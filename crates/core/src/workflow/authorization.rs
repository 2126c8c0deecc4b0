//! Authorization gate for workflow actions and read views.
//!
//! Authorization is data: each action and view carries an allow-list of
//! roles. The gate is consulted before, and independently of, the
//! transition table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{Action, Actor};

/// Business role of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Receives units and prepares their documents at the store.
    #[serde(rename = "Store Supervisor")]
    StoreSupervisor,
    /// Processes registrations with the LTO and liquidates advances.
    Liaison,
    /// Issues and releases check vouchers.
    Cashier,
    /// Approves advances and verifies liquidations.
    Accounting,
}

impl Role {
    /// Every role.
    pub const ALL: [Self; 4] = [
        Self::StoreSupervisor,
        Self::Liaison,
        Self::Cashier,
        Self::Accounting,
    ];

    /// Returns the display label of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StoreSupervisor => "Store Supervisor",
            Self::Liaison => "Liaison",
            Self::Cashier => "Cashier",
            Self::Accounting => "Accounting",
        }
    }

    /// Parse a role from its label, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(needle))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read views gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    /// Motorcycle list and detail.
    Motorcycles,
    /// Cash advance list and detail.
    CashAdvances,
    /// Endorsement list and detail.
    Endorsements,
    /// Dashboard summary.
    Dashboard,
    /// Renewal scan.
    Renewals,
}

impl View {
    /// Returns the name of the view.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motorcycles => "motorcycles",
            Self::CashAdvances => "cash advances",
            Self::Endorsements => "endorsements",
            Self::Dashboard => "dashboard",
            Self::Renewals => "renewals",
        }
    }
}

/// Returns true if `role` is in `allowed_roles`, or the list is empty.
#[must_use]
pub fn is_authorized(role: Role, allowed_roles: &[Role]) -> bool {
    allowed_roles.is_empty() || allowed_roles.contains(&role)
}

/// Role allow-lists per action and per view.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    actions: HashMap<Action, Vec<Role>>,
    views: HashMap<View, Vec<Role>>,
}

impl AccessPolicy {
    /// The standard policy of the registration workflow.
    #[must_use]
    pub fn standard() -> Self {
        use Role::{Accounting, Cashier, Liaison, StoreSupervisor};

        let actions = HashMap::from([
            (Action::RegisterMotorcycle, vec![StoreSupervisor]),
            (Action::SubmitDocuments, vec![StoreSupervisor]),
            (Action::Endorse, vec![StoreSupervisor]),
            (Action::CompleteDocuments, vec![StoreSupervisor, Liaison]),
            (Action::ForwardForApproval, vec![Liaison]),
            (Action::MarkForLiquidation, vec![Liaison]),
            (Action::SubmitLiquidation, vec![Liaison]),
            (Action::Verify, vec![Accounting]),
            (Action::ReturnLiquidation, vec![Accounting]),
            (Action::MarkRegistered, vec![Liaison, StoreSupervisor]),
            (Action::FlagRenewal, vec![StoreSupervisor, Liaison]),
            (Action::Renew, vec![Liaison]),
            (Action::CreateCashAdvance, vec![Liaison]),
            (Action::Approve, vec![Accounting]),
            (Action::Reject, vec![Accounting]),
            (Action::IssueCv, vec![Cashier]),
            (Action::ReleaseCv, vec![Cashier]),
            (Action::Liquidate, vec![Accounting]),
            (Action::CreateEndorsement, vec![StoreSupervisor]),
        ]);

        let views = HashMap::from([
            (View::Motorcycles, vec![]),
            (View::CashAdvances, vec![Liaison, Cashier, Accounting]),
            (View::Endorsements, vec![StoreSupervisor, Liaison]),
            (View::Dashboard, vec![]),
            (View::Renewals, vec![]),
        ]);

        Self { actions, views }
    }

    /// Replace the allow-list of an action.
    #[must_use]
    pub fn with_action(mut self, action: Action, roles: Vec<Role>) -> Self {
        self.actions.insert(action, roles);
        self
    }

    /// Roles allowed to attempt `action`. Empty means everyone.
    #[must_use]
    pub fn allowed_roles(&self, action: Action) -> &[Role] {
        self.actions.get(&action).map_or(&[], Vec::as_slice)
    }

    /// Check that `actor` may attempt `action`.
    ///
    /// # Returns
    /// * `Ok(())` if the actor's role is allowed
    /// * `Err(WorkflowError::Unauthorized)` otherwise
    pub fn authorize(&self, actor: &Actor, action: Action) -> Result<(), WorkflowError> {
        if is_authorized(actor.role, self.allowed_roles(action)) {
            Ok(())
        } else {
            Err(WorkflowError::Unauthorized {
                role: actor.role,
                action: action.as_str().to_string(),
            })
        }
    }

    /// Check that `actor` may read `view`.
    pub fn authorize_view(&self, actor: &Actor, view: View) -> Result<(), WorkflowError> {
        let allowed = self.views.get(&view).map_or(&[][..], Vec::as_slice);
        if is_authorized(actor.role, allowed) {
            Ok(())
        } else {
            Err(WorkflowError::Unauthorized {
                role: actor.role,
                action: format!("view {}", view.as_str()),
            })
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Store Supervisor"), Some(Role::StoreSupervisor));
        assert_eq!(Role::parse("accounting"), Some(Role::Accounting));
        assert_eq!(Role::parse(" Cashier "), Some(Role::Cashier));
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn test_role_serde_label() {
        let json = serde_json::to_string(&Role::StoreSupervisor).unwrap();
        assert_eq!(json, "\"Store Supervisor\"");
    }

    #[test]
    fn test_is_authorized_empty_list_allows_all() {
        for role in Role::ALL {
            assert!(is_authorized(role, &[]));
        }
        assert!(is_authorized(Role::Cashier, &[Role::Cashier]));
        assert!(!is_authorized(Role::Liaison, &[Role::Cashier]));
    }

    #[rstest]
    #[case(Role::Accounting, Action::Verify, true)]
    #[case(Role::Liaison, Action::Verify, false)]
    #[case(Role::Liaison, Action::SubmitLiquidation, true)]
    #[case(Role::Cashier, Action::SubmitLiquidation, false)]
    #[case(Role::Cashier, Action::IssueCv, true)]
    #[case(Role::Accounting, Action::IssueCv, false)]
    #[case(Role::Liaison, Action::CreateCashAdvance, true)]
    #[case(Role::StoreSupervisor, Action::CreateCashAdvance, false)]
    #[case(Role::StoreSupervisor, Action::CreateEndorsement, true)]
    #[case(Role::Liaison, Action::CompleteDocuments, true)]
    #[case(Role::Accounting, Action::Liquidate, true)]
    fn test_standard_action_policy(
        #[case] role: Role,
        #[case] action: Action,
        #[case] allowed: bool,
    ) {
        let policy = AccessPolicy::standard();
        let actor = Actor::new("Tester", role);
        assert_eq!(policy.authorize(&actor, action).is_ok(), allowed);
    }

    #[test]
    fn test_every_action_has_an_allow_list() {
        let policy = AccessPolicy::standard();
        for action in Action::ALL {
            assert!(!policy.allowed_roles(action).is_empty(), "{action}");
        }
    }

    #[rstest]
    #[case(Role::StoreSupervisor, View::CashAdvances, false)]
    #[case(Role::Cashier, View::CashAdvances, true)]
    #[case(Role::Cashier, View::Endorsements, false)]
    #[case(Role::Liaison, View::Endorsements, true)]
    #[case(Role::Accounting, View::Motorcycles, true)]
    #[case(Role::StoreSupervisor, View::Dashboard, true)]
    fn test_standard_view_policy(#[case] role: Role, #[case] view: View, #[case] allowed: bool) {
        let policy = AccessPolicy::standard();
        let actor = Actor::new("Tester", role);
        assert_eq!(policy.authorize_view(&actor, view).is_ok(), allowed);
    }

    #[test]
    fn test_denial_carries_role_and_action() {
        let policy = AccessPolicy::standard();
        let err = policy
            .authorize(&Actor::new("Lia", Role::Liaison), Action::Approve)
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::Unauthorized {
                role: Role::Liaison,
                action: "approve".to_string(),
            }
        );
    }

    #[test]
    fn test_with_action_overrides() {
        let policy = AccessPolicy::standard().with_action(Action::Verify, vec![]);
        assert!(policy
            .authorize(&Actor::new("Lia", Role::Liaison), Action::Verify)
            .is_ok());
    }
}
