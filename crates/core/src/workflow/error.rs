//! Workflow error types.
//!
//! Every workflow operation returns these as typed results; none of them
//! leave the entity store partially mutated.

use thiserror::Error;

use crate::workflow::authorization::Role;
use crate::workflow::types::{Action, EntityKind};

/// Errors that can occur during workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The entity id does not resolve.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of the missing entity.
        entity: EntityKind,
        /// The id that was looked up.
        id: String,
    },

    /// The action is not legal from the entity's current status.
    #[error("Cannot {action} {entity} in status '{from}'")]
    InvalidTransition {
        /// Kind of the entity.
        entity: EntityKind,
        /// Current status label.
        from: String,
        /// The attempted action.
        action: Action,
    },

    /// A required payload field is missing or invalid.
    #[error("Invalid {field}: {reason}")]
    GuardViolation {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The actor's role may not attempt the action.
    #[error("Role '{role}' is not permitted to {action}")]
    Unauthorized {
        /// The actor's role.
        role: Role,
        /// The attempted action.
        action: String,
    },

    /// A concurrent change or uniqueness clash prevented the commit.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The entity store failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl WorkflowError {
    /// Creates a `NotFound` error.
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a `GuardViolation` error.
    pub fn guard(field: &'static str, reason: impl Into<String>) -> Self {
        Self::GuardViolation {
            field,
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidTransition` error.
    pub fn invalid_transition(entity: EntityKind, from: impl ToString, action: Action) -> Self {
        Self::InvalidTransition {
            entity,
            from: from.to_string(),
            action,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidTransition { .. } | Self::Conflict(_) => 409,
            Self::GuardViolation { .. } => 422,
            Self::Unauthorized { .. } => 403,
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::GuardViolation { .. } => "GUARD_VIOLATION",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::Conflict(_) => "CONFLICT",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(WorkflowError::not_found(EntityKind::Motorcycle, "m1"), 404, "NOT_FOUND")]
    #[case(
        WorkflowError::invalid_transition(EntityKind::CashAdvance, "Pending", Action::ReleaseCv),
        409,
        "INVALID_TRANSITION"
    )]
    #[case(
        WorkflowError::guard("ltoOrAmount", "must be greater than zero"),
        422,
        "GUARD_VIOLATION"
    )]
    #[case(
        WorkflowError::Unauthorized { role: Role::Liaison, action: "verify".into() },
        403,
        "UNAUTHORIZED"
    )]
    #[case(WorkflowError::Conflict("stale".into()), 409, "CONFLICT")]
    #[case(WorkflowError::Store("down".into()), 500, "STORE_ERROR")]
    fn test_error_mapping(
        #[case] error: WorkflowError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.error_code(), code);
    }

    #[test]
    fn test_messages() {
        let err =
            WorkflowError::invalid_transition(EntityKind::Motorcycle, "Completed", Action::Verify);
        assert_eq!(err.to_string(), "Cannot verify Motorcycle in status 'Completed'");

        let err = WorkflowError::Unauthorized {
            role: Role::Liaison,
            action: "verify".into(),
        };
        assert_eq!(err.to_string(), "Role 'Liaison' is not permitted to verify");
    }
}
