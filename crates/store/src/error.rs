//! Entity store errors.

use thiserror::Error;

use motortrack_core::workflow::{EntityKind, WorkflowError};

/// Errors raised by an entity store commit or lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An update targets a record that does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of the missing record.
        entity: EntityKind,
        /// Its id.
        id: String,
    },

    /// The record changed since it was read.
    #[error("{entity} {id} was modified concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        /// Kind of the record.
        entity: EntityKind,
        /// Its id.
        id: String,
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },

    /// A registration identifier is already used by another motorcycle.
    #[error("{field} '{value}' is already registered")]
    UniqueViolation {
        /// Offending field.
        field: &'static str,
        /// Duplicated value.
        value: String,
    },

    /// A reference points at a record that does not hold it.
    #[error("Referential integrity violation: {0}")]
    ReferentialViolation(String),

    /// The backing store is unavailable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            StoreError::VersionConflict { .. }
            | StoreError::UniqueViolation { .. }
            | StoreError::ReferentialViolation(_) => Self::Conflict(err.to_string()),
            StoreError::Unavailable(msg) => Self::Store(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_workflow_errors() {
        let err: WorkflowError = StoreError::UniqueViolation {
            field: "engineNumber",
            value: "E-1".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.to_string(), "Conflict: engineNumber 'E-1' is already registered");

        let err: WorkflowError = StoreError::NotFound {
            entity: EntityKind::CashAdvance,
            id: "x".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), 404);

        let err: WorkflowError = StoreError::Unavailable("disk".to_string()).into();
        assert_eq!(err.error_code(), "STORE_ERROR");
    }
}
