//! Registration workflow for Motortrack.
//!
//! This module holds the status transition table, the authorization gate
//! and draft validation. Nothing here touches storage: every operation
//! returns a proposed entity state for the orchestrator to commit.
//!
//! # Modules
//!
//! - `types` - Actions, actors and transition payloads
//! - `error` - Workflow error taxonomy
//! - `authorization` - Role allow-lists per action and view
//! - `transition` - Declarative status transition table
//! - `draft` - Validation of creation drafts

pub mod authorization;
pub mod draft;
pub mod error;
pub mod transition;
pub mod types;

#[cfg(test)]
mod transition_props;

pub use authorization::{AccessPolicy, Role, View, is_authorized};
pub use draft::{
    CashAdvanceDraft, DraftService, DraftSource, EndorsementDraft, EndorsementProposal,
    MotorcycleIntake,
};
pub use error::WorkflowError;
pub use transition::{
    CASH_ADVANCE_RULES, CashAdvanceProposal, MOTORCYCLE_RULES, TransitionContext, TransitionTable,
};
pub use types::{Action, Actor, DocumentUpload, EntityKind, EntityRef, TransitionPayload};
