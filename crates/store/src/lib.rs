//! Entity storage and workflow orchestration.
//!
//! This crate provides:
//! - The `EntityStore` abstraction and its in-memory implementation
//! - Query filters for entity listings
//! - The workflow orchestrator, the only writer of the store
//! - Demo seed data

pub mod error;
pub mod filter;
pub mod memory;
pub mod orchestrator;
pub mod repository;
pub mod seed;

pub use error::StoreError;
pub use filter::{CashAdvanceFilter, MotorcycleFilter};
pub use memory::InMemoryStore;
pub use orchestrator::{
    CashAdvanceView, DraftError, EndorsementView, EntitySnapshot, TransitionOutcome,
    WorkflowOrchestrator,
};
pub use repository::{ChangeSet, EntityStore};
