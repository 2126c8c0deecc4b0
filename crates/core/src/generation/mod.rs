//! Cash advance generation collaborator.
//!
//! A generator proposes a cash advance for a set of motorcycles. Its output
//! is untrusted: [`parse_generated_draft`] turns it into a
//! [`CashAdvanceDraft`](crate::workflow::CashAdvanceDraft) that still has to
//! pass the normal creation guards. A failed or malformed generation is a
//! [`GenerationError`] and never touches stored entities.

pub mod fee_schedule;
pub mod parse;

pub use fee_schedule::FeeScheduleGenerator;
pub use parse::parse_generated_draft;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::entity::Motorcycle;

/// Errors from a cash advance generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The generator could not be reached or declined the request.
    #[error("Generation failed: {0}")]
    Unavailable(String),

    /// The generator answered with something that is not a usable draft.
    #[error("Generation failed: malformed draft: {0}")]
    Malformed(String),
}

impl GenerationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        502
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        "GENERATION_FAILED"
    }
}

/// Input handed to a generator.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Units that need funding.
    pub motorcycles: Vec<Motorcycle>,
    /// Personnel who will receive the advance.
    pub personnel: String,
    /// Issue date to propose.
    pub date: NaiveDate,
}

/// External producer of cash advance drafts.
#[async_trait]
pub trait CashAdvanceGenerator: Send + Sync {
    /// Propose a cash advance record as raw JSON.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<serde_json::Value, GenerationError>;
}
