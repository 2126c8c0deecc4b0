//! Offline generator sizing advances from the fee schedule.

use async_trait::async_trait;
use serde_json::json;

use crate::generation::{CashAdvanceGenerator, GenerationError, GenerationRequest};
use crate::rollup::FeeSchedule;

/// Purpose proposed when none is configured.
pub const DEFAULT_PURPOSE: &str = "LTO registration processing";

/// Generator proposing `processing_fee + or_fee` per motorcycle.
#[derive(Debug, Clone)]
pub struct FeeScheduleGenerator {
    fees: FeeSchedule,
    purpose: String,
}

impl FeeScheduleGenerator {
    /// Creates a generator over `fees`.
    #[must_use]
    pub fn new(fees: FeeSchedule) -> Self {
        Self {
            fees,
            purpose: DEFAULT_PURPOSE.to_string(),
        }
    }

    /// Use `purpose` in generated drafts.
    #[must_use]
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }
}

#[async_trait]
impl CashAdvanceGenerator for FeeScheduleGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<serde_json::Value, GenerationError> {
        if request.motorcycles.is_empty() {
            return Err(GenerationError::Unavailable(
                "no motorcycles need a cash advance".to_string(),
            ));
        }

        let ids: Vec<String> = request.motorcycles.iter().map(|m| m.id.to_string()).collect();

        Ok(json!({
            "personnel": request.personnel,
            "purpose": self.purpose,
            "amount": self.fees.advance_for(request.motorcycles.len()).to_string(),
            "date": request.date.format("%Y-%m-%d").to_string(),
            "status": "Pending",
            "motorcycleIds": ids,
        }))
    }
}
