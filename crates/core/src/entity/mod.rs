//! Entity types tracked by the workflow engine.
//!
//! # Modules
//!
//! - `motorcycle` - Motorcycle units, their lifecycle status and liquidation details
//! - `document` - Typed document attachments
//! - `cash_advance` - Cash advances funding LTO processing
//! - `endorsement` - Custody transfers from store to liaison

pub mod cash_advance;
pub mod document;
pub mod endorsement;
pub mod motorcycle;

pub use cash_advance::{CashAdvance, CashAdvanceStatus};
pub use document::{Document, DocumentType, REGISTRATION_REQUIREMENTS};
pub use endorsement::Endorsement;
pub use motorcycle::{Customer, LiquidationDetails, Motorcycle, MotorcycleStatus};
