//! Core workflow logic for Motortrack.
//!
//! This crate contains pure business logic with ZERO web or storage dependencies.
//! Entity types, the status transition table, the rollup engine and the
//! authorization gate live here.
//!
//! # Modules
//!
//! - `entity` - Motorcycles, documents, cash advances and endorsements
//! - `workflow` - Transition table, authorization gate and draft validation
//! - `rollup` - Liquidation status and allocation rollups
//! - `generation` - Cash advance generator collaborator
//! - `dashboard` - Dashboard summary
//! - `renewal` - Renewal scan over registered units

pub mod dashboard;
pub mod entity;
pub mod generation;
pub mod renewal;
pub mod rollup;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
