//! Shared types, errors, and configuration for Motortrack.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Session claims and JWT handling
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, JwtSettings, ServerConfig, WorkflowSettings};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
