//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for the workflow queries and commands
//! - Bearer-token session middleware resolving the acting user
//! - Error-to-response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use motortrack_core::generation::CashAdvanceGenerator;
use motortrack_shared::JwtService;
use motortrack_store::WorkflowOrchestrator;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The only writer of the entity store.
    pub orchestrator: Arc<WorkflowOrchestrator>,
    /// JWT service for session tokens.
    pub jwt_service: Arc<JwtService>,
    /// Producer of generated cash advance drafts.
    pub generator: Arc<dyn CashAdvanceGenerator>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
