//! API route definitions.

use axum::{Router, middleware};
use serde::Deserialize;

use motortrack_core::workflow::{Action, TransitionPayload};

use crate::{AppState, middleware::auth_middleware};

pub mod cash_advances;
pub mod dashboard;
pub mod endorsements;
pub mod health;
pub mod motorcycles;
pub mod session;

/// Request body of a transition endpoint.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    /// Action to attempt, by wire name (e.g. `submitLiquidation`).
    pub action: Action,
    /// Action-specific input.
    #[serde(default)]
    pub payload: TransitionPayload,
}

/// Creates the API router, wrapping every route except health and session
/// issuance in the session middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(motorcycles::routes())
        .merge(cash_advances::routes())
        .merge(endorsements::routes())
        .merge(dashboard::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(session::routes())
        .merge(protected_routes)
}
