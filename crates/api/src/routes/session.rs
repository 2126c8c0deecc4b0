//! Session token issuance.
//!
//! Stands in for the external session collaborator: it signs whatever name
//! and role it is given. Credentials are never checked here.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::info;

use motortrack_core::workflow::Role;

use crate::{AppState, error::ApiError};

/// Creates the session routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/session", post(create_session))
}

/// Request body for a session token.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    /// Display name of the acting personnel.
    pub name: String,
    /// Role label, e.g. "Store Supervisor".
    pub role: String,
}

/// Issued session token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Bearer token.
    pub access_token: String,
    /// Always "Bearer".
    pub token_type: &'static str,
    /// Lifetime in seconds.
    pub expires_in: i64,
    /// Resolved role label.
    pub role: Role,
}

/// POST /auth/session - Issue a bearer token for a name and role.
async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    let role = Role::parse(&payload.role)
        .ok_or_else(|| ApiError::validation(format!("unknown role '{}'", payload.role)))?;

    let access_token = state.jwt_service.generate_access_token(name, role.as_str())?;
    info!(actor = %name, role = %role, "Session issued");

    Ok(Json(SessionResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt_service.access_token_expires_in(),
        role,
    }))
}
