//! Session middleware for protected routes.
//!
//! The bearer token is issued by the external session collaborator and only
//! carries the actor's name and role. The middleware resolves it into an
//! [`Actor`] that handlers hand to the orchestrator.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use motortrack_core::workflow::{Actor, Role};
use motortrack_shared::{AppError, Claims};

use crate::{AppState, error::ApiError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Resolve validated claims into an actor.
///
/// # Errors
///
/// Returns `AppError::Forbidden` if the role label is not a known role, or
/// `AppError::Unauthorized` if the subject is blank.
pub fn actor_from_claims(claims: &Claims) -> Result<Actor, AppError> {
    let name = claims.name().trim();
    if name.is_empty() {
        return Err(AppError::Unauthorized("session has no subject".to_string()));
    }
    let role = Role::parse(claims.role())
        .ok_or_else(|| AppError::Forbidden(format!("unknown role '{}'", claims.role())))?;
    Ok(Actor::new(name, role))
}

/// Authentication middleware that validates session tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the resolved actor in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::from(AppError::Unauthorized(
            "Authorization header with Bearer token is required".to_string(),
        ))
        .into_response();
    };

    let actor = match state
        .jwt_service
        .validate_token(token)
        .map_err(ApiError::from)
        .and_then(|claims| actor_from_claims(&claims).map_err(ApiError::from))
    {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    debug!(actor = %actor.name, role = %actor.role, "Session resolved");
    request.extensions_mut().insert(actor);
    next.run(request).await
}

/// Extractor for the acting user.
///
/// ```ignore
/// async fn handler(AuthActor(actor): AuthActor) -> impl IntoResponse {
///     // actor.role ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthActor(pub Actor);

impl<S> FromRequestParts<S> for AuthActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(AuthActor)
            .ok_or_else(|| {
                ApiError::from(AppError::Unauthorized("Authentication required".to_string()))
            })
    }
}
