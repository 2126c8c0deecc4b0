//! Motorcycle routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use motortrack_core::entity::{Motorcycle, MotorcycleStatus};
use motortrack_core::workflow::{EntityRef, MotorcycleIntake};
use motortrack_shared::types::{EndorsementId, MotorcycleId, PageRequest, PageResponse};
use motortrack_store::{MotorcycleFilter, TransitionOutcome};

use crate::{AppState, error::ApiError, middleware::AuthActor, routes::TransitionRequest};

/// Creates the motorcycle routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/motorcycles", get(list_motorcycles).post(register_motorcycle))
        .route("/motorcycles/{id}", get(get_motorcycle))
        .route("/motorcycles/{id}/transitions", post(transition_motorcycle))
}

/// Query parameters for listing motorcycles.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotorcycleQuery {
    /// Comma-separated status labels.
    pub status: Option<String>,
    /// Units carried by this endorsement.
    pub endorsement_id: Option<EndorsementId>,
    /// Free-text search.
    pub search: Option<String>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl MotorcycleQuery {
    fn filter(&self) -> Result<MotorcycleFilter, ApiError> {
        let statuses = parse_list(self.status.as_deref(), MotorcycleStatus::parse)
            .map_err(|bad| ApiError::validation(format!("unknown motorcycle status '{bad}'")))?;
        Ok(MotorcycleFilter {
            statuses,
            endorsement_id: self.endorsement_id,
            search: self.search.clone(),
        })
    }
}

/// Parse a comma-separated list, returning the first unparseable item on failure.
pub(crate) fn parse_list<T>(
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>, String> {
    raw.map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()))
        .into_iter()
        .flatten()
        .map(|item| parse(item).ok_or_else(|| item.to_string()))
        .collect()
}

pub(crate) fn page_request(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest::new(page.unwrap_or(defaults.page), per_page.unwrap_or(defaults.per_page))
}

/// GET /motorcycles - List motorcycles.
async fn list_motorcycles(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(query): Query<MotorcycleQuery>,
) -> Result<Json<PageResponse<Motorcycle>>, ApiError> {
    let filter = query.filter()?;
    let page = page_request(query.page, query.per_page);
    let units = state.orchestrator.list_motorcycles(&actor, &filter, &page).await?;
    Ok(Json(units))
}

/// POST /motorcycles - Register a unit received at the store.
async fn register_motorcycle(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Json(intake): Json<MotorcycleIntake>,
) -> Result<(StatusCode, Json<Motorcycle>), ApiError> {
    let unit = state.orchestrator.register_motorcycle(&actor, intake).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

/// GET /motorcycles/{id} - Get one motorcycle.
async fn get_motorcycle(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<MotorcycleId>,
) -> Result<Json<Motorcycle>, ApiError> {
    Ok(Json(state.orchestrator.get_motorcycle(&actor, id).await?))
}

/// POST /motorcycles/{id}/transitions - Attempt an action on a motorcycle.
async fn transition_motorcycle(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<MotorcycleId>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<TransitionOutcome>, ApiError> {
    let outcome = state
        .orchestrator
        .attempt_transition(&actor, EntityRef::Motorcycle(id), request.action, request.payload)
        .await?;
    Ok(Json(outcome))
}
