//! Endorsement routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use motortrack_core::entity::Endorsement;
use motortrack_core::workflow::EndorsementDraft;
use motortrack_shared::types::{EndorsementId, PageResponse};
use motortrack_store::EndorsementView;

use crate::routes::motorcycles::page_request;
use crate::{AppState, error::ApiError, middleware::AuthActor};

/// Creates the endorsement routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/endorsements", get(list_endorsements).post(create_endorsement))
        .route("/endorsements/{id}", get(get_endorsement))
}

/// Paging parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageQuery {
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

async fn list_endorsements(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<Endorsement>>, ApiError> {
    let page = page_request(query.page, query.per_page);
    Ok(Json(state.orchestrator.list_endorsements(&actor, &page).await?))
}

/// POST /endorsements - Transfer a batch of store units to a liaison.
async fn create_endorsement(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Json(draft): Json<EndorsementDraft>,
) -> Result<(StatusCode, Json<EndorsementView>), ApiError> {
    let view = state.orchestrator.create_endorsement(&actor, draft).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_endorsement(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<EndorsementId>,
) -> Result<Json<EndorsementView>, ApiError> {
    Ok(Json(state.orchestrator.get_endorsement(&actor, id).await?))
}
