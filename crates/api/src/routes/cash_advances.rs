//! Cash advance routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;

use motortrack_core::entity::CashAdvanceStatus;
use motortrack_core::workflow::{CashAdvanceDraft, DraftSource, EntityRef};
use motortrack_shared::types::{CashAdvanceId, MotorcycleId, PageResponse};
use motortrack_store::{CashAdvanceFilter, CashAdvanceView, TransitionOutcome};

use crate::routes::motorcycles::{page_request, parse_list};
use crate::{AppState, error::ApiError, middleware::AuthActor, routes::TransitionRequest};

/// Creates the cash advance routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cash-advances", get(list_cash_advances).post(create_cash_advance))
        .route("/cash-advances/generate", post(generate_cash_advance))
        .route("/cash-advances/{id}", get(get_cash_advance))
        .route("/cash-advances/{id}/transitions", post(transition_cash_advance))
}

/// Query parameters for listing cash advances.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CashAdvanceQuery {
    /// Comma-separated status labels.
    pub status: Option<String>,
    /// Advances funding this motorcycle.
    pub motorcycle_id: Option<MotorcycleId>,
    /// Personnel name.
    pub personnel: Option<String>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for a generated cash advance.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Units to fund; every `Endorsed - Ready` unit when empty.
    pub motorcycle_ids: Vec<MotorcycleId>,
    /// Issue date; today when absent.
    pub date: Option<NaiveDate>,
}

/// GET /cash-advances - List cash advances with their rollups.
async fn list_cash_advances(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(query): Query<CashAdvanceQuery>,
) -> Result<Json<PageResponse<CashAdvanceView>>, ApiError> {
    let statuses = parse_list(query.status.as_deref(), CashAdvanceStatus::parse)
        .map_err(|bad| ApiError::validation(format!("unknown cash advance status '{bad}'")))?;
    let filter = CashAdvanceFilter {
        statuses,
        motorcycle_id: query.motorcycle_id,
        personnel: query.personnel,
    };
    let page = page_request(query.page, query.per_page);

    let advances = state.orchestrator.list_cash_advances(&actor, &filter, &page).await?;
    Ok(Json(advances))
}

/// POST /cash-advances - Create a cash advance from a manual draft.
async fn create_cash_advance(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Json(mut draft): Json<CashAdvanceDraft>,
) -> Result<(StatusCode, Json<CashAdvanceView>), ApiError> {
    draft.source = DraftSource::Manual;
    let view = state.orchestrator.create_cash_advance(&actor, draft).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /cash-advances/generate - Create a cash advance proposed by the generator.
async fn generate_cash_advance(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Json(request): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<CashAdvanceView>), ApiError> {
    let view = state
        .orchestrator
        .generate_cash_advance(
            &actor,
            state.generator.as_ref(),
            request.motorcycle_ids,
            request.date,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /cash-advances/{id} - Get one cash advance with its rollup.
async fn get_cash_advance(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<CashAdvanceId>,
) -> Result<Json<CashAdvanceView>, ApiError> {
    Ok(Json(state.orchestrator.get_cash_advance(&actor, id).await?))
}

/// POST /cash-advances/{id}/transitions - Attempt an action on a cash advance.
async fn transition_cash_advance(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<CashAdvanceId>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<TransitionOutcome>, ApiError> {
    let outcome = state
        .orchestrator
        .attempt_transition(&actor, EntityRef::CashAdvance(id), request.action, request.payload)
        .await?;
    Ok(Json(outcome))
}
