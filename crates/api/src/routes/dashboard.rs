//! Dashboard and renewal routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use motortrack_core::dashboard::DashboardSummary;
use motortrack_core::renewal::{
    DEFAULT_RENEWAL_WINDOW_DAYS, MAX_RENEWAL_WINDOW_DAYS, RenewalNotice,
};

use crate::{AppState, error::ApiError, middleware::AuthActor};

/// Creates the dashboard routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/renewals", get(list_renewals))
}

/// Query parameters for the renewal scan.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenewalQuery {
    /// Reference time; now when absent.
    pub as_of: Option<DateTime<Utc>>,
    /// Look-ahead window in days.
    pub window_days: Option<i64>,
}

/// GET /dashboard - Status counts and outstanding totals.
async fn get_dashboard(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(state.orchestrator.dashboard(&actor).await?))
}

/// GET /renewals - Documents of registered units expired or expiring soon.
async fn list_renewals(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(query): Query<RenewalQuery>,
) -> Result<Json<Vec<RenewalNotice>>, ApiError> {
    let window_days = query.window_days.unwrap_or(DEFAULT_RENEWAL_WINDOW_DAYS);
    if !(0..=MAX_RENEWAL_WINDOW_DAYS).contains(&window_days) {
        return Err(ApiError::validation(format!(
            "windowDays must be between 0 and {MAX_RENEWAL_WINDOW_DAYS}"
        )));
    }

    let notices = state
        .orchestrator
        .renewals(&actor, query.as_of.unwrap_or_else(Utc::now), window_days)
        .await?;
    Ok(Json(notices))
}
