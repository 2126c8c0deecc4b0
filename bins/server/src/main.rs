//! Motortrack API Server
//!
//! Main entry point for the registration workflow service.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use motortrack_api::{AppState, create_router};
use motortrack_core::generation::FeeScheduleGenerator;
use motortrack_core::rollup::FeeSchedule;
use motortrack_shared::{AppConfig, JwtConfig, JwtService};
use motortrack_store::{InMemoryStore, WorkflowOrchestrator, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "motortrack=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let store = if config.workflow.seed_demo_data {
        let store = InMemoryStore::seeded(seed::demo(Utc::now()))
            .context("failed to seed demo data")?;
        info!("Demo data loaded");
        store
    } else {
        InMemoryStore::new()
    };

    let fees = FeeSchedule::from(&config.workflow);
    info!(
        processing_fee = %fees.processing_fee,
        or_fee = %fees.or_fee,
        "Fee schedule configured"
    );

    let state = AppState {
        orchestrator: Arc::new(WorkflowOrchestrator::new(Arc::new(store), fees)),
        jwt_service: Arc::new(JwtService::new(JwtConfig::from(&config.jwt))),
        generator: Arc::new(FeeScheduleGenerator::new(fees)),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
