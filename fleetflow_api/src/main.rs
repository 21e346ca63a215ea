mod demo;
mod error;
mod live;
mod optimize;
mod state;
mod ws;

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::{Router, serve};
use fleetflow_solver::orchestrator::Orchestrator;
use fleetflow_solver::params::SolverParams;
use fleetflow_solver::telemetry::TelemetryHub;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, info};

use crate::state::AppState;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename("./.env.local").ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let params = SolverParams::from_env();
    let state = Arc::new(AppState {
        hub: TelemetryHub::new(),
        orchestrator: Arc::new(Orchestrator::new(params.clone())),
        params,
    });

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(demo::health_handler))
        .route("/api/demo-data", get(demo::demo_data_handler))
        .route("/api/optimize", post(optimize::optimize_handler))
        .route("/api/optimize/live", post(optimize::optimize_live_handler))
        .route("/api/live/start", post(live::start_handler))
        .route("/api/live/stop", post(live::stop_handler))
        .route("/ws/telemetry", get(ws::handler))
        .layer(ServiceBuilder::new().layer(cors_layer))
        .with_state(state);

    let addr =
        std::env::var("FLEETFLOW_ADDR").unwrap_or_else(|_| String::from("127.0.0.1:8080"));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "fleetflow api listening");

    serve(listener, app).await?;
    Ok(())
}
