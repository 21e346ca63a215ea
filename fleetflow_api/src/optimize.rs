use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use fleetflow_solver::json::types::{
    JsonOptimizationRequest, JsonOptimizationResponse, JsonOptimizationResults,
};
use fleetflow_solver::problem::vrp::VrpInstance;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/optimize: one solve of the request as stated.
pub async fn optimize_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JsonOptimizationRequest>,
) -> Result<Json<JsonOptimizationResponse>, ApiError> {
    let instance = Arc::new(request.build_instance()?);
    run(state, request, instance).await
}

/// POST /api/optimize/live: one solve under simulated current traffic, for
/// frontends that poll instead of holding a websocket.
pub async fn optimize_live_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JsonOptimizationRequest>,
) -> Result<Json<JsonOptimizationResponse>, ApiError> {
    let instance = request.build_instance()?;

    let mut rng = SmallRng::from_os_rng();
    let perturbed = instance
        .graph()
        .perturbed(&mut rng, state.params.live.perturbation);
    let instance = Arc::new(instance.with_graph(perturbed));

    run(state, request, instance).await
}

async fn run(
    state: Arc<AppState>,
    request: JsonOptimizationRequest,
    instance: Arc<VrpInstance>,
) -> Result<Json<JsonOptimizationResponse>, ApiError> {
    let session = state.hub.session(&request.session_id);
    let Some(guard) = session.try_begin() else {
        return Err(ApiError::Conflict(
            "an optimization is already running for this session".to_owned(),
        ));
    };

    let sink = Arc::new(session.progress_sink());
    let result = state
        .orchestrator
        .optimize(Arc::clone(&instance), request.method, sink)
        .await;

    // release the run before sweeping, or the session always looks busy
    drop(guard);
    drop(session);
    state.hub.evict_if_idle(&request.session_id);

    let results = JsonOptimizationResults::from_report(&instance, &result?);
    Ok(Json(JsonOptimizationResponse::success(results)))
}
