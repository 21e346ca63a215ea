use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use fleetflow_solver::json::types::{DEFAULT_SESSION, JsonOptimizationRequest};
use fleetflow_solver::live::LiveReoptimizer;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/live/start: installs a standing re-optimization loop for the
/// session. Routes stream out as `live_route_update` telemetry events; a
/// second start replaces the previous loop.
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JsonOptimizationRequest>,
) -> Result<Json<Value>, ApiError> {
    let instance = Arc::new(request.build_instance()?);
    let session = state.hub.session(&request.session_id);

    let handle = LiveReoptimizer {
        orchestrator: Arc::clone(&state.orchestrator),
        session: Arc::clone(&session),
        instance,
        method: request.method,
        params: state.params.live.clone(),
    }
    .spawn();
    session.set_live(handle);

    info!(session = %request.session_id, "live optimization started");
    Ok(Json(json!({ "ok": true, "message": "live optimization started" })))
}

#[derive(Deserialize)]
pub struct StopRequest {
    #[serde(default = "default_session")]
    pub session_id: String,
}

fn default_session() -> String {
    DEFAULT_SESSION.to_owned()
}

/// POST /api/live/stop: tears the session's live loop down. Stopping a
/// session without one is not an error.
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StopRequest>,
) -> Json<Value> {
    let stopped = state.hub.session(&request.session_id).stop_live();
    state.hub.evict_if_idle(&request.session_id);

    info!(session = %request.session_id, stopped, "live optimization stop requested");
    Json(json!({ "ok": true, "stopped": stopped }))
}
