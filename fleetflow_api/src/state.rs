use std::sync::Arc;

use fleetflow_solver::orchestrator::Orchestrator;
use fleetflow_solver::params::SolverParams;
use fleetflow_solver::telemetry::TelemetryHub;

pub struct AppState {
    pub hub: TelemetryHub,
    pub orchestrator: Arc<Orchestrator>,
    pub params: SolverParams,
}
