use jiff::Timestamp;
use tracing::debug;

use crate::classical::two_opt;
use crate::error::SolverError;
use crate::params::ClassicalParams;
use crate::problem::location::{DEPOT, LocationIdx};
use crate::problem::vrp::VrpInstance;
use crate::solution::Solution;
use crate::telemetry::{ProgressSink, SolverPhase};

/// Deterministic heuristic VRP solver: greedy nearest-destination
/// construction followed by per-route 2-opt improvement. Handles any
/// instance size and is the guaranteed-answer half of the pipeline.
#[derive(Clone)]
pub struct ClassicalSolver {
    params: ClassicalParams,
}

impl ClassicalSolver {
    pub fn new(params: ClassicalParams) -> Self {
        Self { params }
    }

    pub fn solve(&self, instance: &VrpInstance, sink: &ProgressSink) -> Result<Solution, SolverError> {
        if instance.fleet().vehicle_count == 0 {
            return Err(SolverError::InfeasibleProblem(
                "no vehicles to route".to_owned(),
            ));
        }

        let deadline = Timestamp::now() + self.params.budget;
        let graph = instance.graph();

        let mut stops_per_vehicle = construct_greedy(instance);
        sink.report(SolverPhase::Classical, 40, "initial routes constructed");

        // Improve each route until 2-opt runs dry or the budget does.
        let mut passes = 0usize;
        let mut improved = true;
        while improved && Timestamp::now() < deadline {
            improved = false;
            for stops in &mut stops_per_vehicle {
                improved |= two_opt::improve_route(graph, stops);
            }
            passes += 1;
        }
        debug!(passes, "classical improvement finished");
        sink.report(SolverPhase::Classical, 90, "local search finished");

        Ok(Solution::evaluate(graph, stops_per_vehicle))
    }
}

/// Builds initial routes by repeatedly giving the least-loaded vehicle the
/// destination nearest to its current position. All ties break towards the
/// lower index, which keeps the construction fully deterministic.
fn construct_greedy(instance: &VrpInstance) -> Vec<Vec<LocationIdx>> {
    let graph = instance.graph();
    let vehicles = instance.fleet().vehicle_count;

    let mut stops_per_vehicle: Vec<Vec<LocationIdx>> = vec![Vec::new(); vehicles];
    let mut route_cost = vec![0.0f64; vehicles];
    let mut unassigned: Vec<LocationIdx> = instance.destination_ids().collect();

    while !unassigned.is_empty() {
        let mut vehicle = 0;
        for candidate in 1..vehicles {
            if route_cost[candidate] < route_cost[vehicle] {
                vehicle = candidate;
            }
        }

        let position = stops_per_vehicle[vehicle].last().copied().unwrap_or(DEPOT);
        let mut nearest = 0;
        for candidate in 1..unassigned.len() {
            if graph.distance_km(position, unassigned[candidate])
                < graph.distance_km(position, unassigned[nearest])
            {
                nearest = candidate;
            }
        }

        let destination = unassigned.remove(nearest);
        route_cost[vehicle] += graph.distance_km(position, destination);
        stops_per_vehicle[vehicle].push(destination);
    }

    stops_per_vehicle
}
