use tracing::debug;

use crate::error::SolverError;
use crate::problem::location::{DEPOT, LocationIdx};
use crate::problem::vrp::VrpInstance;
use crate::qubo::encoder::VrpQuboEncoder;
use crate::solution::Solution;

/// Turns a sampled bitstring back into routes.
///
/// Low-energy samples are usually feasible but not always: the decoder walks
/// each vehicle's successor edges from the depot and repairs what the sample
/// got wrong (duplicate successors, stolen stops, unvisited destinations).
/// Every repair is counted; a sample needing to repair more than half the
/// destinations says nothing useful about the problem and is rejected.
pub fn decode_state(
    encoder: &VrpQuboEncoder,
    instance: &VrpInstance,
    state: u64,
) -> Result<Solution, SolverError> {
    let n = encoder.num_locations();
    let k = encoder.num_vehicles();
    let graph = instance.graph();
    let mut repairs = 0usize;

    // Successor of each node per vehicle. On conflicting outgoing edges keep
    // the cheaper one.
    let mut successors = vec![vec![None::<usize>; n]; k];
    for var in 0..encoder.num_variables() {
        if state & (1 << var) == 0 {
            continue;
        }
        let (vehicle, from, to) = encoder.edge(var);
        match successors[vehicle][from] {
            None => successors[vehicle][from] = Some(to),
            Some(existing) => {
                let current = graph.distance_km(LocationIdx::new(from), LocationIdx::new(existing));
                let candidate = graph.distance_km(LocationIdx::new(from), LocationIdx::new(to));
                if candidate < current {
                    successors[vehicle][from] = Some(to);
                }
                repairs += 1;
            }
        }
    }

    // Walk each vehicle from the depot. A destination belongs to the first
    // vehicle that reaches it; walks stop at the depot, a dead end, a cycle,
    // or a stop already claimed elsewhere.
    let mut claimed = vec![false; n];
    let mut stops_per_vehicle: Vec<Vec<LocationIdx>> = Vec::with_capacity(k);

    for vehicle_successors in &successors {
        let mut stops = Vec::new();
        let mut current = 0usize;

        for _ in 0..n {
            let Some(next) = vehicle_successors[current] else {
                if current != 0 {
                    repairs += 1; // dangling route end
                }
                break;
            };
            if next == 0 {
                break;
            }
            if claimed[next] {
                repairs += 1;
                break;
            }
            claimed[next] = true;
            stops.push(LocationIdx::new(next));
            current = next;
        }

        stops_per_vehicle.push(stops);
    }

    // Insert anything the sample left unvisited at its cheapest position.
    for node in 1..n {
        if claimed[node] {
            continue;
        }
        repairs += 1;
        insert_cheapest(graph, &mut stops_per_vehicle, LocationIdx::new(node));
    }

    let num_destinations = n - 1;
    if repairs * 2 > num_destinations {
        return Err(SolverError::QuantumDecode(format!(
            "{repairs} repairs for {num_destinations} destinations"
        )));
    }

    if repairs > 0 {
        debug!(repairs, "repaired infeasible quantum sample");
    }

    Ok(Solution::evaluate(graph, stops_per_vehicle))
}

fn insert_cheapest(
    graph: &crate::problem::cost_graph::CostGraph,
    stops_per_vehicle: &mut [Vec<LocationIdx>],
    node: LocationIdx,
) {
    let mut best: Option<(usize, usize, f64)> = None;

    for (vehicle, stops) in stops_per_vehicle.iter().enumerate() {
        for position in 0..=stops.len() {
            let prev = if position == 0 { DEPOT } else { stops[position - 1] };
            let next = if position == stops.len() { DEPOT } else { stops[position] };
            let delta = graph.distance_km(prev, node) + graph.distance_km(node, next)
                - graph.distance_km(prev, next);

            if best.is_none_or(|(_, _, cost)| delta < cost) {
                best = Some((vehicle, position, delta));
            }
        }
    }

    if let Some((vehicle, position, _)) = best {
        stops_per_vehicle[vehicle].insert(position, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{line_instance, unit_instance};

    fn edges_to_state(encoder: &VrpQuboEncoder, edges: &[(usize, usize, usize)]) -> u64 {
        edges
            .iter()
            .fold(0u64, |s, &(v, i, j)| s | 1 << encoder.var_index(v, i, j))
    }

    #[test]
    fn test_feasible_sample_decodes_exactly() {
        let instance = line_instance(3, 2);
        let encoder = VrpQuboEncoder::new(&instance);

        // vehicle 0: 0 -> 1 -> 2 -> 0, vehicle 1: 0 -> 3 -> 0
        let state = edges_to_state(
            &encoder,
            &[(0, 0, 1), (0, 1, 2), (0, 2, 0), (1, 0, 3), (1, 3, 0)],
        );

        let solution = decode_state(&encoder, &instance, state).unwrap();
        assert_eq!(
            solution.routes()[0].stops(),
            &[LocationIdx::new(1), LocationIdx::new(2)]
        );
        assert_eq!(solution.routes()[1].stops(), &[LocationIdx::new(3)]);
        assert!(solution.visits_each_destination_once(4));
    }

    #[test]
    fn test_missing_destination_is_repaired() {
        let instance = line_instance(3, 1);
        let encoder = VrpQuboEncoder::new(&instance);

        // destination 3 never appears in the sample
        let state = edges_to_state(&encoder, &[(0, 0, 1), (0, 1, 2), (0, 2, 0)]);

        let solution = decode_state(&encoder, &instance, state).unwrap();
        assert!(solution.visits_each_destination_once(4));
        assert_eq!(solution.routes()[0].stops().len(), 3);
    }

    #[test]
    fn test_duplicate_visits_are_deduplicated() {
        let instance = unit_instance(3, 2);
        let encoder = VrpQuboEncoder::new(&instance);

        // vehicle 1 tries to revisit destination 1 after vehicle 0 claimed it
        let state = edges_to_state(
            &encoder,
            &[(0, 0, 1), (0, 1, 2), (0, 2, 0), (1, 0, 3), (1, 3, 1), (1, 1, 0)],
        );

        let solution = decode_state(&encoder, &instance, state).unwrap();
        assert!(solution.visits_each_destination_once(4));
        assert_eq!(solution.routes()[1].stops(), &[LocationIdx::new(3)]);
    }

    #[test]
    fn test_hopeless_sample_is_rejected() {
        let instance = line_instance(6, 1);
        let encoder = VrpQuboEncoder::new(&instance);

        // the empty sample needs every destination repaired in
        let result = decode_state(&encoder, &instance, 0);
        assert!(matches!(result, Err(SolverError::QuantumDecode(_))));
    }
}
