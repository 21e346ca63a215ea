//! Instance builders shared by solver tests.

use crate::problem::cost_graph::CostGraph;
use crate::problem::fleet::FleetSpec;
use crate::problem::location::Location;
use crate::problem::profile::TravelProfile;
use crate::problem::vrp::VrpInstance;

/// Depot plus `num_destinations` points spaced evenly along the equator, so
/// travel costs grow with index distance and every pairwise cost is distinct.
pub fn line_instance(num_destinations: usize, vehicles: usize) -> VrpInstance {
    let depot = Location::from_lat_lon(0.0, 0.0);
    let destinations = (1..=num_destinations)
        .map(|i| Location::from_lat_lon(0.0, i as f64 * 0.05))
        .collect();

    VrpInstance::new(depot, destinations, FleetSpec::new(vehicles), TravelProfile::Car)
        .expect("line instance is valid")
}

/// Instance whose graph has distance 1 between every distinct pair, for tests
/// that count edges rather than compare geometry.
pub fn unit_instance(num_destinations: usize, vehicles: usize) -> VrpInstance {
    let base = line_instance(num_destinations, vehicles);
    let n = num_destinations + 1;
    let rows = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 0.0 } else { 1.0 }).collect())
        .collect();

    base.with_graph(CostGraph::from_distance_rows(rows, 1.2))
}
