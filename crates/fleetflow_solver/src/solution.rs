use crate::problem::cost_graph::CostGraph;
use crate::problem::location::{DEPOT, LocationIdx};

/// CO2 saved per optimized kilometer compared to unoptimized dispatch.
pub const CO2_SAVINGS_PER_KM: f64 = 0.15;

/// One vehicle's ordered destination stops. The depot brackets every
/// non-empty route implicitly; `full_path` makes it explicit.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    stops: Vec<LocationIdx>,
}

impl Route {
    pub fn new(stops: Vec<LocationIdx>) -> Self {
        Self { stops }
    }

    pub fn stops(&self) -> &[LocationIdx] {
        &self.stops
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Depot-bracketed id sequence; an empty route stays at the depot.
    pub fn full_path(&self) -> Vec<LocationIdx> {
        if self.stops.is_empty() {
            return vec![DEPOT];
        }

        let mut path = Vec::with_capacity(self.stops.len() + 2);
        path.push(DEPOT);
        path.extend_from_slice(&self.stops);
        path.push(DEPOT);
        path
    }

    pub fn distance_km(&self, graph: &CostGraph) -> f64 {
        let path = self.full_path();
        path.windows(2)
            .map(|leg| graph.distance_km(leg[0], leg[1]))
            .sum()
    }

    pub fn duration_min(&self, graph: &CostGraph) -> f64 {
        let path = self.full_path();
        path.windows(2)
            .map(|leg| graph.duration_min(leg[0], leg[1]))
            .sum()
    }
}

/// A complete assignment: exactly one route per vehicle (empty permitted)
/// plus aggregate metrics. Immutable once built.
#[derive(Clone, Debug)]
pub struct Solution {
    routes: Vec<Route>,
    total_distance_km: f64,
    total_duration_min: f64,
    co2_savings_kg: f64,
}

impl Solution {
    /// Builds a solution from per-vehicle stop lists and computes its
    /// metrics from the cost graph.
    pub fn evaluate(graph: &CostGraph, stops_per_vehicle: Vec<Vec<LocationIdx>>) -> Self {
        let routes: Vec<Route> = stops_per_vehicle.into_iter().map(Route::new).collect();

        let total_distance_km = routes.iter().map(|route| route.distance_km(graph)).sum();
        let total_duration_min = routes.iter().map(|route| route.duration_min(graph)).sum();

        Solution {
            routes,
            total_distance_km,
            total_duration_min,
            co2_savings_kg: total_distance_km * CO2_SAVINGS_PER_KM,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    pub fn total_duration_min(&self) -> f64 {
        self.total_duration_min
    }

    pub fn co2_savings_kg(&self) -> f64 {
        self.co2_savings_kg
    }

    /// Checks the visit-once invariant: every non-depot location appears in
    /// exactly one route, and nothing else appears at all.
    pub fn visits_each_destination_once(&self, num_locations: usize) -> bool {
        let mut seen = vec![false; num_locations];

        for route in &self.routes {
            for stop in route.stops() {
                if stop.is_depot() || stop.get() >= num_locations || seen[stop.get()] {
                    return false;
                }
                seen[stop.get()] = true;
            }
        }

        seen.iter().skip(1).all(|&visited| visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::cost_graph::CostGraph;

    fn unit_graph(n: usize) -> CostGraph {
        let rows = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 0.0 } else { 1.0 }).collect())
            .collect();
        CostGraph::from_distance_rows(rows, 1.2)
    }

    #[test]
    fn test_route_full_path_brackets_with_depot() {
        let route = Route::new(vec![LocationIdx::new(2), LocationIdx::new(1)]);
        assert_eq!(
            route.full_path(),
            vec![DEPOT, LocationIdx::new(2), LocationIdx::new(1), DEPOT]
        );

        assert_eq!(Route::new(vec![]).full_path(), vec![DEPOT]);
    }

    #[test]
    fn test_solution_metrics() {
        let graph = unit_graph(4);
        let solution = Solution::evaluate(
            &graph,
            vec![
                vec![LocationIdx::new(1), LocationIdx::new(2)],
                vec![LocationIdx::new(3)],
                vec![],
            ],
        );

        // route 0: depot-1-2-depot = 3 edges, route 1: depot-3-depot = 2 edges
        assert_eq!(solution.total_distance_km(), 5.0);
        assert!((solution.total_duration_min() - 6.0).abs() < 1e-9);
        assert!((solution.co2_savings_kg() - 5.0 * CO2_SAVINGS_PER_KM).abs() < 1e-12);
        assert!(solution.visits_each_destination_once(4));
    }

    #[test]
    fn test_visit_once_detects_duplicates_and_omissions() {
        let graph = unit_graph(4);

        let duplicated = Solution::evaluate(
            &graph,
            vec![vec![LocationIdx::new(1)], vec![LocationIdx::new(1)]],
        );
        assert!(!duplicated.visits_each_destination_once(4));

        let missing = Solution::evaluate(&graph, vec![vec![LocationIdx::new(1)], vec![]]);
        assert!(!missing.visits_each_destination_once(4));
    }
}
