use crate::problem::cost_graph::CostGraph;
use crate::problem::location::{DEPOT, LocationIdx};

const MIN_IMPROVEMENT: f64 = 1e-9;

/// One best-improvement 2-opt pass: finds the segment reversal with the
/// largest distance saving and applies it. Returns false when no reversal
/// improves the route, so callers loop until a pass comes back empty.
pub fn improve_route(graph: &CostGraph, stops: &mut [LocationIdx]) -> bool {
    if stops.len() < 2 {
        return false;
    }

    let mut best: Option<(usize, usize, f64)> = None;

    for i in 0..stops.len() - 1 {
        let prev = if i == 0 { DEPOT } else { stops[i - 1] };
        for j in i + 1..stops.len() {
            let next = if j == stops.len() - 1 { DEPOT } else { stops[j + 1] };

            // reversing stops[i..=j] only changes the two boundary legs
            let delta = graph.distance_km(prev, stops[j]) + graph.distance_km(stops[i], next)
                - graph.distance_km(prev, stops[i])
                - graph.distance_km(stops[j], next);

            if delta < -MIN_IMPROVEMENT && best.is_none_or(|(_, _, d)| delta < d) {
                best = Some((i, j, delta));
            }
        }
    }

    match best {
        Some((i, j, _)) => {
            stops[i..=j].reverse();
            true
        }
        None => false,
    }
}
