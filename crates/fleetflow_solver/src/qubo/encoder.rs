use tracing::debug;

use crate::error::SolverError;
use crate::problem::location::LocationIdx;
use crate::problem::vrp::VrpInstance;
use crate::qubo::model::Qubo;

/// Maps a VRP instance onto binary variables `x[i,j,k]`: vehicle `k`
/// traverses the directed edge `i -> j` (`i != j`). Variables are indexed
/// densely per vehicle, then per origin.
pub struct VrpQuboEncoder {
    num_locations: usize,
    num_vehicles: usize,
}

impl VrpQuboEncoder {
    pub fn new(instance: &VrpInstance) -> Self {
        Self {
            num_locations: instance.num_locations(),
            num_vehicles: instance.fleet().vehicle_count,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.num_vehicles * self.num_locations * (self.num_locations - 1)
    }

    pub fn num_locations(&self) -> usize {
        self.num_locations
    }

    pub fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    pub fn var_index(&self, vehicle: usize, from: usize, to: usize) -> usize {
        debug_assert!(from != to);
        let per_vehicle = self.num_locations * (self.num_locations - 1);
        let to_offset = if to < from { to } else { to - 1 };

        vehicle * per_vehicle + from * (self.num_locations - 1) + to_offset
    }

    /// Inverse of `var_index`.
    pub fn edge(&self, var: usize) -> (usize, usize, usize) {
        let per_vehicle = self.num_locations * (self.num_locations - 1);
        let vehicle = var / per_vehicle;
        let rest = var % per_vehicle;
        let from = rest / (self.num_locations - 1);
        let to_offset = rest % (self.num_locations - 1);
        let to = if to_offset < from { to_offset } else { to_offset + 1 };

        (vehicle, from, to)
    }

    /// Builds the QUBO: the travel-cost objective plus penalty terms for
    /// visit-once, depot boundaries, per-vehicle flow conservation, and
    /// 2-cycle subtour exclusion.
    ///
    /// Fails with `ProblemTooLarge` when the variable count exceeds
    /// `ceiling`; the quantum path is only attempted below it.
    pub fn encode(&self, instance: &VrpInstance, penalty_factor: f64, ceiling: usize) -> Result<Qubo, SolverError> {
        let variables = self.num_variables();
        if variables > ceiling {
            return Err(SolverError::ProblemTooLarge { variables, ceiling });
        }

        let n = self.num_locations;
        let k = self.num_vehicles;
        let graph = instance.graph();
        let penalty = penalty_factor * graph.max_distance_km().max(1.0) * n as f64;

        let mut qubo = Qubo::new(variables);

        // Objective: total travel distance over the chosen edges.
        for vehicle in 0..k {
            for from in 0..n {
                for to in 0..n {
                    if from != to {
                        let cost = graph.distance_km(LocationIdx::new(from), LocationIdx::new(to));
                        qubo.add_linear(self.var_index(vehicle, from, to), cost);
                    }
                }
            }
        }

        // Visit-once: each non-depot node has exactly one incoming and one
        // outgoing edge across all vehicles.
        for node in 1..n {
            let incoming: Vec<usize> = (0..n)
                .filter(|&from| from != node)
                .flat_map(|from| (0..k).map(move |vehicle| (vehicle, from)))
                .map(|(vehicle, from)| self.var_index(vehicle, from, node))
                .collect();
            qubo.add_exactly_one_penalty(&incoming, penalty);

            let outgoing: Vec<usize> = (0..n)
                .filter(|&to| to != node)
                .flat_map(|to| (0..k).map(move |vehicle| (vehicle, to)))
                .map(|(vehicle, to)| self.var_index(vehicle, node, to))
                .collect();
            qubo.add_exactly_one_penalty(&outgoing, penalty);
        }

        // Depot boundary: every vehicle leaves the depot once and returns
        // once.
        for vehicle in 0..k {
            let departures: Vec<usize> = (1..n)
                .map(|to| self.var_index(vehicle, 0, to))
                .collect();
            qubo.add_exactly_one_penalty(&departures, penalty);

            let returns: Vec<usize> = (1..n)
                .map(|from| self.var_index(vehicle, from, 0))
                .collect();
            qubo.add_exactly_one_penalty(&returns, penalty);
        }

        // Flow conservation: a vehicle entering a node must also leave it.
        for vehicle in 0..k {
            for node in 1..n {
                let inflow: Vec<usize> = (0..n)
                    .filter(|&from| from != node)
                    .map(|from| self.var_index(vehicle, from, node))
                    .collect();
                let outflow: Vec<usize> = (0..n)
                    .filter(|&to| to != node)
                    .map(|to| self.var_index(vehicle, node, to))
                    .collect();
                qubo.add_balance_penalty(&inflow, &outflow, penalty);
            }
        }

        // Subtour exclusion: forbid 2-cycles between non-depot nodes. Every
        // instance the quantum path attempts sits below the ceiling, so the
        // pairwise form is always affordable.
        for vehicle in 0..k {
            for a in 1..n {
                for b in (a + 1)..n {
                    qubo.add_quadratic(
                        self.var_index(vehicle, a, b),
                        self.var_index(vehicle, b, a),
                        penalty,
                    );
                }
            }
        }

        debug!(variables, penalty, "encoded VRP instance as QUBO");
        Ok(qubo)
    }
}
