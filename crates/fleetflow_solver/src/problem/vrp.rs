use std::sync::Arc;

use crate::error::SolverError;
use crate::problem::cost_graph::CostGraph;
use crate::problem::fleet::FleetSpec;
use crate::problem::location::{Location, LocationIdx};
use crate::problem::profile::TravelProfile;

/// One fully-validated VRP instance: the canonical location list (depot at
/// index 0), its cost graph, and the fleet. Owned by a single run and
/// read-only once built.
pub struct VrpInstance {
    locations: Arc<Vec<Location>>,
    graph: CostGraph,
    fleet: FleetSpec,
}

impl VrpInstance {
    pub fn new(
        depot: Location,
        destinations: Vec<Location>,
        fleet: FleetSpec,
        profile: TravelProfile,
    ) -> Result<Self, SolverError> {
        depot.validate("depot")?;
        for (index, destination) in destinations.iter().enumerate() {
            destination.validate(&format!("destination {index}"))?;
        }

        let mut locations = Vec::with_capacity(1 + destinations.len());
        locations.push(depot);
        locations.extend(destinations);

        let graph = CostGraph::from_locations(&locations, profile);

        Ok(Self {
            locations: Arc::new(locations),
            graph,
            fleet,
        })
    }

    /// The same instance under different travel conditions, used by the
    /// live re-optimization loop.
    pub fn with_graph(&self, graph: CostGraph) -> VrpInstance {
        VrpInstance {
            locations: Arc::clone(&self.locations),
            graph,
            fleet: self.fleet,
        }
    }

    pub fn graph(&self) -> &CostGraph {
        &self.graph
    }

    pub fn fleet(&self) -> FleetSpec {
        self.fleet
    }

    pub fn location(&self, index: LocationIdx) -> &Location {
        &self.locations[index.get()]
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }

    pub fn num_destinations(&self) -> usize {
        self.locations.len() - 1
    }

    pub fn destination_ids(&self) -> impl Iterator<Item = LocationIdx> {
        (1..self.locations.len()).map(LocationIdx::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depot_is_index_zero() {
        let instance = VrpInstance::new(
            Location::with_address(16.5744, 80.6556, "Amaravati"),
            vec![Location::from_lat_lon(16.5062, 80.6480)],
            FleetSpec::new(1),
            TravelProfile::Car,
        )
        .unwrap();

        assert_eq!(instance.num_locations(), 2);
        assert_eq!(instance.num_destinations(), 1);
        assert_eq!(instance.location(LocationIdx::new(0)).address(), Some("Amaravati"));
    }

    #[test]
    fn test_invalid_destination_is_rejected_before_solving() {
        let result = VrpInstance::new(
            Location::from_lat_lon(16.5744, 80.6556),
            vec![Location::from_lat_lon(123.0, 80.0)],
            FleetSpec::new(1),
            TravelProfile::Car,
        );

        assert!(matches!(result, Err(SolverError::InvalidLocation(_))));
    }
}
