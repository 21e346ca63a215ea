use std::sync::Arc;

use rand::Rng;

use crate::problem::location::{Location, LocationIdx};
use crate::problem::profile::TravelProfile;

/// Symmetric travel cost matrices for one request, built once and then
/// shared read-only by the whole solve pipeline.
///
/// Flat storage: the entry for a pair of locations is at
/// `from * num_locations + to`.
#[derive(Clone)]
pub struct CostGraph {
    distances_km: Arc<Vec<f64>>,
    durations_min: Arc<Vec<f64>>,
    num_locations: usize,
}

impl CostGraph {
    /// Builds the great-circle cost graph over the canonical location list
    /// (depot first). Durations derive from the profile's average speed.
    pub fn from_locations(locations: &[Location], profile: TravelProfile) -> Self {
        let num_locations = locations.len();
        let mut distances_km = vec![0.0; num_locations * num_locations];
        let minutes_per_km = 60.0 / profile.average_speed_kmh();

        for (i, from) in locations.iter().enumerate() {
            for (j, to) in locations.iter().enumerate().skip(i + 1) {
                let distance = from.haversine_distance_km(to);
                distances_km[i * num_locations + j] = distance;
                distances_km[j * num_locations + i] = distance;
            }
        }

        let durations_min = distances_km.iter().map(|d| d * minutes_per_km).collect();

        CostGraph {
            distances_km: Arc::new(distances_km),
            durations_min: Arc::new(durations_min),
            num_locations,
        }
    }

    #[inline(always)]
    fn index(&self, from: LocationIdx, to: LocationIdx) -> usize {
        from.get() * self.num_locations + to.get()
    }

    #[inline(always)]
    pub fn distance_km(&self, from: LocationIdx, to: LocationIdx) -> f64 {
        if from == to {
            return 0.0;
        }

        self.distances_km[self.index(from, to)]
    }

    #[inline(always)]
    pub fn duration_min(&self, from: LocationIdx, to: LocationIdx) -> f64 {
        if from == to {
            return 0.0;
        }

        self.durations_min[self.index(from, to)]
    }

    pub fn max_distance_km(&self) -> f64 {
        self.distances_km.iter().cloned().fold(0.0, f64::max)
    }

    pub fn num_locations(&self) -> usize {
        self.num_locations
    }

    /// A copy of this graph with every edge scaled by an independent
    /// multiplier `1 + U(0, magnitude)`, simulating live traffic/weather
    /// deltas. The result stays symmetric.
    pub fn perturbed<R: Rng>(&self, rng: &mut R, magnitude: f64) -> CostGraph {
        let n = self.num_locations;
        let mut distances_km = self.distances_km.as_ref().clone();
        let mut durations_min = self.durations_min.as_ref().clone();

        for i in 0..n {
            for j in (i + 1)..n {
                let multiplier = 1.0 + rng.random::<f64>() * magnitude;
                distances_km[i * n + j] *= multiplier;
                distances_km[j * n + i] = distances_km[i * n + j];
                durations_min[i * n + j] *= multiplier;
                durations_min[j * n + i] = durations_min[i * n + j];
            }
        }

        CostGraph {
            distances_km: Arc::new(distances_km),
            durations_min: Arc::new(durations_min),
            num_locations: n,
        }
    }

    #[cfg(test)]
    pub fn from_distance_rows(rows: Vec<Vec<f64>>, minutes_per_km: f64) -> Self {
        let num_locations = rows.len();
        let distances_km: Vec<f64> = rows.into_iter().flatten().collect();
        let durations_min = distances_km.iter().map(|d| d * minutes_per_km).collect();

        CostGraph {
            distances_km: Arc::new(distances_km),
            durations_min: Arc::new(durations_min),
            num_locations,
        }
    }
}
