//! Wire types of the optimization API. Everything here mirrors what the
//! frontend sends and renders; the solve pipeline itself never sees these.

use serde::{Deserialize, Serialize};

use crate::error::SolverError;
use crate::orchestrator::{Method, MethodUsed, OptimizationReport};
use crate::problem::fleet::FleetSpec;
use crate::problem::location::Location;
use crate::problem::profile::TravelProfile;
use crate::problem::vrp::VrpInstance;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonLocation {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl JsonLocation {
    fn to_location(&self) -> Location {
        match &self.address {
            Some(address) => Location::with_address(self.lat, self.lon, address),
            None => Location::from_lat_lon(self.lat, self.lon),
        }
    }

    fn from_location(location: &Location) -> Self {
        Self {
            lat: location.lat(),
            lon: location.lon(),
            address: location.address().map(str::to_owned),
        }
    }
}

pub const DEFAULT_SESSION: &str = "default";

fn default_session() -> String {
    DEFAULT_SESSION.to_owned()
}

#[derive(Debug, Deserialize)]
pub struct JsonOptimizationRequest {
    pub depot: JsonLocation,
    pub destinations: Vec<JsonLocation>,
    pub vehicle_count: usize,
    #[serde(default)]
    pub method: Method,
    #[serde(default)]
    pub profile: TravelProfile,
    /// Telemetry stream identity; requests without one share `default`.
    #[serde(default = "default_session")]
    pub session_id: String,
}

impl JsonOptimizationRequest {
    pub fn build_instance(&self) -> Result<VrpInstance, SolverError> {
        VrpInstance::new(
            self.depot.to_location(),
            self.destinations.iter().map(JsonLocation::to_location).collect(),
            FleetSpec::new(self.vehicle_count),
            self.profile,
        )
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct JsonPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct JsonRoute {
    /// Visited stops in order, depot excluded.
    pub destinations: Vec<JsonLocation>,
    /// Depot-bracketed coordinate polyline for the map layer.
    pub path: Vec<JsonPoint>,
    pub distance_km: f64,
    pub duration_hours: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct JsonMetrics {
    pub total_distance_km: f64,
    pub total_duration_hours: f64,
    pub co2_savings_kg: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct JsonOptimizationResults {
    pub routes: Vec<JsonRoute>,
    pub metrics: JsonMetrics,
    pub method_used: MethodUsed,
    pub optimization_time: f64,
}

impl JsonOptimizationResults {
    pub fn from_report(instance: &VrpInstance, report: &OptimizationReport) -> Self {
        let graph = instance.graph();

        let routes = report
            .solution
            .routes()
            .iter()
            .map(|route| JsonRoute {
                destinations: route
                    .stops()
                    .iter()
                    .map(|&stop| JsonLocation::from_location(instance.location(stop)))
                    .collect(),
                path: route
                    .full_path()
                    .iter()
                    .map(|&stop| {
                        let location = instance.location(stop);
                        JsonPoint {
                            lat: location.lat(),
                            lon: location.lon(),
                        }
                    })
                    .collect(),
                distance_km: route.distance_km(graph),
                duration_hours: route.duration_min(graph) / 60.0,
            })
            .collect();

        Self {
            routes,
            metrics: JsonMetrics {
                total_distance_km: report.solution.total_distance_km(),
                total_duration_hours: report.solution.total_duration_min() / 60.0,
                co2_savings_kg: report.solution.co2_savings_kg(),
            },
            method_used: report.method_used,
            optimization_time: report.optimization_time,
        }
    }
}

/// Response envelope. `results` and `error` are always present so clients
/// can rely on the shape; the absent one is an explicit null.
#[derive(Clone, Debug, Serialize)]
pub struct JsonOptimizationResponse {
    pub ok: bool,
    pub results: Option<JsonOptimizationResults>,
    pub error: Option<String>,
}

impl JsonOptimizationResponse {
    pub fn success(results: JsonOptimizationResults) -> Self {
        Self {
            ok: true,
            results: Some(results),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            results: None,
            error: Some(message.into()),
        }
    }
}
