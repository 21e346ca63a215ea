pub mod classical;
pub mod error;
pub mod json;
pub mod live;
pub mod orchestrator;
pub mod params;
pub mod problem;
pub mod quantum;
pub mod qubo;
pub mod solution;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_utils;
