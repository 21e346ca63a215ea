use std::str::FromStr;

use jiff::SignedDuration;
use tracing::warn;

/// Parameters for one solve pipeline. Built once at startup (`from_env`) and
/// shared read-only by every run.
#[derive(Clone, Debug)]
pub struct SolverParams {
    pub quantum: QuantumParams,
    pub classical: ClassicalParams,
    pub live: LiveParams,
}

#[derive(Clone, Debug)]
pub struct QuantumParams {
    /// Wall-clock budget for the whole quantum attempt. A zero budget skips
    /// the attempt entirely.
    pub budget: SignedDuration,
    /// Ceiling on QUBO variable count (= simulated qubits). Above it the
    /// orchestrator routes directly to the classical solver.
    pub max_variables: usize,
    /// QAOA depth p: number of cost/mixer layer pairs.
    pub layers: usize,
    /// Measurement samples per circuit evaluation.
    pub shots: usize,
    /// Outer parameter-search iterations.
    pub max_iterations: usize,
    /// Constraint penalties are `penalty_factor * max_edge_cost * n`.
    pub penalty_factor: f64,
    /// Seed for the sampling RNG, so runs are reproducible.
    pub seed: u64,
}

#[derive(Clone, Debug)]
pub struct ClassicalParams {
    /// Independent budget for construction + improvement.
    pub budget: SignedDuration,
}

#[derive(Clone, Debug)]
pub struct LiveParams {
    /// Interval between re-optimization cycles of a standing request.
    pub interval: SignedDuration,
    /// Upper bound of the per-edge traffic multiplier `1 + U(0, perturbation)`.
    pub perturbation: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            quantum: QuantumParams::default(),
            classical: ClassicalParams::default(),
            live: LiveParams::default(),
        }
    }
}

impl Default for QuantumParams {
    fn default() -> Self {
        Self {
            budget: SignedDuration::from_secs(30),
            max_variables: 20,
            layers: 2,
            shots: 1024,
            max_iterations: 100,
            penalty_factor: 10.0,
            seed: 42,
        }
    }
}

impl Default for ClassicalParams {
    fn default() -> Self {
        Self {
            budget: SignedDuration::from_secs(30),
        }
    }
}

impl Default for LiveParams {
    fn default() -> Self {
        Self {
            interval: SignedDuration::from_secs(5),
            perturbation: 0.5,
        }
    }
}

impl SolverParams {
    /// Defaults overridden by `FLEETFLOW_*` environment variables.
    pub fn from_env() -> Self {
        let mut params = Self::default();

        if let Some(secs) = env_parse::<i64>("FLEETFLOW_QUANTUM_BUDGET_SECS") {
            params.quantum.budget = SignedDuration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<i64>("FLEETFLOW_CLASSICAL_BUDGET_SECS") {
            params.classical.budget = SignedDuration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<i64>("FLEETFLOW_LIVE_INTERVAL_SECS") {
            params.live.interval = SignedDuration::from_secs(secs);
        }
        if let Some(value) = env_parse("FLEETFLOW_MAX_QUBO_VARIABLES") {
            params.quantum.max_variables = value;
        }
        if let Some(value) = env_parse("FLEETFLOW_QAOA_LAYERS") {
            params.quantum.layers = value;
        }
        if let Some(value) = env_parse("FLEETFLOW_QAOA_SHOTS") {
            params.quantum.shots = value;
        }
        if let Some(value) = env_parse("FLEETFLOW_QAOA_MAX_ITERATIONS") {
            params.quantum.max_iterations = value;
        }
        if let Some(value) = env_parse("FLEETFLOW_QAOA_SEED") {
            params.quantum.seed = value;
        }

        params
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(key, %value, "ignoring unparseable environment override");
            None
        }
    }
}
