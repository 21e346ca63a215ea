use thiserror::Error;

/// Error surface of the solve pipeline.
///
/// Only `InvalidLocation` and `InfeasibleProblem` are ever user-visible; the
/// quantum-path errors are contained inside the orchestrator and turn into a
/// classical fallback.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("{variables} QUBO variables exceed the quantum ceiling of {ceiling}")]
    ProblemTooLarge { variables: usize, ceiling: usize },

    #[error("quantum solver exceeded its wall-clock budget")]
    QuantumTimeout,

    #[error("quantum sample could not be decoded into a feasible solution: {0}")]
    QuantumDecode(String),

    #[error("infeasible problem: {0}")]
    InfeasibleProblem(String),

    #[error("internal solver failure: {0}")]
    Internal(String),
}
