use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};

use jiff::Timestamp;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::error::SolverError;
use crate::params::QuantumParams;
use crate::problem::vrp::VrpInstance;
use crate::quantum::nelder_mead::{self, NelderMeadParams};
use crate::quantum::qaoa::QaoaCircuit;
use crate::quantum::statevector::MAX_SUPPORTED_VARIABLES;
use crate::qubo::decode::decode_state;
use crate::qubo::encoder::VrpQuboEncoder;
use crate::solution::Solution;
use crate::telemetry::{ProgressSink, SolverPhase};

/// A successful quantum run: the decoded routes plus the QUBO energy of the
/// sample they came from.
pub struct QuantumSolution {
    pub solution: Solution,
    pub energy: f64,
}

/// QAOA-over-simulator VRP solver. Encodes the instance as a QUBO, runs a
/// parameterized circuit on a dense statevector, searches the angles with
/// Nelder-Mead, and decodes the best sampled bitstring back into routes.
///
/// Blocking and CPU-heavy; the orchestrator runs it on a blocking thread
/// with a cancellation flag.
#[derive(Clone)]
pub struct QuantumSolver {
    params: QuantumParams,
}

impl QuantumSolver {
    pub fn new(params: QuantumParams) -> Self {
        Self { params }
    }

    /// Largest QUBO this solver will attempt: the configured limit, never
    /// above what the simulator can hold.
    pub fn variable_ceiling(&self) -> usize {
        self.params.max_variables.min(MAX_SUPPORTED_VARIABLES)
    }

    pub fn solve(
        &self,
        instance: &VrpInstance,
        sink: &ProgressSink,
        cancel: &AtomicBool,
    ) -> Result<QuantumSolution, SolverError> {
        let deadline = Timestamp::now() + self.params.budget;
        let expired = || cancel.load(Ordering::Relaxed) || Timestamp::now() >= deadline;

        let encoder = VrpQuboEncoder::new(instance);
        let qubo = encoder.encode(instance, self.params.penalty_factor, self.variable_ceiling())?;
        sink.report(SolverPhase::Quantum, 10, "problem encoded as QUBO");

        // The cost Hamiltonian is diagonal, so every basis energy is
        // precomputed once and reused by all circuit evaluations.
        let dim = 1usize << qubo.num_variables();
        let mut energies = Vec::with_capacity(dim);
        for state in 0..dim as u64 {
            if state % 4096 == 0 && expired() {
                return Err(SolverError::QuantumTimeout);
            }
            energies.push(qubo.energy(state));
        }

        let circuit = QaoaCircuit::new(&energies, qubo.num_variables(), self.params.layers);
        let mut rng = SmallRng::seed_from_u64(self.params.seed);
        let max_iterations = self.params.max_iterations;
        let shots = self.params.shots;

        let mut best_state = 0u64;
        let mut best_energy = f64::INFINITY;

        let search = nelder_mead::minimize(
            &NelderMeadParams {
                max_iterations,
                ..NelderMeadParams::default()
            },
            &circuit.initial_parameters(),
            |parameters| {
                let evaluation = circuit.evaluate(parameters, shots, &mut rng);
                if evaluation.best_energy < best_energy {
                    best_energy = evaluation.best_energy;
                    best_state = evaluation.best_state;
                }
                evaluation.expected_energy
            },
            |iteration| {
                let percent = 10 + (iteration * 85 / max_iterations.max(1)) as u8;
                sink.report(
                    SolverPhase::Quantum,
                    percent.min(95),
                    format!("parameter search iteration {iteration}"),
                );
                if expired() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );

        if search.interrupted {
            return Err(SolverError::QuantumTimeout);
        }

        debug!(
            iterations = search.iterations,
            expected_energy = search.value,
            best_energy,
            "parameter search converged"
        );
        sink.report(SolverPhase::Quantum, 95, "decoding best sample");

        let solution = decode_state(&encoder, instance, best_state)?;
        Ok(QuantumSolution {
            solution,
            energy: best_energy,
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::test_utils::line_instance;

    fn fast_params() -> QuantumParams {
        QuantumParams {
            max_iterations: 40,
            shots: 256,
            ..QuantumParams::default()
        }
    }

    #[test]
    fn test_solves_a_small_instance() {
        let solver = QuantumSolver::new(fast_params());
        let instance = line_instance(2, 1);
        let cancel = AtomicBool::new(false);

        let result = solver
            .solve(&instance, &ProgressSink::noop(), &cancel)
            .unwrap();

        assert!(result.solution.visits_each_destination_once(3));
        assert!(result.solution.total_distance_km() > 0.0);
        assert!(result.energy.is_finite());
    }

    #[test]
    fn test_same_seed_gives_the_same_routes() {
        let solver = QuantumSolver::new(fast_params());
        let instance = line_instance(2, 1);
        let cancel = AtomicBool::new(false);

        let first = solver
            .solve(&instance, &ProgressSink::noop(), &cancel)
            .unwrap();
        let second = solver
            .solve(&instance, &ProgressSink::noop(), &cancel)
            .unwrap();

        assert_eq!(first.solution.routes(), second.solution.routes());
        assert_eq!(first.energy, second.energy);
    }

    #[test]
    fn test_cancellation_reports_a_timeout() {
        let solver = QuantumSolver::new(fast_params());
        let instance = line_instance(2, 1);
        let cancel = AtomicBool::new(true);

        let result = solver.solve(&instance, &ProgressSink::noop(), &cancel);
        assert!(matches!(result, Err(SolverError::QuantumTimeout)));
    }

    #[test]
    fn test_zero_budget_times_out_immediately() {
        let solver = QuantumSolver::new(QuantumParams {
            budget: SignedDuration::ZERO,
            ..fast_params()
        });
        let instance = line_instance(2, 1);
        let cancel = AtomicBool::new(false);

        let result = solver.solve(&instance, &ProgressSink::noop(), &cancel);
        assert!(matches!(result, Err(SolverError::QuantumTimeout)));
    }

    #[test]
    fn test_oversized_instance_is_rejected_up_front() {
        let solver = QuantumSolver::new(fast_params());
        let instance = line_instance(10, 3);
        let cancel = AtomicBool::new(false);

        let result = solver.solve(&instance, &ProgressSink::noop(), &cancel);
        assert!(matches!(result, Err(SolverError::ProblemTooLarge { .. })));
    }
}
