use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::classical::solver::ClassicalSolver;
use crate::error::SolverError;
use crate::params::SolverParams;
use crate::problem::vrp::VrpInstance;
use crate::quantum::solver::{QuantumSolution, QuantumSolver};
use crate::qubo::encoder::VrpQuboEncoder;
use crate::solution::Solution;
use crate::telemetry::{ProgressSink, SolverPhase};

/// What the caller asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Quantum,
    #[default]
    Classical,
}

/// What actually produced the answer. `QuantumWithClassicalFallback` means a
/// quantum attempt was started and failed; a skipped attempt reports plain
/// `Classical`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodUsed {
    Quantum,
    Classical,
    QuantumWithClassicalFallback,
}

/// Terminal result of one quantum attempt.
pub enum SolverOutcome {
    Success(QuantumSolution),
    TimedOut,
    DecodeFailed,
    TooLarge,
}

impl SolverOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SolverOutcome::Success(_) => "success",
            SolverOutcome::TimedOut => "timed_out",
            SolverOutcome::DecodeFailed => "decode_failed",
            SolverOutcome::TooLarge => "too_large",
        }
    }
}

pub struct OptimizationReport {
    pub solution: Solution,
    pub method_used: MethodUsed,
    /// Wall-clock seconds for the whole run, fallback included.
    pub optimization_time: f64,
}

enum RunState {
    Init,
    QuantumAttempt,
    QuantumSucceeded(QuantumSolution),
    QuantumFailed(SolverOutcome),
    ClassicalAttempt { fallback: bool },
    Done { solution: Solution, method_used: MethodUsed },
}

/// Drives one optimization run through its states: try quantum when it was
/// requested and the instance fits, fall back to classical on any quantum
/// failure, and always come back with routes or a user-facing error.
pub struct Orchestrator {
    params: SolverParams,
    quantum: QuantumSolver,
    classical: ClassicalSolver,
}

impl Orchestrator {
    pub fn new(params: SolverParams) -> Self {
        let quantum = QuantumSolver::new(params.quantum.clone());
        let classical = ClassicalSolver::new(params.classical.clone());
        Self {
            params,
            quantum,
            classical,
        }
    }

    pub async fn optimize(
        &self,
        instance: Arc<VrpInstance>,
        method: Method,
        sink: Arc<ProgressSink>,
    ) -> Result<OptimizationReport, SolverError> {
        if instance.fleet().vehicle_count == 0 {
            return Err(SolverError::InfeasibleProblem("no vehicles to route".to_owned()));
        }
        if instance.num_destinations() == 0 {
            return Err(SolverError::InfeasibleProblem("no destinations to visit".to_owned()));
        }

        let run_id = Uuid::new_v4();
        let started = Timestamp::now();
        info!(
            %run_id,
            ?method,
            destinations = instance.num_destinations(),
            vehicles = instance.fleet().vehicle_count,
            "starting optimization run"
        );

        let mut state = RunState::Init;
        loop {
            state = match state {
                RunState::Init => {
                    if self.quantum_is_viable(&instance, method, &run_id) {
                        RunState::QuantumAttempt
                    } else {
                        RunState::ClassicalAttempt { fallback: false }
                    }
                }
                RunState::QuantumAttempt => {
                    match self.run_quantum(Arc::clone(&instance), Arc::clone(&sink)).await {
                        SolverOutcome::Success(quantum) => RunState::QuantumSucceeded(quantum),
                        outcome => RunState::QuantumFailed(outcome),
                    }
                }
                RunState::QuantumSucceeded(quantum) => {
                    info!(%run_id, energy = quantum.energy, "quantum attempt succeeded");
                    RunState::Done {
                        solution: quantum.solution,
                        method_used: MethodUsed::Quantum,
                    }
                }
                RunState::QuantumFailed(outcome) => {
                    warn!(%run_id, outcome = outcome.label(), "quantum attempt failed, falling back");
                    RunState::ClassicalAttempt { fallback: true }
                }
                RunState::ClassicalAttempt { fallback } => {
                    let solution = self
                        .run_classical(Arc::clone(&instance), Arc::clone(&sink))
                        .await?;
                    let method_used = if fallback {
                        MethodUsed::QuantumWithClassicalFallback
                    } else {
                        MethodUsed::Classical
                    };
                    RunState::Done { solution, method_used }
                }
                RunState::Done { solution, method_used } => {
                    let phase = match method_used {
                        MethodUsed::Quantum => SolverPhase::Quantum,
                        _ => SolverPhase::Classical,
                    };
                    sink.report(phase, 100, "optimization complete");

                    let optimization_time = started.duration_until(Timestamp::now()).as_secs_f64();
                    info!(
                        %run_id,
                        ?method_used,
                        optimization_time,
                        total_distance_km = solution.total_distance_km(),
                        "optimization run finished"
                    );

                    return Ok(OptimizationReport {
                        solution,
                        method_used,
                        optimization_time,
                    });
                }
            };
        }
    }

    /// A quantum attempt only starts when it was asked for, has a non-zero
    /// budget, and the encoded instance fits the simulator. Anything else
    /// routes straight to classical and reports plain `classical`.
    fn quantum_is_viable(&self, instance: &VrpInstance, method: Method, run_id: &Uuid) -> bool {
        if method != Method::Quantum {
            return false;
        }
        if !self.params.quantum.budget.is_positive() {
            info!(%run_id, "quantum budget is zero, skipping attempt");
            return false;
        }

        let variables = VrpQuboEncoder::new(instance).num_variables();
        let ceiling = self.quantum.variable_ceiling();
        if variables > ceiling {
            info!(
                %run_id,
                variables,
                ceiling,
                outcome = SolverOutcome::TooLarge.label(),
                "instance exceeds the quantum ceiling, skipping attempt"
            );
            return false;
        }

        true
    }

    async fn run_quantum(&self, instance: Arc<VrpInstance>, sink: Arc<ProgressSink>) -> SolverOutcome {
        let cancel = Arc::new(AtomicBool::new(false));
        let solver = self.quantum.clone();
        let task_cancel = Arc::clone(&cancel);

        let mut handle =
            tokio::task::spawn_blocking(move || solver.solve(&instance, &sink, &task_cancel));

        // The solver enforces its own deadline; the outer timeout is a
        // backstop with a little grace, after which we cancel and wait for
        // the thread to notice.
        let grace = (self.params.quantum.budget + SignedDuration::from_secs(2)).unsigned_abs();
        let joined = match tokio::time::timeout(grace, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                match handle.await {
                    Ok(_) => return SolverOutcome::TimedOut,
                    Err(join_error) => {
                        error!(%join_error, "quantum solver task failed after timeout");
                        return SolverOutcome::TimedOut;
                    }
                }
            }
        };

        match joined {
            Ok(Ok(quantum)) => SolverOutcome::Success(quantum),
            Ok(Err(SolverError::QuantumTimeout)) => SolverOutcome::TimedOut,
            Ok(Err(SolverError::ProblemTooLarge { .. })) => SolverOutcome::TooLarge,
            Ok(Err(error)) => {
                warn!(%error, "quantum sample rejected");
                SolverOutcome::DecodeFailed
            }
            Err(join_error) => {
                error!(%join_error, "quantum solver task panicked");
                SolverOutcome::DecodeFailed
            }
        }
    }

    async fn run_classical(
        &self,
        instance: Arc<VrpInstance>,
        sink: Arc<ProgressSink>,
    ) -> Result<Solution, SolverError> {
        let solver = self.classical.clone();

        match tokio::task::spawn_blocking(move || solver.solve(&instance, &sink)).await {
            Ok(result) => result,
            Err(join_error) => {
                error!(%join_error, "classical solver task panicked");
                Err(SolverError::Internal("classical solver task failed".to_owned()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::telemetry::{TelemetryEvent, TelemetryHub};
    use crate::test_utils::line_instance;

    fn fast_orchestrator() -> Orchestrator {
        let mut params = SolverParams::default();
        params.quantum.max_iterations = 40;
        params.quantum.shots = 256;
        Orchestrator::new(params)
    }

    #[tokio::test]
    async fn test_classical_request_reports_classical() {
        let orchestrator = fast_orchestrator();
        let instance = Arc::new(line_instance(3, 1));

        let report = orchestrator
            .optimize(instance, Method::Classical, Arc::new(ProgressSink::noop()))
            .await
            .unwrap();

        assert_eq!(report.method_used, MethodUsed::Classical);
        assert!(report.solution.visits_each_destination_once(4));
        assert!(report.optimization_time >= 0.0);
    }

    #[tokio::test]
    async fn test_small_quantum_request_stays_quantum() {
        let orchestrator = fast_orchestrator();
        let instance = Arc::new(line_instance(2, 1));

        let report = orchestrator
            .optimize(instance, Method::Quantum, Arc::new(ProgressSink::noop()))
            .await
            .unwrap();

        assert_eq!(report.method_used, MethodUsed::Quantum);
        assert!(report.solution.visits_each_destination_once(3));
    }

    #[tokio::test]
    async fn test_oversized_quantum_request_is_routed_to_classical() {
        let orchestrator = fast_orchestrator();
        // 30 destinations is far beyond any simulator ceiling
        let instance = Arc::new(line_instance(30, 3));

        let report = orchestrator
            .optimize(instance, Method::Quantum, Arc::new(ProgressSink::noop()))
            .await
            .unwrap();

        assert_eq!(report.method_used, MethodUsed::Classical);
        assert!(report.solution.visits_each_destination_once(31));
    }

    #[tokio::test]
    async fn test_zero_budget_skips_the_quantum_attempt() {
        let mut params = SolverParams::default();
        params.quantum.budget = SignedDuration::ZERO;
        let orchestrator = Orchestrator::new(params);
        let instance = Arc::new(line_instance(2, 1));

        let report = orchestrator
            .optimize(instance, Method::Quantum, Arc::new(ProgressSink::noop()))
            .await
            .unwrap();

        assert_eq!(report.method_used, MethodUsed::Classical);
    }

    #[tokio::test]
    async fn test_expired_attempt_falls_back_with_the_fallback_label() {
        let mut params = SolverParams::default();
        // positive but long gone by the time the solver thread starts
        params.quantum.budget = SignedDuration::from_nanos(1);
        let orchestrator = Orchestrator::new(params);
        let instance = Arc::new(line_instance(2, 1));

        let report = orchestrator
            .optimize(instance, Method::Quantum, Arc::new(ProgressSink::noop()))
            .await
            .unwrap();

        assert_eq!(report.method_used, MethodUsed::QuantumWithClassicalFallback);
        assert!(report.solution.visits_each_destination_once(3));
    }

    #[tokio::test]
    async fn test_amaravati_single_vehicle_tour() {
        use crate::problem::fleet::FleetSpec;
        use crate::problem::location::Location;
        use crate::problem::profile::TravelProfile;

        let instance = Arc::new(
            VrpInstance::new(
                Location::with_address(16.5744, 80.6556, "Amaravati"),
                vec![
                    Location::with_address(16.5062, 80.6480, "Vijayawada"),
                    Location::with_address(16.2991, 80.4575, "Guntur"),
                    Location::with_address(14.4426, 79.9865, "Nellore"),
                ],
                FleetSpec::new(1),
                TravelProfile::Car,
            )
            .unwrap(),
        );

        let orchestrator = fast_orchestrator();
        let report = orchestrator
            .optimize(instance, Method::Quantum, Arc::new(ProgressSink::noop()))
            .await
            .unwrap();

        assert_eq!(report.solution.routes().len(), 1);
        assert!(report.solution.visits_each_destination_once(4));
        assert!(report.solution.total_distance_km() > 0.0);
    }

    #[tokio::test]
    async fn test_empty_fleet_is_rejected() {
        let orchestrator = fast_orchestrator();
        let instance = Arc::new(line_instance(2, 0));

        let result = orchestrator
            .optimize(instance, Method::Classical, Arc::new(ProgressSink::noop()))
            .await;

        assert!(matches!(result, Err(SolverError::InfeasibleProblem(_))));
    }

    #[tokio::test]
    async fn test_progress_is_monotone_and_ends_at_100() {
        let orchestrator = fast_orchestrator();
        let hub = TelemetryHub::new();
        let session = hub.session("test");
        let mut rx = session.subscribe();

        orchestrator
            .optimize(
                Arc::new(line_instance(2, 1)),
                Method::Quantum,
                Arc::new(session.progress_sink()),
            )
            .await
            .unwrap();

        let mut last = 0;
        while let Ok(event) = rx.try_recv() {
            if let TelemetryEvent::QuantumProgress { progress, .. } = event {
                assert!(progress >= last);
                last = progress;
            }
        }
        assert_eq!(last, 100);
    }
}
