use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::json::types::JsonOptimizationResults;
use crate::orchestrator::{Method, Orchestrator};
use crate::params::LiveParams;
use crate::problem::vrp::VrpInstance;
use crate::telemetry::{ProgressSink, Session, TelemetryEvent};

/// A standing re-optimization of one request: every interval, re-cost the
/// graph with simulated traffic and publish fresh routes to the session.
pub struct LiveReoptimizer {
    pub orchestrator: Arc<Orchestrator>,
    pub session: Arc<Session>,
    pub instance: Arc<VrpInstance>,
    pub method: Method,
    pub params: LiveParams,
}

/// Handle to a running live loop. Stopping it aborts the task; any cycle in
/// progress finishes its blocking solve but its result is discarded.
pub struct LiveHandle {
    task: JoinHandle<()>,
}

impl LiveHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl LiveReoptimizer {
    pub fn spawn(self) -> LiveHandle {
        let task = tokio::spawn(self.run());
        LiveHandle { task }
    }

    async fn run(self) {
        let mut interval = tokio::time::interval(self.params.interval.unsigned_abs());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // the zeroth tick completes immediately; the first cycle should wait
        interval.tick().await;

        let mut rng = SmallRng::from_os_rng();
        info!("live re-optimization loop started");

        loop {
            interval.tick().await;

            // One solve per session at a time. A busy session means either a
            // manual request or a previous cycle is still running; skip.
            let Some(_guard) = self.session.try_begin() else {
                continue;
            };

            let perturbed = self
                .instance
                .graph()
                .perturbed(&mut rng, self.params.perturbation);
            let instance = Arc::new(self.instance.with_graph(perturbed));

            let result = self
                .orchestrator
                .optimize(
                    Arc::clone(&instance),
                    self.method,
                    Arc::new(ProgressSink::noop()),
                )
                .await;

            match result {
                Ok(report) => {
                    let results = JsonOptimizationResults::from_report(&instance, &report);
                    self.session.publish(TelemetryEvent::LiveRouteUpdate { results });
                }
                Err(error) => warn!(%error, "live re-optimization cycle failed"),
            }
        }
    }
}
