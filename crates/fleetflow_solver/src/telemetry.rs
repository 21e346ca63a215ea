use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tokio::sync::broadcast;
use tracing::debug;

use crate::json::types::JsonOptimizationResults;
use crate::live::LiveHandle;

/// Events fanned out to every websocket subscribed to a session.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    QuantumProgress { progress: u8, message: String },
    LiveRouteUpdate { results: JsonOptimizationResults },
}

#[derive(Clone, Copy, Debug)]
pub enum SolverPhase {
    Quantum,
    Classical,
}

impl SolverPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverPhase::Quantum => "quantum",
            SolverPhase::Classical => "classical",
        }
    }
}

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Per-session telemetry channels, created lazily on first touch. A session
/// is one frontend's stream identity; events from one never leak into
/// another.
pub struct TelemetryHub {
    sessions: RwLock<FxHashMap<String, Arc<Session>>>,
}

impl TelemetryHub {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn session(&self, id: &str) -> Arc<Session> {
        if let Some(session) = self.sessions.read().get(id) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write();
        Arc::clone(sessions.entry(id.to_owned()).or_insert_with(|| {
            debug!(session = id, "creating telemetry session");
            Arc::new(Session::new())
        }))
    }

    /// Drops a session once nothing holds it: no subscribers, no run in
    /// flight, no live loop. Session ids are client-supplied, so anything
    /// that detaches from one (socket close, live stop, one-shot solve)
    /// sweeps here to keep the map bounded.
    pub fn evict_if_idle(&self, id: &str) {
        let mut sessions = self.sessions.write();
        if sessions.get(id).is_some_and(|session| session.is_idle()) {
            sessions.remove(id);
            debug!(session = id, "evicted idle telemetry session");
        }
    }
}

impl Default for TelemetryHub {
    fn default() -> Self {
        Self::new()
    }
}

/// One session's event channel plus its concurrency state: at most one solve
/// in flight and at most one standing live loop.
pub struct Session {
    events: broadcast::Sender<TelemetryEvent>,
    in_flight: Arc<tokio::sync::Mutex<()>>,
    live: Mutex<Option<LiveHandle>>,
}

impl Session {
    fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            events,
            in_flight: Arc::new(tokio::sync::Mutex::new(())),
            live: Mutex::new(None),
        }
    }

    pub fn publish(&self, event: TelemetryEvent) {
        // send only fails when nobody is subscribed, which is fine
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryEvent> {
        self.events.subscribe()
    }

    pub fn progress_sink(&self) -> ProgressSink {
        ProgressSink::new(self.events.clone())
    }

    /// Claims the session for one solve. `None` means a solve is already
    /// running and the caller should reject rather than queue.
    pub fn try_begin(&self) -> Option<OwnedMutexGuard<()>> {
        Arc::clone(&self.in_flight).try_lock_owned().ok()
    }

    /// Installs a live re-optimization loop, stopping any previous one.
    pub fn set_live(&self, handle: LiveHandle) {
        if let Some(previous) = self.live.lock().replace(handle) {
            previous.stop();
        }
    }

    fn is_idle(&self) -> bool {
        self.events.receiver_count() == 0
            && self.live.lock().is_none()
            && self.in_flight.try_lock().is_ok()
    }

    /// Stops the live loop if one is running. Returns whether there was one.
    pub fn stop_live(&self) -> bool {
        match self.live.lock().take() {
            Some(handle) => {
                handle.stop();
                true
            }
            None => false,
        }
    }
}

/// Progress reporting for one run. Percentages are clamped monotone so a
/// racing fallback can never move the bar backwards.
pub struct ProgressSink {
    tx: Option<broadcast::Sender<TelemetryEvent>>,
    last_percent: AtomicU8,
}

impl ProgressSink {
    pub fn new(tx: broadcast::Sender<TelemetryEvent>) -> Self {
        Self {
            tx: Some(tx),
            last_percent: AtomicU8::new(0),
        }
    }

    /// A sink that swallows everything, for tests and headless runs.
    pub fn noop() -> Self {
        Self {
            tx: None,
            last_percent: AtomicU8::new(0),
        }
    }

    pub fn report(&self, phase: SolverPhase, percent: u8, message: impl Into<String>) {
        let percent = percent.min(100);
        let previous = self.last_percent.fetch_max(percent, Ordering::Relaxed);
        if percent < previous {
            return;
        }

        let message = message.into();
        debug!(phase = phase.as_str(), percent, %message, "solver progress");

        if let Some(tx) = &self.tx {
            let _ = tx.send(TelemetryEvent::QuantumProgress {
                progress: percent,
                message,
            });
        }
    }

    pub fn last_percent(&self) -> u8 {
        self.last_percent.load(Ordering::Relaxed)
    }
}
