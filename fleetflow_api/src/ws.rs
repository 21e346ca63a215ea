use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use fleetflow_solver::json::types::DEFAULT_SESSION;
use fleetflow_solver::telemetry::Session;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

#[derive(Deserialize)]
pub struct WsQuery {
    #[serde(default = "default_session")]
    pub session: String,
}

fn default_session() -> String {
    DEFAULT_SESSION.to_owned()
}

/// GET /ws/telemetry?session=<id>: streams the session's telemetry events as
/// JSON text frames for as long as the socket stays open.
pub async fn handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.session))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, session_id: String) {
    let session = state.hub.session(&session_id);
    stream_events(&mut socket, &session).await;
    drop(session);

    // last subscriber gone; reclaim the session unless something still runs
    state.hub.evict_if_idle(&session_id);
}

async fn stream_events(socket: &mut WebSocket, session: &Session) {
    let mut events = session.subscribe();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let Ok(payload) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if socket.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "telemetry subscriber lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    debug!(%text, "ignoring inbound websocket message");
                }
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }
}
