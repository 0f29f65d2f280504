//! Push channel carrying slot updates to connected browsers.
//!
//! ```text
//! ws://localhost:5000/api/ws
//! ```
//!
//! Every successful claim is sent to every open connection as
//!
//! ```json
//! { "type": "slotUpdate", "expertId": "...", "date": "2025-06-01", "time": "09:00", "isBooked": true }
//! ```
//!
//! There is no backlog. A client that reconnects re-fetches the expert.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{header::ORIGIN, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::middleware::cors::is_allowed_origin;
use crate::services::notification_service::{SlotUpdate, Subscription};
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventMessage {
    SlotUpdate(SlotUpdate),
}

/// Number of open event channels served from one [`AppState`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionCounter {
    open: Arc<AtomicUsize>,
}

impl ConnectionCounter {
    pub fn current(&self) -> usize {
        self.open.load(Ordering::Relaxed)
    }

    /// Counts a connection until the returned guard is dropped.
    pub fn track(&self) -> ConnectionGuard {
        let open = self.open.fetch_add(1, Ordering::Relaxed) + 1;
        info!(connections = open, "Event channel connected");
        ConnectionGuard {
            open: self.open.clone(),
        }
    }
}

pub struct ConnectionGuard {
    open: Arc<AtomicUsize>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let open = self.open.fetch_sub(1, Ordering::Relaxed) - 1;
        info!(connections = open, "Event channel disconnected");
    }
}

/// Browsers always send `Origin` on upgrade; other clients may omit it.
fn origin_permitted(headers: &HeaderMap, allowed: &[String]) -> bool {
    match headers.get(ORIGIN) {
        Some(origin) => origin
            .to_str()
            .map(|o| is_allowed_origin(allowed, o))
            .unwrap_or(false),
        None => true,
    }
}

#[axum::debug_handler]
pub async fn slot_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if !origin_permitted(&headers, &state.allowed_origins) {
        warn!(origin = ?headers.get(ORIGIN), "Rejected event channel from disallowed origin");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "forbidden", "message": "Origin not allowed" })),
        )
            .into_response();
    }

    let subscription = state.notifier.subscribe();
    let connections = state.connections.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, subscription, connections))
}

async fn handle_socket(
    socket: WebSocket,
    subscription: Subscription,
    connections: ConnectionCounter,
) {
    let _guard = connections.track();

    let (mut sender, mut receiver) = socket.split();

    let mut forward = tokio::spawn(async move {
        let mut events = Box::pin(subscription.into_stream());
        while let Some(event) = events.next().await {
            let payload = match serde_json::to_string(&EventMessage::SlotUpdate(event)) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "Failed to encode slot update");
                    continue;
                }
            };
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    // Clients have nothing to say on this channel beyond closing it.
    let mut inbound = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
            debug!("Ignoring inbound event channel frame");
        }
    });

    tokio::select! {
        _ = &mut forward => inbound.abort(),
        _ = &mut inbound => forward.abort(),
    }
}
