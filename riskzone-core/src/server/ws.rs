//! Push channel: one WebSocket session per hub connection
//!
//! The session registers with the hub before the upgrade so a full hub can
//! still answer with a plain 503. After that it pumps hub events out as JSON
//! text frames and feeds client requests back in, until either side closes.

use super::handlers::ApiError;
use super::state::AppState;
use crate::sync::{ClientRequest, ConnectionId, Subscription, SyncHubHandle};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    let subscription = match state.hub.connect().await {
        Ok(subscription) => subscription,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| run_session(socket, hub, subscription))
}

async fn run_session(socket: WebSocket, hub: SyncHubHandle, mut subscription: Subscription) {
    let connection = subscription.id;
    let (mut sink, mut stream) = socket.split();
    info!(%connection, "Push session opened");

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    // Dropped by the hub (lagging, or hub shut down)
                    debug!(%connection, "Hub closed event stream");
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                };

                let text = match event.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(%connection, event = event.name(), error = %e, "Failed to encode event");
                        continue;
                    }
                };

                if let Err(e) = sink.send(Message::Text(text)).await {
                    debug!(%connection, error = %e, "Socket write failed");
                    break;
                }
            }

            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_request(&hub, connection, &text).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(%connection, error = %e, "Socket read failed");
                    break;
                }
            },
        }
    }

    hub.disconnect(connection).await;
    info!(%connection, "Push session closed");
}

async fn handle_request(hub: &SyncHubHandle, connection: ConnectionId, text: &str) {
    let request = match ClientRequest::from_json(text) {
        Ok(request) => request,
        Err(e) => {
            warn!(%connection, error = %e, "Ignoring malformed frame");
            return;
        }
    };

    let result = match request {
        // Rejections reach the client as a zone_rejected event
        ClientRequest::SubmitZone(candidate) => hub.submit_from(connection, candidate).await.map(|_| ()),
        ClientRequest::RequestSnapshot => hub.request_resync(connection).await,
        ClientRequest::ResetZones => hub.reset().await.map(|_| ()),
    };

    if let Err(e) = result {
        debug!(%connection, error = %e, "Client request not applied");
    }
}
