// HTTP request handlers
use crate::application::broadcaster::Frame;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Upgrade to a websocket that receives every broadcast channel
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    // Subscribe before the upgrade completes so no frame published in between is lost
    let frames = state.broadcaster.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, frames))
}

async fn handle_socket(socket: WebSocket, frames: broadcast::Receiver<Frame>) {
    tracing::info!("client connected");
    let (outgoing, incoming) = socket.split();
    pump(outgoing, incoming, frames).await;
    tracing::info!("client disconnected");
}

/// Forward broadcast frames to one client until it goes away
pub(crate) async fn pump<Tx, Rx, E>(mut outgoing: Tx, mut incoming: Rx, mut frames: broadcast::Receiver<Frame>)
where
    Tx: Sink<Message> + Unpin,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
{
    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(text) => {
                    if outgoing.send(Message::Text(text.to_string())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "client is lagging, frames dropped");
                }
                Err(RecvError::Closed) => break,
            },
            message = incoming.next() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Clients only listen; anything they send is ignored
                Some(Ok(_)) => {}
            },
        }
    }
}
