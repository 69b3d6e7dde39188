use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message as AxumMessage, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::application::ports::realtime_port::Notification;
use crate::bootstrap::app_context::AppContext;

#[utoipa::path(
    get,
    path = "/socket",
    responses((status = 101, description = "Switching Protocols (WebSocket upgrade)")),
    tag = "Realtime"
)]
pub async fn socket_entry(ws: WebSocketUpgrade, State(ctx): State<AppContext>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| peer(socket, ctx))
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/socket", get(socket_entry))
        .with_state(ctx)
}

fn encode(note: &Notification) -> Option<AxumMessage> {
    match serde_json::to_string(note) {
        Ok(text) => Some(AxumMessage::Text(text)),
        Err(e) => {
            tracing::warn!(event = %note.event, error = %e, "WS encode failed");
            None
        }
    }
}

// Server-push only. Inbound frames are drained so close frames are noticed.
async fn peer(ws: WebSocket, ctx: AppContext) {
    let mut notes = BroadcastStream::new(ctx.realtime().subscribe());
    tracing::info!(connected = ctx.realtime().connected(), "WS peer:connected");
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(AxumMessage::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "WS peer:read_error");
                    break;
                }
            },
            note = notes.next() => match note {
                Some(Ok(note)) => {
                    let Some(msg) = encode(&note) else { continue };
                    if sink.send(msg).await.is_err() {
                        break;
                    }
                }
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "WS peer:lagged");
                }
                None => break,
            },
        }
    }

    let _ = sink.close().await;
    tracing::info!("WS connection closed");
}
