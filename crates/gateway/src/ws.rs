use std::sync::Arc;

use {
    axum::extract::ws::{Message, WebSocket},
    futures::{SinkExt, stream::StreamExt},
    serde_json::json,
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use crate::{
    broadcast::frame,
    state::{ConnectedClient, GatewayState},
};

/// Handle one subscriber connection: snapshot push → register → read
/// loop → cleanup.
///
/// Subscribers are read-only; inbound frames are ignored. New
/// subscribers get a one-time `chats` snapshot, never a replay of the
/// message log.
pub async fn handle_connection(socket: WebSocket, state: Arc<GatewayState>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, "ws: new subscriber");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (client_tx, mut client_rx) = mpsc::unbounded_channel::<String>();

    // Write loop: forwards serialized frames to the socket.
    let write_conn_id = conn_id.clone();
    let write_handle = tokio::spawn(async move {
        while let Some(msg) = client_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                debug!(conn_id = %write_conn_id, "ws: write loop closed");
                break;
            }
        }
    });

    // Register before the snapshot push so no broadcast can slip past a
    // subscriber that already saw its snapshot.
    state.clients.write().await.insert(conn_id.clone(), ConnectedClient {
        conn_id: conn_id.clone(),
        sender: client_tx.clone(),
    });

    // One-time snapshot for this client only.
    match state.provider.get_chats().await {
        Ok(chats) => {
            let names: Vec<String> = chats.iter().map(|c| c.display_name().to_string()).collect();
            match frame("chats", &json!(names)) {
                Ok(f) => {
                    let _ = client_tx.send(f);
                },
                Err(e) => warn!(error = %e, "ws: failed to serialize chat snapshot"),
            }
        },
        Err(e) => warn!(conn_id = %conn_id, error = %e, "ws: chat snapshot unavailable"),
    }

    while let Some(Ok(msg)) = ws_rx.next().await {
        if let Message::Close(_) = msg {
            break;
        }
    }

    state.clients.write().await.remove(&conn_id);
    write_handle.abort();
    info!(conn_id = %conn_id, "ws: subscriber disconnected");
}
