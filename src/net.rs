use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::RacerError;
use crate::state::{ServerMessage, SharedRaceState};

/// Everything a display client may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Key { key: String, pressed: bool },
    Start,
    Restart,
    Ping,
}

impl ClientMessage {
    pub fn from_json(txt: &str) -> Option<Self> {
        serde_json::from_str(txt).ok()
    }
}

pub async fn start_websocket_server(listener: TcpListener, state: Arc<Mutex<SharedRaceState>>) {
    if let Ok(addr) = listener.local_addr() {
        info!("display websocket listening on ws://{addr}");
    }

    loop {
        let (raw, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!(%err, "accept failed");
                continue;
            }
        };
        let state = Arc::clone(&state);

        tokio::spawn(async move {
            let session_id = Uuid::new_v4().to_string();
            info!(%peer, %session_id, "display connected");

            if let Err(err) = handle_connection(raw, &session_id, state).await {
                warn!(%session_id, %err, "display connection closed with error");
            }

            info!(%session_id, "display disconnected");
        });
    }
}

async fn handle_connection(
    raw: TcpStream,
    session_id: &str,
    state: Arc<Mutex<SharedRaceState>>,
) -> Result<(), RacerError> {
    let ws = accept_async(raw).await?;
    let (mut write, mut read) = ws.split();

    // outgoing frames go through a channel so the frame task never awaits a socket
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let welcome = {
        let mut shared = state.lock().await;
        shared.register_client(tx.clone());
        let screen = shared.config().screen;
        ServerMessage::Welcome {
            session_id,
            width: screen.width,
            height: screen.height,
        }
        .to_json()?
    };
    let _ = tx.send(welcome);

    let send_loop = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    let mut outcome = Ok(());
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(err) => {
                outcome = Err(err.into());
                break;
            }
        };
        if !msg.is_text() {
            continue;
        }
        let Ok(text) = msg.to_text() else {
            continue;
        };

        let Some(parsed) = ClientMessage::from_json(text) else {
            debug!(%session_id, "ignoring unrecognised message");
            continue;
        };

        match parsed {
            ClientMessage::Key { key, pressed } => {
                state.lock().await.set_key(&key, pressed);
            }
            ClientMessage::Start => state.lock().await.start(),
            ClientMessage::Restart => state.lock().await.restart(),
            ClientMessage::Ping => match ServerMessage::Pong.to_json() {
                Ok(json) => {
                    let _ = tx.send(json);
                }
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            },
        }
    }

    send_loop.abort();
    let _ = send_loop.await;
    outcome
}
