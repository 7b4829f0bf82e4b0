use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum RacerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
