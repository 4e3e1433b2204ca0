use server::AuthorityError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("malformed message from authority: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("embedded host failed: {0}")]
    Host(#[from] AuthorityError),

    #[error("authority rejected request: {0}")]
    Rejected(String),

    #[error("could not reach {url} after {attempts} attempts")]
    Unreachable { url: String, attempts: u32 },

    #[error("connection to authority lost")]
    Disconnected,

    #[error("flavor text unavailable: {0}")]
    Flavor(String),
}
