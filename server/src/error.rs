//! Boundary errors of the authority
//!
//! The simulation itself never fails; everything here comes from parsing,
//! lookups, session rules or transport I/O.

use shared::{ConfigError, PlayerId, RoomId};
use thiserror::Error;

/// How an error is surfaced to the peer that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or unrecognised message: logged and dropped.
    Protocol,
    /// Unknown room or player: reported back via `ERROR`.
    Lookup,
    /// Request conflicts with the session state: reported or ignored.
    StateConflict,
    /// Broken link: dropped, cleanup happens at the next tick.
    Transport,
}

#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("malformed message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Room not found")]
    RoomNotFound(RoomId),

    #[error("Not in a room")]
    NotInRoom(PlayerId),

    #[error("Game already in progress")]
    AlreadyStarted(RoomId),

    #[error("Room already exists")]
    RoomExists(RoomId),

    #[error("This host already runs a room")]
    HostedRoomOnly,

    #[error("only the host can start the game")]
    NotHost(PlayerId),

    #[error("Server full")]
    ServerFull,

    #[error("authority is not running")]
    Shutdown,

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid config file: {0}")]
    ConfigFile(serde_json::Error),
}

impl AuthorityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthorityError::Protocol(_) => ErrorKind::Protocol,
            AuthorityError::RoomNotFound(_) | AuthorityError::NotInRoom(_) => ErrorKind::Lookup,
            AuthorityError::AlreadyStarted(_)
            | AuthorityError::RoomExists(_)
            | AuthorityError::HostedRoomOnly
            | AuthorityError::NotHost(_)
            | AuthorityError::ServerFull => ErrorKind::StateConflict,
            AuthorityError::Shutdown
            | AuthorityError::WebSocket(_)
            | AuthorityError::Io(_)
            | AuthorityError::Config(_)
            | AuthorityError::ConfigFile(_) => ErrorKind::Transport,
        }
    }

    /// Whether the requester should get an `ERROR` message for this.
    pub fn is_reported(&self) -> bool {
        match self.kind() {
            ErrorKind::Lookup => true,
            ErrorKind::StateConflict => !matches!(self, AuthorityError::NotHost(_)),
            ErrorKind::Protocol | ErrorKind::Transport => false,
        }
    }
}
