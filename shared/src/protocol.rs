//! JSON wire protocol between clients and the authority
//!
//! Every message is a JSON object whose `type` field names the variant, e.g.
//! `{"type":"JOIN_ROOM","roomId":"3fa2c81e","playerName":"viper"}`.

use crate::geometry::GridPoint;
use crate::model::{Food, LobbyPlayer, PlayerId, RoomId};
use serde::{Deserialize, Serialize};

/// Messages sent by clients.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
        #[serde(default)]
        player_name: String,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        player_name: String,
    },
    StartGame,
    #[serde(rename_all = "camelCase")]
    Input {
        angle: f64,
        #[serde(default)]
        is_boosting: bool,
        /// Lobby handshake on a direct peer link.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

/// Messages sent by the authority.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Init { player_id: PlayerId, map_size: f64 },
    #[serde(rename_all = "camelCase")]
    RoomCreated { room_id: RoomId, player_id: PlayerId },
    #[serde(rename_all = "camelCase")]
    RoomJoined { room_id: RoomId, player_id: PlayerId },
    LobbyUpdate { players: Vec<LobbyPlayer> },
    GameStart,
    State(Snapshot),
    #[serde(rename_all = "camelCase")]
    PlayerDied {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        score: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kills: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        killed_by: Option<PlayerId>,
    },
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

/// Bandwidth-reduced view of one room, identical for every member.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub snakes: Vec<SnakeView>,
    pub food: Vec<Food>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl Snapshot {
    pub fn snake(&self, id: PlayerId) -> Option<&SnakeView> {
        self.snakes.iter().find(|s| s.id == id)
    }
}

/// A snake as broadcast: same fields as the authoritative snake, body rounded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnakeView {
    pub id: PlayerId,
    pub name: String,
    pub body: Vec<GridPoint>,
    pub angle: f64,
    pub target_angle: f64,
    pub speed: f64,
    pub color: String,
    pub score: u32,
    pub width: f64,
    pub turning_speed: f64,
    #[serde(default)]
    pub kills: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
}

pub fn encode_server(message: &ServerMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

pub fn decode_server(text: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn encode_client(message: &ClientMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

pub fn decode_client(text: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(text)
}
