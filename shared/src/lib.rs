//! Types shared by the authority and its clients
//!
//! Geometry, the entity model, game tuning and the JSON wire protocol. Both
//! sides of a link compile against the same definitions, so a message that
//! serializes on one side always parses on the other.

pub mod config;
pub mod geometry;
pub mod model;
pub mod protocol;

pub use config::{ConfigError, GameConfig};
pub use geometry::{angle_delta, normalize_angle, GridPoint, Point};
pub use model::{
    Food, FoodId, InputState, LobbyPlayer, PlayerId, RoomId, Snake, FOOD_COLORS, REMAINS_COLOR,
    SNAKE_COLORS,
};
pub use protocol::{ClientMessage, LeaderboardEntry, ServerMessage, SnakeView, Snapshot};

/// Longest player name kept after trimming.
pub const MAX_NAME_LENGTH: usize = 16;

/// Trims `raw` and caps it at [`MAX_NAME_LENGTH`] characters, falling back to
/// `default` when nothing is left.
pub fn sanitize_name(raw: &str, default: &str) -> String {
    let trimmed: String = raw.trim().chars().take(MAX_NAME_LENGTH).collect();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed
    }
}
