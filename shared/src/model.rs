//! Entity model: snakes, food, lobby profiles and player input

use crate::config::GameConfig;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub type PlayerId = u32;
pub type RoomId = String;
pub type FoodId = u64;

/// Body colours handed out to snakes.
pub const SNAKE_COLORS: [&str; 8] = [
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#06b6d4", "#3b82f6", "#8b5cf6", "#ec4899",
];

/// Colours used for regular food.
pub const FOOD_COLORS: [&str; 8] = [
    "#ff0080", "#00ff80", "#8000ff", "#ff8000", "#0080ff", "#80ff00", "#ff0040", "#40ff00",
];

/// Colour of the food a dead snake leaves behind.
pub const REMAINS_COLOR: &str = "#ffffff";

/// A player-controlled chain of points. `body[0]` is the head.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    pub id: PlayerId,
    pub name: String,
    pub body: VecDeque<Point>,
    pub angle: f64,
    pub target_angle: f64,
    pub speed: f64,
    pub color: String,
    pub score: u32,
    pub width: f64,
    pub turning_speed: f64,
    /// Other snakes that died on this snake's trail.
    pub kills: u32,
}

impl Snake {
    /// Lays the snake out straight below `head`, facing up.
    pub fn spawn(id: PlayerId, name: &str, head: Point, color: &str, config: &GameConfig) -> Self {
        let body = (0..config.initial_length)
            .map(|i| Point::new(head.x, head.y + i as f64 * config.segment_spacing))
            .collect();
        let facing = -std::f64::consts::FRAC_PI_2;

        Self {
            id,
            name: name.to_string(),
            body,
            angle: facing,
            target_angle: facing,
            speed: config.base_speed,
            color: color.to_string(),
            score: 0,
            width: config.base_width,
            turning_speed: config.turning_speed,
            kills: 0,
        }
    }

    /// The body is never empty while the snake exists.
    pub fn head(&self) -> Point {
        self.body.front().copied().unwrap_or_default()
    }

    pub fn tail(&self) -> Point {
        self.body.back().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// A collectible on the map.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Food {
    pub id: FoodId,
    #[serde(flatten)]
    pub position: Point,
    pub value: u32,
    pub color: String,
    pub radius: f64,
}

/// Roster entry shown in the lobby.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LobbyPlayer {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub ready: bool,
}

/// The most recent steering command of a player.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputState {
    /// Heading the player wants, in radians.
    pub angle: f64,
    pub boosting: bool,
}
