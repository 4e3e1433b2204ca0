//! Tunable game constants shared by the authority and its clients

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Gameplay tuning for one authority.
///
/// Every field has a default, so a JSON file only needs the values it
/// overrides.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Side length of the square map; coordinates span `±map_size / 2`.
    pub map_size: f64,
    pub initial_length: usize,
    /// Distance kept between consecutive body segments.
    pub segment_spacing: f64,
    pub base_speed: f64,
    pub boost_speed: f64,
    /// Maximum heading change per tick, in radians.
    pub turning_speed: f64,
    pub base_width: f64,
    /// Number of food items a room is seeded with and replenished towards.
    pub food_target: usize,
    /// Distance from the walls kept free when placing food and spawning snakes.
    pub spawn_padding: f64,
    /// Per-tick probability that a boosting snake sheds its tail.
    pub boost_drop_chance: f64,
    /// Per-tick probability of adding one food item while below target.
    pub replenish_chance: f64,
    /// Only every n-th body segment is tested for trail collisions.
    pub collision_stride: usize,
    /// Own head-adjacent segments that can never kill their snake.
    pub self_collision_skip: usize,
    /// Overlap allowed between two bodies before it counts as a hit.
    pub collision_tolerance: f64,
    pub leaderboard_size: usize,
    pub broadcast_interval_ms: u64,
    pub tick_rate: u32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_size: 4000.0,
            initial_length: 8,
            segment_spacing: 8.0,
            base_speed: 3.0,
            boost_speed: 5.0,
            turning_speed: 0.1,
            base_width: 15.0,
            food_target: 800,
            spawn_padding: 200.0,
            boost_drop_chance: 0.2,
            replenish_chance: 0.1,
            collision_stride: 2,
            self_collision_skip: 6,
            collision_tolerance: 4.0,
            leaderboard_size: 5,
            broadcast_interval_ms: 50,
            tick_rate: 60,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Tuning for the direct-link topology where one player hosts the match:
    /// a smaller map with longer, wider and faster snakes.
    pub fn peer_hosted() -> Self {
        Self {
            map_size: 2000.0,
            initial_length: 20,
            base_speed: 4.0,
            boost_speed: 7.0,
            turning_speed: 0.08,
            base_width: 20.0,
            food_target: 300,
            ..Self::default()
        }
    }

    pub fn half_extent(&self) -> f64 {
        self.map_size / 2.0
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }

    /// Body length a snake with `score` is allowed to keep.
    pub fn target_length(&self, score: u32) -> usize {
        self.initial_length + (score / 10) as usize
    }

    /// Checks that the values describe a playable map.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.map_size.is_finite() && self.map_size > 0.0) {
            return Err(ConfigError("mapSize must be positive"));
        }
        if self.spawn_padding < 0.0 || self.spawn_padding * 2.0 >= self.map_size {
            return Err(ConfigError("spawnPadding must leave room inside the map"));
        }
        if self.initial_length < 2 {
            return Err(ConfigError("initialLength must be at least 2"));
        }
        if self.segment_spacing <= 0.0 {
            return Err(ConfigError("segmentSpacing must be positive"));
        }
        if self.collision_stride == 0 {
            return Err(ConfigError("collisionStride must be at least 1"));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError("tickRate must be at least 1"));
        }
        for chance in [self.boost_drop_chance, self.replenish_chance] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ConfigError("probabilities must lie in [0, 1]"));
            }
        }
        Ok(())
    }
}

/// Rejected configuration value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid game config: {0}")]
pub struct ConfigError(pub &'static str);
