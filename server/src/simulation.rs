//! Authoritative per-tick snake physics
//!
//! [`advance`] moves every snake of one room by a single tick: boost, steering,
//! head movement, body follow and length trim, then collision, food and
//! replenishment. It reads player input only through [`InputSource`], so the
//! same code runs behind a dedicated server and behind a hosting peer.

use crate::collision::{check_collision, Collision};
use crate::food::FoodManager;
use rand::Rng;
use shared::{angle_delta, normalize_angle, GameConfig, InputState, PlayerId, Snake};
use std::collections::{BTreeMap, HashMap};

/// Read access to the most recent input of each player.
pub trait InputSource {
    /// `None` when the player is not known; its snake is then left alone.
    fn latest_input(&self, player: PlayerId) -> Option<InputState>;
}

impl InputSource for HashMap<PlayerId, InputState> {
    fn latest_input(&self, player: PlayerId) -> Option<InputState> {
        self.get(&player).copied()
    }
}

/// Mutable simulation state of one room. Snakes are keyed by their owner and
/// iterated in player id order, which is the order their links connected.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub snakes: BTreeMap<PlayerId, Snake>,
    pub food: FoodManager,
}

/// A snake removed during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Death {
    pub player_id: PlayerId,
    pub name: String,
    pub score: u32,
    pub kills: u32,
    pub cause: Collision,
}

impl Death {
    /// The other snake whose trail caused this death.
    pub fn killed_by(&self) -> Option<PlayerId> {
        match self.cause {
            Collision::Trail { owner } if owner != self.player_id => Some(owner),
            _ => None,
        }
    }
}

/// Turns towards `target_angle` by at most `turning_speed`.
pub fn steer(snake: &mut Snake) {
    let diff = angle_delta(snake.angle, snake.target_angle);

    if diff.abs() > snake.turning_speed {
        snake.angle += diff.signum() * snake.turning_speed;
    } else {
        snake.angle = snake.target_angle;
    }

    snake.angle = normalize_angle(snake.angle);
}

/// Picks the speed for this tick and, while boosting, may shed the tail as food.
///
/// Boosting only works while the body is longer than half the initial length.
pub fn apply_boost<R: Rng>(
    snake: &mut Snake,
    boosting: bool,
    food: &mut FoodManager,
    rng: &mut R,
    config: &GameConfig,
) {
    if boosting && snake.len() > config.initial_length / 2 {
        snake.speed = config.boost_speed;
        if rng.gen_bool(config.boost_drop_chance) {
            if let Some(dropped) = snake.body.pop_back() {
                food.drop_boost(dropped, &snake.color);
            }
        }
    } else {
        snake.speed = config.base_speed;
    }
}

/// Pushes a new head along the current heading, clamped to the map.
pub fn move_head(snake: &mut Snake, config: &GameConfig) {
    let head = snake
        .head()
        .advanced(snake.angle, snake.speed)
        .clamped(config.half_extent());
    snake.body.push_front(head);
}

/// Pulls every segment to within `segment_spacing` of its predecessor.
///
/// One pass from head to tail; sharp turns may overshoot for a tick.
pub fn follow_body(snake: &mut Snake, config: &GameConfig) {
    let spacing = config.segment_spacing;

    for i in 1..snake.body.len() {
        let prev = snake.body[i - 1];
        let curr = snake.body[i];

        if prev.distance(&curr) > spacing {
            let direction = prev.angle_to(&curr);
            snake.body[i] = prev.advanced(direction, spacing);
        }
    }
}

/// Drops trailing segments beyond `initial_length + score / 10`.
pub fn trim_length(snake: &mut Snake, config: &GameConfig) {
    let target = config.target_length(snake.score).max(1);
    snake.body.truncate(target);
}

/// Moves one snake a single tick using `input`. Does not check collisions.
pub fn move_snake<R: Rng>(
    snake: &mut Snake,
    input: InputState,
    food: &mut FoodManager,
    rng: &mut R,
    config: &GameConfig,
) {
    if input.angle.is_finite() {
        snake.target_angle = normalize_angle(input.angle);
    }

    apply_boost(snake, input.boosting, food, rng, config);
    steer(snake);
    move_head(snake, config);
    follow_body(snake, config);
    trim_length(snake, config);
}

/// Runs one tick over `world` and returns the snakes that died in it.
///
/// Snakes move in player id order and are checked against the room as it is at that
/// moment. A snake killed earlier in the pass still blocks the others until
/// the pass ends; then the dead are removed, their bodies turn into food and
/// surviving killers are credited.
pub fn advance<I, R>(world: &mut World, inputs: &I, config: &GameConfig, rng: &mut R) -> Vec<Death>
where
    I: InputSource + ?Sized,
    R: Rng,
{
    let ids: Vec<PlayerId> = world.snakes.keys().copied().collect();
    let mut hits: Vec<(PlayerId, Collision)> = Vec::new();

    for id in ids {
        let Some(input) = inputs.latest_input(id) else {
            continue;
        };
        let Some(snake) = world.snakes.get_mut(&id) else {
            continue;
        };

        move_snake(snake, input, &mut world.food, rng, config);

        if let Some(snake) = world.snakes.get(&id) {
            if let Some(cause) = check_collision(snake, world.snakes.values(), config) {
                hits.push((id, cause));
            }
        }
    }

    let mut deaths = Vec::with_capacity(hits.len());
    for (id, cause) in hits {
        if let Some(snake) = world.snakes.remove(&id) {
            world.food.scatter_remains(&snake, rng);
            deaths.push(Death {
                player_id: id,
                name: snake.name,
                score: snake.score,
                kills: snake.kills,
                cause,
            });
        }
    }

    for death in &deaths {
        if let Some(killer) = death.killed_by().and_then(|id| world.snakes.get_mut(&id)) {
            killer.kills += 1;
        }
    }

    for snake in world.snakes.values_mut() {
        world.food.consume(snake);
    }

    world.food.replenish(rng, config);

    deaths
}
