//! Food placement, consumption and replenishment for one room

use rand::seq::SliceRandom;
use rand::Rng;
use shared::{Food, FoodId, GameConfig, Point, Snake, FOOD_COLORS, REMAINS_COLOR};

const BOOST_DROP_VALUE: u32 = 1;
const BOOST_DROP_RADIUS: f64 = 4.0;
const REMAINS_VALUE: u32 = 2;
const REMAINS_RADIUS: f64 = 5.0;
const REMAINS_JITTER: f64 = 10.0;

/// Uniform integer position inside the map, `spawn_padding` away from the walls.
pub fn random_position<R: Rng>(rng: &mut R, config: &GameConfig) -> Point {
    let limit = config.half_extent() - config.spawn_padding;
    let low = (-limit).ceil() as i64;
    let high = limit.floor() as i64;
    Point::new(
        rng.gen_range(low..=high) as f64,
        rng.gen_range(low..=high) as f64,
    )
}

/// The food of one room. Ids come from a private counter, so they never repeat.
#[derive(Debug, Clone, Default)]
pub struct FoodManager {
    items: Vec<Food>,
    next_id: FoodId,
}

impl FoodManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Food] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, position: Point, value: u32, color: &str, radius: f64) -> FoodId {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Food {
            id,
            position,
            value,
            color: color.to_string(),
            radius,
        });
        id
    }

    fn spawn_one<R: Rng>(&mut self, rng: &mut R, config: &GameConfig) -> FoodId {
        let position = random_position(rng, config);
        let value = rng.gen_range(1..=3);
        let radius = f64::from(rng.gen_range(3..=6_i32));
        let color = FOOD_COLORS.choose(rng).copied().unwrap_or(FOOD_COLORS[0]);
        self.push(position, value, color, radius)
    }

    /// Scatters `count` regular food items over the map.
    pub fn spawn<R: Rng>(&mut self, count: usize, rng: &mut R, config: &GameConfig) {
        for _ in 0..count {
            self.spawn_one(rng, config);
        }
    }

    /// Lets `snake` eat everything its head touches.
    ///
    /// Each item adds `value * 10` to the score and appends a copy of the
    /// tail, which the next length trim keeps because the score grew with it.
    /// Returns the number of items eaten.
    pub fn consume(&mut self, snake: &mut Snake) -> usize {
        let head = snake.head();
        let mut eaten = 0;

        // Reverse order so removals don't shift unvisited items
        for i in (0..self.items.len()).rev() {
            let food = &self.items[i];
            if head.distance(&food.position) < snake.width + food.radius {
                snake.score += food.value * 10;
                self.items.remove(i);
                let tail = snake.tail();
                snake.body.push_back(tail);
                eaten += 1;
            }
        }

        eaten
    }

    /// Adds at most one item per call while below target, with
    /// `replenish_chance` probability.
    pub fn replenish<R: Rng>(&mut self, rng: &mut R, config: &GameConfig) -> bool {
        if self.items.len() < config.food_target && rng.gen_bool(config.replenish_chance) {
            self.spawn_one(rng, config);
            true
        } else {
            false
        }
    }

    /// Tail segment shed while boosting.
    pub fn drop_boost(&mut self, at: Point, color: &str) -> FoodId {
        self.push(at, BOOST_DROP_VALUE, color, BOOST_DROP_RADIUS)
    }

    /// Turns every second segment of a dead snake into food.
    pub fn scatter_remains<R: Rng>(&mut self, snake: &Snake, rng: &mut R) {
        for segment in snake.body.iter().step_by(2) {
            let jittered = Point::new(
                segment.x + (rng.gen::<f64>() - 0.5) * REMAINS_JITTER,
                segment.y + (rng.gen::<f64>() - 0.5) * REMAINS_JITTER,
            );
            self.push(jittered, REMAINS_VALUE, REMAINS_COLOR, REMAINS_RADIUS);
        }
    }
}
