//! Snapshot assembly and the broadcast rate gate

use shared::{Food, GameConfig, LeaderboardEntry, Snake, SnakeView, Snapshot};
use std::time::{Duration, Instant};

/// Top `size` snakes by score, highest first. Equal scores keep their
/// iteration order.
pub fn leaderboard<'a, I>(snakes: I, size: usize) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a Snake>,
{
    let mut ranked: Vec<&Snake> = snakes.into_iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
        .into_iter()
        .take(size)
        .map(|snake| LeaderboardEntry {
            name: snake.name.clone(),
            score: snake.score,
        })
        .collect()
}

pub fn snake_view(snake: &Snake) -> SnakeView {
    SnakeView {
        id: snake.id,
        name: snake.name.clone(),
        body: snake.body.iter().map(|p| p.rounded()).collect(),
        angle: snake.angle,
        target_angle: snake.target_angle,
        speed: snake.speed,
        color: snake.color.clone(),
        score: snake.score,
        width: snake.width,
        turning_speed: snake.turning_speed,
        kills: snake.kills,
    }
}

/// Builds the view every member of a room receives.
pub fn build_snapshot<'a, I>(snakes: I, food: &[Food], config: &GameConfig) -> Snapshot
where
    I: IntoIterator<Item = &'a Snake> + Clone,
{
    Snapshot {
        snakes: snakes.clone().into_iter().map(snake_view).collect(),
        food: food.to_vec(),
        leaderboard: leaderboard(snakes, config.leaderboard_size),
    }
}

/// Lets a snapshot through at most once per `interval`.
#[derive(Debug, Clone)]
pub struct BroadcastGate {
    interval: Duration,
    last_sent: Option<Instant>,
}

impl BroadcastGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
        }
    }

    /// True when a snapshot is due at `now`; the first call always passes.
    pub fn ready(&mut self, now: Instant) -> bool {
        let due = match self.last_sent {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last_sent = Some(now);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Point;

    fn scored(id: u32, score: u32) -> Snake {
        let mut snake = Snake::spawn(
            id,
            &format!("p{id}"),
            Point::new(0.0, 0.0),
            "#ffffff",
            &GameConfig::default(),
        );
        snake.score = score;
        snake
    }

    #[test]
    fn test_leaderboard_top_five() {
        let snakes: Vec<Snake> = [50, 30, 80, 10, 20, 5]
            .iter()
            .enumerate()
            .map(|(i, &score)| scored(i as u32 + 1, score))
            .collect();

        let board = leaderboard(&snakes, 5);
        let scores: Vec<u32> = board.iter().map(|e| e.score).collect();

        assert_eq!(scores, vec![80, 50, 30, 20, 10]);
        assert_eq!(board[0].name, "p3");
    }

    #[test]
    fn test_leaderboard_ties_keep_order() {
        let snakes = vec![scored(1, 10), scored(2, 40), scored(3, 10)];
        let board = leaderboard(&snakes, 5);
        let names: Vec<&str> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn test_snapshot_rounds_bodies() {
        let mut snake = scored(1, 0);
        snake.body[0] = Point::new(10.6, -3.4);
        let snapshot = build_snapshot([&snake], &[], &GameConfig::default());

        let view = snapshot.snake(1).unwrap();
        assert_eq!(view.body[0].x, 11);
        assert_eq!(view.body[0].y, -3);
        assert_eq!(view.body.len(), snake.len());
        assert_eq!(snapshot.leaderboard.len(), 1);
    }

    #[test]
    fn test_gate_spacing() {
        let start = Instant::now();
        let mut gate = BroadcastGate::new(Duration::from_millis(50));

        assert!(gate.ready(start));
        assert!(!gate.ready(start + Duration::from_millis(16)));
        assert!(!gate.ready(start + Duration::from_millis(49)));
        assert!(gate.ready(start + Duration::from_millis(50)));
        assert!(!gate.ready(start + Duration::from_millis(66)));
        assert!(gate.ready(start + Duration::from_millis(120)));

        gate.reset();
        assert!(gate.ready(start + Duration::from_millis(121)));
    }
}
