//! Per-tick death checks: map boundary and trail intersection

use shared::{GameConfig, PlayerId, Point, Snake};

/// What ended a snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    /// Ran into the body of `owner`, which may be the snake itself.
    Trail { owner: PlayerId },
}

/// True once the head reaches the map edge on either axis.
pub fn hits_wall(head: Point, config: &GameConfig) -> bool {
    let half = config.half_extent();
    head.x.abs() >= half || head.y.abs() >= half
}

/// Finds the first obstacle under `snake`'s head.
///
/// `all_snakes` is every snake of the room and may include `snake` itself;
/// its own first `self_collision_skip` segments are ignored so a tight turn
/// cannot kill it. Bodies are sampled every `collision_stride` segments and
/// the scan stops at the first hit.
pub fn check_collision<'a, I>(snake: &Snake, all_snakes: I, config: &GameConfig) -> Option<Collision>
where
    I: IntoIterator<Item = &'a Snake>,
{
    let head = snake.head();

    if hits_wall(head, config) {
        return Some(Collision::Wall);
    }

    let stride = config.collision_stride.max(1);

    for other in all_snakes {
        let start = if other.id == snake.id {
            config.self_collision_skip
        } else {
            0
        };
        let reach = snake.width / 2.0 + other.width / 2.0 - config.collision_tolerance;

        let hit = other
            .body
            .iter()
            .skip(start)
            .step_by(stride)
            .any(|segment| head.distance(segment) < reach);

        if hit {
            return Some(Collision::Trail { owner: other.id });
        }
    }

    None
}

/// Boolean form of [`check_collision`].
pub fn is_dead<'a, I>(snake: &Snake, all_snakes: I, config: &GameConfig) -> bool
where
    I: IntoIterator<Item = &'a Snake>,
{
    check_collision(snake, all_snakes, config).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    fn snake_with_body(id: PlayerId, points: &[(f64, f64)]) -> Snake {
        let config = GameConfig::default();
        let mut snake = Snake::spawn(id, "test", Point::new(0.0, 0.0), "#ffffff", &config);
        snake.body = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        snake
    }

    fn straight(id: PlayerId, x: f64, y0: f64, len: usize) -> Snake {
        let points: Vec<(f64, f64)> = (0..len).map(|i| (x, y0 + i as f64 * 8.0)).collect();
        snake_with_body(id, &points)
    }

    #[test]
    fn test_wall_detection() {
        let config = GameConfig::default();
        let half = config.half_extent();

        assert!(!hits_wall(Point::new(half - 0.5, 0.0), &config));
        assert!(hits_wall(Point::new(half, 0.0), &config));
        assert!(hits_wall(Point::new(0.0, -half), &config));

        let snake = straight(1, half, 0.0, 8);
        assert_eq!(
            check_collision(&snake, [&snake], &config),
            Some(Collision::Wall)
        );
    }

    #[test]
    fn test_straight_snake_survives_alone() {
        let config = GameConfig::default();
        let snake = straight(1, 0.0, 0.0, 30);
        assert!(!is_dead(&snake, [&snake], &config));
    }

    #[test]
    fn test_head_adjacent_segments_never_kill() {
        let config = GameConfig::default();
        // Six segments piled on the head: a turn as sharp as it gets
        let mut points = vec![(0.0, 0.0); 6];
        points.extend((1..10).map(|i| (100.0, i as f64 * 8.0)));
        let snake = snake_with_body(1, &points);

        assert!(!is_dead(&snake, [&snake], &config));
    }

    #[test]
    fn test_own_body_beyond_buffer_kills() {
        let config = GameConfig::default();
        let mut points: Vec<(f64, f64)> = (0..6).map(|i| (i as f64 * 8.0, 50.0)).collect();
        points[0] = (0.0, 0.0);
        // segment 6 is sampled (stride 2 from index 6) and lies on the head
        points.push((1.0, 0.0));
        points.push((200.0, 200.0));
        let snake = snake_with_body(1, &points);

        assert_eq!(
            check_collision(&snake, [&snake], &config),
            Some(Collision::Trail { owner: 1 })
        );
    }

    #[test]
    fn test_other_trail_is_attributed() {
        let config = GameConfig::default();
        let victim = straight(1, 0.0, 0.0, 8);
        let killer = snake_with_body(2, &[(-100.0, 0.0), (-5.0, 0.0), (3.0, 0.0), (11.0, 0.0)]);

        // stride 2 samples indices 0 and 2; index 2 is 3 units from the head
        assert_eq!(
            check_collision(&victim, [&victim, &killer], &config),
            Some(Collision::Trail { owner: 2 })
        );
    }

    #[test]
    fn test_unsampled_segments_are_skipped() {
        let config = GameConfig::default();
        let victim = straight(1, 0.0, 0.0, 8);
        // only index 1 overlaps the head, and odd indices are not sampled
        let other = snake_with_body(2, &[(-300.0, 0.0), (0.0, 0.0), (300.0, 0.0)]);

        assert!(!is_dead(&victim, [&victim, &other], &config));
    }

    #[test]
    fn test_reach_uses_both_widths_and_tolerance() {
        let config = GameConfig::default();
        let victim = straight(1, 0.0, 0.0, 8);
        // reach = 7.5 + 7.5 - 4 = 11
        let near = snake_with_body(2, &[(10.9, 0.0)]);
        let far = snake_with_body(3, &[(11.0, 0.0)]);

        assert!(is_dead(&victim, [&near], &config));
        assert!(!is_dead(&victim, [&far], &config));
    }

    #[test]
    fn test_first_hit_ends_scan() {
        let config = GameConfig::default();
        let victim = straight(1, 0.0, 0.0, 8);
        let first = snake_with_body(2, &[(2.0, 0.0)]);
        let second = snake_with_body(3, &[(0.0, 2.0)]);

        assert_eq!(
            check_collision(&victim, [&first, &second], &config),
            Some(Collision::Trail { owner: 2 })
        );
        assert_eq!(
            check_collision(&victim, [&second, &first], &config),
            Some(Collision::Trail { owner: 3 })
        );
    }

    proptest! {
        #[test]
        fn short_bodies_never_self_collide(
            points in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 1..=6)
        ) {
            let config = GameConfig::default();
            let mut snake = straight(1, 0.0, 0.0, 1);
            snake.body = points.iter().map(|&(x, y)| Point::new(x, y)).collect::<VecDeque<_>>();
            prop_assert!(!is_dead(&snake, [&snake], &config));
        }
    }
}
