//! Performance benchmarks for the per-tick hot paths

use rand::rngs::StdRng;
use rand::SeedableRng;
use server::broadcast::build_snapshot;
use server::collision::check_collision;
use server::room::Room;
use server::simulation::{advance, World};
use shared::protocol::encode_server;
use shared::{GameConfig, InputState, Point, ServerMessage, Snake};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

fn grid_of_snakes(count: u32, config: &GameConfig) -> BTreeMap<u32, Snake> {
    (0..count)
        .map(|i| {
            let x = -1500.0 + f64::from(i % 10) * 300.0;
            let y = -1500.0 + f64::from(i / 10) * 300.0;
            let mut snake = Snake::spawn(i, &format!("s{i}"), Point::new(x, y), "#ff0000", config);
            snake.score = 400;
            (i, snake)
        })
        .collect()
}

/// Benchmarks trail collision checks against a crowded room
#[test]
fn benchmark_collision_detection() {
    let config = GameConfig {
        initial_length: 60,
        ..GameConfig::default()
    };
    let snakes = grid_of_snakes(50, &config);
    let probe = &snakes[&0];

    let iterations = 2_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let _ = check_collision(probe, snakes.values(), &config);
    }

    let duration = start.elapsed();
    println!(
        "Collision detection: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // 50 snakes of 60 segments, well under a second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks full simulation ticks with many snakes
#[test]
fn benchmark_simulation_tick() {
    let config = GameConfig {
        seed: Some(1),
        ..GameConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(1);
    let mut world = World {
        snakes: grid_of_snakes(50, &config),
        ..World::default()
    };
    world.food.spawn(config.food_target, &mut rng, &config);

    let inputs: HashMap<u32, InputState> = (0..50)
        .map(|i| {
            (
                i,
                InputState {
                    angle: -std::f64::consts::FRAC_PI_2,
                    boosting: false,
                },
            )
        })
        .collect();

    let iterations = 60;
    let start = Instant::now();

    for _ in 0..iterations {
        advance(&mut world, &inputs, &config, &mut rng);
    }

    let duration = start.elapsed();
    println!(
        "Simulation: {} ticks in {:?} ({:.2} ms/tick)",
        iterations,
        duration,
        duration.as_secs_f64() * 1000.0 / iterations as f64
    );

    // One second of game time must simulate in well under a second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks snapshot building and encoding for a full room
#[test]
fn benchmark_snapshot_encoding() {
    let config = GameConfig::default();
    let mut rng = StdRng::seed_from_u64(2);
    let snakes = grid_of_snakes(30, &config);
    let mut world = World::default();
    world.food.spawn(config.food_target, &mut rng, &config);

    let iterations = 100;
    let start = Instant::now();
    let mut bytes = 0;

    for _ in 0..iterations {
        let snapshot = build_snapshot(snakes.values(), world.food.items(), &config);
        bytes = encode_server(&ServerMessage::State(snapshot)).unwrap().len();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot encoding: {} iterations in {:?}, {} bytes each",
        iterations, duration, bytes
    );

    assert!(bytes > 0);
    assert!(duration.as_millis() < 2000);
}

/// Stress test: a lobby-to-match room ticking for ten seconds of game time
#[test]
fn stress_test_room_ticks() {
    let config = GameConfig {
        seed: Some(9),
        ..GameConfig::default()
    };
    let mut room = Room::new("bench".to_string(), 1, "host", config, StdRng::seed_from_u64(9));
    for id in 2..=20 {
        room.add_player(id, &format!("p{id}")).unwrap();
    }
    room.start(1).unwrap();

    let start = Instant::now();
    let mut snapshots = 0;
    for tick in 0..600u64 {
        let now = start + std::time::Duration::from_millis(tick * 16);
        if room.tick(now).snapshot.is_some() {
            snapshots += 1;
        }
    }

    let duration = start.elapsed();
    println!("Room: 600 ticks in {:?}, {} snapshots", duration, snapshots);

    assert!(snapshots > 0);
    assert!(duration.as_secs() < 5);
}
