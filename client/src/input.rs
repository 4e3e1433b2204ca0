//! Client input management with change detection and a steering autopilot

use shared::{angle_delta, InputState, Point, SnakeView, Snapshot};
use std::time::{Duration, Instant};

/// Heading changes smaller than this are not worth a message.
const ANGLE_EPSILON: f64 = 1e-3;

/// Decides which input samples go out on the wire.
///
/// A sample is sent when it differs from the last one sent, or when
/// `heartbeat` has elapsed so the authority keeps seeing us.
pub struct InputManager {
    current_input: Option<InputState>,
    last_input_sent: Option<Instant>,
    heartbeat: Duration,
}

impl InputManager {
    pub fn new(heartbeat: Duration) -> Self {
        Self {
            current_input: None,
            last_input_sent: None,
            heartbeat,
        }
    }

    /// Returns the input to send now, if any.
    pub fn update(&mut self, sample: InputState, now: Instant) -> Option<InputState> {
        if !sample.angle.is_finite() {
            return None;
        }

        let input_changed = match self.current_input {
            None => true,
            Some(current) => {
                angle_delta(current.angle, sample.angle).abs() > ANGLE_EPSILON
                    || current.boosting != sample.boosting
            }
        };
        let time_to_send = self
            .last_input_sent
            .map_or(true, |last| now.saturating_duration_since(last) >= self.heartbeat);

        if input_changed || time_to_send {
            self.current_input = Some(sample);
            self.last_input_sent = Some(now);
            Some(sample)
        } else {
            None
        }
    }

    pub fn current_input(&self) -> Option<&InputState> {
        self.current_input.as_ref()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

/// Headless steering: heads for the nearest food and turns back toward the
/// centre when close to a wall.
#[derive(Debug, Clone)]
pub struct Autopilot {
    half_extent: f64,
    wall_margin: f64,
}

impl Autopilot {
    pub fn new(map_size: f64) -> Self {
        Self {
            half_extent: map_size / 2.0,
            wall_margin: 150.0,
        }
    }

    pub fn steer(&self, me: &SnakeView, snapshot: &Snapshot) -> InputState {
        let Some(head) = me.body.first().map(|&p| Point::from(p)) else {
            return InputState {
                angle: me.angle,
                boosting: false,
            };
        };

        let limit = self.half_extent - self.wall_margin;
        if head.x.abs() > limit || head.y.abs() > limit {
            return InputState {
                angle: head.angle_to(&Point::default()),
                boosting: false,
            };
        }

        let nearest = snapshot
            .food
            .iter()
            .map(|f| f.position)
            .min_by(|a, b| head.distance(a).total_cmp(&head.distance(b)));

        InputState {
            angle: nearest.map_or(me.angle, |target| head.angle_to(&target)),
            boosting: false,
        }
    }
}
