use log::warn;
use ndarray::ArrayView2;

use crate::observation::{Observation, PLAYER_NEUTRAL, UNIT_SELECTED};

/// Shaped reward handed out on the step after the goal was reached.
pub const GOAL_BONUS: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        ScreenPoint { x, y }
    }

    pub fn distance(&self, other: &ScreenPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Rounded centroid of every cell of `screen` equal to `value`, as `(x, y)`.
pub fn locate(screen: ArrayView2<f32>, value: f32) -> Option<ScreenPoint> {
    let (mut sum_x, mut sum_y, mut count) = (0.0f64, 0.0f64, 0usize);
    for ((y, x), &cell) in screen.indexed_iter() {
        if cell == value {
            sum_x += x as f64;
            sum_y += y as f64;
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    Some(ScreenPoint::new(
        (sum_x / count as f64).round() as f32,
        (sum_y / count as f64).round() as f32,
    ))
}

/// Beacon and marine positions of one observation and their distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenReading {
    pub beacon: Option<ScreenPoint>,
    pub marine: Option<ScreenPoint>,
    /// `None` when no beacon is visible
    pub distance: Option<f32>,
    pub width: usize,
    pub height: usize,
}

impl ScreenReading {
    pub fn from_observation(observation: &Observation) -> Self {
        let (width, height) = observation.screen_size();
        let beacon = locate(observation.player_relative.view(), PLAYER_NEUTRAL);
        // The marine disappears from the selection screen while standing on
        // the beacon.
        let marine = locate(observation.selected.view(), UNIT_SELECTED).or(beacon);
        let distance = match (beacon, marine) {
            (Some(beacon), Some(marine)) => Some(beacon.distance(&marine)),
            _ => {
                warn!("no beacon on the player-relative screen; distance is undefined");
                None
            }
        };
        ScreenReading { beacon, marine, distance, width, height }
    }
}

/// Progress made toward the beacon: `distance - distance_next`, or
/// `GOAL_BONUS` when the previous step already stood on the beacon.
pub fn shaped_reward(distance: f32, distance_next: f32) -> f32 {
    if distance == 0.0 {
        GOAL_BONUS
    } else {
        distance - distance_next
    }
}

/// `shaped_reward` over possibly undefined distances. An undefined term is
/// taken to equal the other one, so the delta is zero.
pub fn shaped_reward_between(distance: Option<f32>, distance_next: Option<f32>) -> f32 {
    match (distance, distance_next) {
        (Some(distance), Some(distance_next)) => shaped_reward(distance, distance_next),
        (Some(distance), None) => shaped_reward(distance, distance),
        (None, Some(distance_next)) => shaped_reward(distance_next, distance_next),
        (None, None) => 0.0,
    }
}
