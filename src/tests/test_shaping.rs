use ndarray::Array2;

use super::screen_observation;
use crate::agent::shaping::{locate, shaped_reward, shaped_reward_between, ScreenPoint, ScreenReading, GOAL_BONUS};
use crate::types::StepType;

#[test]
fn test_shaped_reward_progress() {
    assert_eq!(shaped_reward(5.0, 3.0), 2.0);
    assert_eq!(shaped_reward(3.0, 5.0), -2.0);
}

#[test]
fn test_shaped_reward_goal() {
    assert_eq!(shaped_reward(0.0, 7.0), GOAL_BONUS);
    assert_eq!(GOAL_BONUS, 100.0);
}

#[test]
fn test_undefined_distance_gives_no_reward() {
    assert_eq!(shaped_reward_between(None, Some(3.0)), 0.0);
    assert_eq!(shaped_reward_between(Some(4.0), None), 0.0);
    assert_eq!(shaped_reward_between(Some(4.0), Some(1.0)), 3.0);
    assert_eq!(shaped_reward_between(None, None), 0.0);
}

#[test]
fn test_undefined_distance_is_symmetric_at_the_goal() {
    assert_eq!(shaped_reward_between(Some(0.0), None), GOAL_BONUS);
    assert_eq!(shaped_reward_between(None, Some(0.0)), GOAL_BONUS);
}

#[test]
fn test_locate_centroid() {
    let mut screen = Array2::zeros((5, 6));
    screen[[1, 2]] = 3.0;
    screen[[1, 3]] = 3.0;
    screen[[1, 4]] = 3.0;

    assert_eq!(locate(screen.view(), 3.0), Some(ScreenPoint::new(3.0, 1.0)));
    assert_eq!(locate(screen.view(), 1.0), None);
}

#[test]
fn test_reading_distance() {
    let observation = screen_observation(StepType::Mid, 10, 8, Some((7, 2)), Some((3, 5)));
    let reading = ScreenReading::from_observation(&observation);

    assert_eq!(reading.beacon, Some(ScreenPoint::new(7.0, 2.0)));
    assert_eq!(reading.marine, Some(ScreenPoint::new(3.0, 5.0)));
    assert_eq!(reading.distance, Some(5.0));
    assert_eq!((reading.width, reading.height), (10, 8));
}

#[test]
fn test_marine_on_beacon_falls_back() {
    let observation = screen_observation(StepType::Mid, 10, 8, Some((4, 4)), None);
    let reading = ScreenReading::from_observation(&observation);
    assert_eq!(reading.marine, reading.beacon);
    assert_eq!(reading.distance, Some(0.0));
}

#[test]
fn test_missing_beacon() {
    let observation = screen_observation(StepType::Mid, 10, 8, None, Some((1, 1)));
    let reading = ScreenReading::from_observation(&observation);
    assert_eq!(reading.beacon, None);
    assert_eq!(reading.distance, None);
}
