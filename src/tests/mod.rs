pub mod test_agent;
pub mod test_network;
pub mod test_optimizer;
pub mod test_shaping;

use ndarray::{array, Array2};

use crate::observation::{Observation, PLAYER_NEUTRAL, UNIT_SELECTED};
use crate::replay_buffer::Transition;
use crate::types::{ActionKind, HeadIndices, StepType};

/// A `(height, width)` screen pair with an optional marine and beacon,
/// positions given as `(x, y)`.
pub(crate) fn screen_observation(
    step_type: StepType,
    width: usize,
    height: usize,
    beacon: Option<(usize, usize)>,
    marine: Option<(usize, usize)>,
) -> Observation {
    let mut player_relative = Array2::zeros((height, width));
    let mut selected = Array2::zeros((height, width));
    if let Some((x, y)) = marine {
        player_relative[[y, x]] = 1.0;
        selected[[y, x]] = UNIT_SELECTED;
    }
    if let Some((x, y)) = beacon {
        player_relative[[y, x]] = PLAYER_NEUTRAL;
    }
    Observation {
        step_type,
        reward: 0.0,
        player_relative,
        selected,
        available_actions: vec![ActionKind::NoOp, ActionKind::Select, ActionKind::Move],
    }
}

pub(crate) fn transition(i: usize) -> Transition {
    Transition {
        state: array![i as f32, 0.0],
        action: HeadIndices::single(i % 2),
        reward: i as f32,
        step_type: StepType::Mid,
        next_state: array![i as f32 + 1.0, 0.0],
    }
}
