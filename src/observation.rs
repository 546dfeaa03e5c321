//! The environment collaborator contract.
//!
//! Environments hand the agent an `Observation` per step and accept an
//! `AgentAction` in return. Screens are indexed `[row, column]`, i.e.
//! `[y, x]`.

use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::types::{ActionKind, AgentAction, StepType};

/// `player_relative` value marking neutral units (the beacon).
pub const PLAYER_NEUTRAL: f32 = 3.0;

/// `selected` value marking the currently selected unit.
pub const UNIT_SELECTED: f32 = 1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub step_type: StepType,
    pub reward: f32,
    /// Player-relative feature screen, `(height, width)`
    pub player_relative: Array2<f32>,
    /// Selection feature screen, same shape as `player_relative`
    pub selected: Array2<f32>,
    pub available_actions: Vec<ActionKind>,
}

impl Observation {
    pub fn first(&self) -> bool {
        self.step_type == StepType::First
    }

    pub fn last(&self) -> bool {
        self.step_type == StepType::Last
    }

    pub fn can_do(&self, kind: ActionKind) -> bool {
        self.available_actions.contains(&kind)
    }

    /// `(width, height)` of the feature screens
    pub fn screen_size(&self) -> (usize, usize) {
        let (height, width) = self.player_relative.dim();
        (width, height)
    }

    /// Network input: the player-relative screen flattened row by row.
    pub fn state(&self) -> Array1<f32> {
        self.player_relative.iter().copied().collect()
    }
}

/// An environment the trainer can drive.
pub trait Environment {
    /// Start a new episode; the returned observation is a `First` step.
    fn reset(&mut self) -> Result<Observation>;

    /// Apply an action and return the next observation.
    fn step(&mut self, action: &AgentAction) -> Result<Observation>;
}
