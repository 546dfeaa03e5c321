//! Decaying epsilon-greedy exploration.
//!
//! Epsilon is never stored; it is derived from the number of decisions
//! taken so far:
//!
//! `epsilon = eps_end + (eps_start - eps_end) * exp(-steps_done / eps_decay)`

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{DqnError, Result};

/// Outcome of one exploration draw
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Choice {
    Random,
    Greedy,
}

/// Result of `EpsilonGreedy::decide`: the draw, the epsilon it used and the
/// decision counter after the call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    pub choice: Choice,
    pub epsilon: f32,
    pub steps_done: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpsilonSchedule {
    pub eps_start: f32,
    pub eps_end: f32,
    pub eps_decay: f32,
}

impl EpsilonSchedule {
    pub fn new(eps_start: f32, eps_end: f32, eps_decay: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&eps_start) || !(0.0..=1.0).contains(&eps_end) {
            return Err(DqnError::invalid_parameter("epsilon", "eps_start and eps_end must lie in [0, 1]"));
        }
        if eps_end > eps_start {
            return Err(DqnError::invalid_parameter("eps_end", "must not exceed eps_start"));
        }
        if !eps_decay.is_finite() || eps_decay <= 0.0 {
            return Err(DqnError::invalid_parameter("eps_decay", "must be a positive, finite time constant"));
        }
        Ok(EpsilonSchedule { eps_start, eps_end, eps_decay })
    }

    /// A schedule that stays at `epsilon` forever.
    pub fn constant(epsilon: f32) -> Result<Self> {
        Self::new(epsilon, epsilon, 1.0)
    }

    /// Pure function of the decision counter.
    pub fn epsilon_at(&self, steps_done: u64) -> f32 {
        let decay = (-(steps_done as f64) / self.eps_decay as f64).exp() as f32;
        self.eps_end + (self.eps_start - self.eps_end) * decay
    }
}

/// Stateful epsilon-greedy policy; `steps_done` counts decisions, not
/// environment steps.
#[derive(Clone, Debug)]
pub struct EpsilonGreedy {
    schedule: EpsilonSchedule,
    steps_done: u64,
}

impl EpsilonGreedy {
    pub fn new(schedule: EpsilonSchedule) -> Self {
        EpsilonGreedy { schedule, steps_done: 0 }
    }

    /// Resume a schedule from an existing decision counter.
    pub fn with_steps_done(schedule: EpsilonSchedule, steps_done: u64) -> Self {
        EpsilonGreedy { schedule, steps_done }
    }

    pub fn schedule(&self) -> &EpsilonSchedule {
        &self.schedule
    }

    pub fn steps_done(&self) -> u64 {
        self.steps_done
    }

    /// Epsilon the next call to `decide` will use.
    pub fn epsilon(&self) -> f32 {
        self.schedule.epsilon_at(self.steps_done)
    }

    /// Must be called exactly once per action-selection decision.
    pub fn decide<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Decision {
        let epsilon = self.schedule.epsilon_at(self.steps_done);
        self.steps_done += 1;
        let choice = if rng.gen::<f32>() < epsilon {
            Choice::Random
        } else {
            Choice::Greedy
        };
        Decision {
            choice,
            epsilon,
            steps_done: self.steps_done,
        }
    }
}
