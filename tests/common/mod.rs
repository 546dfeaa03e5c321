#![allow(dead_code)]

use std::io;

use beacon_dqn::error::{DqnError, Result};
use beacon_dqn::observation::{Environment, Observation, PLAYER_NEUTRAL, UNIT_SELECTED};
use beacon_dqn::types::{ActionKind, AgentAction, StepType};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A tiny move-to-beacon game: one marine, one beacon, fixed-length
/// episodes. Touching the beacon scores 1 and relocates it.
pub struct BeaconGrid {
    pub width: usize,
    pub height: usize,
    pub episode_steps: usize,
    marine: (i32, i32),
    beacon: (i32, i32),
    selected: bool,
    step: usize,
    rng: StdRng,
}

impl BeaconGrid {
    pub fn new(width: usize, height: usize, episode_steps: usize, seed: u64) -> Self {
        BeaconGrid {
            width,
            height,
            episode_steps,
            marine: (0, 0),
            beacon: (0, 0),
            selected: false,
            step: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random_cell(&mut self) -> (i32, i32) {
        (
            self.rng.gen_range(0..self.width as i32),
            self.rng.gen_range(0..self.height as i32),
        )
    }

    fn place_beacon(&mut self) {
        loop {
            let cell = self.random_cell();
            if cell != self.marine {
                self.beacon = cell;
                return;
            }
        }
    }

    fn observe(&self, step_type: StepType, reward: f32) -> Observation {
        let mut player_relative = Array2::zeros((self.height, self.width));
        let mut selected = Array2::zeros((self.height, self.width));
        let (mx, my) = (self.marine.0 as usize, self.marine.1 as usize);
        player_relative[[my, mx]] = 1.0;
        if self.selected {
            selected[[my, mx]] = UNIT_SELECTED;
        }
        player_relative[[self.beacon.1 as usize, self.beacon.0 as usize]] = PLAYER_NEUTRAL;

        let mut available_actions = vec![ActionKind::NoOp, ActionKind::Select];
        if self.selected {
            available_actions.push(ActionKind::Move);
        }
        Observation {
            step_type,
            reward,
            player_relative,
            selected,
            available_actions,
        }
    }
}

impl Environment for BeaconGrid {
    fn reset(&mut self) -> Result<Observation> {
        self.step = 0;
        self.selected = false;
        self.marine = self.random_cell();
        self.place_beacon();
        Ok(self.observe(StepType::First, 0.0))
    }

    fn step(&mut self, action: &AgentAction) -> Result<Observation> {
        self.step += 1;
        let mut reward = 0.0;
        match *action {
            AgentAction::Select => self.selected = true,
            AgentAction::Move { dx, dy } if self.selected => {
                self.marine.0 = (self.marine.0 + dx).clamp(0, self.width as i32 - 1);
                self.marine.1 = (self.marine.1 + dy).clamp(0, self.height as i32 - 1);
                if self.marine == self.beacon {
                    reward = 1.0;
                    self.place_beacon();
                }
            }
            _ => {}
        }
        let step_type = if self.step >= self.episode_steps {
            StepType::Last
        } else {
            StepType::Mid
        };
        Ok(self.observe(step_type, reward))
    }
}

/// Wraps another environment and fails after a fixed number of steps.
pub struct FailingEnv<E> {
    pub inner: E,
    pub fail_after: usize,
    steps: usize,
}

impl<E: Environment> FailingEnv<E> {
    pub fn new(inner: E, fail_after: usize) -> Self {
        FailingEnv { inner, fail_after, steps: 0 }
    }
}

impl<E: Environment> Environment for FailingEnv<E> {
    fn reset(&mut self) -> Result<Observation> {
        self.inner.reset()
    }

    fn step(&mut self, action: &AgentAction) -> Result<Observation> {
        self.steps += 1;
        if self.steps > self.fail_after {
            return Err(DqnError::Io(io::Error::new(io::ErrorKind::ConnectionReset, "game connection lost")));
        }
        self.inner.step(action)
    }
}
