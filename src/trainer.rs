//! Episode loop driving an agent against an environment.

use std::path::PathBuf;

use log::{error, info};

use crate::agent::Agent;
use crate::config::AgentConfig;
use crate::error::{DqnError, Result};
use crate::observation::Environment;
use crate::persistence::Persist;

pub const MODEL_FILE: &str = "model.bin";
pub const EMERGENCY_MODEL_FILE: &str = "emergency_model.bin";

/// Outcome of `Trainer::run`
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingReport {
    pub episodes: usize,
    pub steps: usize,
    /// Raw environment score of every episode, in order
    pub scores: Vec<f32>,
    pub checkpoints: usize,
}

impl TrainingReport {
    pub fn mean_score(&self) -> Option<f32> {
        if self.scores.is_empty() {
            None
        } else {
            Some(self.scores.iter().sum::<f32>() / self.scores.len() as f32)
        }
    }
}

pub struct Trainer {
    pub episodes: usize,
    /// Upper bound on steps per episode; the episode is cut with a reset
    pub max_episode_steps: usize,
    pub model_dir: Option<PathBuf>,
    /// Episodes between checkpoints; 0 disables them
    pub model_save_period: usize,
}

impl Trainer {
    pub fn new(episodes: usize) -> Self {
        Trainer {
            episodes,
            max_episode_steps: 10_000,
            model_dir: None,
            model_save_period: 0,
        }
    }

    /// Checkpoint cadence and directory taken from the agent configuration.
    pub fn from_config(episodes: usize, config: &AgentConfig) -> Self {
        Trainer {
            model_dir: config.model_dir.clone(),
            model_save_period: config.model_save_period,
            ..Trainer::new(episodes)
        }
    }

    pub fn max_episode_steps(mut self, steps: usize) -> Self {
        self.max_episode_steps = steps;
        self
    }

    /// Write `model.bin` into `dir` every `period` episodes.
    pub fn checkpoints<P: Into<PathBuf>>(mut self, dir: P, period: usize) -> Self {
        self.model_dir = Some(dir.into());
        self.model_save_period = period;
        self
    }

    /// Play `episodes` episodes. An environment failure triggers an
    /// emergency save (when a model directory is set) before it propagates.
    pub fn run<A, E>(&self, agent: &mut A, env: &mut E) -> Result<TrainingReport>
    where
        A: Agent + Persist,
        E: Environment,
    {
        if self.max_episode_steps == 0 {
            return Err(DqnError::invalid_parameter("max_episode_steps", "must be greater than 0"));
        }
        let mut report = TrainingReport {
            episodes: 0,
            steps: 0,
            scores: Vec::with_capacity(self.episodes),
            checkpoints: 0,
        };

        for _ in 0..self.episodes {
            let score = match self.play_episode(agent, env, &mut report.steps) {
                Ok(score) => score,
                Err(err) => {
                    error!("environment failure in episode {}: {}", report.episodes + 1, err);
                    self.emergency_save(agent);
                    return Err(err);
                }
            };
            report.episodes += 1;
            report.scores.push(score);

            if let Some(dir) = &self.model_dir {
                if self.model_save_period > 0 && report.episodes % self.model_save_period == 0 {
                    agent.save_model(&dir.join(MODEL_FILE))?;
                    report.checkpoints += 1;
                }
            }
        }

        info!(
            "training finished: {} episodes, {} steps, mean score {:.2}",
            report.episodes,
            report.steps,
            report.mean_score().unwrap_or(0.0)
        );
        Ok(report)
    }

    fn play_episode<A: Agent, E: Environment>(&self, agent: &mut A, env: &mut E, steps: &mut usize) -> Result<f32> {
        let mut observation = env.reset()?;
        let mut score = 0.0;
        for _ in 0..self.max_episode_steps {
            score += observation.reward;
            *steps += 1;
            let action = agent.decide(&observation)?;
            if action.is_reset() {
                return Ok(score);
            }
            observation = env.step(&action)?;
        }
        info!("episode cut after {} steps", self.max_episode_steps);
        agent.end_episode()?;
        Ok(score)
    }

    fn emergency_save<A: Persist>(&self, agent: &A) {
        if let Some(dir) = &self.model_dir {
            if let Err(err) = agent.save_model(&dir.join(EMERGENCY_MODEL_FILE)) {
                error!("emergency save failed: {}", err);
            }
        }
    }
}
