//! Agent configuration.
//!
//! Every field has a default, so a JSON file only needs the values it
//! overrides:
//!
//! ```rust
//! use beacon_dqn::config::{AgentConfig, ActionMode};
//!
//! let config = AgentConfig::from_json_str(r#"{ "batch_size": 16, "action_mode": "screen_point" }"#).unwrap();
//! assert_eq!(config.batch_size, 16);
//! assert_eq!(config.action_mode, ActionMode::ScreenPoint);
//! ```

use serde::{Serialize, Deserialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::actions::{ActionTranslator, CompassActions, GridActions, ScreenPointActions};
use crate::error::{DqnError, Result};
use crate::exploration::EpsilonSchedule;

/// How the discrete heads map onto screen actions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionMode {
    /// Four moves of `step` pixels around the marine
    Compass { step: i32 },
    /// `[no_op, select, move]` plus x and y coordinate heads
    ScreenPoint,
    /// One head over a `x * y` lattice of screen targets
    Grid { x: usize, y: usize },
}

impl Default for ActionMode {
    fn default() -> Self {
        ActionMode::Compass { step: 4 }
    }
}

impl ActionMode {
    pub fn translator(&self, width: usize, height: usize) -> Box<dyn ActionTranslator> {
        match *self {
            ActionMode::Compass { step } => Box::new(CompassActions::new(step)),
            ActionMode::ScreenPoint => Box::new(ScreenPointActions::new(width, height)),
            ActionMode::Grid { x, y } => Box::new(GridActions::new(x, y, width, height)),
        }
    }
}

/// Cadence of target-network synchronisation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSync {
    /// After every n-th completed episode
    Episodes(usize),
    /// After every n-th optimizer step
    OptimizerSteps(usize),
}

impl TargetSync {
    fn period(&self) -> usize {
        match *self {
            TargetSync::Episodes(n) | TargetSync::OptimizerSteps(n) => n,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub gamma: f32,
    pub learning_rate: f32,
    pub eps_start: f32,
    pub eps_end: f32,
    /// Decay time constant, in decisions
    pub eps_decay: f32,
    pub batch_size: usize,
    pub replay_capacity: usize,
    pub target_sync: TargetSync,
    /// Episodes driven by the scripted supervisor before the policy takes over
    pub supervised_episodes: usize,
    /// Episodes between model checkpoints; 0 disables them
    pub model_save_period: usize,
    /// Directory receiving checkpoints and the emergency save
    pub model_dir: Option<PathBuf>,
    pub hidden_sizes: Vec<usize>,
    pub screen_width: usize,
    pub screen_height: usize,
    pub action_mode: ActionMode,
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            gamma: 0.99,
            learning_rate: 1e-4,
            eps_start: 1.0,
            eps_end: 0.1,
            eps_decay: 8000.0,
            batch_size: 32,
            replay_capacity: 100_000,
            target_sync: TargetSync::Episodes(5),
            supervised_episodes: 0,
            model_save_period: 1000,
            model_dir: None,
            hidden_sizes: vec![256],
            screen_width: 84,
            screen_height: 64,
            action_mode: ActionMode::default(),
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AgentConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fail fast on values no component could work with.
    pub fn validate(&self) -> Result<()> {
        if self.replay_capacity == 0 {
            return Err(DqnError::invalid_parameter("replay_capacity", "must be greater than 0"));
        }
        if self.batch_size == 0 {
            return Err(DqnError::invalid_parameter("batch_size", "must be greater than 0"));
        }
        if self.batch_size > self.replay_capacity {
            return Err(DqnError::InvalidParameter {
                name: "batch_size".to_string(),
                reason: format!("{} exceeds the replay capacity of {}", self.batch_size, self.replay_capacity),
            });
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(DqnError::invalid_parameter("gamma", "must lie in [0, 1]"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(DqnError::invalid_parameter("learning_rate", "must be positive"));
        }
        self.epsilon_schedule()?;
        if self.target_sync.period() == 0 {
            return Err(DqnError::invalid_parameter("target_sync", "period must be greater than 0"));
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(DqnError::invalid_parameter("screen", "width and height must be greater than 0"));
        }
        if self.hidden_sizes.contains(&0) {
            return Err(DqnError::invalid_parameter("hidden_sizes", "every hidden layer needs at least one unit"));
        }
        match self.action_mode {
            ActionMode::Grid { x, y } if x == 0 || y == 0 => {
                return Err(DqnError::invalid_parameter("action_mode", "grid dimensions must be greater than 0"));
            }
            ActionMode::Compass { step } if step <= 0 => {
                return Err(DqnError::invalid_parameter("action_mode", "compass step must be positive"));
            }
            _ => {}
        }
        Ok(())
    }

    pub fn epsilon_schedule(&self) -> Result<EpsilonSchedule> {
        EpsilonSchedule::new(self.eps_start, self.eps_end, self.eps_decay)
    }

    /// Length of the flattened screen state
    pub fn state_size(&self) -> usize {
        self.screen_width * self.screen_height
    }

    pub fn translator(&self) -> Box<dyn ActionTranslator> {
        self.action_mode.translator(self.screen_width, self.screen_height)
    }
}
