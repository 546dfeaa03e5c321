//! # beacon_dqn - Deep Q-Learning for the Move-to-Beacon Task
//!
//! A DQN agent that learns to steer a unit onto a beacon from
//! feature-screen observations. The value network has several output heads
//! so one decision can pick an action type together with screen
//! coordinates.
//!
//! ## Key Features
//!
//! - **Multi-head value network**: shared ReLU trunk, one linear head per
//!   action dimension, Adam or SGD updates
//! - **Target network**: bootstrap values come from a copy that is only
//!   changed by an explicit sync
//! - **Epsilon-greedy exploration**: exponentially decaying schedule driven
//!   by the decision counter
//! - **Experience replay**: bounded FIFO buffer with uniform sampling
//! - **Reward shaping**: distance progress toward the beacon
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beacon_dqn::agent::ScreenAgentBuilder;
//! use beacon_dqn::config::{ActionMode, AgentConfig};
//! use beacon_dqn::trainer::Trainer;
//!
//! let config = AgentConfig {
//!     action_mode: ActionMode::Compass { step: 4 },
//!     ..AgentConfig::default()
//! };
//! let mut agent = ScreenAgentBuilder::new().config(config).build().unwrap();
//! let trainer = Trainer::new(100).checkpoints("models", 10);
//! // trainer.run(&mut agent, &mut env)?;
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions for the dense layers
//! - [`agent`] - The screen agent, action translators and reward shaping
//! - [`config`] - Serde-backed agent configuration
//! - [`error`] - Error types and result handling
//! - [`estimator`] - Online/target network pair and greedy selection
//! - [`exploration`] - Epsilon schedule and epsilon-greedy policy
//! - [`layers`] - Dense layer with batched forward/backward passes
//! - [`loss`] - Mean squared error
//! - [`metrics`] - Per-episode training statistics
//! - [`network`] - Multi-head value network
//! - [`observation`] - Observations and the environment contract
//! - [`optimizer`] - Optimization algorithms
//! - [`persistence`] - Saving and loading network parameters
//! - [`replay_buffer`] - Experience replay
//! - [`td`] - Temporal-difference update across heads
//! - [`trainer`] - Episode loop with checkpointing
//! - [`types`] - Step types, head indices and agent actions

pub mod activations;
pub mod agent;
pub mod config;
pub mod error;
pub mod estimator;
pub mod exploration;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod observation;
pub mod optimizer;
pub mod persistence;
pub mod replay_buffer;
pub mod td;
pub mod trainer;
pub mod types;

pub use error::{DqnError, Result};

#[cfg(test)]
mod tests;
