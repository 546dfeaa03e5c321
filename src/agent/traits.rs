use crate::error::Result;
use crate::observation::Observation;
use crate::types::AgentAction;

/// The capability an environment loop depends on.
pub trait Agent {
    /// Produce the action for the current observation. Called exactly once
    /// per environment step.
    fn decide(&mut self, observation: &Observation) -> Result<AgentAction>;

    /// Sample a minibatch and run one optimizer step, returning the loss.
    ///
    /// Fails with `DqnError::InsufficientData` while the replay buffer holds
    /// fewer transitions than one batch.
    fn learn(&mut self) -> Result<f32>;

    /// Close an episode the environment ended without a terminal
    /// observation, e.g. one cut by a step limit. A no-op outside an
    /// episode.
    fn end_episode(&mut self) -> Result<()>;

    /// Completed episodes
    fn episodes(&self) -> usize;
}
