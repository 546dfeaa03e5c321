use std::path::Path;

use log::{debug, info, warn};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::actions::{ActionTranslator, Compass};
use super::shaping::{shaped_reward_between, ScreenReading};
use super::supervised::CompassSupervisor;
use super::traits::Agent;
use crate::config::{ActionMode, AgentConfig, TargetSync};
use crate::error::{DqnError, Result};
use crate::estimator::ActionValueEstimator;
use crate::exploration::{Choice, EpsilonGreedy};
use crate::metrics::{EpisodeSummary, EpisodeTracker};
use crate::network::{MultiHeadNetwork, QFunction};
use crate::observation::Observation;
use crate::optimizer::{Adam, OptimizerWrapper};
use crate::persistence::{load_snapshot, save_snapshot, Persist};
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::td::TdOptimizer;
use crate::types::{AgentAction, HeadIndices, StepType};

const METRICS_HISTORY: usize = 100;

/// Where the agent stands within the current episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Next observation opens an episode; the answer is always `Select`
    AwaitingFirst,
    Acting,
    /// The last observation has been consumed; the environment must reset
    Terminal,
}

/// The previous decision, waiting for its successor observation.
#[derive(Clone, Debug)]
struct PendingStep {
    state: Array1<f32>,
    action: HeadIndices,
    distance: Option<f32>,
    first: bool,
}

/// DQN agent for the move-to-beacon screen task.
///
/// Every call to `decide` consumes one observation. The transition ending
/// at that observation is pushed into the replay buffer, a minibatch update
/// runs once the buffer holds a full batch, and a new action is selected.
pub struct ScreenAgent<Q: QFunction = MultiHeadNetwork> {
    config: AgentConfig,
    estimator: ActionValueEstimator<Q>,
    policy: EpsilonGreedy,
    replay: ReplayBuffer,
    td: TdOptimizer,
    translator: Box<dyn ActionTranslator>,
    supervisor: Option<CompassSupervisor>,
    phase: Phase,
    pending: Option<PendingStep>,
    last_compass: Option<Compass>,
    episodes: usize,
    total_steps: usize,
    metrics: EpisodeTracker,
    rng: StdRng,
}

impl<Q: QFunction> ScreenAgent<Q> {
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn estimator(&self) -> &ActionValueEstimator<Q> {
        &self.estimator
    }

    pub fn replay(&self) -> &ReplayBuffer {
        &self.replay
    }

    pub fn policy(&self) -> &EpsilonGreedy {
        &self.policy
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Observations consumed over the agent's lifetime
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn optimizer_steps(&self) -> u64 {
        self.td.steps()
    }

    pub fn metrics(&self) -> &EpisodeTracker {
        &self.metrics
    }

    /// True while the scripted supervisor drives the episodes.
    pub fn is_supervised(&self) -> bool {
        self.supervisor.is_some() && self.episodes < self.config.supervised_episodes
    }

    fn check_screen(&self, observation: &Observation) -> Result<()> {
        let expected = (self.config.screen_height, self.config.screen_width);
        for (name, screen) in [("player_relative", &observation.player_relative), ("selected", &observation.selected)] {
            if screen.dim() != expected {
                return Err(DqnError::dimension_mismatch(
                    format!("{} screen of {:?}", name, expected),
                    format!("{} screen of {:?}", name, screen.dim()),
                ));
            }
        }
        Ok(())
    }

    fn random_heads(&mut self) -> HeadIndices {
        let sizes = self.estimator.head_sizes();
        HeadIndices::new(sizes.into_iter().map(|size| self.rng.gen_range(0..size)).collect())
    }

    fn select_heads(&mut self, state: &Array1<f32>, reading: &ScreenReading) -> Result<HeadIndices> {
        if self.is_supervised() {
            if let Some(supervisor) = &self.supervisor {
                if let Some(direction) = supervisor.action(reading, self.last_compass, &mut self.rng) {
                    self.last_compass = Some(direction);
                    return Ok(HeadIndices::single(direction.index()));
                }
            }
        }

        let decision = self.policy.decide(&mut self.rng);
        let heads = match decision.choice {
            Choice::Random => self.random_heads(),
            Choice::Greedy => self.estimator.best_action(state.view())?,
        };
        debug!(
            "{:?} action {:?} at epsilon {:.3} (decision {})",
            decision.choice, &*heads, decision.epsilon, decision.steps_done
        );
        if self.supervisor.is_some() {
            self.last_compass = heads.first().copied().and_then(Compass::from_index);
        }
        Ok(heads)
    }

    /// Close the pending step with the state that followed it.
    fn push_pending(&mut self, next_state: &Array1<f32>, next_distance: Option<f32>, last: bool) {
        if let Some(pending) = self.pending.take() {
            let reward = shaped_reward_between(pending.distance, next_distance);
            let step_type = if last {
                StepType::Last
            } else if pending.first {
                StepType::First
            } else {
                StepType::Mid
            };
            self.metrics.record_shaped_reward(reward);
            self.replay.push(Transition {
                state: pending.state,
                action: pending.action,
                reward,
                step_type,
                next_state: next_state.clone(),
            });
        }
    }

    /// Run an optimizer step once the buffer holds a full batch.
    fn maybe_learn(&mut self) -> Result<()> {
        if self.replay.len() < self.config.batch_size {
            self.metrics.record_skipped_update();
            return Ok(());
        }
        match self.learn() {
            Ok(_) => Ok(()),
            Err(err) if err.is_recoverable() => {
                warn!("skipping optimizer step: {}", err);
                self.metrics.record_skipped_update();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Drop the pending step and close the episode without a final push.
    fn truncate_episode(&mut self) -> Result<EpisodeSummary> {
        self.pending = None;
        self.last_compass = None;
        let summary = self.finish_episode()?;
        self.phase = Phase::Terminal;
        Ok(summary)
    }

    fn finish_episode(&mut self) -> Result<EpisodeSummary> {
        self.episodes += 1;
        if let TargetSync::Episodes(period) = self.config.target_sync {
            if self.episodes % period == 0 {
                self.estimator.sync_target()?;
            }
        }
        let summary = self.metrics.finish_episode(self.episodes, self.policy.epsilon());
        info!(
            "episode {} finished: score {:.1}, shaped return {:.2}, {} steps, epsilon {:.3}, mean loss {}",
            summary.episode,
            summary.env_score,
            summary.shaped_return,
            summary.steps,
            summary.epsilon,
            summary.mean_loss.map_or_else(|| "n/a".to_string(), |loss| format!("{:.5}", loss)),
        );
        if self.supervisor.is_some() && self.episodes == self.config.supervised_episodes {
            info!("supervised phase complete after {} episodes; policy takes over", self.episodes);
        }
        Ok(summary)
    }
}

impl<Q: QFunction> Agent for ScreenAgent<Q> {
    fn decide(&mut self, observation: &Observation) -> Result<AgentAction> {
        self.check_screen(observation)?;
        if observation.first() && self.phase == Phase::Acting {
            warn!("episode {} restarted before its last observation", self.episodes + 1);
            self.truncate_episode()?;
        }
        self.total_steps += 1;
        self.metrics.record_step(observation.reward);

        // An episode seen only through its terminal observation still counts.
        if observation.last() && self.phase != Phase::Acting {
            self.truncate_episode()?;
            return Ok(AgentAction::Reset);
        }

        if observation.first() || self.phase != Phase::Acting {
            self.pending = None;
            self.last_compass = None;
            self.phase = Phase::Acting;
            return Ok(AgentAction::Select);
        }

        let reading = ScreenReading::from_observation(observation);
        let state = observation.state();

        if observation.last() {
            self.push_pending(&state, reading.distance, true);
            self.maybe_learn()?;
            self.finish_episode()?;
            self.phase = Phase::Terminal;
            return Ok(AgentAction::Reset);
        }

        let first = self.pending.is_none();
        self.push_pending(&state, reading.distance, false);
        self.maybe_learn()?;

        let heads = self.select_heads(&state, &reading)?;
        let action = self.translator.translate(&heads, &reading, observation);
        self.pending = Some(PendingStep {
            state,
            action: heads,
            distance: reading.distance,
            first,
        });
        Ok(action)
    }

    fn learn(&mut self) -> Result<f32> {
        let batch = self.replay.sample_with(self.config.batch_size, &mut self.rng)?;
        let loss = self.td.step(&mut self.estimator, &batch)?;
        self.metrics.record_loss(loss);
        if let TargetSync::OptimizerSteps(period) = self.config.target_sync {
            if self.td.steps() % period as u64 == 0 {
                self.estimator.sync_target()?;
            }
        }
        Ok(loss)
    }

    fn end_episode(&mut self) -> Result<()> {
        if self.phase == Phase::Acting {
            self.truncate_episode()?;
        }
        Ok(())
    }

    fn episodes(&self) -> usize {
        self.episodes
    }
}

impl<Q: QFunction> Persist for ScreenAgent<Q> {
    fn save_model(&self, path: &Path) -> Result<()> {
        save_snapshot(&self.estimator.snapshot(), path)?;
        info!("model saved to {}", path.display());
        Ok(())
    }

    /// Loads into both the online and the target network.
    fn load_model(&mut self, path: &Path) -> Result<()> {
        let snapshot = load_snapshot(path)?;
        self.estimator.restore(&snapshot)?;
        info!("model loaded from {}", path.display());
        Ok(())
    }
}

/// Builder for `ScreenAgent`
pub struct ScreenAgentBuilder {
    config: AgentConfig,
    translator: Option<Box<dyn ActionTranslator>>,
}

impl ScreenAgentBuilder {
    pub fn new() -> Self {
        ScreenAgentBuilder {
            config: AgentConfig::default(),
            translator: None,
        }
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the translator derived from `config.action_mode`
    pub fn translator(mut self, translator: Box<dyn ActionTranslator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build with a `MultiHeadNetwork` trained by Adam.
    pub fn build(self) -> Result<ScreenAgent<MultiHeadNetwork>> {
        self.config.validate()?;
        let head_sizes = match &self.translator {
            Some(translator) => translator.head_sizes(),
            None => self.config.translator().head_sizes(),
        };
        let optimizer = OptimizerWrapper::Adam(Adam::default());
        let input_size = self.config.state_size();
        let network = match self.config.seed {
            Some(seed) => MultiHeadNetwork::new_seeded(input_size, &self.config.hidden_sizes, &head_sizes, optimizer, seed)?,
            None => MultiHeadNetwork::new(input_size, &self.config.hidden_sizes, &head_sizes, optimizer)?,
        };
        self.build_with(network)
    }

    /// Build around a caller-supplied online network; the target starts as
    /// its copy.
    pub fn build_with<Q: QFunction + Clone>(self, network: Q) -> Result<ScreenAgent<Q>> {
        let config = self.config;
        config.validate()?;
        let translator = match self.translator {
            Some(translator) => translator,
            None => config.translator(),
        };

        if network.input_size() != config.state_size() {
            return Err(DqnError::dimension_mismatch(
                format!("network input of {}", config.state_size()),
                format!("network input of {}", network.input_size()),
            ));
        }
        if network.head_sizes() != translator.head_sizes() {
            return Err(DqnError::dimension_mismatch(
                format!("heads {:?}", translator.head_sizes()),
                format!("heads {:?}", network.head_sizes()),
            ));
        }

        let supervisor = match config.action_mode {
            ActionMode::Compass { .. } if config.supervised_episodes > 0 => Some(CompassSupervisor::new()),
            _ => None,
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };

        info!(
            "building agent: {}x{} screen, heads {:?}, replay capacity {}, batch {}",
            config.screen_width,
            config.screen_height,
            translator.head_sizes(),
            config.replay_capacity,
            config.batch_size
        );

        Ok(ScreenAgent {
            estimator: ActionValueEstimator::new(network),
            policy: EpsilonGreedy::new(config.epsilon_schedule()?),
            replay: ReplayBuffer::new(config.replay_capacity)?,
            td: TdOptimizer::new(config.gamma, config.learning_rate)?,
            translator,
            supervisor,
            phase: Phase::AwaitingFirst,
            pending: None,
            last_compass: None,
            episodes: 0,
            total_steps: 0,
            metrics: EpisodeTracker::new(METRICS_HISTORY),
            rng,
            config,
        })
    }
}

impl Default for ScreenAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
