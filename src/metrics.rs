use serde::{Serialize, Deserialize};
use std::collections::VecDeque;

/// Statistics of one completed episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    /// Sum of raw environment rewards
    pub env_score: f32,
    /// Sum of shaped rewards pushed into the replay buffer
    pub shaped_return: f32,
    pub mean_loss: Option<f32>,
    pub optimizer_steps: usize,
    /// Optimizer steps skipped because the buffer was not warm yet
    pub skipped_updates: usize,
    pub epsilon: f32,
}

#[derive(Debug, Clone, Default)]
struct EpisodeAccumulator {
    steps: usize,
    env_score: f32,
    shaped_return: f32,
    loss_sum: f32,
    optimizer_steps: usize,
    skipped_updates: usize,
}

/// Tracks metrics during training, keeping the last `history_size` episodes.
#[derive(Debug, Clone)]
pub struct EpisodeTracker {
    history: VecDeque<EpisodeSummary>,
    history_size: usize,
    current: EpisodeAccumulator,
}

impl EpisodeTracker {
    pub fn new(history_size: usize) -> Self {
        EpisodeTracker {
            history: VecDeque::with_capacity(history_size),
            history_size,
            current: EpisodeAccumulator::default(),
        }
    }

    pub fn record_step(&mut self, env_reward: f32) {
        self.current.steps += 1;
        self.current.env_score += env_reward;
    }

    pub fn record_shaped_reward(&mut self, reward: f32) {
        self.current.shaped_return += reward;
    }

    pub fn record_loss(&mut self, loss: f32) {
        self.current.loss_sum += loss;
        self.current.optimizer_steps += 1;
    }

    pub fn record_skipped_update(&mut self) {
        self.current.skipped_updates += 1;
    }

    /// Close the running episode and start a fresh one.
    pub fn finish_episode(&mut self, episode: usize, epsilon: f32) -> EpisodeSummary {
        let current = std::mem::take(&mut self.current);
        let mean_loss = if current.optimizer_steps > 0 {
            Some(current.loss_sum / current.optimizer_steps as f32)
        } else {
            None
        };
        let summary = EpisodeSummary {
            episode,
            steps: current.steps,
            env_score: current.env_score,
            shaped_return: current.shaped_return,
            mean_loss,
            optimizer_steps: current.optimizer_steps,
            skipped_updates: current.skipped_updates,
            epsilon,
        };
        if self.history_size > 0 {
            if self.history.len() >= self.history_size {
                self.history.pop_front();
            }
            self.history.push_back(summary.clone());
        }
        summary
    }

    pub fn history(&self) -> &VecDeque<EpisodeSummary> {
        &self.history
    }

    pub fn last(&self) -> Option<&EpisodeSummary> {
        self.history.back()
    }

    /// Mean environment score over the last `n` recorded episodes
    pub fn mean_score(&self, n: usize) -> Option<f32> {
        let count = n.min(self.history.len());
        if count == 0 {
            return None;
        }
        let sum: f32 = self.history.iter().rev().take(count).map(|s| s.env_score).sum();
        Some(sum / count as f32)
    }
}
