use log::warn;
use ndarray::Array1;
use rand::Rng;
use serde::{Serialize, Deserialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{DqnError, Result};
use crate::types::{HeadIndices, StepType};

/// One recorded experience step.
///
/// `next_state` carries no meaning for `StepType::Last` but is always
/// stored so every transition has the same shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: HeadIndices,
    pub reward: f32,
    pub step_type: StepType,
    pub next_state: Array1<f32>,
}

impl Transition {
    pub fn is_terminal(&self) -> bool {
        self.step_type.is_last()
    }
}

/// Fixed-capacity FIFO store of transitions with uniform sampling.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DqnError::invalid_parameter("capacity", "must be greater than 0"));
        }
        Ok(ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity.min(1 << 16)),
            capacity,
        })
    }

    /// Append a transition, evicting the oldest one when full.
    pub fn push(&mut self, transition: Transition) {
        if let Some(first) = self.buffer.front() {
            if first.action.len() != transition.action.len() {
                warn!(
                    "transition with {} action heads pushed into a buffer of {}-head transitions",
                    transition.action.len(),
                    first.action.len()
                );
            }
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw `n` transitions uniformly at random, with replacement.
    ///
    /// The returned transitions are copies; mutating them never touches the
    /// buffer's contents.
    pub fn sample(&self, n: usize) -> Result<Vec<Transition>> {
        self.sample_with(n, &mut rand::thread_rng())
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<Transition>> {
        if n > self.buffer.len() {
            return Err(DqnError::InsufficientData {
                requested: n,
                available: self.buffer.len(),
            });
        }
        Ok((0..n)
            .map(|_| self.buffer[rng.gen_range(0..self.buffer.len())].clone())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    /// The oldest surviving transition
    pub fn oldest(&self) -> Option<&Transition> {
        self.buffer.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// A replay buffer shared between several experience collectors.
///
/// `push` and `sample` are serialised by a mutex; no ordering is promised
/// across workers since sampling is uniform anyway.
#[derive(Clone, Debug)]
pub struct SharedReplayBuffer {
    inner: Arc<Mutex<ReplayBuffer>>,
}

impl SharedReplayBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(SharedReplayBuffer {
            inner: Arc::new(Mutex::new(ReplayBuffer::new(capacity)?)),
        })
    }

    // A push either completes or never starts; a poisoned buffer is still consistent.
    fn lock(&self) -> MutexGuard<'_, ReplayBuffer> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, transition: Transition) {
        self.lock().push(transition);
    }

    pub fn sample(&self, n: usize) -> Result<Vec<Transition>> {
        self.lock().sample(n)
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<Transition>> {
        self.lock().sample_with(n, rng)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
